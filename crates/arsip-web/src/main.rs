use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod application;
mod archive;
mod config;
mod error;
mod forms;
mod incoming;
mod letter;
mod login;
mod outgoing;
mod roster;
mod routes;
mod session_key;
mod uploads;


#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let config = config::load().context("loading configuration")?;
    init_tracing(&config.tracing);
    let store = arsip_db::create(&config.database)
        .await
        .context("creating database store")?;
    let key = match &config.secret_key {
        Some(encoded) => {
            session_key::from_base64_encoded(encoded).context("configuring session key")?
        }
        None => {
            tracing::warn!(
                "no secret-key configured, using a random session key; sessions end on restart"
            );
            session_key::generate()
        }
    };
    let uploads = uploads::UploadDir::new(&config.upload_dir);
    uploads
        .ensure_exists()
        .await
        .context("creating upload directory")?;
    let rasterizer = Arc::new(letter::CommandRasterizer::new(config.rasterizer.clone()));
    let letters = letter::LetterRenderer::new(
        uploads.root(),
        config.organization_header.clone(),
        rasterizer,
    );
    let app_state = AppState {
        store,
        uploads: Arc::new(uploads),
        letters: Arc::new(letters),
    };
    let app = routes::setup(
        app_state,
        routes::SessionOptions {
            key,
            secure_cookies: config.secure_cookies,
            max_upload_size: config.max_upload_size,
        },
    );
    let address = (config.bind_address.as_str(), config.bind_port);
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .context("binding listener")?;
    tracing::info!("listening on {}", listener.local_addr()?);
    Ok(axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving application")?)
}

fn init_tracing(config: &config::TracingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,arsip_web=debug"));
    tracing_subscriber::registry()
        .with(config.console.then(console_subscriber::spawn))
        .with(tracing_subscriber::fmt::layer().with_filter(filter))
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("unable to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[derive(Clone)]
pub(crate) struct AppState {
    store: arsip_db::Store,
    uploads: Arc<uploads::UploadDir>,
    letters: Arc<letter::LetterRenderer>,
}
