use super::{
    application::{dashboard, index},
    archive, incoming,
    login::{create_backend, login, logout, BackEnd},
    outgoing, roster, uploads,
};
use axum::{extract::DefaultBodyLimit, routing::get};
use axum_login::{login_required, AuthManagerLayerBuilder};
use axum_messages::MessagesManagerLayer;
use tower_sessions::{cookie::Key, MemoryStore, SessionManagerLayer};

pub(super) struct SessionOptions {
    pub key: Key,
    pub secure_cookies: bool,
    pub max_upload_size: usize,
}

pub(super) fn setup(app_state: super::AppState, options: SessionOptions) -> axum::Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(options.secure_cookies)
        .with_signed(options.key);
    let login_backend = create_backend(app_state.store.clone());
    let auth_layer = AuthManagerLayerBuilder::new(login_backend, session_layer).build();
    axum::Router::new()
        .route("/dashboard", get(dashboard::get))
        .route("/pegawai", get(roster::list::get))
        .route(
            "/pegawai/add",
            get(roster::add::get).post(roster::add::post),
        )
        .route("/surat-masuk", get(incoming::list::get))
        .route(
            "/surat-masuk/add",
            get(incoming::add::get).post(incoming::add::post),
        )
        .route("/surat-keluar", get(outgoing::list::get))
        .route(
            "/surat-keluar/add",
            get(outgoing::add::get).post(outgoing::add::post),
        )
        .route("/arsip", get(archive::get))
        .route("/uploads/{filename}", get(uploads::get))
        .route_layer(login_required!(BackEnd, login_url = "/login"))
        .route("/", get(index::get))
        .route("/login", get(login::get).post(login::post))
        .route("/logout", get(logout::get))
        .layer(MessagesManagerLayer)
        .layer(auth_layer)
        .layer(DefaultBodyLimit::max(options.max_upload_size))
        .fallback(fallback)
        .with_state(app_state)
}

pub async fn fallback(_uri: axum::http::Uri) -> impl axum::response::IntoResponse {
    (axum::http::StatusCode::NOT_FOUND, "404: Not Found")
}
