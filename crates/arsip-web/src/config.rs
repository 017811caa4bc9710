use crate::letter;
use anyhow::Context;
use std::{io::Read, path::PathBuf};

const DEFAULT_CONFIG_PATH: &str = "./app-config.toml";

#[derive(serde::Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bind_address: String,
    pub bind_port: u16,
    /// Base64 session signing key, see `gen-session-key`.
    pub secret_key: Option<String>,
    /// Marks the session cookie `Secure`; enable when served over https.
    pub secure_cookies: bool,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub organization_header: String,
    pub rasterizer: letter::RasterizerConfig,
    pub database: arsip_db::Config,
    pub tracing: TracingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_owned(),
            bind_port: 3000,
            secret_key: None,
            secure_cookies: false,
            upload_dir: PathBuf::from("uploads"),
            max_upload_size: 16 * 1024 * 1024,
            organization_header: "DINAS KESEHATAN BLUD PUSKESMAS KUTARAYA".to_owned(),
            rasterizer: letter::RasterizerConfig::default(),
            database: arsip_db::Config::default(),
            tracing: TracingConfig::default(),
        }
    }
}

#[derive(serde::Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct TracingConfig {
    pub console: bool,
}

/// Reads the optional configuration file, then lets the environment (and a
/// `.env` file) override the deployment specific values.
pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    let path = std::env::var("ARSIP_CONFIG").ok();
    let mut config = match &path {
        Some(path) => read_file(path)?,
        None if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
            read_file(DEFAULT_CONFIG_PATH)?
        }
        None => Config::default(),
    };
    if let Ok(bind_address) = std::env::var("ARSIP_BIND_ADDRESS") {
        config.bind_address = bind_address;
    }
    if let Ok(bind_port) = std::env::var("ARSIP_BIND_PORT") {
        config.bind_port = bind_port
            .parse()
            .context("ARSIP_BIND_PORT is not a port number")?;
    }
    if let Ok(secret_key) = std::env::var("ARSIP_SECRET_KEY") {
        config.secret_key = Some(secret_key);
    }
    if let Ok(upload_dir) = std::env::var("ARSIP_UPLOAD_DIR") {
        config.upload_dir = PathBuf::from(upload_dir);
    }
    if let Ok(max_upload_size) = std::env::var("ARSIP_MAX_UPLOAD_SIZE") {
        config.max_upload_size = max_upload_size
            .parse()
            .context("ARSIP_MAX_UPLOAD_SIZE is not a size in bytes")?;
    }
    config.database.apply_env();
    Ok(config)
}

fn read_file(path: &str) -> anyhow::Result<Config> {
    let mut configuration = String::with_capacity(4096);
    std::fs::File::open(path)
        .with_context(|| format!("unable to open configuration file {path}"))?
        .read_to_string(&mut configuration)
        .with_context(|| format!("unable to read configuration file {path}"))?;
    toml::from_str::<Config>(&configuration)
        .with_context(|| format!("unable to parse configuration file {path}"))
}
