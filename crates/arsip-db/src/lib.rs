use diesel::{sqlite::SqliteConnection, Connection as _};
use diesel_async::{
    pooled_connection::{
        mobc::{Builder, Pool},
        AsyncDieselConnectionManager,
    },
    sync_connection_wrapper::SyncConnectionWrapper,
    RunQueryDsl,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;

pub mod credentials;
mod employees;
mod incoming;
pub mod models;
mod outgoing;
mod schema;
#[cfg(test)]
mod tests;
mod users;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type DbConnection = SyncConnectionWrapper<SqliteConnection>;
type PooledConnection = mobc::Connection<AsyncDieselConnectionManager<DbConnection>>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("getting connection from pool: {0}")]
    GetConnectionPool(#[from] mobc::Error<diesel_async::pooled_connection::PoolError>),
    #[error("result failure: {0}")]
    Result(#[from] diesel::result::Error),
    #[error("opening database {url}: {source}")]
    Open {
        url: String,
        source: diesel::ConnectionError,
    },
    #[error("running migrations: {0}")]
    Migration(String),
    #[error("password hash: {0}")]
    PasswordHash(argon2::password_hash::Error),
    #[error("Other General: {0}")]
    OtherGeneral(String),
    #[error("Not Found")]
    NotFound,
}

#[derive(Clone)]
pub struct Store {
    pool: Pool<DbConnection>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub db_url: String,
    max_open: u64,
    max_idle: u64,
    #[serde(with = "humantime_serde")]
    max_lifetime: Option<Duration>,
    #[serde(with = "humantime_serde")]
    max_idle_lifetime: Option<Duration>,
    #[serde(with = "humantime_serde")]
    timeout_for_get: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: "arsip.db".to_owned(),
            max_open: 8,
            max_idle: 4,
            max_lifetime: None,
            max_idle_lifetime: None,
            timeout_for_get: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// A default configuration pointing at `db_url`.
    pub fn for_url(db_url: impl Into<String>) -> Self {
        Self {
            db_url: db_url.into(),
            ..Self::default()
        }
    }

    /// Applies the `DATABASE_URL` environment override.
    pub fn apply_env(&mut self) {
        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            self.db_url = db_url;
        }
    }
}

/// Opens the database, bringing its schema up to date before the pool is built.
pub async fn create(config: &Config) -> Result<Store, Error> {
    run_migrations(config.db_url.clone()).await?;
    let pool = create_pool(config);
    Ok(Store { pool })
}

async fn run_migrations(db_url: String) -> Result<(), Error> {
    tokio::task::spawn_blocking(move || {
        let mut conn = SqliteConnection::establish(&db_url).map_err(|source| Error::Open {
            url: db_url.clone(),
            source,
        })?;
        diesel::connection::SimpleConnection::batch_execute(
            &mut conn,
            "PRAGMA journal_mode = WAL;",
        )?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| Error::Migration(err.to_string()))?;
        for version in applied {
            tracing::info!("applied migration {version}");
        }
        Ok(())
    })
    .await
    .map_err(|err| Error::OtherGeneral(format!("migration task: {err}")))?
}

fn create_pool(config: &Config) -> Pool<DbConnection> {
    let builder = Builder::new()
        .max_open(config.max_open)
        .max_idle(config.max_idle)
        .max_lifetime(
            config
                .max_lifetime
                .map(|v| v.max(Duration::from_secs(3600))),
        )
        .max_idle_lifetime(
            config
                .max_idle_lifetime
                .map(|v| v.max(Duration::from_secs(900))),
        )
        .get_timeout(Some(config.timeout_for_get.max(Duration::from_secs(5))));
    let manager = AsyncDieselConnectionManager::<DbConnection>::new(&config.db_url);
    builder.build(manager)
}

impl Store {
    async fn connection(&self) -> Result<PooledConnection, Error> {
        let mut conn = self.pool.get().await?;
        // concurrent writers wait on each other instead of failing with SQLITE_BUSY
        diesel::sql_query("PRAGMA busy_timeout = 5000")
            .execute(&mut conn)
            .await?;
        Ok(conn)
    }
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards in the needle escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn not_found_as_none<T>(result: Result<T, diesel::result::Error>) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn not_found_as_error<T>(result: Result<T, diesel::result::Error>) -> Result<T, Error> {
    match result {
        Ok(value) => Ok(value),
        Err(diesel::result::Error::NotFound) => Err(Error::NotFound),
        Err(err) => Err(err.into()),
    }
}
