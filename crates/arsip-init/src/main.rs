use anyhow::{bail, Context};

const MIN_PASSWORD_CHARS: usize = 12;

/// Creates the schema and, when no account exists yet, the first administrator.
/// The password is never defaulted: it must come from `ARSIP_ADMIN_PASSWORD`.
#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = arsip_db::Config::default();
    config.apply_env();
    let store = arsip_db::create(&config)
        .await
        .with_context(|| format!("creating database {}", config.db_url))?;
    if store.count_users().await.context("counting users")? > 0 {
        println!("an account already exists, nothing to do");
        return Ok(());
    }
    let username = std::env::var("ARSIP_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_owned());
    let password = std::env::var("ARSIP_ADMIN_PASSWORD")
        .context("ARSIP_ADMIN_PASSWORD must be set to the initial administrator password")?;
    if password.chars().count() < MIN_PASSWORD_CHARS {
        bail!("ARSIP_ADMIN_PASSWORD must be at least {MIN_PASSWORD_CHARS} characters long");
    }
    let password_hash =
        arsip_db::credentials::hash_password(&password).context("hashing password")?;
    let admin = store
        .create_user(arsip_db::models::UserDraft {
            username,
            password_hash,
            full_name: Some("Administrator".to_owned()),
            is_admin: true,
        })
        .await
        .context("creating administrator")?;
    println!("created administrator account '{}'", admin.username);
    Ok(())
}
