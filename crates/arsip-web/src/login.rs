use crate::{application::Page, error::AppError, forms::FieldErrors};
use askama::Template;
use axum::{
    extract::Query,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_login::{AuthSession, AuthUser, AuthnBackend, UserId};
use axum_messages::Messages;
use rs_sha512::HasherContext;
use std::hash::Hasher;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct BackEnd {
    db: arsip_db::Store,
}

pub(crate) fn create_backend(database: arsip_db::Store) -> BackEnd {
    BackEnd { db: database }
}

/// The signed-in account as carried by the session.
#[derive(Clone, Debug)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub full_name: Option<String>,
    session_auth_hash: [u8; 64],
}

impl User {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

impl AuthUser for User {
    type Id = i32;

    fn id(&self) -> Self::Id {
        self.id
    }

    // changes whenever the password does, which ends every existing session
    fn session_auth_hash(&self) -> &[u8] {
        &self.session_auth_hash
    }
}

impl From<arsip_db::models::User> for User {
    fn from(
        arsip_db::models::User {
            id,
            username,
            password_hash,
            full_name,
            ..
        }: arsip_db::models::User,
    ) -> Self {
        let mut hasher = rs_sha512::Sha512Hasher::default();
        hasher.write(password_hash.as_bytes());
        let _ = hasher.finish();
        let final_result = HasherContext::finish(&mut hasher);
        Self {
            id,
            username,
            full_name,
            session_auth_hash: final_result.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("User database error: {0}")]
    UserDb(#[from] arsip_db::Error),
}

#[derive(Clone, Default, serde::Deserialize)]
pub struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    next: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl AuthnBackend for BackEnd {
    type User = User;
    type Credentials = Credentials;
    type Error = Error;

    /// Unknown users and wrong passwords both come back as `Ok(None)`.
    async fn authenticate(
        &self,
        credentials: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let Some(user) = self.db.load_user_by_username(&credentials.username).await? else {
            return Ok(None);
        };
        if arsip_db::credentials::verify(&user, &credentials.password)? {
            Ok(Some(user.into()))
        } else {
            Ok(None)
        }
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        Ok(self.db.load_user_by_id(*user_id).await?.map(Into::into))
    }
}

/// Only same-site paths are followed after signing in.
fn local_redirect_target(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') => {
            next
        }
        _ => "/dashboard",
    }
}

pub mod login {
    use super::*;

    #[derive(Template)]
    #[template(path = "login.html")]
    pub struct LoginTemplate<'a> {
        page: Page,
        username: &'a str,
        next: Option<&'a str>,
        error: Option<&'a str>,
        errors: FieldErrors,
    }

    #[derive(Debug, serde::Deserialize)]
    pub struct NextUrl {
        next: Option<String>,
    }

    pub async fn get(
        messages: Messages,
        Query(NextUrl { next }): Query<NextUrl>,
    ) -> Result<Response, AppError> {
        Ok(Html(
            LoginTemplate {
                page: Page::anonymous(messages),
                username: "",
                next: next.as_deref(),
                error: None,
                errors: FieldErrors::default(),
            }
            .render()?,
        )
        .into_response())
    }

    pub async fn post(
        mut auth_session: AuthSession<BackEnd>,
        messages: Messages,
        Form(creds): Form<Credentials>,
    ) -> Result<Response, AppError> {
        let mut errors = FieldErrors::default();
        errors.required("username", &creds.username);
        errors.required("password", &creds.password);
        let user = if errors.is_empty() {
            auth_session
                .authenticate(creds.clone())
                .await
                .map_err(|err| AppError::Session(err.to_string()))?
        } else {
            None
        };
        let Some(user) = user else {
            if errors.is_empty() {
                tracing::info!(username = %creds.username, "rejected sign in");
            }
            let error = errors.is_empty().then_some(INVALID_CREDENTIALS);
            return Ok(Html(
                LoginTemplate {
                    page: Page::anonymous(messages),
                    username: &creds.username,
                    next: creds.next.as_deref(),
                    error,
                    errors,
                }
                .render()?,
            )
            .into_response());
        };
        auth_session
            .login(&user)
            .await
            .map_err(|err| AppError::Session(err.to_string()))?;
        tracing::info!(user_id = user.id, "signed in");
        messages.success(format!("Welcome, {}", user.display_name()));
        Ok(Redirect::to(local_redirect_target(creds.next.as_deref())).into_response())
    }
}

pub mod logout {
    use super::*;

    pub async fn get(mut auth_session: AuthSession<BackEnd>) -> Result<Response, AppError> {
        auth_session
            .logout()
            .await
            .map_err(|err| AppError::Session(err.to_string()))?;
        Ok(Redirect::to("/login").into_response())
    }
}
