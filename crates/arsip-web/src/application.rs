use crate::{error::AppError, login::BackEnd, AppState};
use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_login::AuthSession;
use axum_messages::{Level, Message, Messages};

/// A flash message as shown at the top of a page.
pub struct Notice {
    pub level: &'static str,
    pub text: String,
}

impl From<Message> for Notice {
    fn from(message: Message) -> Self {
        let level = match message.level {
            Level::Debug | Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        Self {
            level,
            text: message.message,
        }
    }
}

/// What the shared layout needs on every page.
pub struct Page {
    pub notices: Vec<Notice>,
    pub user_name: Option<String>,
}

impl Page {
    pub fn anonymous(messages: Messages) -> Self {
        Self {
            notices: messages.into_iter().map(Notice::from).collect(),
            user_name: None,
        }
    }

    pub fn new(messages: Messages, auth_session: &AuthSession<BackEnd>) -> Self {
        Self {
            user_name: auth_session
                .user
                .as_ref()
                .map(|user| user.display_name().to_owned()),
            ..Self::anonymous(messages)
        }
    }
}

pub mod index {
    use super::*;

    pub async fn get(auth_session: AuthSession<BackEnd>) -> Redirect {
        if auth_session.user.is_some() {
            Redirect::to("/dashboard")
        } else {
            Redirect::to("/login")
        }
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Template)]
    #[template(path = "dashboard.html")]
    pub struct DashboardTemplate {
        page: Page,
        employees: i64,
        incoming: i64,
        outgoing: i64,
    }

    pub async fn get(
        State(app_state): State<AppState>,
        messages: Messages,
        auth_session: AuthSession<BackEnd>,
    ) -> Result<Response, AppError> {
        let store = &app_state.store;
        Ok(Html(
            DashboardTemplate {
                page: Page::new(messages, &auth_session),
                employees: store.count_employees().await?,
                incoming: store.count_incoming_mail().await?,
                outgoing: store.count_outgoing_mail().await?,
            }
            .render()?,
        )
        .into_response())
    }
}
