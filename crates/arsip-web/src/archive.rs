use crate::{
    application::Page, error::AppError, forms::SearchQuery, incoming::IncomingRow,
    login::BackEnd, outgoing::OutgoingRow, AppState,
};
use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use axum_login::AuthSession;
use axum_messages::Messages;

#[derive(Template)]
#[template(path = "archive.html")]
pub struct ArchiveTemplate<'a> {
    page: Page,
    q: &'a str,
    incoming: Vec<IncomingRow>,
    outgoing: Vec<OutgoingRow>,
}

/// Both mail collections on one page, searched with the same text.
pub async fn get(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
    messages: Messages,
    auth_session: AuthSession<BackEnd>,
) -> Result<Response, AppError> {
    let store = &app_state.store;
    let (incoming, outgoing) = match query.needle() {
        Some(needle) => (
            store.search_incoming_mail(needle).await?,
            store.search_outgoing_mail(needle).await?,
        ),
        None => (
            store.list_incoming_mail().await?,
            store.list_outgoing_mail().await?,
        ),
    };
    Ok(Html(
        ArchiveTemplate {
            page: Page::new(messages, &auth_session),
            q: query.text(),
            incoming: incoming.into_iter().map(IncomingRow::from).collect(),
            outgoing: outgoing.into_iter().map(OutgoingRow::from).collect(),
        }
        .render()?,
    )
    .into_response())
}
