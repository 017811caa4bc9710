//! Outgoing mail ("surat keluar"). Each new mail is turned into a PDF letter
//! right after it is saved.

use crate::{
    application::Page,
    error::AppError,
    forms::{optional_text, FieldErrors, SearchQuery},
    letter::LetterContext,
    login::BackEnd,
    roster::EmployeeRow,
    AppState,
};
use arsip_db::models::{OutgoingMail, OutgoingMailChanges, OutgoingMailDraft};
use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_login::AuthSession;
use axum_messages::Messages;
use itertools::Itertools;
use std::borrow::Borrow;

pub struct OutgoingRow {
    pub mail_number: String,
    pub subject: String,
    pub mail_date: String,
    pub recipient: String,
    pub pdf_filename: Option<String>,
}

impl From<OutgoingMail> for OutgoingRow {
    fn from(mail: OutgoingMail) -> Self {
        Self {
            mail_date: mail
                .mail_date
                .as_ref()
                .map(|date| date.to_jiff().to_string())
                .unwrap_or_default(),
            mail_number: mail.mail_number.unwrap_or_default(),
            subject: mail.subject,
            recipient: mail.recipient.unwrap_or_default(),
            pdf_filename: mail.pdf_filename,
        }
    }
}

pub mod list {
    use super::*;

    #[derive(Template)]
    #[template(path = "outgoing_list.html")]
    pub struct OutgoingListTemplate<'a> {
        page: Page,
        q: &'a str,
        outgoing: Vec<OutgoingRow>,
    }

    pub async fn get(
        State(app_state): State<AppState>,
        Query(query): Query<SearchQuery>,
        messages: Messages,
        auth_session: AuthSession<BackEnd>,
    ) -> Result<Response, AppError> {
        let mails = match query.needle() {
            Some(needle) => app_state.store.search_outgoing_mail(needle).await?,
            None => app_state.store.list_outgoing_mail().await?,
        };
        Ok(Html(
            OutgoingListTemplate {
                page: Page::new(messages, &auth_session),
                q: query.text(),
                outgoing: mails.into_iter().map(OutgoingRow::from).collect(),
            }
            .render()?,
        )
        .into_response())
    }
}

pub mod add {
    use super::*;

    #[derive(Debug, Default)]
    pub struct OutgoingForm {
        mail_number: String,
        subject: String,
        mail_date: String,
        recipient: String,
        body: String,
        assigned_to: Vec<i32>,
        unreadable_assignment: bool,
    }

    impl OutgoingForm {
        /// Builds the form from the url-encoded pairs so that repeated
        /// `assigned_to` values are all kept, in submission order.
        fn from_pairs(pairs: Vec<(String, String)>) -> Self {
            let mut form = Self::default();
            for (key, value) in pairs {
                match key.as_str() {
                    "mail_number" => form.mail_number = value,
                    "subject" => form.subject = value,
                    "mail_date" => form.mail_date = value,
                    "recipient" => form.recipient = value,
                    "body" => form.body = value,
                    "assigned_to" if value.trim().is_empty() => {}
                    "assigned_to" => match value.trim().parse() {
                        Ok(id) => form.assigned_to.push(id),
                        Err(_) => form.unreadable_assignment = true,
                    },
                    _ => {}
                }
            }
            form.assigned_to = form.assigned_to.into_iter().unique().collect();
            form
        }

        fn is_assigned(&self, employee_id: impl Borrow<i32>) -> bool {
            self.assigned_to.contains(employee_id.borrow())
        }

        fn validate(&self, created_by: i32) -> Result<OutgoingMailDraft, FieldErrors> {
            let mut errors = FieldErrors::default();
            errors.max_length("mail_number", self.mail_number.trim(), 120);
            errors.required("subject", &self.subject);
            errors.max_length("subject", self.subject.trim(), 300);
            let mail_date = errors.optional_date("mail_date", &self.mail_date);
            errors.max_length("recipient", self.recipient.trim(), 200);
            errors.required("body", &self.body);
            if self.unreadable_assignment {
                errors.add("assigned_to", "Choose employees from the list.");
            }
            if !errors.is_empty() {
                return Err(errors);
            }
            Ok(OutgoingMailDraft {
                mail_number: optional_text(&self.mail_number),
                subject: self.subject.trim().to_owned(),
                mail_date,
                recipient: optional_text(&self.recipient),
                body: self.body.clone(),
                created_by,
                assigned_to: self.assigned_to.clone(),
            })
        }
    }

    #[derive(Template)]
    #[template(path = "outgoing_form.html")]
    pub struct OutgoingFormTemplate<'a> {
        page: Page,
        form: &'a OutgoingForm,
        employees: Vec<EmployeeRow>,
        errors: FieldErrors,
    }

    async fn render_form(
        app_state: &AppState,
        page: Page,
        form: &OutgoingForm,
        errors: FieldErrors,
    ) -> Result<Response, AppError> {
        let employees = app_state.store.list_employees().await?;
        Ok(Html(
            OutgoingFormTemplate {
                page,
                form,
                employees: employees.into_iter().map(EmployeeRow::from).collect(),
                errors,
            }
            .render()?,
        )
        .into_response())
    }

    pub async fn get(
        State(app_state): State<AppState>,
        messages: Messages,
        auth_session: AuthSession<BackEnd>,
    ) -> Result<Response, AppError> {
        render_form(
            &app_state,
            Page::new(messages, &auth_session),
            &OutgoingForm::default(),
            FieldErrors::default(),
        )
        .await
    }

    pub async fn post(
        State(app_state): State<AppState>,
        mut messages: Messages,
        auth_session: AuthSession<BackEnd>,
        Form(pairs): Form<Vec<(String, String)>>,
    ) -> Result<Response, AppError> {
        let Some(user_id) = auth_session.user.as_ref().map(|user| user.id) else {
            return Ok(Redirect::to("/login").into_response());
        };
        let form = OutgoingForm::from_pairs(pairs);
        let draft = match form.validate(user_id) {
            Ok(draft) => draft,
            Err(errors) => {
                let page = Page::new(messages, &auth_session);
                return render_form(&app_state, page, &form, errors).await;
            }
        };
        let mail = app_state.store.add_outgoing_mail(draft).await?;
        tracing::info!(mail_id = mail.id, "outgoing mail recorded");
        let names = app_state.store.assigned_employee_names(mail.id).await?;
        match app_state
            .letters
            .render(&LetterContext::new(&mail, names))
            .await
        {
            Ok(pdf_filename) => {
                app_state
                    .store
                    .update_outgoing_mail(
                        mail.id,
                        OutgoingMailChanges {
                            pdf_filename: Some(Some(pdf_filename)),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            Err(err) => {
                tracing::warn!(mail_id = mail.id, "letter was not generated: {err}");
                messages = messages.warning(
                    "The mail was saved, but its letter could not be generated.",
                );
            }
        }
        messages.success(format!("Outgoing mail \"{}\" recorded.", mail.subject));
        Ok(Redirect::to("/surat-keluar").into_response())
    }

}
