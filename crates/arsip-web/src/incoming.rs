//! Incoming mail ("surat masuk") with an optional scanned attachment.

use crate::{
    application::Page,
    error::AppError,
    forms::{optional_text, FieldErrors, SearchQuery},
    login::BackEnd,
    uploads::{self, Upload},
    AppState,
};
use arsip_db::models::{IncomingMail, IncomingMailDraft};
use askama::Template;
use axum::{
    extract::{Multipart, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_login::AuthSession;
use axum_messages::Messages;

pub struct IncomingRow {
    pub mail_number: String,
    pub origin: String,
    pub subject: String,
    pub date_received: String,
    pub attachment: Option<String>,
}

impl From<IncomingMail> for IncomingRow {
    fn from(mail: IncomingMail) -> Self {
        Self {
            date_received: mail
                .date_received
                .as_ref()
                .map(|date| date.to_jiff().to_string())
                .unwrap_or_default(),
            mail_number: mail.mail_number,
            origin: mail.origin.unwrap_or_default(),
            subject: mail.subject.unwrap_or_default(),
            attachment: mail.attachment,
        }
    }
}

pub mod list {
    use super::*;

    #[derive(Template)]
    #[template(path = "incoming_list.html")]
    pub struct IncomingListTemplate<'a> {
        page: Page,
        q: &'a str,
        incoming: Vec<IncomingRow>,
    }

    pub async fn get(
        State(app_state): State<AppState>,
        Query(query): Query<SearchQuery>,
        messages: Messages,
        auth_session: AuthSession<BackEnd>,
    ) -> Result<Response, AppError> {
        let mails = match query.needle() {
            Some(needle) => app_state.store.search_incoming_mail(needle).await?,
            None => app_state.store.list_incoming_mail().await?,
        };
        Ok(Html(
            IncomingListTemplate {
                page: Page::new(messages, &auth_session),
                q: query.text(),
                incoming: mails.into_iter().map(IncomingRow::from).collect(),
            }
            .render()?,
        )
        .into_response())
    }
}

pub mod add {
    use super::*;

    #[derive(Default)]
    pub struct IncomingForm {
        mail_number: String,
        origin: String,
        subject: String,
        date_received: String,
        attachment: Option<Upload>,
    }

    impl IncomingForm {
        /// Collects the text fields and the `attachment` file part. Unknown
        /// parts are ignored.
        async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
            let mut form = Self::default();
            while let Some(field) = multipart.next_field().await? {
                let Some(name) = field.name().map(str::to_owned) else {
                    continue;
                };
                match name.as_str() {
                    "attachment" => {
                        let filename = field.file_name().unwrap_or_default().to_owned();
                        let content = field.bytes().await?;
                        form.attachment = Some(Upload { filename, content });
                    }
                    "mail_number" => form.mail_number = field.text().await?,
                    "origin" => form.origin = field.text().await?,
                    "subject" => form.subject = field.text().await?,
                    "date_received" => form.date_received = field.text().await?,
                    _ => tracing::debug!("ignoring form part {name}"),
                }
            }
            Ok(form)
        }

        fn validate(&self) -> Result<Option<jiff::civil::Date>, FieldErrors> {
            let mut errors = FieldErrors::default();
            errors.required("mail_number", &self.mail_number);
            errors.max_length("mail_number", self.mail_number.trim(), 120);
            errors.max_length("origin", self.origin.trim(), 200);
            errors.max_length("subject", self.subject.trim(), 300);
            let date_received = errors.optional_date("date_received", &self.date_received);
            if let Some(upload) = &self.attachment {
                if !upload.filename.is_empty() && !uploads::is_allowed_extension(&upload.filename)
                {
                    errors.add(
                        "attachment",
                        "Only pdf, doc, docx, jpg, jpeg, png and txt files are accepted.",
                    );
                }
            }
            if errors.is_empty() {
                Ok(date_received)
            } else {
                Err(errors)
            }
        }
    }

    #[derive(Template)]
    #[template(path = "incoming_form.html")]
    pub struct IncomingFormTemplate<'a> {
        page: Page,
        form: &'a IncomingForm,
        errors: FieldErrors,
    }

    pub async fn get(
        messages: Messages,
        auth_session: AuthSession<BackEnd>,
    ) -> Result<Response, AppError> {
        Ok(Html(
            IncomingFormTemplate {
                page: Page::new(messages, &auth_session),
                form: &IncomingForm::default(),
                errors: FieldErrors::default(),
            }
            .render()?,
        )
        .into_response())
    }

    pub async fn post(
        State(app_state): State<AppState>,
        messages: Messages,
        auth_session: AuthSession<BackEnd>,
        multipart: Multipart,
    ) -> Result<Response, AppError> {
        let mut form = IncomingForm::from_multipart(multipart).await?;
        let date_received = match form.validate() {
            Ok(date_received) => date_received,
            Err(errors) => {
                return Ok(Html(
                    IncomingFormTemplate {
                        page: Page::new(messages, &auth_session),
                        form: &form,
                        errors,
                    }
                    .render()?,
                )
                .into_response())
            }
        };
        let attachment = app_state.uploads.store(form.attachment.take()).await?;
        let mail = app_state
            .store
            .add_incoming_mail(IncomingMailDraft {
                mail_number: form.mail_number.trim().to_owned(),
                origin: optional_text(&form.origin),
                subject: optional_text(&form.subject),
                date_received,
                attachment,
            })
            .await?;
        tracing::info!(mail_id = mail.id, "incoming mail recorded");
        messages.success(format!("Incoming mail {} recorded.", mail.mail_number));
        Ok(Redirect::to("/surat-masuk").into_response())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use axum::body::Bytes;

        fn form(attachment: Option<&str>) -> IncomingForm {
            IncomingForm {
                mail_number: "001/A".to_owned(),
                date_received: "2024-01-10".to_owned(),
                attachment: attachment.map(|filename| Upload {
                    filename: filename.to_owned(),
                    content: Bytes::from_static(b"x"),
                }),
                ..Default::default()
            }
        }

        #[test]
        fn it_rejects_a_disallowed_attachment() {
            let errors = form(Some("virus.exe")).validate().unwrap_err();
            assert!(errors.get("attachment").is_some());
        }

        #[test]
        fn it_accepts_a_missing_or_empty_attachment() {
            assert_eq!(
                form(None).validate().unwrap(),
                Some(jiff::civil::date(2024, 1, 10))
            );
            assert!(form(Some("")).validate().is_ok());
            assert!(form(Some("scan.PDF")).validate().is_ok());
        }

        #[test]
        fn it_requires_a_mail_number() {
            let mut form = form(None);
            form.mail_number = String::new();
            form.date_received = "10-01-2024".to_owned();
            let errors = form.validate().unwrap_err();
            assert!(errors.get("mail_number").is_some());
            assert!(errors.get("date_received").is_some());
        }
    }
}
