use crate::{contains_pattern, models, not_found_as_error, schema, Error, Store};
use diesel::{expression_methods::EscapeExpressionMethods, prelude::*};
use diesel_async::RunQueryDsl;

impl Store {
    /// Incoming mail, most recently received first.
    #[tracing::instrument(skip(self))]
    pub async fn list_incoming_mail(&self) -> Result<Vec<models::IncomingMail>, Error> {
        use schema::incoming_mail::dsl::*;
        let mut conn = self.connection().await?;
        Ok(incoming_mail
            .order((date_received.desc(), id.desc()))
            .select(models::IncomingMail::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Incoming mail whose number or subject contains `needle`, ignoring ASCII case.
    #[tracing::instrument(skip(self))]
    pub async fn search_incoming_mail(
        &self,
        needle: &str,
    ) -> Result<Vec<models::IncomingMail>, Error> {
        use schema::incoming_mail::dsl::*;
        let pattern = contains_pattern(needle);
        let mut conn = self.connection().await?;
        Ok(incoming_mail
            .filter(
                mail_number
                    .like(pattern.clone())
                    .escape('\\')
                    .or(subject.like(pattern).escape('\\')),
            )
            .order((date_received.desc(), id.desc()))
            .select(models::IncomingMail::as_select())
            .load(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_incoming_mail(
        &self,
        draft: models::IncomingMailDraft,
    ) -> Result<models::IncomingMail, Error> {
        let new_mail = models::NewIncomingMail {
            mail_number: draft.mail_number,
            origin: draft.origin,
            subject: draft.subject,
            date_received: draft.date_received.map(Into::into),
            attachment: draft.attachment,
            created_at: jiff::Timestamp::now().into(),
        };
        let mut conn = self.connection().await?;
        Ok(diesel::insert_into(schema::incoming_mail::table)
            .values(new_mail)
            .returning(models::IncomingMail::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_incoming_mail(
        &self,
        mail_id: i32,
        changes: models::IncomingMailChanges,
    ) -> Result<models::IncomingMail, Error> {
        use schema::incoming_mail::dsl::*;
        let mut conn = self.connection().await?;
        not_found_as_error(
            diesel::update(incoming_mail.filter(id.eq(mail_id)))
                .set(changes)
                .returning(models::IncomingMail::as_returning())
                .get_result(&mut conn)
                .await,
        )
    }

    #[tracing::instrument(skip(self))]
    pub async fn count_incoming_mail(&self) -> Result<i64, Error> {
        let mut conn = self.connection().await?;
        Ok(schema::incoming_mail::table
            .count()
            .get_result(&mut conn)
            .await?)
    }
}
