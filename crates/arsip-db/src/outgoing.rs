use crate::{contains_pattern, models, not_found_as_error, schema, Error, Store};
use diesel::{expression_methods::EscapeExpressionMethods, prelude::*};
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};

impl Store {
    /// Outgoing mail, most recently dated first.
    #[tracing::instrument(skip(self))]
    pub async fn list_outgoing_mail(&self) -> Result<Vec<models::OutgoingMail>, Error> {
        use schema::outgoing_mail::dsl::*;
        let mut conn = self.connection().await?;
        Ok(outgoing_mail
            .order((mail_date.desc(), id.desc()))
            .select(models::OutgoingMail::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Outgoing mail whose number or subject contains `needle`, ignoring ASCII case.
    #[tracing::instrument(skip(self))]
    pub async fn search_outgoing_mail(
        &self,
        needle: &str,
    ) -> Result<Vec<models::OutgoingMail>, Error> {
        use schema::outgoing_mail::dsl::*;
        let pattern = contains_pattern(needle);
        let mut conn = self.connection().await?;
        Ok(outgoing_mail
            .filter(
                mail_number
                    .like(pattern.clone())
                    .escape('\\')
                    .or(subject.like(pattern).escape('\\')),
            )
            .order((mail_date.desc(), id.desc()))
            .select(models::OutgoingMail::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Inserts the mail and its employee assignments in one transaction. The
    /// returned record has no PDF yet.
    #[tracing::instrument(skip(self, draft), fields(subject = %draft.subject))]
    pub async fn add_outgoing_mail(
        &self,
        draft: models::OutgoingMailDraft,
    ) -> Result<models::OutgoingMail, Error> {
        let new_mail = models::NewOutgoingMail {
            mail_number: draft.mail_number,
            subject: draft.subject,
            mail_date: draft.mail_date.map(Into::into),
            recipient: draft.recipient,
            body: draft.body,
            created_by: draft.created_by,
            created_at: jiff::Timestamp::now().into(),
        };
        let assigned_to = draft.assigned_to;
        self.connection()
            .await?
            .transaction(|conn| {
                use schema::{outgoing_mail, outgoing_mail_assignment};
                async move {
                    let new_mail = diesel::insert_into(outgoing_mail::table)
                        .values(new_mail)
                        .returning(models::OutgoingMail::as_returning())
                        .get_result(conn)
                        .await?;
                    // sqlite has no batch insert with default values, one row each
                    for (employee_id, position) in assigned_to.into_iter().zip(0..) {
                        diesel::insert_into(outgoing_mail_assignment::table)
                            .values(models::NewAssignment {
                                outgoing_mail_id: new_mail.id,
                                employee_id,
                                position,
                            })
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, Error>(new_mail)
                }
                .scope_boxed()
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_outgoing_mail(
        &self,
        mail_id: i32,
        changes: models::OutgoingMailChanges,
    ) -> Result<models::OutgoingMail, Error> {
        use schema::outgoing_mail::dsl::*;
        let mut conn = self.connection().await?;
        not_found_as_error(
            diesel::update(outgoing_mail.filter(id.eq(mail_id)))
                .set(changes)
                .returning(models::OutgoingMail::as_returning())
                .get_result(&mut conn)
                .await,
        )
    }

    /// Names of the employees assigned to a mail, in assignment order. Ids with
    /// no matching employee are skipped.
    #[tracing::instrument(skip(self))]
    pub async fn assigned_employee_names(&self, mail_id: i32) -> Result<Vec<String>, Error> {
        use schema::{employees, outgoing_mail_assignment};
        let mut conn = self.connection().await?;
        Ok(outgoing_mail_assignment::table
            .inner_join(employees::table)
            .filter(outgoing_mail_assignment::outgoing_mail_id.eq(mail_id))
            .order(outgoing_mail_assignment::position.asc())
            .select(employees::name)
            .load(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn count_outgoing_mail(&self) -> Result<i64, Error> {
        let mut conn = self.connection().await?;
        Ok(schema::outgoing_mail::table
            .count()
            .get_result(&mut conn)
            .await?)
    }
}
