use crate::{models, not_found_as_none, schema, Error, Store};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

impl Store {
    #[tracing::instrument(skip(self))]
    pub async fn load_user_by_username(&self, name: &str) -> Result<Option<models::User>, Error> {
        use schema::users::dsl::*;
        let mut conn = self.connection().await?;
        not_found_as_none(
            users
                .filter(username.eq(name))
                .select(models::User::as_select())
                .first(&mut conn)
                .await,
        )
    }

    #[tracing::instrument(skip(self, user_id))]
    pub async fn load_user_by_id(&self, user_id: i32) -> Result<Option<models::User>, Error> {
        use schema::users::dsl::*;
        let mut conn = self.connection().await?;
        not_found_as_none(
            users
                .filter(id.eq(user_id))
                .select(models::User::as_select())
                .first(&mut conn)
                .await,
        )
    }

    #[tracing::instrument(skip(self))]
    pub async fn count_users(&self) -> Result<i64, Error> {
        let mut conn = self.connection().await?;
        Ok(schema::users::table.count().get_result(&mut conn).await?)
    }

    #[tracing::instrument(skip(self, draft), fields(username = %draft.username))]
    pub async fn create_user(&self, draft: models::UserDraft) -> Result<models::User, Error> {
        let mut conn = self.connection().await?;
        Ok(diesel::insert_into(schema::users::table)
            .values(draft)
            .returning(models::User::as_returning())
            .get_result(&mut conn)
            .await?)
    }
}
