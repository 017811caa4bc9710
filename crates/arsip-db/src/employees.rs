use crate::{contains_pattern, models, schema, Error, Store};
use diesel::{expression_methods::EscapeExpressionMethods, prelude::*};
use diesel_async::RunQueryDsl;

impl Store {
    #[tracing::instrument(skip(self))]
    pub async fn list_employees(&self) -> Result<Vec<models::Employee>, Error> {
        use schema::employees::dsl::*;
        let mut conn = self.connection().await?;
        Ok(employees
            .order(id.asc())
            .select(models::Employee::as_select())
            .load(&mut conn)
            .await?)
    }

    /// Employees whose name contains `needle`, ignoring ASCII case.
    #[tracing::instrument(skip(self))]
    pub async fn search_employees(&self, needle: &str) -> Result<Vec<models::Employee>, Error> {
        use schema::employees::dsl::*;
        let mut conn = self.connection().await?;
        Ok(employees
            .filter(name.like(contains_pattern(needle)).escape('\\'))
            .order(id.asc())
            .select(models::Employee::as_select())
            .load(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_employee(
        &self,
        draft: models::EmployeeDraft,
    ) -> Result<models::Employee, Error> {
        let new_employee = models::NewEmployee {
            name: draft.name,
            position: draft.position,
            employee_number: draft.employee_number,
            created_at: jiff::Timestamp::now().into(),
        };
        let mut conn = self.connection().await?;
        Ok(diesel::insert_into(schema::employees::table)
            .values(new_employee)
            .returning(models::Employee::as_returning())
            .get_result(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn count_employees(&self) -> Result<i64, Error> {
        let mut conn = self.connection().await?;
        Ok(schema::employees::table
            .count()
            .get_result(&mut conn)
            .await?)
    }
}
