//! The employee roster ("pegawai").

use crate::{
    application::Page,
    error::AppError,
    forms::{optional_text, FieldErrors, SearchQuery},
    login::BackEnd,
    AppState,
};
use arsip_db::models::{Employee, EmployeeDraft};
use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_login::AuthSession;
use axum_messages::Messages;

pub struct EmployeeRow {
    pub id: i32,
    pub name: String,
    pub position: String,
    pub employee_number: String,
}

impl From<Employee> for EmployeeRow {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name,
            position: employee.position.unwrap_or_default(),
            employee_number: employee.employee_number.unwrap_or_default(),
        }
    }
}

pub mod list {
    use super::*;

    #[derive(Template)]
    #[template(path = "employees.html")]
    pub struct EmployeesTemplate<'a> {
        page: Page,
        q: &'a str,
        employees: Vec<EmployeeRow>,
    }

    pub async fn get(
        State(app_state): State<AppState>,
        Query(query): Query<SearchQuery>,
        messages: Messages,
        auth_session: AuthSession<BackEnd>,
    ) -> Result<Response, AppError> {
        let employees = match query.needle() {
            Some(needle) => app_state.store.search_employees(needle).await?,
            None => app_state.store.list_employees().await?,
        };
        Ok(Html(
            EmployeesTemplate {
                page: Page::new(messages, &auth_session),
                q: query.text(),
                employees: employees.into_iter().map(EmployeeRow::from).collect(),
            }
            .render()?,
        )
        .into_response())
    }
}

pub mod add {
    use super::*;

    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(default)]
    pub struct EmployeeForm {
        name: String,
        position: String,
        employee_number: String,
    }

    impl EmployeeForm {
        fn validate(&self) -> Result<EmployeeDraft, FieldErrors> {
            let mut errors = FieldErrors::default();
            errors.required("name", &self.name);
            errors.max_length("name", self.name.trim(), 150);
            errors.max_length("position", self.position.trim(), 150);
            errors.max_length("employee_number", self.employee_number.trim(), 50);
            if !errors.is_empty() {
                return Err(errors);
            }
            Ok(EmployeeDraft {
                name: self.name.trim().to_owned(),
                position: optional_text(&self.position),
                employee_number: optional_text(&self.employee_number),
            })
        }
    }

    #[derive(Template)]
    #[template(path = "employee_form.html")]
    pub struct EmployeeFormTemplate<'a> {
        page: Page,
        form: &'a EmployeeForm,
        errors: FieldErrors,
    }

    pub async fn get(
        messages: Messages,
        auth_session: AuthSession<BackEnd>,
    ) -> Result<Response, AppError> {
        Ok(Html(
            EmployeeFormTemplate {
                page: Page::new(messages, &auth_session),
                form: &EmployeeForm::default(),
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
        Form(form): Form<EmployeeForm>,
    ) -> Result<Response, AppError> {
        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(errors) => {
                return Ok(Html(
                    EmployeeFormTemplate {
                        page: Page::new(messages, &auth_session),
                        form: &form,
                        errors,
                    }
                    .render()?,
                )
                .into_response())
            }
        };
        let employee = app_state.store.add_employee(draft).await?;
        tracing::info!(employee_id = employee.id, "employee added");
        messages.success(format!("Employee {} added.", employee.name));
        Ok(Redirect::to("/pegawai").into_response())
    }

}
