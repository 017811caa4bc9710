use diesel::prelude::*;

#[derive(Identifiable, Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub is_admin: bool,
}

/// A user about to be provisioned; `password_hash` comes from
/// [`crate::credentials::hash_password`].
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDraft {
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub is_admin: bool,
}

#[derive(Identifiable, Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::employees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub position: Option<String>,
    pub employee_number: Option<String>,
    pub created_at: jiff_diesel::Timestamp,
}

#[derive(Clone, Debug, Default)]
pub struct EmployeeDraft {
    pub name: String,
    pub position: Option<String>,
    pub employee_number: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::employees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct NewEmployee {
    pub name: String,
    pub position: Option<String>,
    pub employee_number: Option<String>,
    pub created_at: jiff_diesel::Timestamp,
}

#[derive(Identifiable, Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::incoming_mail)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IncomingMail {
    pub id: i32,
    pub mail_number: String,
    pub origin: Option<String>,
    pub subject: Option<String>,
    pub date_received: Option<jiff_diesel::Date>,
    pub attachment: Option<String>,
    pub created_at: jiff_diesel::Timestamp,
}

#[derive(Clone, Debug, Default)]
pub struct IncomingMailDraft {
    pub mail_number: String,
    pub origin: Option<String>,
    pub subject: Option<String>,
    pub date_received: Option<jiff::civil::Date>,
    pub attachment: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::incoming_mail)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct NewIncomingMail {
    pub mail_number: String,
    pub origin: Option<String>,
    pub subject: Option<String>,
    pub date_received: Option<jiff_diesel::Date>,
    pub attachment: Option<String>,
    pub created_at: jiff_diesel::Timestamp,
}

/// Partial update of an incoming mail; `None` leaves a column untouched,
/// `Some(None)` clears a nullable one.
#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = crate::schema::incoming_mail)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IncomingMailChanges {
    pub mail_number: Option<String>,
    pub origin: Option<Option<String>>,
    pub subject: Option<Option<String>>,
    pub date_received: Option<Option<jiff_diesel::Date>>,
    pub attachment: Option<Option<String>>,
}

#[derive(Identifiable, Queryable, Selectable, Associations, Clone, Debug)]
#[diesel(table_name = crate::schema::outgoing_mail)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(User, foreign_key = created_by))]
pub struct OutgoingMail {
    pub id: i32,
    pub mail_number: Option<String>,
    pub subject: String,
    pub mail_date: Option<jiff_diesel::Date>,
    pub recipient: Option<String>,
    pub body: String,
    pub created_by: i32,
    pub created_at: jiff_diesel::Timestamp,
    pub pdf_filename: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct OutgoingMailDraft {
    pub mail_number: Option<String>,
    pub subject: String,
    pub mail_date: Option<jiff::civil::Date>,
    pub recipient: Option<String>,
    pub body: String,
    pub created_by: i32,
    /// Employee ids in the order they were chosen; ids need not exist.
    pub assigned_to: Vec<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::outgoing_mail)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct NewOutgoingMail {
    pub mail_number: Option<String>,
    pub subject: String,
    pub mail_date: Option<jiff_diesel::Date>,
    pub recipient: Option<String>,
    pub body: String,
    pub created_by: i32,
    pub created_at: jiff_diesel::Timestamp,
}

#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = crate::schema::outgoing_mail)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OutgoingMailChanges {
    pub mail_number: Option<Option<String>>,
    pub subject: Option<String>,
    pub mail_date: Option<Option<jiff_diesel::Date>>,
    pub recipient: Option<Option<String>>,
    pub body: Option<String>,
    pub pdf_filename: Option<Option<String>>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::outgoing_mail_assignment)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct NewAssignment {
    pub outgoing_mail_id: i32,
    pub employee_id: i32,
    pub position: i32,
}
