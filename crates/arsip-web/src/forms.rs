//! Field level validation shared by the add forms.

use std::collections::BTreeMap;

/// The first problem found for each form field, keyed by field name.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&String> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "This field is required.");
        }
    }

    pub fn max_length(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("Must be at most {max} characters."));
        }
    }

    /// Parses an optional `YYYY-MM-DD` date; blank is `None`.
    pub fn optional_date(&mut self, field: &'static str, value: &str) -> Option<jiff::civil::Date> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match value.parse::<jiff::civil::Date>() {
            Ok(date) => Some(date),
            Err(_) => {
                self.add(field, "Not a valid date, expected YYYY-MM-DD.");
                None
            }
        }
    }
}

/// Trimmed text, or `None` when blank.
pub fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// The `q` search parameter shared by the list pages.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

impl SearchQuery {
    /// The search text, `None` when absent or blank so the full list is shown.
    pub fn needle(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn text(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_keeps_the_first_error_per_field() {
        let mut errors = FieldErrors::default();
        errors.required("name", "  ");
        errors.max_length("name", "  ", 1);
        assert_eq!(
            errors.get("name").map(String::as_str),
            Some("This field is required.")
        );
        assert!(errors.get("position").is_none());
    }

    #[test]
    fn it_parses_optional_dates() {
        let mut errors = FieldErrors::default();
        assert_eq!(errors.optional_date("date", ""), None);
        assert_eq!(
            errors.optional_date("date", "2024-02-29"),
            Some(jiff::civil::date(2024, 2, 29))
        );
        assert!(errors.is_empty());
        assert_eq!(errors.optional_date("date", "29/02/2024"), None);
        assert!(errors.get("date").is_some());
    }

    #[test]
    fn it_treats_a_blank_query_as_no_query() {
        let blank = SearchQuery {
            q: Some("   ".to_owned()),
        };
        assert_eq!(blank.needle(), None);
        assert_eq!(SearchQuery::default().needle(), None);
        let query = SearchQuery {
            q: Some(" kut ".to_owned()),
        };
        assert_eq!(query.needle(), Some("kut"));
    }
}
