//! Input Validation Helpers
//!
//! Collect every field problem into one `FieldErrors` before failing.

use kernel::error::fields::FieldErrors;

use crate::domain::value_objects::ValueError;

/// Keep the value, or record the error under `field`
pub(crate) fn parse_field<T>(
    errors: &mut FieldErrors,
    field: &'static str,
    result: Result<T, ValueError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

/// Required field: missing or invalid values are both recorded
pub(crate) fn require_field<R, T>(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: Option<R>,
    parse: impl FnOnce(R) -> Result<T, ValueError>,
) -> Option<T> {
    let raw = errors.require(field, raw)?;
    parse_field(errors, field, parse(raw))
}

/// Optional field: absent stays `None`, present must parse
pub(crate) fn optional_field<R, T>(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: Option<R>,
    parse: impl FnOnce(R) -> Result<T, ValueError>,
) -> Option<T> {
    parse_field(errors, field, parse(raw?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Name, Score};

    #[test]
    fn test_require_field_records_missing_and_invalid() {
        let mut errors = FieldErrors::new();
        assert!(require_field(&mut errors, "name", None::<String>, Name::new).is_none());
        assert!(require_field(&mut errors, "score", Some(11), Score::new).is_none());
        assert_eq!(errors.get("name").unwrap(), ["This field is required.".to_string()]);
        assert_eq!(errors.get("score").unwrap(), ["Score must be between 1 and 10.".to_string()]);
    }

    #[test]
    fn test_optional_field_skips_absent() {
        let mut errors = FieldErrors::new();
        assert!(optional_field(&mut errors, "name", None::<String>, Name::new).is_none());
        assert!(errors.is_empty());
        assert!(optional_field(&mut errors, "name", Some("Drama"), Name::new).is_some());
    }
}
