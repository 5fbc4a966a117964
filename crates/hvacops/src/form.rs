//! Raw form-field access.
//!
//! Form posts arrive as flat string maps. Readers here are tolerant by
//! contract: a blank or non-numeric value reads as `None`, never an error,
//! so partially-filled test sheets stay persistable.

use std::collections::HashMap;

/// One submitted form: field name → raw value.
pub type FormData = HashMap<String, String>;

/// Trimmed text field; blank (or absent) reads as `None`.
pub fn text(form: &FormData, key: &str) -> Option<String> {
    let value = form.get(key)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Numeric field; blank or unparsable reads as `None`.
pub fn number(form: &FormData, key: &str) -> Option<f64> {
    text(form, key)?.parse::<f64>().ok()
}

/// Checkbox/flag field. Recognizes the usual true/false tokens; anything
/// else (including blank) reads as `None`.
pub fn flag(form: &FormData, key: &str) -> Option<bool> {
    match text(form, key)?.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Required identifier field; blank is a validation error.
pub fn require(
    form: &FormData,
    key: &'static str,
) -> Result<String, crate::error::ValidationError> {
    text(form, key).ok_or(crate::error::ValidationError::MissingField(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_text_trims_and_blanks() {
        let f = form(&[("name", "  Upstairs  "), ("empty", "   ")]);
        assert_eq!(text(&f, "name").as_deref(), Some("Upstairs"));
        assert_eq!(text(&f, "empty"), None);
        assert_eq!(text(&f, "missing"), None);
    }

    #[test]
    fn test_number_tolerates_garbage() {
        let f = form(&[("tonnage", "3.5"), ("cfm", "abc"), ("blank", "")]);
        assert_eq!(number(&f, "tonnage"), Some(3.5));
        assert_eq!(number(&f, "cfm"), None);
        assert_eq!(number(&f, "blank"), None);
    }

    #[test]
    fn test_flag_tokens() {
        let f = form(&[
            ("a", "true"),
            ("b", "ON"),
            ("c", "no"),
            ("d", "0"),
            ("e", "maybe"),
        ]);
        assert_eq!(flag(&f, "a"), Some(true));
        assert_eq!(flag(&f, "b"), Some(true));
        assert_eq!(flag(&f, "c"), Some(false));
        assert_eq!(flag(&f, "d"), Some(false));
        assert_eq!(flag(&f, "e"), None);
        assert_eq!(flag(&f, "missing"), None);
    }

    #[test]
    fn test_require_missing() {
        let f = form(&[("job_id", "")]);
        assert!(require(&f, "job_id").is_err());
        let f = form(&[("job_id", "j-1")]);
        assert_eq!(require(&f, "job_id").unwrap(), "j-1");
    }
}
