//! Small utilities shared by the forms and the handlers.
use std::borrow::Cow;
use std::collections::BTreeMap;

use validator::{ValidationError, ValidationErrors};

/// Messages per form field, as shown next to a re-rendered form.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Validator for free-text fields that must carry more than whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("This field is required."));
        return Err(error);
    }
    Ok(())
}

/// Optional text inputs arrive as empty strings when left blank. Those are
/// stored as `NULL`.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Flatten validation errors into `field -> messages` for re-rendering a form.
pub fn error_messages(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("Invalid value ({}).", e.code),
                })
                .collect();
            (field.to_owned(), messages)
        })
        .collect()
}

/// Error map used when the submission could not even be parsed.
pub fn malformed_submission() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(
        "__all__".to_owned(),
        vec!["The submitted form was incomplete or malformed.".to_owned()],
    );
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_blank() {
        assert!(not_blank("   \n\t").is_err());
        assert!(not_blank("").is_err());
        assert!(not_blank(" x ").is_ok());
    }

    #[test]
    fn empty_optional_text_becomes_none() {
        assert_eq!(blank_to_none(None), None);
        assert_eq!(blank_to_none(Some("  ".into())), None);
        assert_eq!(blank_to_none(Some(" a ".into())), Some("a".to_owned()));
    }

    #[test]
    fn messages_fall_back_to_code() {
        let mut errors = ValidationErrors::new();
        errors.add("title", ValidationError::new("length"));
        errors.add("content", not_blank("").unwrap_err());

        let messages = error_messages(&errors);
        assert_eq!(messages["title"], vec!["Invalid value (length).".to_owned()]);
        assert_eq!(messages["content"], vec!["This field is required.".to_owned()]);
    }
}
