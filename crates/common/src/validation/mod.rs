//! Contact submission validation
//!
//! Accepts the raw `{email, name, content}` fields and either produces a
//! validated value object or a per-field error map. All failing fields are
//! reported together. No side effects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

/// Per-field validation error messages, keyed by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Maximum length for the submitter's name
pub const NAME_MAX_LEN: usize = 255;

/// Raw contact form submission
///
/// Fields absent from the wire deserialize as empty strings, so a missing
/// field is reported through the same per-field error map as a blank one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactSubmission {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required"))]
    pub content: String,
}

/// A contact submission that has passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub email: String,
    pub name: String,
    pub content: String,
}

impl ContactSubmission {
    /// Validate the submission, returning either the value object or the
    /// full per-field error map.
    pub fn into_valid(self) -> Result<ValidContact, FieldErrors> {
        match self.validate() {
            Ok(()) => Ok(ValidContact {
                email: self.email,
                name: self.name.trim().to_string(),
                content: self.content,
            }),
            Err(errors) => Err(collect_field_errors(&errors)),
        }
    }
}

/// Validate the submitter's name: non-empty after trimming, bounded length
fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("required").with_message("This field is required".into()));
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Err(ValidationError::new("max_length")
            .with_message(format!("Ensure this value has at most {} characters", NAME_MAX_LEN).into()));
    }
    Ok(())
}

/// Flatten `ValidationErrors` into a field -> messages map
pub fn collect_field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(email: &str, name: &str, content: &str) -> ContactSubmission {
        ContactSubmission {
            email: email.to_string(),
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_valid_submission() {
        let valid = submission("test@example.com", "Test User", "Test message")
            .into_valid()
            .unwrap();
        assert_eq!(valid.email, "test@example.com");
        assert_eq!(valid.name, "Test User");
        assert_eq!(valid.content, "Test message");
    }

    #[test]
    fn test_absent_fields_validate_as_missing() {
        let submission: ContactSubmission = serde_json::from_str(r#"{"name":"Jo"}"#).unwrap();
        let errors = submission.into_valid().unwrap_err();
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("content"));
        assert!(!errors.contains_key("name"));
    }

    #[test]
    fn test_all_invalid_fields_reported_together() {
        let errors = submission("invalid_email", "", "").into_valid().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("content"));
    }

    #[test]
    fn test_malformed_email_rejected() {
        let errors = submission("not-an-email", "Someone", "Hello").into_valid().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("email"));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let errors = submission("a@b.com", "   ", "Hello").into_valid().unwrap_err();
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn test_name_trimmed_on_success() {
        let valid = submission("a@b.com", "  Ada  ", "Hello").into_valid().unwrap();
        assert_eq!(valid.name, "Ada");
    }

    #[test]
    fn test_overlong_name_rejected() {
        let long = "x".repeat(NAME_MAX_LEN + 1);
        let errors = submission("a@b.com", &long, "Hello").into_valid().unwrap_err();
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn test_name_at_limit_accepted() {
        let at_limit = "x".repeat(NAME_MAX_LEN);
        assert!(submission("a@b.com", &at_limit, "Hello").into_valid().is_ok());
    }
}
