//! Submission field validation.

use std::sync::LazyLock;

use regex::Regex;

use super::error::{
    FieldError,
    FormError,
};
use super::types::FormSubmission;

/// Email shape check, intentionally loose.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a literal, cannot fail
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Indian mobile number: ten digits starting 6-9.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a literal, cannot fail
    Regex::new(r"^[6-9]\d{9}$").unwrap()
});

/// Validates one submission, collecting every offending field.
///
/// # Errors
/// [`FormError::Validation`] listing all problems at once, so the client
/// can surface them in a single pass.
pub fn validate(submission: &FormSubmission) -> Result<(), FormError> {
    let mut errors = Vec::new();

    if submission.field("name").is_none() {
        errors.push(FieldError::new("name", "Name is required"));
    }

    match submission.field("email") {
        None => errors.push(FieldError::new("email", "Email is required")),
        Some(email) if !EMAIL.is_match(email) => {
            errors.push(FieldError::new("email", "Invalid email format"));
        }
        Some(_) => {}
    }

    match submission.field("phone") {
        None => errors.push(FieldError::new("phone", "Phone number is required")),
        Some(phone) if !PHONE.is_match(phone) => {
            errors.push(FieldError::new("phone", "Invalid phone number format"));
        }
        Some(_) => {}
    }

    for field in submission.form_type.required_fields() {
        if submission.field(field).is_none() {
            errors.push(FieldError::new(*field, format!("{field} is required")));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(
            form_type = submission.form_type.wire_name(),
            fields = errors.len(),
            "Submission failed validation"
        );
        Err(FormError::Validation(errors))
    }
}
