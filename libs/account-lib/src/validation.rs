use std::collections::BTreeMap;

use serde::Serialize;
use validator::ValidateEmail;

pub const USERNAME_FIELD: &str = "username";
pub const EMAIL_FIELD: &str = "email";
pub const PASSWORD_FIELD: &str = "password";

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const USERNAME_TAKEN_MESSAGE: &str = "a user with that username already exists";
pub const EMAIL_TAKEN_MESSAGE: &str = "a user with that email already exists";

/// Ordered mapping from field name to the messages explaining why that field
/// was rejected. Serializes as a plain JSON object, which is the 400 body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }
}

pub fn validate_username(username: &str, errors: &mut FieldErrors) {
    if username.is_empty() {
        errors.push(USERNAME_FIELD, "username cannot be empty");
    } else if username.chars().count() > MAX_USERNAME_LENGTH {
        errors.push(
            USERNAME_FIELD,
            format!("username cannot exceed {MAX_USERNAME_LENGTH} characters"),
        );
    }
}

pub fn validate_email(email: &str, errors: &mut FieldErrors) {
    if email.is_empty() {
        errors.push(EMAIL_FIELD, "email cannot be empty");
    } else if !email.validate_email() {
        errors.push(EMAIL_FIELD, "email is not a valid email address");
    }
}

pub fn validate_password(password: &str, errors: &mut FieldErrors) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(
            PASSWORD_FIELD,
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }
}

/// Run every format-level rule and report all violated fields at once.
/// Uniqueness is checked against the user store by the registration service.
pub fn validate_new_user(username: &str, email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validate_username(username, &mut errors);
    validate_email(email, &mut errors);
    validate_password(password, &mut errors);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input_has_no_errors() {
        let errors = validate_new_user("foobar", "foobar@example.com", "foobarpassword");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_username_rejected() {
        let errors = validate_new_user("", "foobar@example.com", "foobarpassword");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.messages(USERNAME_FIELD).unwrap().len(), 1);
    }

    #[test]
    fn test_username_length_boundary() {
        let at_limit = "a".repeat(MAX_USERNAME_LENGTH);
        let errors = validate_new_user(&at_limit, "foobar@example.com", "foobarpassword");
        assert!(errors.is_empty());

        let over_limit = "a".repeat(MAX_USERNAME_LENGTH + 1);
        let errors = validate_new_user(&over_limit, "foobar@example.com", "foobarpassword");
        assert!(errors.contains(USERNAME_FIELD));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_username_length_counts_characters_not_bytes() {
        // 150 two-byte characters is 300 bytes but still within the limit
        let username = "é".repeat(MAX_USERNAME_LENGTH);
        let errors = validate_new_user(&username, "foobar@example.com", "foobarpassword");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_email_rejected_with_single_message() {
        let errors = validate_new_user("foobar", "", "foobarpassword");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.messages(EMAIL_FIELD).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_email_rejected() {
        let errors = validate_new_user("foobar", "testing", "foobarpassword");
        assert!(errors.contains(EMAIL_FIELD));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_password_length_boundary() {
        let errors = validate_new_user("foobar", "foobar@example.com", "1234567");
        assert!(errors.contains(PASSWORD_FIELD));

        let errors = validate_new_user("foobar", "foobar@example.com", "12345678");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_all_violations_reported_together() {
        let errors = validate_new_user("", "testing", "foo");
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(USERNAME_FIELD));
        assert!(errors.contains(EMAIL_FIELD));
        assert!(errors.contains(PASSWORD_FIELD));
    }

    #[test]
    fn test_field_errors_serialize_as_object() {
        let mut errors = FieldErrors::new();
        errors.push(PASSWORD_FIELD, "password must be at least 8 characters");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"password": ["password must be at least 8 characters"]})
        );
    }
}
