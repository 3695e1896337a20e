//! Input validation for authentication payloads
//!
//! Request structs in [`crate::types`] carry the declarative `validator`
//! rules. The functions here run those rules against an untyped JSON payload
//! and produce either normalized input or a list of field errors.

use crate::models::Role;
use crate::types::{SignInInput, SignInRequest, SignupInput, SignupRequest};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a role name, returning the parsed role
pub fn validate_role(role: &str) -> Result<Role, String> {
    role.parse::<Role>().map_err(|e| e.to_string())
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Flatten `validator` errors into field errors, ordered by field name
pub fn format_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |err| FieldError {
                field: field.clone(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string()),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

fn body_error(err: serde_json::Error) -> Vec<FieldError> {
    vec![FieldError::new(
        "body",
        &format!("Invalid request body: {}", err),
    )]
}

/// Deserialize a request struct from a JSON object.
///
/// Derived structs also accept a JSON array as a positional sequence, so
/// anything other than an object is rejected before serde sees it.
fn from_object<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, Vec<FieldError>> {
    if !payload.is_object() {
        return Err(vec![FieldError::new(
            "body",
            "Request body must be a JSON object",
        )]);
    }
    serde_json::from_value(payload).map_err(body_error)
}

/// Validate a signup payload.
///
/// Name and email are trimmed and the email lowercased before the rules run.
/// A missing role defaults to [`Role::User`].
pub fn validate_signup(payload: serde_json::Value) -> Result<SignupInput, Vec<FieldError>> {
    let request = from_object::<SignupRequest>(payload)?.normalize();

    let mut details = match request.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => format_validation_errors(&errors),
    };

    let role = match request.role.as_deref() {
        None => Role::default(),
        Some(raw) => match validate_role(raw) {
            Ok(role) => role,
            Err(message) => {
                details.push(FieldError::new("role", &message));
                Role::default()
            }
        },
    };

    if !details.is_empty() {
        details.sort_by(|a, b| a.field.cmp(&b.field));
        return Err(details);
    }

    match (request.name, request.email, request.password) {
        (Some(name), Some(email), Some(password)) => Ok(SignupInput {
            name,
            email,
            password,
            role,
        }),
        _ => Err(vec![FieldError::new("body", "Missing required fields")]),
    }
}

/// Validate a sign-in payload: email and password must be present
pub fn validate_sign_in(payload: serde_json::Value) -> Result<SignInInput, Vec<FieldError>> {
    let request = from_object::<SignInRequest>(payload)?.normalize();

    if let Err(errors) = request.validate() {
        return Err(format_validation_errors(&errors));
    }

    match (request.email, request.password) {
        (Some(email), Some(password)) => Ok(SignInInput { email, password }),
        _ => Err(vec![FieldError::new("body", "Missing required fields")]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn fields(details: &[FieldError]) -> Vec<&str> {
        details.iter().map(|d| d.field.as_str()).collect()
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_valid_signup_is_normalized() {
        let input = validate_signup(json!({
            "name": "  Ann ",
            "email": " Ann@X.com ",
            "password": "Secret123",
            "role": "user"
        }))
        .unwrap();

        assert_eq!(input.name, "Ann");
        assert_eq!(input.email, "ann@x.com");
        assert_eq!(input.password, "Secret123");
        assert_eq!(input.role, Role::User);
    }

    #[test]
    fn test_signup_role_defaults_to_user() {
        let input = validate_signup(json!({
            "name": "Ann",
            "email": "ann@x.com",
            "password": "Secret123"
        }))
        .unwrap();
        assert_eq!(input.role, Role::User);
    }

    #[test]
    fn test_signup_accepts_admin_role() {
        let input = validate_signup(json!({
            "name": "Root",
            "email": "root@x.com",
            "password": "Secret123",
            "role": "admin"
        }))
        .unwrap();
        assert_eq!(input.role, Role::Admin);
    }

    #[test]
    fn test_signup_missing_fields_reported_per_field() {
        let details = validate_signup(json!({})).unwrap_err();
        assert_eq!(fields(&details), vec!["email", "name", "password"]);
        assert!(details.iter().any(|d| d.message == "Email is required"));
    }

    #[rstest]
    #[case(json!({"name": "Ann", "email": "not-an-email", "password": "Secret123"}), "email")]
    #[case(json!({"name": "   ", "email": "ann@x.com", "password": "Secret123"}), "name")]
    #[case(json!({"name": "Ann", "email": "ann@x.com", "password": "short"}), "password")]
    #[case(json!({"name": "Ann", "email": "ann@x.com", "password": "Secret123", "role": "root"}), "role")]
    fn test_signup_rejects_invalid_field(#[case] payload: serde_json::Value, #[case] field: &str) {
        let details = validate_signup(payload).unwrap_err();
        assert_eq!(fields(&details), vec![field]);
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!("a string"))]
    #[case(json!({"name": 42, "email": "ann@x.com", "password": "Secret123"}))]
    #[case(json!(["Ann", "ann@x.com", "Secret123", "admin"]))]
    #[case(json!([]))]
    #[case(json!(42))]
    fn test_signup_rejects_malformed_body(#[case] payload: serde_json::Value) {
        let details = validate_signup(payload).unwrap_err();
        assert_eq!(fields(&details), vec!["body"]);
    }

    #[rstest]
    #[case(json!(["ann@x.com", "Secret123"]))]
    #[case(json!(null))]
    #[case(json!(true))]
    #[case(json!("ann@x.com"))]
    fn test_sign_in_rejects_non_object_body(#[case] payload: serde_json::Value) {
        let details = validate_sign_in(payload).unwrap_err();
        assert_eq!(fields(&details), vec!["body"]);
        assert_eq!(details[0].message, "Request body must be a JSON object");
    }

    #[test]
    fn test_sign_in_requires_both_fields() {
        let details = validate_sign_in(json!({"email": "ann@x.com"})).unwrap_err();
        assert_eq!(fields(&details), vec!["password"]);

        let details = validate_sign_in(json!({"email": "", "password": ""})).unwrap_err();
        assert_eq!(fields(&details), vec!["email", "password"]);
    }

    #[test]
    fn test_sign_in_normalizes_email() {
        let input = validate_sign_in(json!({"email": " ANN@x.com", "password": "x"})).unwrap();
        assert_eq!(input.email, "ann@x.com");
        assert_eq!(input.password, "x");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_password_length_valid(len in 8usize..=128) {
            let password = "a".repeat(len);
            prop_assert!(validate_password(&password).is_ok());
        }

        #[test]
        fn prop_short_password_rejected_at_signup(password in "[a-zA-Z0-9]{0,7}") {
            let result = validate_signup(json!({
                "name": "Ann",
                "email": "ann@x.com",
                "password": password,
            }));
            prop_assert!(result.is_err());
        }

        #[test]
        fn prop_valid_signup_accepted(
            name in "[A-Za-z]{1,40}",
            user in "[a-z][a-z0-9]{0,20}",
            domain in "[a-z]{2,12}",
            password in "[A-Za-z0-9]{8,64}",
        ) {
            let email = format!("{}@{}.com", user, domain);
            let input = validate_signup(json!({
                "name": name,
                "email": email,
                "password": password,
            }));
            prop_assert!(input.is_ok());
            prop_assert_eq!(input.unwrap().email, email);
        }
    }
}
