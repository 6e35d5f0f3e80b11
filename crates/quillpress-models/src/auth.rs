//! Authentication DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::User;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(
        min = 3,
        max = 30,
        message = "Username must be between 3 and 30 characters"
    ))]
    #[schema(example = "ada")]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret123")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Returned by registration and login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(
            register("ada@example.com", "ada", "secret1")
                .validate()
                .is_ok()
        );
        assert!(
            register("not-an-email", "ada", "secret1")
                .validate()
                .is_err()
        );
        assert!(
            register("ada@example.com", "ad", "secret1")
                .validate()
                .is_err()
        );
        assert!(
            register("ada@example.com", &"a".repeat(31), "secret1")
                .validate()
                .is_err()
        );
        assert!(
            register("ada@example.com", "ada", "12345")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_register_error_message() {
        let errors = register("ada@example.com", "ada", "123")
            .validate()
            .unwrap_err();
        assert_eq!(
            quillpress_core::errors::format_validation_errors(&errors),
            "Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_login_validation() {
        let login = LoginRequest {
            email: "ada@example.com".to_string(),
            password: String::new(),
        };
        assert!(login.validate().is_err());
    }
}
