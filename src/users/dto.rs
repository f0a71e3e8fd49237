use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    pub email: String,
    pub password_plaintext: String,
}

/// Request body for changing the password on the account route.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password_plaintext: String,
    pub new_password_plaintext: String,
}

/// Request body naming an email address (forgot-password).
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Request body for completing a password reset via an emailed token.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password_plaintext: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Public profile of a user. Never carries the password hash or the
/// bearer token.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_on: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub email_confirmation_sent_on: OffsetDateTime,
    pub email_confirmed: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub email_confirmed_on: Option<OffsetDateTime>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            registered_on: user.registered_on,
            email_confirmation_sent_on: user.email_confirmation_sent_on,
            email_confirmed: user.email_confirmed,
            email_confirmed_on: user.email_confirmed_on,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationResult {
    Confirmed,
    AlreadyConfirmed,
    InvalidOrExpired,
}

/// Outcome of following an email-confirmation link. Always a 200: a bad
/// link is a user-facing state, not a server error.
#[derive(Debug, Serialize)]
pub struct ConfirmationOutcome {
    pub result: ConfirmationResult,
    pub message: String,
}

impl ConfirmationOutcome {
    pub fn confirmed(email: &str) -> Self {
        Self {
            result: ConfirmationResult::Confirmed,
            message: format!("Email address confirmed for {email}."),
        }
    }

    pub fn already_confirmed() -> Self {
        Self {
            result: ConfirmationResult::AlreadyConfirmed,
            message: "This email address has already been confirmed.".into(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            result: ConfirmationResult::InvalidOrExpired,
            message: "The confirmation link is invalid or has expired.".into(),
        }
    }
}

/// Validity report for a password-reset token (GET on the reset route).
#[derive(Debug, Serialize)]
pub struct ResetTokenReport {
    pub valid: bool,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetResult {
    PasswordUpdated,
    InvalidOrExpired,
}

#[derive(Debug, Serialize)]
pub struct ResetOutcome {
    pub result: ResetResult,
    pub message: String,
}

impl ResetOutcome {
    pub fn updated() -> Self {
        Self {
            result: ResetResult::PasswordUpdated,
            message: "Your password has been updated.".into(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            result: ResetResult::InvalidOrExpired,
            message: "The password reset link is invalid or has expired.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use crate::users::repo::UserType;

    fn sample_user() -> User {
        User {
            id: 7,
            email: "x@y.com".into(),
            password_hashed: "$argon2id$...".into(),
            auth_token: Some("secret-token".into()),
            auth_token_expiration: Some(datetime!(2024-03-01 13:00:00 UTC)),
            registered_on: datetime!(2024-03-01 12:00:00 UTC),
            email_confirmation_sent_on: datetime!(2024-03-01 12:00:00 UTC),
            email_confirmed: false,
            email_confirmed_on: None,
            user_type: UserType::User,
        }
    }

    #[test]
    fn profile_never_exposes_hash_or_token() {
        let json = serde_json::to_string(&UserResponse::from(sample_user())).unwrap();
        assert!(json.contains("x@y.com"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("secret-token"));
    }

    #[test]
    fn profile_reports_confirmation_state() {
        let json = serde_json::to_value(UserResponse::from(sample_user())).unwrap();
        assert_eq!(json["email_confirmed"], false);
        assert!(json["email_confirmed_on"].is_null());
        assert!(json["registered_on"].as_str().unwrap().starts_with("2024-03-01"));
    }

    #[test]
    fn confirmation_outcomes_serialize_as_snake_case() {
        let json = serde_json::to_value(ConfirmationOutcome::already_confirmed()).unwrap();
        assert_eq!(json["result"], "already_confirmed");
        let json = serde_json::to_value(ConfirmationOutcome::invalid()).unwrap();
        assert_eq!(json["result"], "invalid_or_expired");
    }
}
