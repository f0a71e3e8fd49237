use axum::extract::{FromRef, Path, State};
use axum::http::StatusCode;
use axum::Json;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::auth::bearer;
use crate::auth::extractors::{BasicUser, BearerUser};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::signed::{LinkSigner, EMAIL_CONFIRMATION_SALT, PASSWORD_RESET_SALT};
use crate::error::ApiError;
use crate::mailer::{confirmation_email, dispatch, password_reset_email};
use crate::state::AppState;
use crate::users::dto::{
    ChangePasswordRequest, ConfirmationOutcome, EmailRequest, MessageResponse, NewUserRequest,
    ResetOutcome, ResetPasswordRequest, ResetTokenReport, TokenResponse, UserResponse,
};
use crate::users::repo::{User, UserType};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn check_password_strength(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters long".into(),
        ));
    }
    Ok(())
}

fn send_confirmation_link(state: &AppState, email: &str) {
    let signer = LinkSigner::from_ref(state);
    match signer.sign(email, EMAIL_CONFIRMATION_SALT) {
        Ok(token) => dispatch(
            state.mailer.clone(),
            confirmation_email(&state.config, email, &token),
        ),
        // Registration already committed; a missing email only shows up here.
        Err(e) => error!(error = %e, email = %email, "signing confirmation link failed"),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "registration with an invalid email");
        return Err(ApiError::Validation("Invalid email address".into()));
    }
    check_password_strength(&payload.password_plaintext)?;

    let hash = hash_password(&payload.password_plaintext).map_err(ApiError::Internal)?;
    let user = User::create(&state.db, &payload.email, &hash, UserType::User).await?;

    send_confirmation_link(&state, &user.email);

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, caller))]
pub async fn get_auth_token(
    State(state): State<AppState>,
    BasicUser(caller): BasicUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = bearer::issue(
        &state.db,
        caller.id,
        state.config.tokens.auth_token_ttl_minutes,
    )
    .await?;
    info!(user_id = caller.id, "auth token issued");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(caller))]
pub async fn user_profile(BearerUser(caller): BearerUser) -> Json<UserResponse> {
    Json(caller.into())
}

#[instrument(skip(state, caller, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    BearerUser(caller): BearerUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let ok = verify_password(&payload.old_password_plaintext, &caller.password_hashed)
        .map_err(ApiError::Internal)?;
    if !ok {
        warn!(user_id = caller.id, "password change with a wrong old password");
        return Err(ApiError::Validation("Old password is incorrect".into()));
    }
    check_password_strength(&payload.new_password_plaintext)?;

    let hash = hash_password(&payload.new_password_plaintext).map_err(ApiError::Internal)?;
    User::set_password(&state.db, caller.id, &hash).await?;

    // Force re-authentication with the new password.
    bearer::revoke(&state.db, caller.id).await?;

    info!(user_id = caller.id, "password changed, auth token revoked");
    Ok(Json(caller.into()))
}

#[instrument(skip(state, token))]
pub async fn confirm_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ConfirmationOutcome>, ApiError> {
    let signer = LinkSigner::from_ref(&state);
    let email = match signer.verify(
        &token,
        EMAIL_CONFIRMATION_SALT,
        state.config.tokens.link_token_max_age_secs,
    ) {
        Ok(email) => email,
        Err(e) => {
            info!(error = %e, "invalid or expired confirmation link");
            return Ok(Json(ConfirmationOutcome::invalid()));
        }
    };

    match User::find_by_email(&state.db, &email).await? {
        None => {
            info!(email = %email, "confirmation link for a vanished user");
            Ok(Json(ConfirmationOutcome::invalid()))
        }
        Some(user) if user.email_confirmed => {
            info!(email = %user.email, "confirmation link for an already confirmed user");
            Ok(Json(ConfirmationOutcome::already_confirmed()))
        }
        Some(user) => {
            User::confirm_email(&state.db, user.id).await?;
            info!(email = %user.email, "email address confirmed");
            Ok(Json(ConfirmationOutcome::confirmed(&user.email)))
        }
    }
}

#[instrument(skip(state, caller))]
pub async fn resend_email_confirmation(
    State(state): State<AppState>,
    BearerUser(caller): BearerUser,
) -> Result<Json<UserResponse>, ApiError> {
    if caller.email_confirmed {
        return Err(ApiError::Validation("Email already confirmed".into()));
    }

    send_confirmation_link(&state, &caller.email);
    User::touch_confirmation_sent(&state.db, caller.id).await?;

    let user = User::find_by_id(&state.db, caller.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    info!(user_id = user.id, "confirmation email re-sent");
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email).await?;
    let Some(user) = user else {
        info!(email = %email, "forgot password for an unknown email");
        return Err(ApiError::Validation("Invalid email address".into()));
    };
    if !user.email_confirmed {
        info!(email = %user.email, "forgot password for an unconfirmed email");
        return Err(ApiError::Validation(
            "Password reset link cannot be sent to an unconfirmed email address".into(),
        ));
    }

    let signer = LinkSigner::from_ref(&state);
    match signer.sign(&user.email, PASSWORD_RESET_SALT) {
        Ok(token) => dispatch(
            state.mailer.clone(),
            password_reset_email(&state.config, &user.email, &token),
        ),
        Err(e) => error!(error = %e, "signing password reset link failed"),
    }

    Ok(Json(MessageResponse {
        message: "Please check your email for a password reset link!".into(),
    }))
}

fn verify_reset_token(state: &AppState, token: &str) -> Option<String> {
    let signer = LinkSigner::from_ref(state);
    signer
        .verify(
            token,
            PASSWORD_RESET_SALT,
            state.config.tokens.link_token_max_age_secs,
        )
        .ok()
}

#[instrument(skip(state, token))]
pub async fn reset_password_report(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Json<ResetTokenReport> {
    match verify_reset_token(&state, &token) {
        Some(email) => Json(ResetTokenReport {
            valid: true,
            email: Some(email),
        }),
        None => {
            info!("password reset link is invalid or has expired");
            Json(ResetTokenReport {
                valid: false,
                email: None,
            })
        }
    }
}

#[instrument(skip(state, token, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ResetOutcome>, ApiError> {
    let Some(email) = verify_reset_token(&state, &token) else {
        info!("password reset attempted with an invalid or expired link");
        return Ok(Json(ResetOutcome::invalid()));
    };

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        info!(email = %email, "password reset for a vanished user");
        return Ok(Json(ResetOutcome::invalid()));
    };

    check_password_strength(&payload.new_password_plaintext)?;
    let hash = hash_password(&payload.new_password_plaintext).map_err(ApiError::Internal)?;
    User::set_password(&state.db, user.id, &hash).await?;

    info!(user_id = user.id, "password reset via emailed token");
    Ok(Json(ResetOutcome::updated()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(is_valid_email("a@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_validation_rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("nodot@example"));
    }

    #[test]
    fn password_strength_floor_is_eight_chars() {
        assert!(check_password_strength("Secret12").is_ok());
        assert!(check_password_strength("short").is_err());
    }
}
