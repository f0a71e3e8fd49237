use axum::extract::{Path, State};
use axum::Json;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::admin::dto::{AdminLoginRequest, AdminPasswordRequest, AdminUserRow};
use crate::auth::bearer;
use crate::auth::extractors::{AdminUser, SESSION_USER_KEY};
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::MessageResponse;
use crate::users::handlers::check_password_strength;
use crate::users::repo::{User, UserType};

fn message(text: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.into(),
    })
}

async fn load_target(state: &AppState, id: i64) -> Result<User, ApiError> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

/// One generic rejection for every failure mode, so the response does
/// not reveal whether the email exists or carries admin rights.
#[instrument(skip(state, session, payload))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email).await?;
    let Some(user) = user else {
        warn!(email = %email, "admin login with an unknown email");
        return Err(ApiError::Unauthorized("Incorrect login credentials".into()));
    };

    let ok = verify_password(&payload.password_plaintext, &user.password_hashed)
        .map_err(ApiError::Internal)?;
    if !ok || user.user_type != UserType::Admin {
        warn!(user_id = user.id, "admin login rejected");
        return Err(ApiError::Unauthorized("Incorrect login credentials".into()));
    }

    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    info!(user_id = user.id, email = %user.email, "admin logged in");
    Ok(message(format!("Logged in as {}", user.email)))
}

#[instrument(skip(caller, session))]
pub async fn logout(
    AdminUser(caller): AdminUser,
    session: Session,
) -> Result<Json<MessageResponse>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    info!(user_id = caller.id, email = %caller.email, "admin logged out");
    Ok(message("Goodbye!"))
}

#[instrument(skip(state, _caller))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_caller): AdminUser,
) -> Result<Json<Vec<AdminUserRow>>, ApiError> {
    let rows = User::list_with_entry_counts(&state.db).await?;
    Ok(Json(rows.into_iter().map(AdminUserRow::from).collect()))
}

#[instrument(skip(state, _caller))]
pub async fn confirm_email(
    State(state): State<AppState>,
    AdminUser(_caller): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = load_target(&state, id).await?;
    User::confirm_email(&state.db, target.id).await?;
    info!(user_id = target.id, "email confirmed by admin");
    Ok(message(format!("Email address confirmed for {}", target.email)))
}

#[instrument(skip(state, _caller))]
pub async fn unconfirm_email(
    State(state): State<AppState>,
    AdminUser(_caller): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = load_target(&state, id).await?;
    User::unconfirm_email(&state.db, target.id).await?;
    info!(user_id = target.id, "email confirmation revoked by admin");
    Ok(message(format!(
        "Email address confirmation revoked for {}",
        target.email
    )))
}

#[instrument(skip(state, _caller, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AdminUser(_caller): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<AdminPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = load_target(&state, id).await?;
    check_password_strength(&payload.new_password_plaintext)?;

    let hash = hash_password(&payload.new_password_plaintext).map_err(ApiError::Internal)?;
    User::set_password(&state.db, target.id, &hash).await?;
    info!(user_id = target.id, "password changed by admin");
    Ok(message(format!("Password changed for {}", target.email)))
}

#[instrument(skip(state, _caller))]
pub async fn revoke_token(
    State(state): State<AppState>,
    AdminUser(_caller): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = load_target(&state, id).await?;
    bearer::revoke(&state.db, target.id).await?;
    info!(user_id = target.id, "auth token revoked by admin");
    Ok(message(format!(
        "Authentication token revoked for {}",
        target.email
    )))
}

/// Administrator accounts cannot be deleted. For everyone else the
/// entries go first, then the user, in one transaction.
#[instrument(skip(state, _caller))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_caller): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = load_target(&state, id).await?;
    if target.user_type == UserType::Admin {
        warn!(user_id = target.id, "refused to delete an administrator");
        return Err(ApiError::Forbidden(format!(
            "Cannot delete administrator ({})",
            target.email
        )));
    }

    User::delete_with_entries(&state.db, target.id).await?;
    info!(user_id = target.id, email = %target.email, "user and entries deleted");
    Ok(message(format!(
        "User {} and their journal entries were deleted",
        target.email
    )))
}
