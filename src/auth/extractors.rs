use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tower_sessions::Session;
use tracing::warn;

use crate::auth::bearer;
use crate::auth::password::verify_password;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::{User, UserType};

/// Session key under which the admin console stores the logged-in user.
pub const SESSION_USER_KEY: &str = "admin_user_id";

fn authorization_header(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))
}

/// Split a Basic authorization header value into email and password.
pub(crate) fn parse_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}

/// Caller authenticated with email + password (Basic). Used only by the
/// token-exchange endpoint.
pub struct BasicUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for BasicUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let header = authorization_header(parts)?;
        let (email, password) = parse_basic(header)
            .ok_or_else(|| ApiError::Unauthorized("Basic authentication required".into()))?;

        let email = email.trim().to_lowercase();
        let user = User::find_by_email(&state.db, &email)
            .await
            .map_err(ApiError::from)?;
        let Some(user) = user else {
            warn!(email = %email, "basic auth for unknown email");
            return Err(ApiError::Unauthorized("Invalid username or password".into()));
        };

        let ok = verify_password(&password, &user.password_hashed).map_err(ApiError::Internal)?;
        if !ok {
            warn!(user_id = user.id, "basic auth with an invalid password");
            return Err(ApiError::Unauthorized("Invalid username or password".into()));
        }

        Ok(BasicUser(user))
    }
}

/// Caller authenticated with a live bearer token.
pub struct BearerUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for BearerUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let header = authorization_header(parts)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        match bearer::verify(&state.db, token).await.map_err(ApiError::from)? {
            Some(user) => Ok(BearerUser(user)),
            None => {
                warn!("invalid or expired bearer token");
                Err(ApiError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}

/// Caller authenticated via the admin console session cookie and holding
/// the Admin role. Missing or stale session is a 401; a session that
/// resolves to a non-admin user is a 403.
pub struct AdminUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| ApiError::Internal(anyhow::anyhow!(msg)))?;

        let user_id: Option<i64> = session
            .get(SESSION_USER_KEY)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;
        let Some(user_id) = user_id else {
            return Err(ApiError::Unauthorized("Admin login required".into()));
        };

        let state = AppState::from_ref(state);
        let user = User::find_by_id(&state.db, user_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Unauthorized("Admin login required".into()))?;

        if user.user_type != UserType::Admin {
            warn!(user_id = user.id, "session user is not an administrator");
            return Err(ApiError::Forbidden("Administrator access required".into()));
        }

        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_decodes_email_and_password() {
        // base64("a@example.com:Secret123")
        let header = format!("Basic {}", STANDARD.encode("a@example.com:Secret123"));
        let (email, password) = parse_basic(&header).unwrap();
        assert_eq!(email, "a@example.com");
        assert_eq!(password, "Secret123");
    }

    #[test]
    fn parse_basic_keeps_colons_inside_the_password() {
        let header = format!("Basic {}", STANDARD.encode("a@example.com:pa:ss"));
        let (_, password) = parse_basic(&header).unwrap();
        assert_eq!(password, "pa:ss");
    }

    #[test]
    fn parse_basic_rejects_other_schemes_and_garbage() {
        assert!(parse_basic("Bearer abc").is_none());
        assert!(parse_basic("Basic not-base64!").is_none());
        let no_colon = format!("Basic {}", STANDARD.encode("justonefield"));
        assert!(parse_basic(&no_colon).is_none());
    }
}
