use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};

use crate::users::repo::User;

/// Entropy per token. 32 random bytes encode to 43 URL-safe characters.
const TOKEN_BYTES: usize = 32;

/// Generate an opaque, URL-safe bearer token.
pub fn generate_token() -> String {
    let mut raw = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut raw);
    URL_SAFE_NO_PAD.encode(raw)
}

pub fn expiration_from(now: OffsetDateTime, ttl_minutes: i64) -> OffsetDateTime {
    now + Duration::minutes(ttl_minutes)
}

/// A token is live only while the expiration is set and still ahead of
/// the clock. Revocation moves the expiration to "now" and leaves the
/// token value in place, so this predicate is the single validity rule.
pub fn token_is_live(expiration: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    matches!(expiration, Some(exp) if now < exp)
}

/// Issue a fresh token for the user, overwriting any prior one: a user
/// has at most one active session.
pub async fn issue(db: &PgPool, user_id: i64, ttl_minutes: i64) -> sqlx::Result<String> {
    let token = generate_token();
    let expiration = expiration_from(OffsetDateTime::now_utc(), ttl_minutes);
    User::set_auth_token(db, user_id, &token, expiration).await?;
    Ok(token)
}

/// Resolve a presented token to its user, or `None` when the token is
/// unknown or expired. Expired rows are left untouched.
pub async fn verify(db: &PgPool, token: &str) -> sqlx::Result<Option<User>> {
    let user = User::find_by_auth_token(db, token).await?;
    Ok(user.filter(|u| token_is_live(u.auth_token_expiration, OffsetDateTime::now_utc())))
}

/// Expire the user's current token immediately.
pub async fn revoke(db: &PgPool, user_id: i64) -> sqlx::Result<()> {
    User::revoke_auth_token(db, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn generated_tokens_are_43_chars_of_urlsafe_base64() {
        let token = generate_token();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn token_lives_for_exactly_the_issuance_window() {
        let issued = datetime!(2024-03-01 12:00:00 UTC);
        let expiration = Some(expiration_from(issued, 60));
        assert!(token_is_live(expiration, issued + Duration::minutes(59)));
        assert!(!token_is_live(expiration, issued + Duration::minutes(61)));
    }

    #[test]
    fn expiration_boundary_is_exclusive() {
        let issued = datetime!(2024-03-01 12:00:00 UTC);
        let expiration = Some(expiration_from(issued, 60));
        assert!(!token_is_live(expiration, issued + Duration::minutes(60)));
    }

    #[test]
    fn revoked_token_is_dead_even_though_the_value_is_unchanged() {
        let now = datetime!(2024-03-01 12:00:00 UTC);
        // Revocation sets the expiration to the current instant.
        assert!(!token_is_live(Some(now), now));
    }

    #[test]
    fn user_without_a_token_is_never_authenticated() {
        assert!(!token_is_live(None, OffsetDateTime::now_utc()));
    }
}
