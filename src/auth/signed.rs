use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::state::AppState;

/// Purpose salt for email-confirmation links.
pub const EMAIL_CONFIRMATION_SALT: &str = "email-confirmation-salt";
/// Purpose salt for password-reset links.
pub const PASSWORD_RESET_SALT: &str = "password-reset-salt";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LinkTokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct LinkClaims {
    sub: String,
    purpose: String,
    iat: i64,
}

/// Signs and verifies stateless, time-limited link tokens (HMAC-SHA256
/// over the server secret). The payload is an email address; the purpose
/// salt scopes a token to one use case so a confirmation token can never
/// pass the password-reset verifier.
#[derive(Clone)]
pub struct LinkSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl FromRef<AppState> for LinkSigner {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.tokens.secret_key)
    }
}

impl LinkSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, email: &str, purpose: &str) -> anyhow::Result<String> {
        self.sign_at(email, purpose, OffsetDateTime::now_utc())
    }

    fn sign_at(
        &self,
        email: &str,
        purpose: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let claims = LinkClaims {
            sub: email.to_string(),
            purpose: purpose.to_string(),
            iat: now.unix_timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify the signature and purpose, then enforce the max age against
    /// the issuance time carried in the token. Returns the payload email.
    pub fn verify(
        &self,
        token: &str,
        purpose: &str,
        max_age_secs: i64,
    ) -> Result<String, LinkTokenError> {
        self.verify_at(token, purpose, max_age_secs, OffsetDateTime::now_utc())
    }

    fn verify_at(
        &self,
        token: &str,
        purpose: &str,
        max_age_secs: i64,
        now: OffsetDateTime,
    ) -> Result<String, LinkTokenError> {
        // Age is checked against `iat` below, so the standard `exp`
        // claim is neither present nor validated.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<LinkClaims>(token, &self.decoding, &validation)
            .map_err(|_| LinkTokenError::InvalidSignature)?;

        if data.claims.purpose != purpose {
            return Err(LinkTokenError::InvalidSignature);
        }
        if data.claims.iat + max_age_secs < now.unix_timestamp() {
            return Err(LinkTokenError::Expired);
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    const MAX_AGE: i64 = 3600;

    fn signer() -> LinkSigner {
        LinkSigner::new("test-secret")
    }

    #[test]
    fn sign_then_verify_returns_the_email() {
        let signer = signer();
        let token = signer.sign("a@example.com", EMAIL_CONFIRMATION_SALT).unwrap();
        let email = signer
            .verify(&token, EMAIL_CONFIRMATION_SALT, MAX_AGE)
            .unwrap();
        assert_eq!(email, "a@example.com");
    }

    #[test]
    fn confirmation_token_is_rejected_by_the_reset_verifier() {
        let signer = signer();
        let token = signer.sign("a@example.com", EMAIL_CONFIRMATION_SALT).unwrap();
        let err = signer
            .verify(&token, PASSWORD_RESET_SALT, MAX_AGE)
            .unwrap_err();
        assert_eq!(err, LinkTokenError::InvalidSignature);
    }

    #[test]
    fn token_signed_with_another_secret_fails() {
        let token = LinkSigner::new("other-secret")
            .sign("a@example.com", EMAIL_CONFIRMATION_SALT)
            .unwrap();
        let err = signer()
            .verify(&token, EMAIL_CONFIRMATION_SALT, MAX_AGE)
            .unwrap_err();
        assert_eq!(err, LinkTokenError::InvalidSignature);
    }

    #[test]
    fn tampered_token_fails() {
        let signer = signer();
        let mut token = signer.sign("a@example.com", EMAIL_CONFIRMATION_SALT).unwrap();
        token.push('x');
        let err = signer
            .verify(&token, EMAIL_CONFIRMATION_SALT, MAX_AGE)
            .unwrap_err();
        assert_eq!(err, LinkTokenError::InvalidSignature);
    }

    #[test]
    fn token_older_than_max_age_is_expired() {
        let signer = signer();
        let issued = OffsetDateTime::now_utc() - Duration::seconds(MAX_AGE + 1);
        let token = signer
            .sign_at("a@example.com", PASSWORD_RESET_SALT, issued)
            .unwrap();
        let err = signer
            .verify(&token, PASSWORD_RESET_SALT, MAX_AGE)
            .unwrap_err();
        assert_eq!(err, LinkTokenError::Expired);
    }

    #[test]
    fn token_just_inside_max_age_still_verifies() {
        let signer = signer();
        let issued = OffsetDateTime::now_utc() - Duration::seconds(MAX_AGE - 60);
        let token = signer
            .sign_at("a@example.com", PASSWORD_RESET_SALT, issued)
            .unwrap();
        assert!(signer.verify(&token, PASSWORD_RESET_SALT, MAX_AGE).is_ok());
    }
}
