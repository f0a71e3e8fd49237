use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash a plaintext password with Argon2 and a fresh random salt. The
/// salt and parameters are embedded in the returned PHC string.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hashing failed");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Check a plaintext password against a stored hash. A hash that cannot
/// be parsed is an error, not a failed verification.
pub fn verify_password(plain: &str, hashed: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hashed).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_accepts_the_password() {
        let hash = hash_password("Secret123").expect("hashing should succeed");
        assert!(verify_password("Secret123", &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_a_wrong_password() {
        let hash = hash_password("Secret123").expect("hashing should succeed");
        assert!(!verify_password("Secret124", &hash).expect("verify should not error"));
    }

    #[test]
    fn two_hashes_of_the_same_password_differ() {
        let a = hash_password("Secret123").unwrap();
        let b = hash_password("Secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
