//! Password hashing helpers (argon2, PHC string format).

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::{EngineError, ResultEngine};

/// Hashes a password with a fresh random salt.
pub fn hash(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| EngineError::InvalidInput("failed to hash password".to_string()))
}

/// Verifies a password against a stored PHC hash string.
///
/// An unparsable stored hash counts as a failed verification.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash("sup3rsecret").unwrap();
        assert!(verify("sup3rsecret", &hash));
        assert!(!verify("wrong", &hash));
    }

    #[test]
    fn garbage_stored_hash_never_verifies() {
        assert!(!verify("anything", "not-a-phc-string"));
    }
}
