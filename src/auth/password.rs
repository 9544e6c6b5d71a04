// Password hashing and verification using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::PasswordHashError)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    ///
    /// Returns Ok(false) on mismatch; Err only when the stored hash itself
    /// cannot be parsed.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::PasswordHashError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = PasswordService::hash_password("Correct1horse").unwrap();
        assert!(PasswordService::verify_password("Correct1horse", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = PasswordService::hash_password("Correct1horse").unwrap();
        assert!(!PasswordService::verify_password("Wrong1horse", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let h1 = PasswordService::hash_password("Correct1horse").unwrap();
        let h2 = PasswordService::hash_password("Correct1horse").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_hash_does_not_contain_plaintext() {
        let hash = PasswordService::hash_password("Correct1horse").unwrap();
        assert!(!hash.contains("Correct1horse"));
    }

    #[test]
    fn test_garbage_stored_hash_is_an_error() {
        assert!(PasswordService::verify_password("anything", "not-a-phc-string").is_err());
    }
}
