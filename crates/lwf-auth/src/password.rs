//! Argon2 password hashing.

use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::rand_core::OsRng;

use crate::error::{AuthError, Result};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Hashes a password with Argon2id and a fresh random salt.
///
/// The result is a PHC string, e.g. `$argon2id$v=19$...`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHashError)
}

/// Checks a password against a PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Password policy: at least 8 characters, with a letter and a digit.
pub fn validate_password(password: &str) -> Result<()> {
    let problem = if password.chars().count() < MIN_PASSWORD_LENGTH {
        Some(format!("password needs at least {MIN_PASSWORD_LENGTH} characters"))
    } else if !password.chars().any(char::is_alphabetic) {
        Some("password needs a letter".to_string())
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("password needs a digit".to_string())
    } else {
        None
    };
    problem.map_or(Ok(()), |message| Err(AuthError::Validation(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let hash = hash_password("correct horse 1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse 1", &hash));
        assert!(!verify_password("correct horse 2", &hash));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same pass 1").unwrap(), hash_password("same pass 1").unwrap());
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_policy() {
        assert!(validate_password("letters4ever").is_ok());
        assert!(validate_password("abc1").is_err());
        assert!(validate_password("onlyletters").is_err());
        assert!(validate_password("1234567890").is_err());
    }
}
