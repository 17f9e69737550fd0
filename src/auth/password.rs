use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

/// Argon2id hash in PHC string form, salt embedded.
pub fn hash(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// `false` on mismatch. A stored hash that cannot be parsed is an internal error.
pub fn verify(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_original_password() {
        let stored = hash("password123").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify("password123", &stored).unwrap());
        assert!(!verify("password124", &stored).unwrap());
    }

    #[test]
    fn salts_each_hash() {
        assert_ne!(hash("same").unwrap(), hash("same").unwrap());
    }
}
