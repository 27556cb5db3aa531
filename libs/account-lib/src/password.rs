use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher as _};
use secrecy::{ExposeSecret, Secret};

/// One-way transform applied to plaintext passwords before they reach the
/// user store. The plaintext is never persisted or returned.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &Secret<String>) -> Result<String, anyhow::Error>;
}

/// Argon2id with a per-password random salt, encoded in PHC string format.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &Secret<String>) -> Result<String, anyhow::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.expose_secret().as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2_phc_string() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash(&Secret::new("foobarpassword".to_string())).unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_ne!(hash, "foobarpassword");
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = Argon2PasswordHasher;
        let password = Secret::new("foobarpassword".to_string());
        let first = hasher.hash(&password).unwrap();
        let second = hasher.hash(&password).unwrap();
        assert_ne!(first, second);
    }
}
