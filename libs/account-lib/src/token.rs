use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;

use crate::entities::{AuthToken, User};
use crate::repository::errors::AccountRepositoryError;
use crate::repository::traits::TokenRepositoryTrait;
use crate::repository::TokenRepository;

pub const TOKEN_KEY_BYTES: usize = 20;

/// Fresh opaque token key: 20 random bytes as 40 lowercase hex characters.
pub fn generate_token_key() -> String {
    let mut bytes = [0u8; TOKEN_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Produces the unique token bound to a freshly registered user.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue_for(&self, user: &User) -> Result<AuthToken, AccountRepositoryError>;
}

/// Generates a random key and persists it through the token repository.
#[derive(Debug, Clone)]
pub struct StoredTokenIssuer<T = TokenRepository>
where
    T: TokenRepositoryTrait,
{
    token_repo: Arc<T>,
}

impl<T: TokenRepositoryTrait> StoredTokenIssuer<T> {
    pub fn new(token_repo: T) -> Self {
        Self {
            token_repo: Arc::new(token_repo),
        }
    }

    pub fn with_repo(token_repo: Arc<T>) -> Self {
        Self { token_repo }
    }
}

#[async_trait]
impl<T: TokenRepositoryTrait> TokenIssuer for StoredTokenIssuer<T> {
    async fn issue_for(&self, user: &User) -> Result<AuthToken, AccountRepositoryError> {
        let key = generate_token_key();
        let row = self.token_repo.create_token(user.id, &key).await?;
        Ok(AuthToken {
            key: row.token_key,
            user_id: user.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key_is_40_hex_chars() {
        let key = generate_token_key();
        assert_eq!(key.len(), 40);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_token_keys_are_random() {
        assert_ne!(generate_token_key(), generate_token_key());
    }
}
