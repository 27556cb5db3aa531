use async_trait::async_trait;
use uuid::Uuid;

use crate::repository::errors::AccountRepositoryError;
use crate::repository::models::{TokenRow, UserRow};

#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn exists_by_username(&self, username: &str) -> Result<bool, AccountRepositoryError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, AccountRepositoryError>;
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, AccountRepositoryError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, AccountRepositoryError>;
}

#[async_trait]
pub trait TokenRepositoryTrait: Send + Sync {
    async fn create_token(
        &self,
        user_id: Uuid,
        key: &str,
    ) -> Result<TokenRow, AccountRepositoryError>;
}
