use async_trait::async_trait;
use sqlx::{query, query_as, MySqlPool};
use uuid::Uuid;

use crate::repository::errors::AccountRepositoryError;
use crate::repository::models::TokenRow;
use crate::repository::traits::TokenRepositoryTrait;

#[derive(Debug, Clone)]
pub struct TokenRepository {
    pub pool: MySqlPool,
}

impl TokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepositoryTrait for TokenRepository {
    async fn create_token(
        &self,
        user_id: Uuid,
        key: &str,
    ) -> Result<TokenRow, AccountRepositoryError> {
        query(
            r#"
            INSERT INTO auth_tokens (token_key, user_id)
            VALUES (?, ?)
            "#,
        )
        .bind(key)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(AccountRepositoryError::from)?;

        let token = query_as::<_, TokenRow>(
            r#"
            SELECT token_key, user_id FROM auth_tokens WHERE token_key = ?
            "#,
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(AccountRepositoryError::from)?;

        Ok(token)
    }
}
