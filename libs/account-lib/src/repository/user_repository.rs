use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, MySqlPool};
use uuid::Uuid;

use crate::repository::errors::AccountRepositoryError;
use crate::repository::models::UserRow;
use crate::repository::traits::UserRepositoryTrait;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pub pool: MySqlPool,
}

impl UserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn exists_by_username(&self, username: &str) -> Result<bool, AccountRepositoryError> {
        let count: i64 = query_scalar(
            r#"
            SELECT COUNT(*) FROM users WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(AccountRepositoryError::from)?;

        Ok(count > 0)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AccountRepositoryError> {
        let count: i64 = query_scalar(
            r#"
            SELECT COUNT(*) FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(AccountRepositoryError::from)?;

        Ok(count > 0)
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, AccountRepositoryError> {
        let user_id = Uuid::new_v4();

        query(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id.to_string())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(AccountRepositoryError::from)?;

        let user = query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash FROM users WHERE id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(AccountRepositoryError::from)?;

        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, AccountRepositoryError> {
        let user = query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash FROM users WHERE id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(AccountRepositoryError::from)?;

        Ok(user)
    }
}
