use std::sync::Arc;

use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

use crate::entities::{RegisteredUser, User};
use crate::errors_service::RegistrationError;
use crate::password::{Argon2PasswordHasher, PasswordHasher};
use crate::repository::models::UserRow;
use crate::repository::traits::UserRepositoryTrait;
use crate::repository::{TokenRepository, UserRepository};
use crate::token::{StoredTokenIssuer, TokenIssuer};
use crate::validation::{self, EMAIL_FIELD, EMAIL_TAKEN_MESSAGE, USERNAME_FIELD, USERNAME_TAKEN_MESSAGE};

fn parse_uuid(s: &str) -> Result<Uuid, RegistrationError> {
    Uuid::parse_str(s).map_err(|_| RegistrationError::InvalidUuid(s.to_string()))
}

fn user_from_row(row: UserRow) -> Result<User, RegistrationError> {
    Ok(User {
        id: parse_uuid(&row.id)?,
        username: row.username,
        email: row.email,
    })
}

/// Candidate user record submitted for registration.
#[derive(Debug)]
pub struct NewUserRequest {
    pub username: String,
    pub email: String,
    pub password: Secret<String>,
}

#[derive(Debug)]
pub struct RegistrationService<
    U = UserRepository,
    I = StoredTokenIssuer<TokenRepository>,
    H = Argon2PasswordHasher,
> where
    U: UserRepositoryTrait,
    I: TokenIssuer,
    H: PasswordHasher,
{
    pub user_repo: Arc<U>,
    pub token_issuer: Arc<I>,
    pub password_hasher: Arc<H>,
}

impl RegistrationService<UserRepository, StoredTokenIssuer<TokenRepository>, Argon2PasswordHasher> {
    pub fn new(
        user_repo: UserRepository,
        token_issuer: StoredTokenIssuer<TokenRepository>,
        password_hasher: Argon2PasswordHasher,
    ) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
            token_issuer: Arc::new(token_issuer),
            password_hasher: Arc::new(password_hasher),
        }
    }
}

impl<U, I, H> RegistrationService<U, I, H>
where
    U: UserRepositoryTrait,
    I: TokenIssuer,
    H: PasswordHasher,
{
    pub fn with_collaborators(
        user_repo: Arc<U>,
        token_issuer: Arc<I>,
        password_hasher: Arc<H>,
    ) -> Self {
        Self {
            user_repo,
            token_issuer,
            password_hasher,
        }
    }

    /// Validate the candidate record against every rule, then persist the
    /// user and issue its token. All violated fields are reported together;
    /// nothing is written unless every rule passes.
    pub async fn register(
        &self,
        request: NewUserRequest,
    ) -> Result<RegisteredUser, RegistrationError> {
        let mut errors = validation::validate_new_user(
            &request.username,
            &request.email,
            request.password.expose_secret(),
        );

        if self
            .user_repo
            .exists_by_username(&request.username)
            .await
            .map_err(RegistrationError::from)?
        {
            errors.push(USERNAME_FIELD, USERNAME_TAKEN_MESSAGE);
        }

        if self
            .user_repo
            .exists_by_email(&request.email)
            .await
            .map_err(RegistrationError::from)?
        {
            errors.push(EMAIL_FIELD, EMAIL_TAKEN_MESSAGE);
        }

        if !errors.is_empty() {
            return Err(RegistrationError::Validation(errors));
        }

        let password_hash = self
            .password_hasher
            .hash(&request.password)
            .map_err(RegistrationError::Internal)?;

        // The store's unique constraints are authoritative: a duplicate key
        // raced in between the checks above and this insert maps back to the
        // same field error.
        let row = self
            .user_repo
            .create_user(&request.username, &request.email, &password_hash)
            .await
            .map_err(RegistrationError::from)?;
        let user = user_from_row(row)?;

        let token = self
            .token_issuer
            .issue_for(&user)
            .await
            .map_err(RegistrationError::from)?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");

        Ok(RegisteredUser { user, token })
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, RegistrationError> {
        let row = self
            .user_repo
            .get_user(user_id)
            .await
            .map_err(RegistrationError::from)?;
        row.map(user_from_row).transpose()
    }
}
