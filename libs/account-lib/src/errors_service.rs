use crate::repository::errors::AccountRepositoryError;
use crate::validation::{FieldErrors, EMAIL_FIELD, EMAIL_TAKEN_MESSAGE, USERNAME_FIELD, USERNAME_TAKEN_MESSAGE};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegistrationError {
    /// One or more field violations. Recoverable; nothing was written.
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("resource not found")]
    NotFound,

    #[error("invalid UUID in database: {0}")]
    InvalidUuid(String),

    /// Unexpected store or hasher failure. Never conflated with validation.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AccountRepositoryError> for RegistrationError {
    fn from(err: AccountRepositoryError) -> Self {
        match err {
            // Duplicate-key insert errors surface as the same field error the
            // pre-insert existence checks would have produced.
            AccountRepositoryError::UsernameAlreadyExists => RegistrationError::Validation(
                FieldErrors::single(USERNAME_FIELD, USERNAME_TAKEN_MESSAGE),
            ),
            AccountRepositoryError::EmailAlreadyExists => RegistrationError::Validation(
                FieldErrors::single(EMAIL_FIELD, EMAIL_TAKEN_MESSAGE),
            ),
            AccountRepositoryError::NotFound => RegistrationError::NotFound,
            AccountRepositoryError::Sqlx(e) => RegistrationError::Internal(e.into()),
        }
    }
}
