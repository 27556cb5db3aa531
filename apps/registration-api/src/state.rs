use std::sync::Arc;

use account_lib::password::{Argon2PasswordHasher, PasswordHasher};
use account_lib::registration_service::RegistrationService;
use account_lib::repository::traits::UserRepositoryTrait;
use account_lib::repository::{TokenRepository, UserRepository};
use account_lib::token::{StoredTokenIssuer, TokenIssuer};

pub struct AppState<
    U = UserRepository,
    I = StoredTokenIssuer<TokenRepository>,
    H = Argon2PasswordHasher,
> where
    U: UserRepositoryTrait + Send + Sync + 'static,
    I: TokenIssuer + Send + Sync + 'static,
    H: PasswordHasher + Send + Sync + 'static,
{
    pub registration_service: Arc<RegistrationService<U, I, H>>,
    pub env: String,
}

// Manual impl: the Arc is clonable regardless of the collaborator types.
impl<U, I, H> Clone for AppState<U, I, H>
where
    U: UserRepositoryTrait + Send + Sync + 'static,
    I: TokenIssuer + Send + Sync + 'static,
    H: PasswordHasher + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            registration_service: self.registration_service.clone(),
            env: self.env.clone(),
        }
    }
}
