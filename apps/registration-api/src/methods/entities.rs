use secrecy::Secret;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use account_lib::entities::{RegisteredUser, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    /// Kept wrapped so the plaintext never appears in logs or debug output.
    #[schema(value_type = String, format = Password)]
    pub password: Secret<String>,
}

/// Success body: the stored identity plus the issued token. The password is
/// excluded under all circumstances.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredUserResponse {
    pub username: String,
    pub email: String,
    pub token: String,
}

impl From<RegisteredUser> for RegisteredUserResponse {
    fn from(registered: RegisteredUser) -> Self {
        RegisteredUserResponse {
            username: registered.user.username,
            email: registered.user.email,
            token: registered.token.key,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}
