use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Opaque credential bound 1:1 to a user, issued when the user row is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthToken {
    pub key: String,
    pub user_id: Uuid,
}

/// Result of a successful registration: the persisted user plus its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub user: User,
    pub token: AuthToken,
}
