use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use account_lib::password::PasswordHasher;
use account_lib::registration_service::NewUserRequest;
use account_lib::repository::traits::UserRepositoryTrait;
use account_lib::token::TokenIssuer;

use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::{RegisterUserRequest, RegisteredUserResponse};
use crate::methods::routes::USERS_PATH;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = USERS_PATH,
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User created and token issued", body = RegisteredUserResponse),
        (status = 400, description = "Validation error: field name mapped to messages"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn register_user<U, I, H>(
    State(state): State<AppState<U, I, H>>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<RegisteredUserResponse>), ApiError>
where
    U: UserRepositoryTrait + Send + Sync + 'static,
    I: TokenIssuer + Send + Sync + 'static,
    H: PasswordHasher + Send + Sync + 'static,
{
    let request = NewUserRequest {
        username: payload.username,
        email: payload.email,
        password: payload.password,
    };

    state
        .registration_service
        .register(request)
        .await
        .map(|registered| {
            (
                StatusCode::CREATED,
                Json(RegisteredUserResponse::from(registered)),
            )
        })
        .map_err(|e| handle_service_error(e, &state.env, "register_user"))
}
