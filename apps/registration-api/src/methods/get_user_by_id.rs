use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use account_lib::password::PasswordHasher;
use account_lib::repository::traits::UserRepositoryTrait;
use account_lib::token::TokenIssuer;

use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::UserResponse;
use crate::methods::routes::USERS_BY_ID_PATH;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = USERS_BY_ID_PATH,
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID (UUID)")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid UUID"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_user_by_id<U, I, H>(
    Path(id): Path<String>,
    State(state): State<AppState<U, I, H>>,
) -> Result<Json<UserResponse>, ApiError>
where
    U: UserRepositoryTrait + Send + Sync + 'static,
    I: TokenIssuer + Send + Sync + 'static,
    H: PasswordHasher + Send + Sync + 'static,
{
    let user_id = Uuid::parse_str(&id).map_err(|_| ApiError::invalid_uuid())?;

    match state.registration_service.get_user(user_id).await {
        Ok(Some(user)) => Ok(Json(UserResponse::from(user))),
        Ok(None) => Err(ApiError::user_not_found()),
        Err(e) => Err(handle_service_error(e, &state.env, "get_user_by_id")),
    }
}
