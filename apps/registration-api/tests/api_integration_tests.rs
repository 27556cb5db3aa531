use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use mockall::mock;
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use account_lib::entities::{AuthToken, User};
use account_lib::password::PasswordHasher;
use account_lib::registration_service::RegistrationService;
use account_lib::repository::errors::AccountRepositoryError;
use account_lib::repository::models::UserRow;
use account_lib::repository::traits::UserRepositoryTrait;
use account_lib::token::TokenIssuer;

use registration_api::methods::get_user_by_id::get_user_by_id;
use registration_api::methods::register_user::register_user;
use registration_api::methods::routes::{USERS_BY_ID_PATH, USERS_PATH};
use registration_api::state::AppState;

// ==================== MOCKS ====================

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepositoryTrait for UserRepo {
        async fn exists_by_username(&self, username: &str) -> Result<bool, AccountRepositoryError>;
        async fn exists_by_email(&self, email: &str) -> Result<bool, AccountRepositoryError>;
        async fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<UserRow, AccountRepositoryError>;
        async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, AccountRepositoryError>;
    }
}

/// Hasher double that marks the plaintext instead of running Argon2.
#[derive(Debug)]
struct FakeHasher;

impl PasswordHasher for FakeHasher {
    fn hash(&self, plaintext: &Secret<String>) -> Result<String, anyhow::Error> {
        Ok(format!("hashed:{}", plaintext.expose_secret()))
    }
}

/// Hasher double that always fails, to drive the internal-error path.
#[derive(Debug)]
struct BrokenHasher;

impl PasswordHasher for BrokenHasher {
    fn hash(&self, _plaintext: &Secret<String>) -> Result<String, anyhow::Error> {
        Err(anyhow::anyhow!("hasher unavailable"))
    }
}

/// Issuer double returning a fixed key, so responses can be checked against
/// the token the store would hold.
#[derive(Debug, Clone)]
struct FixedTokenIssuer {
    key: String,
}

#[async_trait]
impl TokenIssuer for FixedTokenIssuer {
    async fn issue_for(&self, user: &User) -> Result<AuthToken, AccountRepositoryError> {
        Ok(AuthToken {
            key: self.key.clone(),
            user_id: user.id,
        })
    }
}

// ==================== TEST HELPERS ====================

const ISSUED_KEY: &str = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b";

fn test_app<H>(user_repo: MockUserRepo, password_hasher: H) -> Router
where
    H: PasswordHasher + Send + Sync + 'static,
{
    let issuer = FixedTokenIssuer {
        key: ISSUED_KEY.to_string(),
    };
    let state = AppState {
        registration_service: Arc::new(RegistrationService::with_collaborators(
            Arc::new(user_repo),
            Arc::new(issuer),
            Arc::new(password_hasher),
        )),
        env: "test".to_string(),
    };

    Router::new()
        .route(USERS_PATH, post(register_user))
        .route(USERS_BY_ID_PATH, get(get_user_by_id))
        .with_state(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Repo mock for a store where both existence checks come back clean.
fn empty_store() -> MockUserRepo {
    let mut user_repo = MockUserRepo::new();
    user_repo
        .expect_exists_by_username()
        .returning(|_| Ok(false));
    user_repo.expect_exists_by_email().returning(|_| Ok(false));
    user_repo
}

// ==================== REGISTER ENDPOINT TESTS ====================

#[tokio::test]
async fn test_register_user_returns_201_with_token_and_no_password() {
    let mut user_repo = empty_store();
    user_repo
        .expect_create_user()
        .withf(|username, email, password_hash| {
            username == "foobar"
                && email == "foobar@example.com"
                && password_hash == "hashed:foobarpassword"
        })
        .times(1)
        .returning(|username, email, password_hash| {
            Ok(UserRow {
                id: Uuid::new_v4().to_string(),
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
            })
        });

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(post_json(
            "/users",
            json!({
                "username": "foobar",
                "email": "foobar@example.com",
                "password": "foobarpassword",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "foobar");
    assert_eq!(body["email"], "foobar@example.com");
    assert_eq!(body["token"], ISSUED_KEY);
    assert!(body.get("password").is_none());
    assert_eq!(body.as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_register_user_with_short_password_returns_400() {
    let mut user_repo = empty_store();
    user_repo.expect_create_user().times(0);

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(post_json(
            "/users",
            json!({
                "username": "foobar",
                "email": "foobarbaz@example.com",
                "password": "foo",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(body["password"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_user_with_too_long_username_returns_400() {
    let mut user_repo = empty_store();
    user_repo.expect_create_user().times(0);

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(post_json(
            "/users",
            json!({
                "username": "foo".repeat(51),
                "email": "foobarbaz@example.com",
                "password": "foobarpassword",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["username"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_user_with_empty_username_returns_400() {
    let mut user_repo = empty_store();
    user_repo.expect_create_user().times(0);

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(post_json(
            "/users",
            json!({
                "username": "",
                "email": "foobarbaz@example.com",
                "password": "foobarpassword",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["username"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_user_with_preexisting_username_returns_400() {
    let mut user_repo = MockUserRepo::new();
    user_repo
        .expect_exists_by_username()
        .withf(|username| username == "testuser")
        .times(1)
        .returning(|_| Ok(true));
    user_repo.expect_exists_by_email().returning(|_| Ok(false));
    user_repo.expect_create_user().times(0);

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(post_json(
            "/users",
            json!({
                "username": "testuser",
                "email": "new@example.com",
                "password": "testuser",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(body["username"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_user_with_preexisting_email_returns_400() {
    let mut user_repo = MockUserRepo::new();
    user_repo
        .expect_exists_by_username()
        .returning(|_| Ok(false));
    user_repo
        .expect_exists_by_email()
        .withf(|email| email == "test@example.com")
        .times(1)
        .returning(|_| Ok(true));
    user_repo.expect_create_user().times(0);

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(post_json(
            "/users",
            json!({
                "username": "newuser",
                "email": "test@example.com",
                "password": "testpassword",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["email"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_user_with_invalid_email_returns_400() {
    let mut user_repo = empty_store();
    user_repo.expect_create_user().times(0);

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(post_json(
            "/users",
            json!({
                "username": "testuser",
                "email": "testing",
                "password": "testpassword",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["email"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_user_reports_every_violated_field() {
    let mut user_repo = empty_store();
    user_repo.expect_create_user().times(0);

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(post_json(
            "/users",
            json!({
                "username": "",
                "email": "testing",
                "password": "foo",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 3);
    assert!(fields.contains_key("username"));
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("password"));
}

#[tokio::test]
async fn test_register_user_internal_failure_returns_500() {
    let mut user_repo = empty_store();
    user_repo.expect_create_user().times(0);

    let app = test_app(user_repo, BrokenHasher);
    let response = app
        .oneshot(post_json(
            "/users",
            json!({
                "username": "foobar",
                "email": "foobar@example.com",
                "password": "foobarpassword",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal_error");
}

// ==================== GET USER ENDPOINT TESTS ====================

#[tokio::test]
async fn test_get_user_by_id_returns_user_without_password_hash() {
    let user_id = Uuid::new_v4();

    let mut user_repo = MockUserRepo::new();
    user_repo.expect_get_user().times(1).returning(move |_| {
        Ok(Some(UserRow {
            id: user_id.to_string(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$opaque".to_string(),
        }))
    });

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(get_request(&format!("/users/{}", user_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], user_id.to_string());
    assert_eq!(body["username"], "testuser");
    assert_eq!(body["email"], "test@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_get_user_by_id_unknown_user_returns_404() {
    let mut user_repo = MockUserRepo::new();
    user_repo.expect_get_user().times(1).returning(|_| Ok(None));

    let app = test_app(user_repo, FakeHasher);
    let response = app
        .oneshot(get_request(&format!("/users/{}", Uuid::new_v4())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_user_by_id_invalid_uuid_returns_400() {
    let mut user_repo = MockUserRepo::new();
    user_repo.expect_get_user().times(0);

    let app = test_app(user_repo, FakeHasher);
    let response = app.oneshot(get_request("/users/not-a-uuid")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
