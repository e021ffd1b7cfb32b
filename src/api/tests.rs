//! Router-level tests over in-memory state

use std::sync::{Arc, Mutex};

use argon2::Params;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::{create_router_with_state, AppComponents, AppState};
use crate::domain::email::EmailSender;
use crate::domain::user::{Role, User, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::{JwtConfig, JwtService, TokenCodec, TokenKind};
use crate::infrastructure::loan::InMemoryLoanRepository;
use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository, PasswordHasher};

const PASSWORD: &str = "Str0ng!pass";

#[derive(Debug, Default)]
struct Outbox {
    last_token: Mutex<Option<String>>,
}

#[async_trait]
impl EmailSender for Outbox {
    async fn send_verification_email(&self, _: &str, token: &str) -> Result<(), DomainError> {
        *self.last_token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    async fn send_reset_email(&self, _: &str, token: &str) -> Result<(), DomainError> {
        *self.last_token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }
}

struct TestApp {
    router: Router,
    users: Arc<InMemoryUserRepository>,
    outbox: Arc<Outbox>,
    hasher: Arc<Argon2Hasher>,
    access: Arc<JwtService>,
    refresh: Arc<JwtService>,
}

impl TestApp {
    fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let outbox = Arc::new(Outbox::default());
        let hasher = Arc::new(Argon2Hasher::with_params(
            Params::new(8 * 1024, 1, 1, None).unwrap(),
        ));
        let refresh = Arc::new(JwtService::new(
            TokenKind::Refresh,
            &JwtConfig::new("test-refresh-secret", 168),
        ));

        let access = Arc::new(JwtService::new(
            TokenKind::Access,
            &JwtConfig::new("test-access-secret", 1),
        ));

        let state = AppState::new(AppComponents {
            users: users.clone(),
            loans: Arc::new(InMemoryLoanRepository::new()),
            hasher: hasher.clone(),
            email: outbox.clone(),
            access_tokens: access.clone(),
            refresh_tokens: refresh.clone(),
        });

        Self {
            router: create_router_with_state(state),
            users,
            outbox,
            hasher,
            access,
            refresh,
        }
    }

    async fn add_user(&self, username: &str, role: Role) -> User {
        let mut user = User::new(
            username,
            format!("{}@example.com", username),
            self.hasher.hash(PASSWORD).unwrap(),
            None,
        );
        user.mark_verified();
        user.set_role(role);
        self.users.insert(user).await.unwrap()
    }

    async fn login(&self, username: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/users/login",
                None,
                Some(json!({"username": username, "password": PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        // Reported expiry is the access token's own `exp`
        let access_token = body["data"]["access_token"].as_str().unwrap();
        let claims = self.access.verify(access_token).unwrap();
        let expires_at =
            chrono::DateTime::parse_from_rfc3339(body["data"]["expires_at"].as_str().unwrap())
                .unwrap();
        assert_eq!(expires_at.timestamp(), claims.exp);

        (
            body["data"]["access_token"].as_str().unwrap().to_string(),
            body["data"]["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    fn last_email_token(&self) -> String {
        self.outbox.last_token.lock().unwrap().clone().unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_verify_login() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/users/register",
            None,
            Some(json!({
                "username": "jane",
                "email": "jane@example.com",
                "password": PASSWORD,
                "contact": "+1 555 0100"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], 201);
    assert!(body["data"].get("password_hash").is_none());

    // Unverified accounts cannot log in
    let (status, body) = app
        .send(
            Method::POST,
            "/users/login",
            None,
            Some(json!({"email": "jane@example.com", "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let uri = format!(
        "/users/verify-email?email=jane@example.com&token={}",
        app.last_email_token()
    );
    let (status, _) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (access, _) = app.login("jane").await;

    let (status, body) = app
        .send(Method::GET, "/users/profile", Some(&access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "jane");
    assert_eq!(body["data"]["contact"], "+1 555 0100");
}

#[tokio::test]
async fn test_verify_email_missing_query() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/users/verify-email?email=a@b.io", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_protected_routes_require_bearer() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert!(body["message"].is_string());

    let (status, _) = app
        .send(Method::GET, "/users/profile", Some("not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_cannot_authenticate() {
    let app = TestApp::new();
    app.add_user("jane", Role::User).await;
    let (_, refresh) = app.login("jane").await;

    let (status, _) = app
        .send(Method::GET, "/users/profile", Some(&refresh), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_body_uses_envelope() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{oops"))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_loan_lifecycle() {
    let app = TestApp::new();
    let alice = app.add_user("alice", Role::User).await;
    let bob = app.add_user("bob", Role::User).await;
    let (alice_token, _) = app.login("alice").await;
    let (bob_token, _) = app.login("bob").await;

    // Owner must be the subject
    let (status, _) = app
        .send(
            Method::POST,
            "/loans",
            Some(&alice_token),
            Some(json!({"amount": 100.0, "user_id": bob.id().to_string()})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(
            Method::POST,
            "/loans",
            Some(&alice_token),
            Some(json!({"amount": 0, "user_id": alice.id().to_string()})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = app
        .send(
            Method::POST,
            "/loans",
            Some(&alice_token),
            Some(json!({"amount": 100.0, "user_id": alice.id().to_string()})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    let loan_id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/loans/{}", loan_id);
    let (status, body) = app.send(Method::GET, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");

    let (status, _) = app.send(Method::GET, &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_loan_listing() {
    let app = TestApp::new();
    let alice = app.add_user("alice", Role::User).await;
    app.add_user("root", Role::Admin).await;
    let (alice_token, _) = app.login("alice").await;
    let (admin_token, _) = app.login("root").await;

    let mut loan_ids = Vec::new();
    for amount in [100.0, 200.0] {
        let (_, body) = app
            .send(
                Method::POST,
                "/loans",
                Some(&alice_token),
                Some(json!({"amount": amount, "user_id": alice.id().to_string()})),
            )
            .await;
        loan_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, _) = app
        .send(Method::GET, "/admin/loans", Some(&alice_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let review = format!("/admin/loans/{}/review", loan_ids[0]);
    let (status, body) = app.send(Method::POST, &review, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "reviewed");

    let (status, body) = app
        .send(
            Method::GET,
            "/admin/loans?status=pending",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], loan_ids[1].as_str());

    let (status, _) = app
        .send(
            Method::GET,
            "/admin/loans?order=sideways",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_user_management() {
    let app = TestApp::new();
    let jane = app.add_user("jane", Role::User).await;
    app.add_user("root", Role::Admin).await;
    let (jane_token, _) = app.login("jane").await;
    let (admin_token, _) = app.login("root").await;

    let (status, _) = app
        .send(Method::GET, "/admin/users", Some(&jane_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(
            Method::GET,
            "/admin/users?page_no=1&page_size=1",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["users"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["total"], 2);
    assert!(!body.to_string().contains("argon2"));

    let uri = format!("/admin/users?page_no={}&page_size=100", u64::MAX);
    let (status, body) = app.send(Method::GET, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["users"].as_array().unwrap().is_empty());

    let uri = format!("/admin/users/{}", jane.id());
    let (status, body) = app
        .send(Method::DELETE, &uri, Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, _) = app
        .send(Method::DELETE, &uri, Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_token_refresh() {
    let app = TestApp::new();
    app.add_user("alice", Role::User).await;
    let bob = app.add_user("bob", Role::User).await;
    let (access, refresh) = app.login("alice").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/token/refresh",
            Some(&access),
            Some(json!({"refresh_token": refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let renewed = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(Method::GET, "/users/profile", Some(&renewed), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // A validly signed refresh token for another subject is refused
    let bob_refresh = app.refresh.issue(bob.id()).unwrap().token;
    let (status, _) = app
        .send(
            Method::POST,
            "/token/refresh",
            Some(&access),
            Some(json!({"refresh_token": bob_refresh})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_over_http() {
    let app = TestApp::new();
    app.add_user("jane", Role::User).await;
    app.add_user("bob", Role::User).await;
    let (jane_token, _) = app.login("jane").await;
    let (bob_token, _) = app.login("bob").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/users/password-reset",
            Some(&bob_token),
            Some(json!({"email": "jane@example.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/users/password-reset",
            Some(&jane_token),
            Some(json!({"email": "jane@example.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!(
        "/users/password-update?email=jane@example.com&token={}",
        app.last_email_token()
    );

    let (status, _) = app
        .send(
            Method::POST,
            &uri,
            Some(&jane_token),
            Some(json!({"new_password": "weak"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            &uri,
            Some(&jane_token),
            Some(json!({"new_password": "N3w!password"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            "/users/login",
            None,
            Some(json!({"username": "jane", "password": "N3w!password"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let stored = app
        .users
        .find_by_username("jane")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.reset_password_token().is_none());
}

#[tokio::test]
async fn test_unknown_subject_on_admin_route() {
    let app = TestApp::new();
    let jane = app.add_user("jane", Role::User).await;
    let (token, _) = app.login("jane").await;
    app.users.delete(jane.id()).await.unwrap();

    let (status, _) = app
        .send(Method::GET, "/admin/users", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
