//! Token verification and role rules, end to end.

use std::time::{SystemTime, UNIX_EPOCH};

use api_gateway::auth::{Claims, Role};
use api_gateway::config::PolicyRuleConfig;
use axum::{body::Body, http::Request};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

const SECRET: &str = "integration-secret-with-enough-entropy-0123";

fn token(role: Role, ttl_secs: i64) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
    let claims = Claims {
        sub: format!("{role:?}-user"),
        role,
        exp: (now + ttl_secs) as u64,
        iat: Some(now as u64),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn policy_config(backend_url: &str) -> api_gateway::GatewayConfig {
    let mut config = common::gateway_config(backend_url);
    config.auth.jwt_secret = Some(SECRET.into());
    config.auth.leeway_secs = 0;
    config.auth.policies = vec![
        PolicyRuleConfig {
            path_prefix: "/api/admin".into(),
            roles: vec![Role::Admin],
        },
        PolicyRuleConfig {
            path_prefix: "/api/hr".into(),
            roles: vec![Role::Admin, Role::Hr],
        },
    ];
    config
}

async fn setup() -> (common::MockBackend, String, api_gateway::Shutdown) {
    let backend = common::start_backend(|_| (200, r#"{"ok":true}"#.into())).await;
    let (gateway, shutdown) = common::start_gateway(policy_config(&backend.url())).await;
    (backend, gateway, shutdown)
}

#[tokio::test]
async fn permitted_role_is_forwarded_with_original_token() {
    let (backend, gateway, shutdown) = setup().await;
    let hr = token(Role::Hr, 600);

    let res = common::client()
        .get(format!("{gateway}/api/hr/applicants"))
        .bearer_auth(&hr)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(backend.last().headers["authorization"], format!("Bearer {hr}").as_str());

    shutdown.trigger();
}

#[tokio::test]
async fn other_role_is_forbidden() {
    let (backend, gateway, shutdown) = setup().await;

    let res = common::client()
        .delete(format!("{gateway}/api/admin/users/9"))
        .bearer_auth(token(Role::Student, 600))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Insufficient permissions" }));
    assert!(backend.requests().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn unruled_paths_accept_any_valid_token() {
    let (_backend, gateway, shutdown) = setup().await;

    let res = common::client()
        .get(format!("{gateway}/api/courses"))
        .header("cookie", format!("token={}", token(Role::JobSeeker, 600)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
}

#[tokio::test]
async fn expired_or_forged_tokens_are_rejected() {
    let (backend, gateway, shutdown) = setup().await;
    let client = common::client();

    for bad in [token(Role::Admin, -600), "not.a.jwt".to_string()] {
        let res = client
            .get(format!("{gateway}/api/courses"))
            .bearer_auth(bad)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Invalid token" }));
    }
    assert!(backend.requests().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn dot_segments_do_not_bypass_role_rules() {
    let backend = common::start_backend(|_| (200, r#"{"ok":true}"#.into())).await;
    let router = common::gateway_router(policy_config(&backend.url()));
    let student = token(Role::Student, 600);

    for path in [
        "/api/courses/../admin/users",
        "/api/courses/%2e%2e/admin/users",
        "/api/courses/.%2E/admin/users",
        "/api/%61dmin/users",
    ] {
        let request = Request::get(path)
            .header("authorization", format!("Bearer {student}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = common::oneshot_json(router.clone(), request).await;

        assert_eq!(status, StatusCode::FORBIDDEN, "{path}");
        assert_eq!(body, json!({ "error": "Insufficient permissions" }));
    }
    assert!(backend.requests().is_empty());

    let request = Request::get("/api/hr/../admin/users")
        .header("authorization", format!("Bearer {}", token(Role::Admin, 600)))
        .body(Body::empty())
        .unwrap();
    let (status, _) = common::oneshot_json(router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.last().path_and_query, "/api/admin/users");
}
