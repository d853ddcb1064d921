//! HTTP-level tests: auth middleware, route wiring, response envelope.

use axum::body::Body;
use axum::Router;
use chit_server::auth::JwtConfig;
use chit_server::db::MIGRATOR;
use chit_server::routes::build_app;
use chit_server::{Config, ServerState};
use http::{header, Request, StatusCode};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-secret-32-chars-min!";

async fn test_app() -> (Router, ServerState) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();

    let mut config = Config::with_overrides("/tmp/chit-test", 0);
    config.jwt = JwtConfig {
        secret: TEST_SECRET.to_string(),
        expiration_minutes: 60,
        issuer: "identity-service".to_string(),
        audience: "chit-server".to_string(),
    };

    let state = ServerState::with_pool(config, pool);
    let app = build_app(&state).with_state(state.clone());
    (app, state)
}

fn bearer(state: &ServerState, user_id: &str) -> String {
    let token = state
        .jwt_service
        .generate_token(user_id, "mgr@example.com", "manager")
        .unwrap();
    format!("Bearer {token}")
}

#[tokio::test]
async fn health_is_public() {
    let (app, _state) = test_app().await;

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_routes_require_a_token() {
    let (app, _state) = test_app().await;

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/chit-funds")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let (app, _state) = test_app().await;

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/chit-funds")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_and_list_funds_over_http() {
    let (app, state) = test_app().await;
    let auth = bearer(&state, "mgr-1");

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chit-funds")
                .header(header::AUTHORIZATION, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Family Fund",
                        "fund_type": "auction",
                        "total_amount": 12000.0,
                        "duration_months": 12,
                        "start_date": "2026-01-01"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/chit-funds")
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let funds: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(funds.as_array().unwrap().len(), 1);
    assert_eq!(funds[0]["monthly_amount"], 1000.0);

    // Another manager sees nothing
    let other = bearer(&state, "mgr-2");
    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/chit-funds")
                .header(header::AUTHORIZATION, &other)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let funds: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(funds.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn validation_errors_use_the_envelope() {
    let (app, state) = test_app().await;
    let auth = bearer(&state, "mgr-1");

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chit-funds")
                .header(header::AUTHORIZATION, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Bad",
                        "fund_type": "auction",
                        "total_amount": -5.0,
                        "duration_months": 12
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope["code"], "E0002");
}
