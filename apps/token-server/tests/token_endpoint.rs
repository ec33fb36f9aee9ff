use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
};
use chrono::Utc;
use tower::ServiceExt;

use reliefmap_token_server::api::app_router;
use reliefmap_token_server::minter::{AccessToken, MintError, TokenMinter};
use reliefmap_token_server::token_cache::TokenCache;
use reliefmap_token_server::verify::{IdTokenVerifier, VerifyError};
use reliefmap_token_server::AppState;

const GOOD_ID_TOKEN: &str = "good-id-token";
const DASHBOARD_ORIGIN: &str = "https://givedirectly.github.io";

struct FakeMinter {
    validity: chrono::Duration,
    mints: AtomicUsize,
}

impl FakeMinter {
    fn new(validity: chrono::Duration) -> Arc<Self> {
        Arc::new(Self {
            validity,
            mints: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TokenMinter for FakeMinter {
    async fn mint(&self) -> Result<AccessToken, MintError> {
        let n = self.mints.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AccessToken {
            access_token: format!("ee-token-{n}"),
            expire_time: Utc::now() + self.validity,
        })
    }
}

struct FakeVerifier;

#[async_trait]
impl IdTokenVerifier for FakeVerifier {
    async fn verify(&self, id_token: &str) -> Result<(), VerifyError> {
        if id_token == GOOD_ID_TOKEN {
            Ok(())
        } else {
            Err(VerifyError::Rejected("unknown token".to_string()))
        }
    }
}

fn build_test_router(minter: Arc<FakeMinter>) -> axum::Router {
    let state = Arc::new(AppState {
        cache: Arc::new(TokenCache::new(minter)),
        verifier: Arc::new(FakeVerifier),
        allowed_origins: vec![
            "http://localhost:8080".to_string(),
            DASHBOARD_ORIGIN.to_string(),
        ],
    });
    app_router(state)
}

fn token_request(origin: Option<&str>, id_token: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/token")
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
    if let Some(origin) = origin {
        builder = builder.header(header::ORIGIN, origin);
    }
    builder
        .body(Body::from(format!("idToken={id_token}")))
        .unwrap()
}

#[tokio::test]
async fn request_from_allowed_origin_receives_token() {
    let app = build_test_router(FakeMinter::new(chrono::Duration::hours(1)));

    let response = app
        .oneshot(token_request(Some(DASHBOARD_ORIGIN), GOOD_ID_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        DASHBOARD_ORIGIN
    );
    assert_eq!(response.headers()[header::VARY], "Origin");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["accessToken"], "ee-token-1");
    assert!(json["expireTime"].as_str().is_some());
}

#[tokio::test]
async fn unknown_origin_is_rejected() {
    let app = build_test_router(FakeMinter::new(chrono::Duration::hours(1)));

    let response = app
        .oneshot(token_request(Some("https://evil.example.com"), GOOD_ID_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    // Wildcard CORS so the browser lets the caller observe the failure.
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn missing_origin_is_rejected() {
    let app = build_test_router(FakeMinter::new(chrono::Duration::hours(1)));

    let response = app
        .oneshot(token_request(None, GOOD_ID_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn invalid_id_token_is_rejected() {
    let minter = FakeMinter::new(chrono::Duration::hours(1));
    let app = build_test_router(minter.clone());

    let response = app
        .oneshot(token_request(Some(DASHBOARD_ORIGIN), "forged"))
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    // A rejected caller must not trigger token minting.
    assert_eq!(minter.mints.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn token_is_shared_across_requests_while_valid() {
    let minter = FakeMinter::new(chrono::Duration::hours(1));
    let app = build_test_router(minter.clone());

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(token_request(Some(DASHBOARD_ORIGIN), GOOD_ID_TOKEN))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["accessToken"], "ee-token-1");
    }
    assert_eq!(minter.mints.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn nearly_expired_token_is_regenerated_per_request() {
    // Tokens come back with less than the minimum acceptable validity,
    // so every request mints a replacement.
    let minter = FakeMinter::new(chrono::Duration::minutes(5));
    let app = build_test_router(minter.clone());

    for expected in ["ee-token-1", "ee-token-2"] {
        let response = app
            .clone()
            .oneshot(token_request(Some(DASHBOARD_ORIGIN), GOOD_ID_TOKEN))
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["accessToken"], expected);
    }
    assert_eq!(minter.mints.load(Ordering::SeqCst), 2);
}
