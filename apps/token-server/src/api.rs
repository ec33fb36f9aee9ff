use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::main_lib::AppState;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/token", post(issue_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
struct TokenRequest {
    #[serde(rename = "idToken")]
    id_token: String,
}

/// Hands the cached analysis-backend token to a signed-in dashboard
/// user. The caller must come from an allow-listed origin and present a
/// valid id token; both failures get the same generic response so the
/// endpoint leaks nothing about which check failed.
async fn issue_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let Some(origin) = origin.filter(|o| state.allowed_origins.iter().any(|a| a == o)) else {
        return unauthorized();
    };
    if let Err(err) = state.verifier.verify(&request.id_token).await {
        warn!("rejected token request from {origin}: {err}");
        return unauthorized();
    }
    match state.cache.current().await {
        Ok(token) => (cors_headers(&origin), Json(token)).into_response(),
        Err(err) => {
            warn!("could not produce a token: {err}");
            (
                StatusCode::BAD_GATEWAY,
                cors_headers(&origin),
                "Token unavailable",
            )
                .into_response()
        }
    }
}

fn cors_headers(origin: &str) -> [(header::HeaderName, HeaderValue); 2] {
    [
        (header::VARY, HeaderValue::from_static("Origin")),
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_str(origin).expect("origin was already parsed from a header"),
        ),
    ]
}

/// Generic failure. The wildcard CORS header lets the dashboard's error
/// handler observe the status instead of an opaque network error.
fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        )],
        "Unauthorized",
    )
        .into_response()
}
