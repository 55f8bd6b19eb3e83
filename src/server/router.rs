use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, instrument};

use super::state::AppState;
use crate::types::{ParseRequestInput, ParseRequestResponse};

pub const SERVICE_NAME: &str = "request-parse-agent";

/// Routes under `/request`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/request/parse-request", post(parse_request_handler))
        .route("/request/health", get(health_handler))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Transport-level failure rendered as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("解析请求失败: {error}"),
        }
    }

    fn unavailable(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            detail: format!("服务不可用: {error}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[instrument(name = "trip_agent.parse_request", skip_all)]
async fn parse_request_handler(
    State(state): State<AppState>,
    Json(payload): Json<ParseRequestInput>,
) -> Result<Json<ParseRequestResponse>, ApiError> {
    info!(
        target: "trip_agent::server",
        user_input = %payload.user_input,
        "received parse request"
    );

    let parser = state.parser().map_err(|reason| {
        error!(target: "trip_agent::server", %reason, "request parser unavailable");
        ApiError::internal(reason)
    })?;

    let outcome = parser.parse(&payload.user_input).await;

    let response = ParseRequestResponse::from_outcome(outcome).map_err(|err| {
        error!(target: "trip_agent::server", error = %err, "parse result violates contract");
        ApiError::internal(err)
    })?;

    Ok(Json(response))
}

async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.parser().map_err(ApiError::unavailable)?;
    Ok(Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    })))
}
