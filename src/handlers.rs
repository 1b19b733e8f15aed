use axum::{
    body::Body,
    extract::{ConnectInfo, Query, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::error::AppError;
use crate::rate_limit::{Admission, RateLimiter};
use crate::resolver::WeatherResolver;

#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub resolver: Arc<WeatherResolver>,
}

pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok", "service": "weather-api" }))
}

#[derive(Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<Value>, AppError> {
    let city = params
        .city
        .filter(|c| !c.is_empty())
        .ok_or(AppError::MissingCity)?;

    info!(city = %city, "weather request received");

    let weather = state.resolver.resolve(&city).await?;

    Ok(Json(weather))
}

/// Admission middleware. A rejected request never reaches the handler, so it
/// consumes no cache lookup and no provider call.
pub async fn admission(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_identity(&req);

    match state.limiter.admit(&client).await {
        Admission::Allowed => next.run(req).await,
        Admission::Rejected => AppError::RateLimited.into_response(),
    }
}

/// Identifies the requesting client: proxy headers first, then the peer
/// address from the connection.
fn client_identity(req: &Request<Body>) -> String {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(peer.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}
