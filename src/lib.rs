pub mod config;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod rate_limit;
pub mod resolver;
pub mod store;

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Builds the service router. Admission control wraps the weather route only;
/// the health probe is never rate limited.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(handlers::get_weather))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::admission,
        ))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
