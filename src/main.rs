use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use weather_api::config::Config;
use weather_api::handlers::AppState;
use weather_api::provider::WeatherProvider;
use weather_api::rate_limit::RateLimiter;
use weather_api::resolver::WeatherResolver;
use weather_api::store::{KeyValueStore, RedisStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::from_env();

    let redis_client = redis::Client::open(config.redis_url.clone())?;
    let store: Arc<dyn KeyValueStore> = Arc::new(RedisStore::new(redis_client));

    let limiter = Arc::new(RateLimiter::new(
        store.clone(),
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_seconds),
    ));
    let provider = WeatherProvider::new(
        config.provider_base_url.clone(),
        config.provider_api_key.clone(),
        Duration::from_secs(config.provider_timeout_seconds),
    );
    let resolver = Arc::new(WeatherResolver::new(
        store,
        provider,
        Duration::from_secs(config.cache_ttl_seconds),
    ));

    let app = weather_api::router(AppState { limiter, resolver });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Weather service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Weather service stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
