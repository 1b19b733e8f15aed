use std::env;

/// Runtime configuration, populated once at startup and passed down.
///
/// Defaults mirror the reference deployment: a 12 hour cache TTL and a
/// budget of 10 requests per minute per client.
pub struct Config {
    pub port: u16,
    pub provider_base_url: String,
    pub provider_api_key: String,
    pub provider_timeout_seconds: u64,
    pub redis_url: String,
    pub cache_ttl_seconds: u64,
    pub rate_limit_max_requests: u64,
    pub rate_limit_window_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            provider_base_url: env::var("PROVIDER_BASE_URL").unwrap_or_else(|_| {
                "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline"
                    .to_string()
            }),
            provider_api_key: env::var("VISUAL_CROSSING_API_KEY").unwrap_or_default(),
            provider_timeout_seconds: env::var("PROVIDER_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string()),
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(43200), // 12 hours default
            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or(10),
            rate_limit_window_seconds: env::var("RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or(60),
        }
    }
}
