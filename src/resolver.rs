use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::provider::WeatherProvider;
use crate::store::KeyValueStore;

/// Cache key for a city. The city is used literally: `"Boston"` and
/// `"boston"` are distinct entries, matching how the provider treats them.
fn cache_key(city: &str) -> String {
    format!("weather:{city}")
}

/// Cache-aside lookup: serve the cached document when present, otherwise
/// fetch from the provider and write the result back with the configured TTL.
/// The store evicts expired entries on its own; the resolver only sets the
/// TTL at write time.
pub struct WeatherResolver {
    store: Arc<dyn KeyValueStore>,
    provider: WeatherProvider,
    ttl: Duration,
}

impl WeatherResolver {
    pub fn new(store: Arc<dyn KeyValueStore>, provider: WeatherProvider, ttl: Duration) -> Self {
        Self {
            store,
            provider,
            ttl,
        }
    }

    #[instrument(skip(self), fields(city = %city))]
    pub async fn resolve(&self, city: &str) -> Result<Value, AppError> {
        let key = cache_key(city);

        // A read failure or an undecodable entry degrades to a miss: the
        // cache is an optimization, not the source of truth.
        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(document) => {
                    info!(city = %city, "cache hit");
                    return Ok(document);
                }
                Err(error) => {
                    warn!(city = %city, %error, "undecodable cache entry, treating as miss");
                }
            },
            Ok(None) => {}
            Err(error) => {
                warn!(city = %city, %error, "cache read failed, treating as miss");
            }
        }

        info!(city = %city, "cache miss, fetching from provider");
        let document = self.provider.fetch(city).await.map_err(|error| {
            warn!(city = %city, %error, "provider fetch failed");
            AppError::ProviderUnavailable
        })?;

        // Write-through is best effort: a store outage must not turn a
        // successful fetch into a failed request.
        match serde_json::to_string(&document) {
            Ok(raw) => {
                if let Err(error) = self.store.set_ex(&key, &raw, self.ttl).await {
                    warn!(city = %city, %error, "cache write failed, returning fetched data");
                }
            }
            Err(error) => {
                warn!(city = %city, %error, "failed to serialize document for caching");
            }
        }

        Ok(document)
    }
}
