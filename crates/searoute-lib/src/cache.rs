//! Cache adapter over an external key-value store.
//!
//! The store contract is narrow: string get/set with a per-entry TTL, and
//! tolerance for missing values. Cache failures never fail a request; they
//! degrade to a miss and are logged. The in-process implementation uses a
//! `moka` future cache with per-entry expiry, which also serves as the test
//! double for the external backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::response::RouteResponse;

/// Narrow key-value contract for the external cache backend.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}

/// In-process cache store with per-entry TTL.
pub struct MemoryCacheStore {
    cache: moka::future::Cache<String, (String, Duration)>,
}

struct PerEntryExpiry;

impl moka::Expiry<String, (String, Duration)> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &(String, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

impl MemoryCacheStore {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: moka::future::Cache::builder()
                .max_capacity(max_entries)
                .expire_after(PerEntryExpiry)
                .build(),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key).await.map(|(value, _)| value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.cache.insert(key.to_string(), (value, ttl)).await;
        Ok(())
    }
}

/// TTL policy for the cache classes.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub route: Duration,
    pub port_lookup: Duration,
    pub validation: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            route: Duration::from_secs(1_800),
            port_lookup: Duration::from_secs(24 * 3_600),
            validation: Duration::from_secs(300),
        }
    }
}

/// Serializing adapter between the coordinator and the cache store.
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    ttls: CacheTtls,
    /// Budget for a single backend call; slower calls degrade to a miss.
    call_timeout: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self {
            store,
            ttls,
            call_timeout: Duration::from_millis(50),
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Cached response for a fingerprint, with `cache_hit` set on the way
    /// out. Backend errors and timeouts degrade to a miss.
    pub async fn get_route(&self, fingerprint: &Fingerprint) -> Option<RouteResponse> {
        let key = fingerprint.route_cache_key();
        let raw = match tokio::time::timeout(self.call_timeout, self.store.get(&key)).await {
            Ok(Ok(value)) => value?,
            Ok(Err(error)) => {
                warn!(%key, %error, "cache get failed; treating as miss");
                return None;
            }
            Err(_) => {
                warn!(%key, "cache get timed out; treating as miss");
                return None;
            }
        };

        match serde_json::from_str::<RouteResponse>(&raw) {
            Ok(mut response) => {
                response.cache_hit = true;
                Some(response)
            }
            Err(error) => {
                warn!(%key, %error, "cache value failed to deserialize; treating as miss");
                None
            }
        }
    }

    /// Store a response under its fingerprint with the route TTL. The
    /// `cache_hit` flag is cleared on write so reads mark it themselves.
    pub async fn put_route(&self, fingerprint: &Fingerprint, response: &RouteResponse) {
        let key = fingerprint.route_cache_key();
        let mut stored = response.clone();
        stored.cache_hit = false;

        let raw = match serde_json::to_string(&stored) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%key, %error, "response failed to serialize for cache");
                return;
            }
        };

        match tokio::time::timeout(self.call_timeout, self.store.set(&key, raw, self.ttls.route))
            .await
        {
            Ok(Ok(())) => debug!(%key, "route response cached"),
            Ok(Err(error)) => warn!(%key, %error, "cache set failed"),
            Err(_) => warn!(%key, "cache set timed out"),
        }
    }

    /// Cached validation verdict for a fingerprint.
    pub async fn get_validation(&self, fingerprint: &Fingerprint) -> Option<bool> {
        let key = fingerprint.validation_cache_key();
        match tokio::time::timeout(self.call_timeout, self.store.get(&key)).await {
            Ok(Ok(Some(raw))) => raw.parse().ok(),
            Ok(Ok(None)) => None,
            Ok(Err(error)) => {
                warn!(%key, %error, "cache get failed; treating as miss");
                None
            }
            Err(_) => None,
        }
    }

    pub async fn put_validation(&self, fingerprint: &Fingerprint, valid: bool) {
        let key = fingerprint.validation_cache_key();
        if let Ok(Err(error)) = tokio::time::timeout(
            self.call_timeout,
            self.store.set(&key, valid.to_string(), self.ttls.validation),
        )
        .await
        {
            warn!(%key, %error, "cache set failed");
        }
    }

    /// Cached serialized port for the lookup endpoint.
    pub async fn get_port_lookup(&self, code: &str) -> Option<String> {
        let key = format!("ports:v1:{code}");
        match tokio::time::timeout(self.call_timeout, self.store.get(&key)).await {
            Ok(Ok(value)) => value,
            _ => None,
        }
    }

    pub async fn put_port_lookup(&self, code: &str, serialized: String) {
        let key = format!("ports:v1:{code}");
        if let Ok(Err(error)) = tokio::time::timeout(
            self.call_timeout,
            self.store.set(&key, serialized, self.ttls.port_lookup),
        )
        .await
        {
            warn!(%key, %error, "cache set failed");
        }
    }
}

/// A store that always fails, for exercising the degrade-to-miss path.
#[cfg(test)]
pub struct FailingCacheStore;

#[cfg(test)]
#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(crate::error::Error::BackendUnavailable {
            backend: "cache".to_string(),
            message: "injected failure".to_string(),
        })
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
        Err(crate::error::Error::BackendUnavailable {
            backend: "cache".to_string(),
            message: "injected failure".to_string(),
        })
    }
}
