//! Verification keys for signed third-party assertions.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use warden_core::config::GoogleConfig;
use warden_core::error::AppError;

/// Default minimum gap between refetches of a JWK set.
const DEFAULT_MIN_REFETCH_SECS: u64 = 60;

/// Resolves the public key an assertion was signed with.
#[async_trait]
pub trait KeySource: Send + Sync + fmt::Debug + 'static {
    /// Returns the key for `kid`. A missing `kid` resolves only when the
    /// source holds exactly one key.
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError>;
}

/// Fixed set of keys, keyed by key ID.
#[derive(Clone, Default)]
pub struct StaticKeySource {
    keys: HashMap<String, DecodingKey>,
}

impl StaticKeySource {
    /// Creates an empty key source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key under `kid`.
    pub fn with_key(mut self, kid: impl Into<String>, key: DecodingKey) -> Self {
        self.keys.insert(kid.into(), key);
        self
    }

    /// Adds an RSA public key in PEM form under `kid`.
    pub fn with_rsa_pem(self, kid: impl Into<String>, pem: &[u8]) -> Result<Self, AppError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| AppError::configuration(format!("Invalid RSA public key: {e}")))?;
        Ok(self.with_key(kid, key))
    }
}

impl fmt::Debug for StaticKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeySource")
            .field("kids", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError> {
        select_key(&self.keys, kid)
    }
}

/// Keys fetched from a provider's published JWK set and cached for a TTL.
///
/// An unknown key ID forces a refetch so rotated keys are picked up
/// before the cache expires. Refetches are spaced at least
/// `min_refetch_interval` apart and run one at a time.
pub struct JwksKeySource {
    client: reqwest::Client,
    url: String,
    ttl: Duration,
    min_refetch_interval: Duration,
    cache: RwLock<Option<CachedKeys>>,
    /// When the last fetch was attempted, successful or not.
    last_attempt: Mutex<Option<Instant>>,
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

impl JwksKeySource {
    /// Creates a key source for `url` with the given cache TTL and request timeout.
    pub fn new(url: impl Into<String>, ttl: Duration, timeout: Duration) -> Result<Self, AppError> {
        if timeout.is_zero() {
            return Err(AppError::configuration(
                "JWK set fetch timeout must be greater than zero",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            ttl,
            min_refetch_interval: Duration::from_secs(DEFAULT_MIN_REFETCH_SECS),
            cache: RwLock::new(None),
            last_attempt: Mutex::new(None),
        })
    }

    /// Overrides the minimum gap between refetches.
    pub fn with_min_refetch_interval(mut self, interval: Duration) -> Self {
        self.min_refetch_interval = interval;
        self
    }

    /// Creates the key source for Google's published certificates.
    pub fn from_config(config: &GoogleConfig) -> Result<Self, AppError> {
        Ok(Self::new(
            config.jwks_url.clone(),
            Duration::from_secs(config.jwks_cache_seconds),
            Duration::from_secs(config.timeout_seconds),
        )?
        .with_min_refetch_interval(Duration::from_secs(config.jwks_min_refetch_seconds)))
    }

    async fn cached(&self, kid: Option<&str>) -> Option<DecodingKey> {
        let cache = self.cache.read().await;
        let cached = cache.as_ref()?;
        if cached.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        select_key(&cached.keys, kid).ok()
    }

    async fn refresh(&self) -> Result<(), AppError> {
        let set: JwkSet = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "Failed to fetch JWK set");
                AppError::external_validation("Unable to fetch provider signing keys")
            })?
            .json()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "Malformed JWK set");
                AppError::external_validation("Unable to fetch provider signing keys")
            })?;

        let keys: HashMap<String, DecodingKey> = set
            .keys
            .iter()
            .filter_map(|jwk| {
                let kid = jwk.common.key_id.clone()?;
                DecodingKey::from_jwk(jwk).ok().map(|key| (kid, key))
            })
            .collect();
        debug!(url = %self.url, keys = keys.len(), "Refreshed JWK set");

        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }
}

impl fmt::Debug for JwksKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwksKeySource")
            .field("url", &self.url)
            .field("ttl", &self.ttl)
            .field("min_refetch_interval", &self.min_refetch_interval)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeySource for JwksKeySource {
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError> {
        if let Some(key) = self.cached(kid).await {
            return Ok(key);
        }

        let mut last_attempt = self.last_attempt.lock().await;
        // A concurrent caller may have refreshed while we waited.
        if let Some(key) = self.cached(kid).await {
            return Ok(key);
        }
        if last_attempt.is_some_and(|at| at.elapsed() < self.min_refetch_interval) {
            debug!(url = %self.url, kid = ?kid, "JWK refetch suppressed");
            return Err(AppError::external_validation("Unknown signing key"));
        }
        *last_attempt = Some(Instant::now());
        self.refresh().await?;
        drop(last_attempt);

        let cache = self.cache.read().await;
        match cache.as_ref() {
            Some(cached) => select_key(&cached.keys, kid),
            None => Err(AppError::external_validation("No signing keys available")),
        }
    }
}

fn select_key(
    keys: &HashMap<String, DecodingKey>,
    kid: Option<&str>,
) -> Result<DecodingKey, AppError> {
    let key = match kid {
        Some(kid) => keys.get(kid),
        None if keys.len() == 1 => keys.values().next(),
        None => None,
    };
    key.cloned()
        .ok_or_else(|| AppError::external_validation("Unknown signing key"))
}
