use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use http::StatusCode;
use tracing::{debug, error, instrument, warn};

use crate::cache::Cache;
use crate::config::CheckerConfig;
use crate::file_cache::FileCache;
use crate::hash::{PasswordHash, hash_password};
use crate::matcher::match_range;
use crate::pacing::Pacer;
use crate::range::RangeClient;
use crate::status::ExposureStatus;
use crate::transport::{ReqwestTransport, Transport, TransportConfig};
use crate::trust::TrustBundleProvider;

/// Checks passwords against the breach corpus with a cache in front of the
/// range endpoint.
///
/// Cheap to share between threads. A cache or transport that was not
/// injected is built on first use, exactly once; if building it fails the
/// checker carries on without it (no cache, or `Unknown` for every miss).
pub struct ExposureChecker {
    config: CheckerConfig,
    range: RangeClient,
    cache: OnceLock<Option<Arc<dyn Cache>>>,
    transport: OnceLock<Option<Arc<dyn Transport>>>,
    trust: Option<Arc<dyn TrustBundleProvider>>,
    pacer: Option<Arc<dyn Pacer>>,
}

impl ExposureChecker {
    /// A checker with default settings and lazily built defaults.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> ExposureCheckerBuilder {
        ExposureCheckerBuilder::default()
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn check_password(&self, password: &str) -> ExposureStatus {
        self.check_hash(&hash_password(password))
    }

    /// Resolves the status of `hash`.
    ///
    /// At most one cache read, one range request and one cache write. A failed
    /// cache read counts as a miss and disables the write for this call; a
    /// failed or non-200 request yields `Unknown`, which is never cached.
    #[instrument(level = "debug", skip_all, fields(prefix = hash.prefix()))]
    pub fn check_hash(&self, hash: &PasswordHash) -> ExposureStatus {
        let key = hash.range_key();

        let (cached, write_back) = match self.cache() {
            None => (None, None),
            Some(cache) => match cache.get(&key) {
                Ok(hit) => (hit, Some(cache)),
                Err(e) => {
                    warn!(key, error = %e, "cache read failed, treating as a miss");
                    (None, None)
                }
            },
        };

        if let Some(body) = cached {
            debug!(key, "range cache hit");
            return match_range(hash, &body);
        }
        debug!(key, "range cache miss");

        let Some(body) = self.fetch_range(hash) else {
            return ExposureStatus::Unknown;
        };
        let status = match_range(hash, &body);

        if let Some(cache) = write_back
            && let Err(e) = cache.set(&key, &body, self.config.effective_cache_ttl())
        {
            warn!(key, error = %e, "cache write failed");
        }

        status
    }

    pub fn is_exposed_password(&self, password: &str) -> Option<bool> {
        self.check_password(password).as_bool()
    }

    pub fn is_exposed_hash(&self, hash: &PasswordHash) -> Option<bool> {
        self.check_hash(hash).as_bool()
    }

    // `None` means no authoritative answer; the reason has been logged.
    fn fetch_range(&self, hash: &PasswordHash) -> Option<String> {
        let Some(transport) = self.transport() else {
            warn!("no HTTP transport available");
            return None;
        };

        if let Some(pacer) = &self.pacer {
            pacer.pace();
        }

        match self.range.query(transport, hash) {
            Ok(response) if response.status() == StatusCode::OK => Some(response.into_body()),
            Ok(response) => {
                warn!(
                    status = response.status().as_u16(),
                    "range request returned no answer"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "range request failed");
                None
            }
        }
    }

    fn cache(&self) -> Option<&dyn Cache> {
        self.cache.get_or_init(|| self.default_cache()).as_deref()
    }

    fn transport(&self) -> Option<&dyn Transport> {
        self.transport
            .get_or_init(|| self.default_transport())
            .as_deref()
    }

    fn default_cache(&self) -> Option<Arc<dyn Cache>> {
        let dir = match &self.config.cache_dir {
            Some(dir) => dir.clone(),
            None => FileCache::default_dir(),
        };
        match FileCache::new(&dir) {
            Ok(cache) => {
                debug!(dir = %dir.display(), "using file cache");
                Some(Arc::new(cache))
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "file cache unavailable, caching disabled");
                None
            }
        }
    }

    fn default_transport(&self) -> Option<Arc<dyn Transport>> {
        // An explicit path wins and the provider is never consulted.
        let trust_bundle = match &self.config.trust_bundle_path {
            Some(path) => Some(path.clone()),
            None => self.trust.as_ref().and_then(|p| p.trusted_cert_path()),
        };

        let transport_config = TransportConfig {
            timeout: self.config.request_timeout,
            user_agent: &self.config.user_agent,
            trust_bundle: trust_bundle.as_deref(),
            danger_accept_invalid_certs: self.config.danger_accept_invalid_certs,
        };

        match ReqwestTransport::new(&transport_config) {
            Ok(transport) => Some(Arc::new(transport)),
            Err(e) => {
                error!(error = %e, "failed to build HTTP transport");
                None
            }
        }
    }
}

impl Default for ExposureChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Async wrappers that run the blocking check on tokio's blocking pool.
#[cfg(feature = "tokio")]
impl ExposureChecker {
    pub async fn check_password_async(self: &Arc<Self>, password: &str) -> ExposureStatus {
        self.check_hash_async(&hash_password(password)).await
    }

    pub async fn check_hash_async(self: &Arc<Self>, hash: &PasswordHash) -> ExposureStatus {
        let checker = Arc::clone(self);
        let hash = *hash;
        let task = tokio::task::spawn_blocking(move || checker.check_hash(&hash));
        match task.await {
            Ok(status) => status,
            Err(e) => {
                error!(error = %e, "exposure check task failed");
                ExposureStatus::Unknown
            }
        }
    }

    pub async fn is_exposed_password_async(self: &Arc<Self>, password: &str) -> Option<bool> {
        self.check_password_async(password).await.as_bool()
    }

    pub async fn is_exposed_hash_async(self: &Arc<Self>, hash: &PasswordHash) -> Option<bool> {
        self.check_hash_async(hash).await.as_bool()
    }
}

/// Builder for [`ExposureChecker`].
#[derive(Default)]
pub struct ExposureCheckerBuilder {
    config: CheckerConfig,
    cache: Option<Arc<dyn Cache>>,
    transport: Option<Arc<dyn Transport>>,
    trust: Option<Arc<dyn TrustBundleProvider>>,
    pacer: Option<Arc<dyn Pacer>>,
}

impl ExposureCheckerBuilder {
    /// Replaces every setting; collaborators already injected are kept.
    pub fn config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Used as-is; timeout and trust settings do not apply to it.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Consulted once, when the default transport is built.
    pub fn trust_bundle(mut self, provider: Arc<dyn TrustBundleProvider>) -> Self {
        self.trust = Some(provider);
        self
    }

    pub fn trust_bundle_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.trust_bundle_path = Some(path.into());
        self
    }

    pub fn pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn build(self) -> ExposureChecker {
        let range = RangeClient::new(&self.config.endpoint, &self.config.user_agent);

        let cache = OnceLock::new();
        if let Some(injected) = self.cache {
            let _ = cache.set(Some(injected));
        }
        let transport = OnceLock::new();
        if let Some(injected) = self.transport {
            let _ = transport.set(Some(injected));
        }

        ExposureChecker {
            config: self.config,
            range,
            cache,
            transport,
            trust: self.trust,
            pacer: self.pacer,
        }
    }
}
