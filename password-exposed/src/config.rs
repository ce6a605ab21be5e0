use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::range::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};

/// Environment variable naming the directory of the default file cache.
pub const CACHE_DIR_ENV: &str = "PASSWORD_EXPOSED_CACHE_DIR";

/// Environment variable naming a PEM bundle to trust for the range endpoint.
pub const TRUST_BUNDLE_ENV: &str = "PASSWORD_EXPOSED_CA_BUNDLE";

/// Environment variable overriding the request timeout, in whole seconds.
pub const TIMEOUT_ENV: &str = "PASSWORD_EXPOSED_TIMEOUT_SECS";

/// Environment variable overriding the cache lifetime, in whole seconds.
pub const CACHE_TTL_ENV: &str = "PASSWORD_EXPOSED_CACHE_TTL_SECS";

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Settings for an [`ExposureChecker`](crate::ExposureChecker).
///
/// Collaborators (cache, transport, trust provider, pacer) are injected
/// through [`ExposureCheckerBuilder`](crate::ExposureCheckerBuilder); the
/// fields here only shape the defaults built when nothing is injected.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Lifetime of cached ranges. Zero means [`DEFAULT_CACHE_TTL`].
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    /// PEM bundle for the default transport. Takes precedence over an
    /// injected trust provider.
    pub trust_bundle_path: Option<PathBuf>,
    /// API base URL.
    pub endpoint: String,
    pub user_agent: String,
    /// Directory for the default file cache. `None` uses
    /// [`FileCache::default_dir`](crate::FileCache::default_dir).
    pub cache_dir: Option<PathBuf>,
    pub danger_accept_invalid_certs: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            trust_bundle_path: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_dir: None,
            danger_accept_invalid_certs: false,
        }
    }
}

impl CheckerConfig {
    /// Defaults overridden by the `PASSWORD_EXPOSED_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(CACHE_DIR_ENV) {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = lookup(TRUST_BUNDLE_ENV) {
            config.trust_bundle_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = parse_secs(&lookup, TIMEOUT_ENV) {
            config.request_timeout = secs;
        }
        if let Some(secs) = parse_secs(&lookup, CACHE_TTL_ENV) {
            config.cache_ttl = secs;
        }

        config
    }

    /// The TTL actually applied to cache writes.
    pub fn effective_cache_ttl(&self) -> Duration {
        if self.cache_ttl.is_zero() {
            DEFAULT_CACHE_TTL
        } else {
            self.cache_ttl
        }
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<Duration> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparsable duration");
            None
        }
    }
}
