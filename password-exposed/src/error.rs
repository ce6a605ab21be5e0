use std::path::PathBuf;

/// Failures while talking to the range endpoint.
///
/// These never reach callers of the check operations; the checker maps every
/// variant to [`ExposureStatus::Unknown`](crate::ExposureStatus::Unknown).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Escape hatch for custom transports.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Classifies a reqwest failure for `url`.
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            TransportError::Timeout { url }
        } else if source.is_connect() {
            TransportError::Connect { url, source }
        } else {
            TransportError::Request { url, source }
        }
    }
}

/// Failures inside a cache backend. The checker treats all of them as a miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt cache entry for key {key}")]
    Corrupt { key: String },

    #[error("invalid cache key {key:?}")]
    InvalidKey { key: String },
}

/// Failures while acquiring a trust bundle. Providers log these and fall back
/// to an older bundle or the built-in roots.
#[derive(Debug, thiserror::Error)]
pub enum TrustBundleError {
    #[error("trust bundle I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trust bundle fetch failed: {0}")]
    Fetch(#[from] TransportError),

    #[error("HTTP {status} while fetching trust bundle from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("'{path}' does not contain a usable PEM certificate bundle")]
    InvalidBundle { path: PathBuf },

    #[error("fetched trust bundle is not a usable PEM certificate bundle")]
    InvalidRemoteBundle,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // The rejected input is not echoed back: it may be a password passed by mistake.
    #[error("invalid SHA-1 hash: expected 40 hexadecimal characters, got {len} characters")]
    InvalidHash { len: usize },
}
