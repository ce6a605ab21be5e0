//! Breached password checker using the Pwned Passwords range API.
//!
//! Passwords are hashed with SHA-1 locally and only the first 5 hex characters
//! of the digest are sent to the service (a k-anonymity range query). The
//! service answers with every known suffix in that range, and membership is
//! decided locally with a constant-time comparison.
//!
//! Results are tri-state: [`ExposureStatus::Exposed`],
//! [`ExposureStatus::NotExposed`], or [`ExposureStatus::Unknown`] when the
//! range could not be retrieved. Network and cache failures never surface as
//! errors from the check operations.
//!
//! Range bodies are cached (by default on disk, for 30 days) keyed on the hash
//! prefix, so repeated checks in the same range skip the network.
//!
//! ```no_run
//! use password_exposed::{ExposureChecker, ExposureStatus};
//!
//! let checker = ExposureChecker::new();
//! match checker.check_password("hunter2") {
//!     ExposureStatus::Exposed => println!("pick another password"),
//!     ExposureStatus::NotExposed => println!("not found in any breach"),
//!     ExposureStatus::Unknown => println!("could not check right now"),
//! }
//! ```
//!
//! The cache, HTTP transport, trust bundle source and request pacing are all
//! injectable through [`ExposureChecker::builder`].

use std::sync::OnceLock;

pub mod cache;
pub mod checker;
pub mod config;
pub mod error;
pub mod file_cache;
pub mod hash;
pub mod matcher;
pub mod pacing;
pub mod range;
pub mod status;
pub mod transport;
pub mod trust;

pub use cache::{Cache, DEFAULT_CACHE_TTL, MemoryCache, NoCache};
pub use checker::{ExposureChecker, ExposureCheckerBuilder};
pub use config::CheckerConfig;
pub use error::{CacheError, Error, TransportError, TrustBundleError};
pub use file_cache::FileCache;
pub use hash::{HEX_CHARS, PREFIX_LEN, PasswordHash, SUFFIX_LEN, hash_password};
pub use matcher::match_range;
pub use pacing::{MinIntervalPacer, Pacer};
pub use range::RangeClient;
pub use status::ExposureStatus;
pub use transport::{ReqwestTransport, Transport, TransportConfig};
pub use trust::{RemoteTrustBundle, StaticTrustBundle, SystemTrust, TrustBundleProvider};

// Shared by the free functions below; configured from the environment.
fn default_checker() -> &'static ExposureChecker {
    static CHECKER: OnceLock<ExposureChecker> = OnceLock::new();
    CHECKER.get_or_init(|| {
        let config = CheckerConfig::from_env();
        ExposureChecker::with_config(config)
    })
}

/// Checks `password` with a process-wide default checker.
pub fn password_exposed(password: &str) -> ExposureStatus {
    default_checker().check_password(password)
}

pub fn password_exposed_by_hash(hash: &PasswordHash) -> ExposureStatus {
    default_checker().check_hash(hash)
}

pub fn password_is_exposed(password: &str) -> Option<bool> {
    default_checker().is_exposed_password(password)
}

pub fn password_is_exposed_by_hash(hash: &PasswordHash) -> Option<bool> {
    default_checker().is_exposed_hash(hash)
}
