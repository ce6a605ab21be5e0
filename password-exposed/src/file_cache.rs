//! On-disk cache: one JSON file per key in a single directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::trace;

use crate::cache::Cache;
use crate::error::CacheError;

/// Directory name used under the per-user cache directory by default.
pub const USER_CACHE_DIR_NAME: &str = "password-exposed";

/// Directory name used under the system temp directory when the platform has
/// no per-user cache directory.
pub const DEFAULT_CACHE_DIR_NAME: &str = "password-exposed-cache";

// Longer lifetimes are clamped so the expiry stays a representable RFC 3339 date.
fn max_ttl() -> TimeDelta {
    TimeDelta::days(36_500)
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// File backed [`Cache`].
///
/// Entries are written to a temporary file in the cache directory and renamed
/// into place, so readers never observe a partial entry. Expired entries are
/// deleted when read.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Opens (creating if needed) a cache rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// `<user cache dir>/password-exposed` (`$XDG_CACHE_HOME` or
    /// `~/.cache` on Linux), or `<temp dir>/password-exposed-cache` when the
    /// platform reports no per-user cache directory.
    ///
    /// The temp directory is shared by every local account, and whoever can
    /// write to the cache can make passwords read as not exposed. Configure
    /// an explicit directory on hosts where that fallback applies.
    pub fn default_dir() -> PathBuf {
        default_dir_in(dirs::cache_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Keys become file names, so anything outside [A-Za-z0-9_-] is refused.
    fn entry_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        let allowed = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'-';
        if key.is_empty() || !key.bytes().all(allowed) {
            return Err(CacheError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(key)?;

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let Ok(entry) = serde_json::from_slice::<StoredEntry>(&bytes) else {
            return Err(CacheError::Corrupt {
                key: key.to_string(),
            });
        };

        if entry.expires_at <= Utc::now() {
            trace!(key, "removing expired cache entry");
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let path = self.entry_path(key)?;

        let ttl = TimeDelta::from_std(ttl)
            .unwrap_or_else(|_| max_ttl())
            .min(max_ttl());
        let expires_at = Utc::now() + ttl;
        let entry = StoredEntry {
            value: value.to_string(),
            expires_at,
        };
        let bytes = serde_json::to_vec(&entry)?;

        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(&bytes)?;
        file.persist(&path).map_err(|e| CacheError::Io(e.error))?;

        Ok(())
    }
}

fn default_dir_in(user_cache_dir: Option<PathBuf>) -> PathBuf {
    match user_cache_dir {
        Some(dir) => dir.join(USER_CACHE_DIR_NAME),
        None => std::env::temp_dir().join(DEFAULT_CACHE_DIR_NAME),
    }
}
