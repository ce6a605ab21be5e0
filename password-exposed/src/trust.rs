//! Sources of the root certificates used to verify the range endpoint.
//!
//! A provider only hands back a path to a PEM bundle. Whatever goes wrong while
//! producing one, the answer degrades to an older bundle or to `None` (the
//! built-in roots); it never turns verification off.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use http::{Method, Request, StatusCode};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{TransportError, TrustBundleError};
use crate::transport::{Transport, parse_trust_bundle};

/// Downloaded bundles kept in the data directory; older ones are deleted
/// after each successful refresh.
pub const KEEP_BUNDLES: usize = 3;

pub trait TrustBundleProvider: Send + Sync {
    /// Path of a PEM bundle to trust, or `None` for the built-in roots.
    fn trusted_cert_path(&self) -> Option<PathBuf>;
}

/// Uses the built-in roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrust;

impl TrustBundleProvider for SystemTrust {
    fn trusted_cert_path(&self) -> Option<PathBuf> {
        None
    }
}

/// A fixed bundle on disk.
#[derive(Debug, Clone)]
pub struct StaticTrustBundle {
    path: PathBuf,
}

impl StaticTrustBundle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TrustBundleProvider for StaticTrustBundle {
    fn trusted_cert_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

/// Fetches a bundle from a remote trust-bundle service and keeps the copies
/// it downloads in a data directory.
///
/// Resolution order, evaluated once per provider:
/// 1. a freshly fetched bundle, saved as `bundle-<timestamp>.pem` (only the
///    newest [`KEEP_BUNDLES`] of these are kept);
/// 2. the newest `*.pem` already in the data directory;
/// 3. the fallback snapshot, if one was configured;
/// 4. `None`.
///
/// A data directory that cannot be written to skips straight to step 2.
pub struct RemoteTrustBundle {
    url: String,
    data_dir: PathBuf,
    fallback: Option<PathBuf>,
    transport: Arc<dyn Transport>,
    resolved: OnceLock<Option<PathBuf>>,
}

impl RemoteTrustBundle {
    pub fn new(
        url: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            url: url.into(),
            data_dir: data_dir.into(),
            fallback: None,
            transport,
            resolved: OnceLock::new(),
        }
    }

    /// Bundle to use when neither a fetch nor a stored copy is available.
    pub fn with_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback = Some(path.into());
        self
    }

    fn resolve(&self) -> Option<PathBuf> {
        match self.refresh() {
            Ok(path) => {
                info!(path = %path.display(), "refreshed trust bundle");
                return Some(path);
            }
            Err(e) => warn!(url = %self.url, error = %e, "trust bundle refresh failed"),
        }

        if let Some(path) = latest_snapshot(&self.data_dir) {
            debug!(path = %path.display(), "using stored trust bundle");
            return Some(path);
        }

        if self.fallback.is_none() {
            warn!("no trust bundle available, using built-in roots");
        }
        self.fallback.clone()
    }

    fn refresh(&self) -> Result<PathBuf, TrustBundleError> {
        fs::create_dir_all(&self.data_dir)?;
        // Fail on an unwritable directory before spending a request.
        let mut file = NamedTempFile::new_in(&self.data_dir)?;

        let request = Request::builder()
            .method(Method::GET)
            .uri(self.url.as_str())
            .body(())
            .map_err(TransportError::from)?;
        let response = self.transport.send(request)?;

        if response.status() != StatusCode::OK {
            return Err(TrustBundleError::HttpStatus {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let pem = response.into_body();
        if parse_trust_bundle(pem.as_bytes()).is_none() {
            return Err(TrustBundleError::InvalidRemoteBundle);
        }

        file.write_all(pem.as_bytes())?;
        let name = format!("bundle-{}.pem", Utc::now().format("%Y%m%d%H%M%S%.6f"));
        let path = self.data_dir.join(name);
        file.persist(&path).map_err(|e| TrustBundleError::Io(e.error))?;
        prune_snapshots(&self.data_dir, KEEP_BUNDLES);

        Ok(path)
    }
}

impl TrustBundleProvider for RemoteTrustBundle {
    fn trusted_cert_path(&self) -> Option<PathBuf> {
        self.resolved.get_or_init(|| self.resolve()).clone()
    }
}

// Bundle names embed a sortable timestamp, so the greatest name is the newest.
fn latest_snapshot(dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "pem"))
        .max_by(|a, b| a.file_name().cmp(&b.file_name()))
}

// Only `bundle-*.pem` files written by `refresh` are candidates; other PEM
// files in the directory are left alone.
fn prune_snapshots(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut bundles: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_downloaded_bundle(path))
        .collect();
    bundles.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    for stale in bundles.iter().skip(keep) {
        if let Err(e) = fs::remove_file(stale) {
            warn!(path = %stale.display(), error = %e, "failed to remove old trust bundle");
        }
    }
}

fn is_downloaded_bundle(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("bundle-") && name.ends_with(".pem"))
}
