use std::fs;
use std::path::Path;
use std::time::Duration;

use http::{Request, Response};
use tracing::{debug, warn};

use crate::error::{TransportError, TrustBundleError};
use crate::range::user_agent_header;

/// Sends one HTTP request and returns the status and body.
///
/// Implementations enforce their own timeout and must be usable from several
/// threads at once. A non-2xx status is a normal response, not an error.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request<()>) -> Result<Response<String>, TransportError>;
}

/// Settings for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig<'a> {
    pub timeout: Duration,
    pub user_agent: &'a str,
    /// PEM bundle used as the root set instead of the built-in roots.
    pub trust_bundle: Option<&'a Path>,
    /// Turns off certificate verification. Only honoured when set explicitly.
    pub danger_accept_invalid_certs: bool,
}

/// Blocking reqwest client over rustls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Builds the client. A trust bundle that cannot be read or parsed is
    /// logged and the built-in roots are used instead, as is the default user
    /// agent when `user_agent` is not a valid header value.
    pub fn new(config: &TransportConfig<'_>) -> Result<Self, TransportError> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent_header(config.user_agent));

        if let Some(path) = config.trust_bundle {
            match load_trust_bundle(path) {
                Ok(certs) => {
                    debug!(path = %path.display(), count = certs.len(), "using trust bundle");
                    builder = builder.tls_built_in_root_certs(false);
                    for cert in certs {
                        builder = builder.add_root_certificate(cert);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "trust bundle unusable, falling back to built-in roots");
                }
            }
        }

        if config.danger_accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(TransportError::Client)?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: Request<()>) -> Result<Response<String>, TransportError> {
        let (parts, ()) = request.into_parts();
        let url = parts.uri.to_string();

        let response = self
            .client
            .request(parts.method, &url)
            .headers(parts.headers)
            .send()
            .map_err(|e| TransportError::from_reqwest(&url, e))?;

        let status = response.status();
        let body = response.text().map_err(|source| {
            if source.is_timeout() {
                TransportError::Timeout { url: url.clone() }
            } else {
                TransportError::Body {
                    url: url.clone(),
                    source,
                }
            }
        })?;

        let mut out = Response::new(body);
        *out.status_mut() = status;
        Ok(out)
    }
}

/// Reads every certificate from a PEM bundle. An empty bundle is an error.
pub fn load_trust_bundle(path: &Path) -> Result<Vec<reqwest::Certificate>, TrustBundleError> {
    let pem = fs::read(path)?;
    parse_trust_bundle(&pem).ok_or_else(|| TrustBundleError::InvalidBundle {
        path: path.to_path_buf(),
    })
}

pub(crate) fn parse_trust_bundle(pem: &[u8]) -> Option<Vec<reqwest::Certificate>> {
    reqwest::Certificate::from_pem_bundle(pem)
        .ok()
        .filter(|certs| !certs.is_empty())
}
