use http::header::USER_AGENT;
use http::{HeaderValue, Method, Request, Response};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::hash::PasswordHash;
use crate::transport::Transport;

/// Base URL of the Pwned Passwords range API.
pub const DEFAULT_ENDPOINT: &str = "https://api.pwnedpasswords.com";

/// User agent sent with every range request.
pub const DEFAULT_USER_AGENT: &str =
    "password_exposed - https://github.com/DivineOmega/password_exposed";

/// Builds and sends k-anonymity range requests: only the 5-character prefix
/// of a hash ever leaves the process.
#[derive(Debug, Clone)]
pub struct RangeClient {
    endpoint: String,
    user_agent: HeaderValue,
}

impl RangeClient {
    /// `endpoint` is the API base URL without a trailing `/range`.
    ///
    /// A user agent that is not a valid header value falls back to
    /// [`DEFAULT_USER_AGENT`].
    pub fn new(endpoint: &str, user_agent: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            user_agent: user_agent_header(user_agent),
        }
    }

    /// `GET {endpoint}/range/{PREFIX}` with the prefix in uppercase.
    pub fn request(&self, hash: &PasswordHash) -> Result<Request<()>, TransportError> {
        let url = format!("{}/range/{}", self.endpoint, hash.prefix());
        let request = Request::builder()
            .method(Method::GET)
            .uri(url)
            .header(USER_AGENT, self.user_agent.clone())
            .body(())?;
        Ok(request)
    }

    /// Issues the range request for `hash` over `transport`.
    ///
    /// Any status code is returned as-is; deciding what a non-200 means is up
    /// to the caller.
    pub fn query(
        &self,
        transport: &dyn Transport,
        hash: &PasswordHash,
    ) -> Result<Response<String>, TransportError> {
        let request = self.request(hash)?;
        debug!(prefix = hash.prefix(), "requesting hash range");
        transport.send(request)
    }
}

impl Default for RangeClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_USER_AGENT)
    }
}

/// `user_agent` as a header value, or [`DEFAULT_USER_AGENT`] if it is not one.
pub(crate) fn user_agent_header(user_agent: &str) -> HeaderValue {
    HeaderValue::from_str(user_agent).unwrap_or_else(|_| {
        warn!("user agent is not a valid header value, using the default");
        HeaderValue::from_static(DEFAULT_USER_AGENT)
    })
}
