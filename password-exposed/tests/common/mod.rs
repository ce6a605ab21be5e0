#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use http::{Request, Response, StatusCode};
use password_exposed::{PasswordHash, Transport, TransportError, hash_password};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Records that are in every range served by [`FakeRangeService`].
const FILLER: &[&str] = &[
    "0018A45C4D1DEF81644B54AB7F969B88D65:1",
    "00D4F6E8FA6EECAD2A3AA415EEC418D38EC:2",
    "011053FD0102E94D6AE2F8B83D76FAF94F6:1",
];

/// In-process stand-in for the range API.
///
/// Serves `/range/{PREFIX}` with the suffixes of the configured passwords that
/// fall in that prefix, plus a few filler records, joined with CRLF.
pub struct FakeRangeService {
    exposed: Vec<PasswordHash>,
    calls: AtomicUsize,
}

impl FakeRangeService {
    pub fn new(exposed_passwords: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            exposed: exposed_passwords.iter().map(|p| hash_password(p)).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for FakeRangeService {
    fn send(&self, request: Request<()>) -> Result<Response<String>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(prefix) = request.uri().path().strip_prefix("/range/") else {
            let mut response = Response::new(String::new());
            *response.status_mut() = StatusCode::NOT_FOUND;
            return Ok(response);
        };

        let matching = self
            .exposed
            .iter()
            .filter(|hash| hash.prefix() == prefix)
            .map(|hash| format!("{}:{}", hash.suffix(), 42));
        let body: Vec<String> = FILLER
            .iter()
            .map(|line| line.to_string())
            .chain(matching)
            .collect();

        Ok(Response::new(body.join("\r\n")))
    }
}

/// A transport whose every request times out.
pub struct TimeoutTransport {
    calls: AtomicUsize,
}

impl TimeoutTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for TimeoutTransport {
    fn send(&self, request: Request<()>) -> Result<Response<String>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Timeout {
            url: request.uri().to_string(),
        })
    }
}

/// Serves one fixed body for every request.
pub struct FixedBodyTransport(pub &'static str);

impl Transport for FixedBodyTransport {
    fn send(&self, _request: Request<()>) -> Result<Response<String>, TransportError> {
        Ok(Response::new(self.0.to_string()))
    }
}

const WORDS: &[&str] = &[
    "anchor", "basalt", "cobalt", "dapple", "ember", "fjord", "gantry", "hollow", "indigo",
    "juniper", "kelp", "lantern", "marrow", "nimbus", "oxbow", "pewter", "quarry", "russet",
    "sextant", "thistle", "umber", "vellum", "wicker", "yarrow", "zephyr", "bramble", "cinder",
    "drumlin", "estuary", "furrow", "gossamer", "heather", "isthmus", "jetty", "kestrel",
    "lichen", "meadow", "nettle", "obsidian", "plover", "quill", "rampart", "sorrel", "tundra",
    "upland", "vortex", "warbler", "xylem", "yonder", "zircon",
];

/// Six words from a fixed list, reproducible from `seed`.
pub fn passphrase(seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let words: Vec<&str> = (0..6).map(|_| *WORDS.choose(&mut rng).unwrap()).collect();
    words.join(" ")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
