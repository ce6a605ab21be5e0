#![allow(dead_code)]

use http::{Request, Response};
use password_exposed::{PasswordHash, Transport, TransportError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALL_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Records in a typical range response.
pub const RANGE_RECORDS: usize = 1000;

/// Generates a specified number of random passwords with uniform distribution.
/// Uses a fixed seed for reproducible benchmark results.
pub fn generate_random_passwords(count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let length = rng.gen_range(8..=64);
            (0..length)
                .map(|_| ALL_CHARS[rng.gen_range(0..ALL_CHARS.len())] as char)
                .collect()
        })
        .collect()
}

/// Builds a CRLF separated range body of `records` random `SUFFIX:COUNT` lines,
/// with `include` appended as the last record when given.
pub fn synthetic_range(records: usize, include: Option<&PasswordHash>) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut rng = StdRng::seed_from_u64(7);

    let mut lines: Vec<String> = (0..records)
        .map(|_| {
            let suffix: String = (0..35)
                .map(|_| HEX[rng.gen_range(0..16)] as char)
                .collect();
            format!("{}:{}", suffix, rng.gen_range(1..100_000))
        })
        .collect();
    if let Some(hash) = include {
        lines.push(format!("{}:3", hash.suffix()));
    }

    lines.join("\r\n")
}

/// Answers every range request with the same pre-built body.
pub struct StaticRange(pub String);

impl Transport for StaticRange {
    fn send(&self, _request: Request<()>) -> Result<Response<String>, TransportError> {
        Ok(Response::new(self.0.clone()))
    }
}
