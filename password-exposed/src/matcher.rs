use subtle::ConstantTimeEq;
use tracing::trace;

use crate::hash::{PasswordHash, SUFFIX_LEN};
use crate::status::ExposureStatus;

/// Decides whether `hash` appears in a range body.
///
/// The body is a list of `SUFFIX:COUNT` records separated by CRLF. Records
/// without a `:` or with a suffix of the wrong length are skipped. Suffixes
/// are compared in constant time after uppercasing.
pub fn match_range(hash: &PasswordHash, body: &str) -> ExposureStatus {
    let wanted = hash.suffix().as_bytes();

    // Stack buffer for the uppercased record suffix, avoids a per-line allocation.
    let mut candidate = [0u8; SUFFIX_LEN];

    for line in body.lines() {
        let Some((suffix, _count)) = line.split_once(':') else {
            if !line.is_empty() {
                trace!(
                    prefix = hash.prefix(),
                    "skipping range record without separator"
                );
            }
            continue;
        };

        let suffix = suffix.trim().as_bytes();
        if suffix.len() != SUFFIX_LEN {
            trace!(
                prefix = hash.prefix(),
                len = suffix.len(),
                "skipping range record with bad suffix length"
            );
            continue;
        }

        for (out, byte) in candidate.iter_mut().zip(suffix) {
            *out = byte.to_ascii_uppercase();
        }

        if bool::from(candidate[..].ct_eq(wanted)) {
            return ExposureStatus::Exposed;
        }
    }

    ExposureStatus::NotExposed
}
