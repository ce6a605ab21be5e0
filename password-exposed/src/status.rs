use std::fmt;

/// Outcome of an exposure check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExposureStatus {
    /// The hash appears in the breach corpus.
    Exposed,
    /// The range was retrieved and the hash is not in it.
    NotExposed,
    /// No authoritative answer: the range could not be retrieved.
    Unknown,
}

impl ExposureStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExposureStatus::Exposed => "exposed",
            ExposureStatus::NotExposed => "not_exposed",
            ExposureStatus::Unknown => "unknown",
        }
    }

    /// `Some(true)` for exposed, `Some(false)` for not exposed, `None` when unknown.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            ExposureStatus::Exposed => Some(true),
            ExposureStatus::NotExposed => Some(false),
            ExposureStatus::Unknown => None,
        }
    }
}

impl fmt::Display for ExposureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
