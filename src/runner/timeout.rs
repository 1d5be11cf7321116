//! Timeout applied to every rustfmt invocation.

use std::time::Duration;

/// Upper bound on a single rustfmt run.
///
/// When it expires the child process is killed and the run settles as timed
/// out. The default is 10 seconds; shorter values exist for tests and for
/// embedders that format on every keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTimeout(Duration);

impl FormatTimeout {
    /// Default timeout: 10 seconds
    const DEFAULT_SECS: u64 = 10;

    /// Create a timeout, rejecting zero (a run could never succeed).
    pub fn new(duration: Duration) -> std::io::Result<Self> {
        if duration.is_zero() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Format timeout must be greater than zero",
            ));
        }
        Ok(Self(duration))
    }

    /// Get the inner Duration value.
    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Default for FormatTimeout {
    fn default() -> Self {
        Self(Duration::from_secs(Self::DEFAULT_SECS))
    }
}
