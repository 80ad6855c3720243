//! Source of "now" for expiration checks and deadline validation.

use chrono::{DateTime, Utc};

/// Supplies the current instant.
///
/// The store and the dialog never call `Utc::now()` directly so that expiry and
/// deadline rules can be exercised against a controlled clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
