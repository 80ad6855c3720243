//! Dialog configuration.

use chrono_tz::Tz;

/// Inactivity period after which a stored session is treated as abandoned.
/// The store owns expiry; see `SeaOrmSessionStore::with_ttl`.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

/// Wait before the single retry of a rate-limited message deletion.
pub const DEFAULT_DELETE_RETRY_BACKOFF_SECS: u64 = 1;

/// Settings shared by the dialog, its cleanup helper and the summary renderer.
///
/// ```
/// use chrono_tz::Europe::Berlin;
/// use event_dialog_store::DialogConfig;
///
/// let config = DialogConfig::default()
///     .with_display_timezone(Berlin)
///     .with_locale("de");
/// assert_eq!(config.locale(), "de");
/// ```
#[derive(Debug, Clone)]
pub struct DialogConfig {
    delete_retry_backoff: std::time::Duration,
    display_timezone: Tz,
    locale: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            delete_retry_backoff: std::time::Duration::from_secs(
                DEFAULT_DELETE_RETRY_BACKOFF_SECS,
            ),
            display_timezone: Tz::UTC,
            locale: "en".to_string(),
        }
    }
}

impl DialogConfig {
    /// Sets the wait before retrying a rate-limited deletion.
    pub fn with_delete_retry_backoff(mut self, backoff: std::time::Duration) -> Self {
        self.delete_retry_backoff = backoff;
        self
    }

    /// Sets the timezone deadlines are entered and displayed in.
    pub fn with_display_timezone(mut self, tz: Tz) -> Self {
        self.display_timezone = tz;
        self
    }

    /// Sets the locale passed to the localizer.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn delete_retry_backoff(&self) -> std::time::Duration {
        self.delete_retry_backoff
    }

    pub fn display_timezone(&self) -> Tz {
        self.display_timezone
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}
