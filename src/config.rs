//! Run settings shared by the resolver and the downloader.

/// Default HTTP connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Default number of pages fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Upper bound for download concurrency.
pub const MAX_CONCURRENCY: usize = 16;

/// Default upper bound on lookup requests for one book.
pub const DEFAULT_MAX_LOOKUPS: usize = 10_000;

/// Connect and read timeouts for the shared HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Seconds allowed to establish a connection.
    pub connect_secs: u64,
    /// Seconds allowed for a whole request, body included.
    pub read_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

/// Settings for one book run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// HTTP timeouts.
    pub timeouts: HttpTimeouts,
    /// Number of pages fetched at once (clamped to `1..=MAX_CONCURRENCY`).
    pub concurrency: usize,
    /// Maximum number of lookup requests before resolution gives up.
    pub max_lookups: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            timeouts: HttpTimeouts::default(),
            concurrency: DEFAULT_CONCURRENCY,
            max_lookups: DEFAULT_MAX_LOOKUPS,
        }
    }
}

impl RunSettings {
    /// Returns the concurrency clamped to the supported range.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_settings_defaults() {
        let settings = RunSettings::default();
        assert_eq!(settings.concurrency, 1);
        assert_eq!(settings.max_lookups, 10_000);
        assert_eq!(settings.timeouts.connect_secs, 10);
        assert_eq!(settings.timeouts.read_secs, 30);
    }

    #[test]
    fn test_effective_concurrency_clamped() {
        let mut settings = RunSettings::default();
        settings.concurrency = 0;
        assert_eq!(settings.effective_concurrency(), 1);
        settings.concurrency = 500;
        assert_eq!(settings.effective_concurrency(), MAX_CONCURRENCY);
    }
}
