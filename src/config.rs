//! Connection settings and the process-wide default configuration.

use std::sync::{LazyLock, PoisonError, RwLock};
use std::time::Duration;

/// Default base URL of the Authsignal API.
pub const DEFAULT_API_URL: &str = "https://signal.authsignal.com/v1/";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry behavior for transport-level failures (connect errors, timeouts).
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub enabled: bool,
    /// Number of retries after the first attempt.
    pub max_retries: usize,
    /// Delay before the first retry.
    pub interval: Duration,
    /// Multiplier applied to the delay after every retry.
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            interval: Duration::from_millis(100),
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
        self.interval
            .saturating_mul(self.backoff_factor.saturating_pow(exponent))
    }

    /// Total attempts allowed, including the first one.
    pub fn attempts(&self) -> usize {
        if self.enabled {
            self.max_retries.saturating_add(1)
        } else {
            1
        }
    }
}

/// Settings read by every API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub api_secret_key: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Log requests and responses at `info` instead of `debug`.
    pub debug: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_secret_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            debug: false,
        }
    }
}

static GLOBAL: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Returns a snapshot of the process-wide configuration.
///
/// The instance is created with defaults on first access.
pub fn configuration() -> Configuration {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Mutates the process-wide configuration in place.
///
/// Clients created with [`crate::Client::new`] pick up the change on their next call.
pub fn setup<F>(f: F)
where
    F: FnOnce(&mut Configuration),
{
    let mut config = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    f(&mut config);
}

/// Returns the built-in defaults, ignoring any [`setup`] changes.
pub fn default_configuration() -> Configuration {
    Configuration::default()
}
