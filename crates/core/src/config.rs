//! Monitor configuration.
//!
//! Every section has serde defaults so a partial `Config.toml` (or no file
//! at all) still yields a runnable configuration. CLI flags override the
//! loaded values in the binary.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the roll scout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub connection: ConnectionConfig,
    pub scan: ScanConfig,
    pub matcher: MatcherConfig,
    pub expiry: ExpiryWindow,
    pub cache: CacheConfig,
    pub retry: RetryPolicy,
}

/// IB Gateway/TWS connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Gateway/TWS host (use 127.0.0.1, not localhost — TWS may block IPv6).
    pub host: String,
    /// 7496 = TWS live, 7497 = TWS paper.
    pub port: u16,
    /// Client ID (unique per connection).
    pub client_id: i32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7496,
            client_id: 2,
        }
    }
}

/// Per-position scan thresholds and loop cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Positions with more DTE than this are not analyzed yet.
    pub dte_alert_threshold: i64,
    /// At or below this DTE, missing market data is expected, not an error.
    pub expiring_dte: i64,
    /// Polling interval in seconds.
    pub check_interval_secs: u64,
    /// Maximum strikes sampled from the band per scan.
    pub max_strike_samples: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            dte_alert_threshold: 14,
            expiring_dte: 2,
            check_interval_secs: 300,
            max_strike_samples: 20,
        }
    }
}

/// Delta-matching parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Signed target delta; positive selects calls, negative selects puts.
    pub target_delta: f64,
    /// Symmetric acceptance window around the target.
    pub delta_tolerance: f64,
    /// Stop fetching once this many quotes land inside the window.
    pub good_match_threshold: usize,
    /// At most this many quotes are returned, closest-first.
    pub max_results: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            target_delta: 0.10,
            delta_tolerance: 0.05,
            good_match_threshold: 8,
            max_results: 5,
        }
    }
}

/// Roll-expiry selection window.
///
/// The source history cites both 30–45 and 30–60 day windows; both bounds
/// are plain config fields so either policy is reachable without a code
/// change. Defaults follow the 30–45 variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryWindow {
    /// Target the expiry this many days past the current one.
    pub roll_offset_days: i64,
    pub min_dte: i64,
    pub max_dte: i64,
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        Self {
            roll_offset_days: 7,
            min_dte: 30,
            max_dte: 45,
        }
    }
}

/// Quote cache TTLs, in seconds.
///
/// Underlying prices move faster than a scan does, so they get a shorter
/// lifetime than option quotes within the same store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub quote_ttl_secs: u64,
    pub underlying_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            quote_ttl_secs: 60,
            underlying_ttl_secs: 30,
        }
    }
}

impl CacheConfig {
    pub fn quote_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_ttl_secs)
    }

    pub fn underlying_ttl(&self) -> Duration {
        Duration::from_secs(self.underlying_ttl_secs)
    }
}

/// Retry schedule for flaky upstream fetches.
///
/// Delays grow linearly: `initial_delay_ms + attempt * step_ms`. Tests
/// substitute [`RetryPolicy::none`] to run without sleeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub step_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            step_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, zero delay.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 0,
            step_ms: 0,
        }
    }

    /// Delay to wait after the given zero-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.initial_delay_ms + u64::from(attempt) * self.step_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MonitorConfig::default();

        assert_eq!(config.connection.port, 7496);
        assert_eq!(config.scan.dte_alert_threshold, 14);
        assert!((config.matcher.target_delta - 0.10).abs() < f64::EPSILON);
        assert_eq!(config.matcher.good_match_threshold, 8);
        assert_eq!(config.expiry.min_dte, 30);
        assert_eq!(config.expiry.max_dte, 45);
        assert_eq!(config.cache.quote_ttl_secs, 60);
        assert_eq!(config.cache.underlying_ttl_secs, 30);
    }

    #[test]
    fn retry_delays_grow_linearly() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 1000,
            step_ms: 500,
        };

        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
    }

    #[test]
    fn none_policy_never_sleeps() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay_for(0), Duration::ZERO);
    }

    #[test]
    fn partial_overrides_keep_the_other_defaults() {
        let config: MonitorConfig = figment::Figment::new()
            .merge(figment::providers::Serialized::defaults(
                MonitorConfig::default(),
            ))
            .merge(figment::providers::Serialized::default(
                "matcher.target_delta",
                0.15,
            ))
            .extract()
            .unwrap();

        assert!((config.matcher.target_delta - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.matcher.good_match_threshold, 8);
    }
}
