//! Retry wrapper for flaky upstream fetches.
//!
//! The IB data feed often needs a second request before greeks populate,
//! so position refreshes retry on both transport errors and empty data.
//! The schedule is an injectable [`RetryPolicy`] — tests substitute
//! [`RetryPolicy::none`] and never sleep. Never used inside a
//! `DeltaMatcher` scan, which must not refetch a strike.

use tracing::debug;

use roll_scout_core::{FetchError, QuoteFetcher, QuoteKey, QuoteSnapshot, RetryPolicy};

/// Fetch a quote, retrying per `policy`.
///
/// Returns the first successful snapshot; otherwise the last transport
/// error, or `Ok(None)` when every attempt answered but had no usable
/// data.
pub async fn fetch_with_retry<F>(
    fetcher: &F,
    key: &QuoteKey,
    policy: &RetryPolicy,
) -> Result<Option<QuoteSnapshot>, FetchError>
where
    F: QuoteFetcher + ?Sized,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_error: Option<FetchError> = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            tokio::time::sleep(policy.delay_for(attempt - 1)).await;
        }

        match fetcher.fetch_quote(key).await {
            Ok(Some(snapshot)) => return Ok(Some(snapshot)),
            Ok(None) => {
                last_error = None;
                debug!(key = %key, attempt, "No usable data yet");
            }
            Err(error) => {
                debug!(key = %key, attempt, error = %error, "Fetch attempt failed");
                last_error = Some(error);
            }
        }
    }

    match last_error {
        Some(error) => Err(error),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn key() -> QuoteKey {
        QuoteKey::option(
            "NVDA",
            NaiveDate::from_ymd_opt(2025, 11, 21).unwrap(),
            dec!(140),
            roll_scout_core::OptionRight::Call,
        )
    }

    fn snapshot() -> QuoteSnapshot {
        QuoteSnapshot {
            strike: dec!(140),
            expiry: NaiveDate::from_ymd_opt(2025, 11, 21).unwrap(),
            bid: None,
            ask: None,
            mark: dec!(2.50),
            delta: Some(0.12),
            gamma: None,
            theta: None,
            iv: None,
            dte: 35,
        }
    }

    /// Succeeds only from the nth call onward.
    struct FlakyFetcher {
        calls: AtomicU32,
        succeed_after: u32,
        error_mode: bool,
    }

    #[async_trait]
    impl QuoteFetcher for FlakyFetcher {
        async fn fetch_quote(
            &self,
            _key: &QuoteKey,
        ) -> Result<Option<QuoteSnapshot>, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.succeed_after {
                Ok(Some(snapshot()))
            } else if self.error_mode {
                Err(FetchError::Disconnected)
            } else {
                Ok(None)
            }
        }
    }

    fn zero_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay_ms: 0,
            step_ms: 0,
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_errors() {
        let fetcher = FlakyFetcher {
            calls: AtomicU32::new(0),
            succeed_after: 2,
            error_mode: true,
        };

        let result = fetch_with_retry(&fetcher, &key(), &zero_delay(3)).await;
        assert!(result.unwrap().is_some());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_attempts_surface_the_last_error() {
        let fetcher = FlakyFetcher {
            calls: AtomicU32::new(0),
            succeed_after: 10,
            error_mode: true,
        };

        let result = fetch_with_retry(&fetcher, &key(), &zero_delay(2)).await;
        assert!(matches!(result, Err(FetchError::Disconnected)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persistent_empty_data_is_not_an_error() {
        let fetcher = FlakyFetcher {
            calls: AtomicU32::new(0),
            succeed_after: 10,
            error_mode: false,
        };

        let result = fetch_with_retry(&fetcher, &key(), &zero_delay(3)).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn none_policy_tries_exactly_once() {
        let fetcher = FlakyFetcher {
            calls: AtomicU32::new(0),
            succeed_after: 1,
            error_mode: false,
        };

        let result = fetch_with_retry(&fetcher, &key(), &RetryPolicy::none()).await;
        assert!(matches!(result, Ok(None)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }
}
