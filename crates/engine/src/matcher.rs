//! Delta-proximity quote matching with early exit.
//!
//! Visits sampled strikes in band order, pulling each quote through the
//! cache and stopping the moment enough quotes land inside the delta
//! tolerance window. Every strike not fetched is an expensive upstream
//! round trip saved, which makes the early exit the primary latency lever
//! of the whole scan.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use roll_scout_core::{MatcherConfig, OptionRight, QuoteFetcher, QuoteKey, QuoteSnapshot};

use crate::cache::QuoteCache;

/// Cache-first quote lookup; a successful live fetch populates the cache.
///
/// Transport errors are logged and mapped to `None` — one bad strike never
/// aborts a scan. Pass a TTL to override the cache default (used for
/// underlying prices, which live shorter than option quotes).
pub(crate) async fn get_or_fetch<F>(
    cache: &QuoteCache,
    fetcher: &F,
    key: &QuoteKey,
    ttl: Option<Duration>,
) -> Option<QuoteSnapshot>
where
    F: QuoteFetcher + ?Sized,
{
    if let Some(snapshot) = cache.get(key) {
        return Some(snapshot);
    }

    match fetcher.fetch_quote(key).await {
        Ok(Some(snapshot)) => {
            match ttl {
                Some(ttl) => cache.put_with_ttl(key.clone(), snapshot.clone(), ttl),
                None => cache.put(key.clone(), snapshot.clone()),
            }
            Some(snapshot)
        }
        Ok(None) => None,
        Err(error) => {
            warn!(key = %key, error = %error, "Quote fetch failed — skipping");
            None
        }
    }
}

/// Scans sampled strikes for quotes near a target delta.
pub struct DeltaMatcher<'a, F: QuoteFetcher + ?Sized> {
    cache: &'a QuoteCache,
    fetcher: &'a F,
    config: MatcherConfig,
}

impl<'a, F: QuoteFetcher + ?Sized> DeltaMatcher<'a, F> {
    pub fn new(cache: &'a QuoteCache, fetcher: &'a F, config: MatcherConfig) -> Self {
        Self {
            cache,
            fetcher,
            config,
        }
    }

    /// Visit `strikes` in the given order and collect quotes near the
    /// configured target delta.
    ///
    /// Strikes whose quote has no usable delta are skipped silently and
    /// not retried within this scan. The walk terminates as soon as
    /// `good_match_threshold` quotes sit inside the tolerance window; the
    /// remaining strikes are never fetched. Returns up to `max_results`
    /// quotes sorted by ascending distance to the target. No key is
    /// fetched twice within one scan.
    ///
    /// An empty result is a valid outcome, not an error.
    pub async fn scan(
        &self,
        symbol: &str,
        expiry: NaiveDate,
        right: OptionRight,
        strikes: &[Decimal],
    ) -> Vec<QuoteSnapshot> {
        let target = self.config.target_delta;
        let mut quotes: Vec<QuoteSnapshot> = Vec::new();
        let mut good_matches = 0usize;
        let mut visited: HashSet<Decimal> = HashSet::new();

        for &strike in strikes {
            if good_matches >= self.config.good_match_threshold {
                debug!(
                    good_matches,
                    fetched = visited.len(),
                    remaining = strikes.len() - visited.len(),
                    "Early exit — enough good matches"
                );
                break;
            }
            if !visited.insert(strike) {
                continue;
            }

            let key = QuoteKey::option(symbol, expiry, strike, right);
            let Some(quote) = get_or_fetch(self.cache, self.fetcher, &key, None).await else {
                continue;
            };
            let Some(delta) = quote.delta else {
                // Greeks never populated — skip, don't retry this pass.
                continue;
            };

            if (delta - target).abs() <= self.config.delta_tolerance {
                good_matches += 1;
            }
            quotes.push(quote);
        }

        quotes.sort_by(|a, b| delta_distance(a, target)
            .partial_cmp(&delta_distance(b, target))
            .unwrap_or(Ordering::Equal));
        quotes.truncate(self.config.max_results);
        quotes
    }
}

fn delta_distance(quote: &QuoteSnapshot, target: f64) -> f64 {
    match quote.delta {
        Some(delta) => (delta - target).abs(),
        None => f64::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use roll_scout_core::FetchError;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn expiry() -> NaiveDate {
        "2025-11-21".parse().unwrap()
    }

    fn quote(strike: i64, delta: Option<f64>) -> QuoteSnapshot {
        QuoteSnapshot {
            strike: Decimal::from(strike),
            expiry: expiry(),
            bid: Some(dec!(0.90)),
            ask: Some(dec!(1.10)),
            mark: dec!(1.00),
            delta,
            gamma: None,
            theta: None,
            iv: Some(0.35),
            dte: 35,
        }
    }

    /// Deterministic fetch source that records every issued fetch.
    struct ScriptedFetcher {
        quotes: HashMap<Decimal, QuoteSnapshot>,
        failing: Vec<Decimal>,
        fetches: Mutex<Vec<QuoteKey>>,
    }

    impl ScriptedFetcher {
        fn new(quotes: Vec<QuoteSnapshot>) -> Self {
            Self {
                quotes: quotes.into_iter().map(|q| (q.strike, q)).collect(),
                failing: Vec::new(),
                fetches: Mutex::new(Vec::new()),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl QuoteFetcher for ScriptedFetcher {
        async fn fetch_quote(
            &self,
            key: &QuoteKey,
        ) -> Result<Option<QuoteSnapshot>, FetchError> {
            self.fetches.lock().unwrap().push(key.clone());
            if self.failing.contains(&key.strike) {
                return Err(FetchError::Timeout(2500));
            }
            Ok(self.quotes.get(&key.strike).cloned())
        }
    }

    fn config() -> MatcherConfig {
        MatcherConfig {
            target_delta: 0.10,
            delta_tolerance: 0.05,
            good_match_threshold: 8,
            max_results: 5,
        }
    }

    fn strikes(range: std::ops::RangeInclusive<i64>) -> Vec<Decimal> {
        range.map(Decimal::from).collect()
    }

    #[tokio::test]
    async fn early_exit_caps_upstream_fetches() {
        // 20 sampled strikes; 8 of the first 10 carry deltas inside
        // [0.05, 0.15] (two have no greeks). With a good-match threshold
        // of 8 the scan must stop within the first 10 fetches — never
        // walk all 20.
        let quotes: Vec<QuoteSnapshot> = (1..=20)
            .map(|strike| {
                let delta = if strike == 3 || strike == 7 {
                    None
                } else {
                    Some(0.05 + 0.005 * strike as f64)
                };
                quote(strike, delta)
            })
            .collect();
        let fetcher = ScriptedFetcher::new(quotes);
        let cache = QuoteCache::default();
        let matcher = DeltaMatcher::new(&cache, &fetcher, config());

        let result = matcher
            .scan("NVDA", expiry(), OptionRight::Call, &strikes(1..=20))
            .await;

        assert!(fetcher.fetch_count() <= 10, "fetched {}", fetcher.fetch_count());
        assert_eq!(result.len(), 5);
    }

    #[tokio::test]
    async fn quotes_without_delta_are_skipped_silently() {
        let quotes = vec![
            quote(100, None),
            quote(105, Some(0.12)),
            quote(110, Some(0.09)),
        ];
        let fetcher = ScriptedFetcher::new(quotes);
        let cache = QuoteCache::default();
        let matcher = DeltaMatcher::new(&cache, &fetcher, config());

        let result = matcher
            .scan("NVDA", expiry(), OptionRight::Call, &strikes(100..=110))
            .await;

        assert!(result.iter().all(|q| q.delta.is_some()));
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn results_are_sorted_by_distance_and_truncated() {
        let quotes = vec![
            quote(100, Some(0.30)),
            quote(110, Some(0.12)),
            quote(120, Some(0.10)),
            quote(130, Some(0.07)),
            quote(140, Some(0.22)),
            quote(150, Some(0.16)),
            quote(160, Some(0.11)),
        ];
        let fetcher = ScriptedFetcher::new(quotes);
        let cache = QuoteCache::default();
        let matcher = DeltaMatcher::new(&cache, &fetcher, config());

        let result = matcher
            .scan(
                "NVDA",
                expiry(),
                OptionRight::Call,
                &[
                    dec!(100),
                    dec!(110),
                    dec!(120),
                    dec!(130),
                    dec!(140),
                    dec!(150),
                    dec!(160),
                ],
            )
            .await;

        assert_eq!(result.len(), 5);
        assert_eq!(result[0].strike, dec!(120)); // exact target
        let distances: Vec<f64> = result
            .iter()
            .map(|q| (q.delta.unwrap() - 0.10).abs())
            .collect();
        assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[tokio::test]
    async fn second_scan_is_served_from_cache() {
        let quotes = vec![quote(105, Some(0.11)), quote(110, Some(0.09))];
        let fetcher = ScriptedFetcher::new(quotes);
        let cache = QuoteCache::default();
        let matcher = DeltaMatcher::new(&cache, &fetcher, config());
        let sampled = [dec!(105), dec!(110)];

        matcher
            .scan("NVDA", expiry(), OptionRight::Call, &sampled)
            .await;
        let after_first = fetcher.fetch_count();
        matcher
            .scan("NVDA", expiry(), OptionRight::Call, &sampled)
            .await;

        assert_eq!(fetcher.fetch_count(), after_first);
    }

    #[tokio::test]
    async fn transport_error_skips_the_strike_and_continues() {
        let mut fetcher = ScriptedFetcher::new(vec![quote(110, Some(0.10))]);
        fetcher.failing.push(dec!(105));
        let cache = QuoteCache::default();
        let matcher = DeltaMatcher::new(&cache, &fetcher, config());

        let result = matcher
            .scan(
                "NVDA",
                expiry(),
                OptionRight::Call,
                &[dec!(105), dec!(110)],
            )
            .await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].strike, dec!(110));
    }

    #[tokio::test]
    async fn duplicate_strikes_fetch_once_per_scan() {
        // A fetch that returns no data must not be reissued for a repeated
        // strike within the same scan.
        let fetcher = ScriptedFetcher::new(Vec::new());
        let cache = QuoteCache::default();
        let matcher = DeltaMatcher::new(&cache, &fetcher, config());

        matcher
            .scan(
                "NVDA",
                expiry(),
                OptionRight::Call,
                &[dec!(105), dec!(105), dec!(105)],
            )
            .await;

        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn empty_chain_yields_empty_result() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let cache = QuoteCache::default();
        let matcher = DeltaMatcher::new(&cache, &fetcher, config());

        let result = matcher
            .scan("NVDA", expiry(), OptionRight::Call, &[])
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn put_targets_match_negative_deltas() {
        let quotes = vec![quote(90, Some(-0.11)), quote(80, Some(-0.30))];
        let fetcher = ScriptedFetcher::new(quotes);
        let cache = QuoteCache::default();
        let put_config = MatcherConfig {
            target_delta: -0.10,
            ..config()
        };
        let matcher = DeltaMatcher::new(&cache, &fetcher, put_config);

        let result = matcher
            .scan("NVDA", expiry(), OptionRight::Put, &[dec!(80), dec!(90)])
            .await;

        assert_eq!(result[0].strike, dec!(90));
    }
}
