//! Per-position roll scan orchestration.
//!
//! Runs the full pipeline for one position: DTE gating → expiry
//! resolution → strike band sampling → delta matching (through the quote
//! cache) → roll evaluation. Every failure mode is a typed outcome so the
//! caller can keep scanning other positions; nothing here aborts a pass.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use roll_scout_core::{
    ChainProvider, MatcherConfig, MonitorConfig, Position, QuoteFetcher, QuoteKey, RollReport,
};

use crate::band::sample_strikes;
use crate::cache::QuoteCache;
use crate::expiry::resolve_roll_expiry;
use crate::matcher::{get_or_fetch, DeltaMatcher};

/// Result of scanning one position.
///
/// Only `Report` carries roll candidates; the other variants are named
/// non-results so "option about to expire, data naturally sparse" is never
/// conflated with "something is wrong with the pipeline".
#[derive(Debug)]
pub enum ScanOutcome {
    /// Ranked roll candidates ready for display.
    Report(RollReport),
    /// Position has more DTE than the alert threshold; nothing to do yet.
    NotDue { dte: i64 },
    /// Imminent expiry with no market data — expected, informational.
    SkippedExpiring { dte: i64 },
    /// No market data on a position that is not imminent — a data gap
    /// worth surfacing.
    MissingData { dte: i64 },
    /// No listed expiry fits the roll window.
    NoSuitableExpiry { dte: i64 },
    /// Chain scanned but nothing priced profitably.
    NoQuotes,
}

/// Scans positions for profitable rolls.
///
/// The cache is constructed by the orchestrating caller and passed by
/// reference — scanners never own hidden shared state.
pub struct RollScanner<'a, F: QuoteFetcher + ChainProvider + ?Sized> {
    cache: &'a QuoteCache,
    fetcher: &'a F,
    config: MonitorConfig,
}

impl<'a, F: QuoteFetcher + ChainProvider + ?Sized> RollScanner<'a, F> {
    pub fn new(cache: &'a QuoteCache, fetcher: &'a F, config: MonitorConfig) -> Self {
        Self {
            cache,
            fetcher,
            config,
        }
    }

    /// Run the full roll pipeline for one position.
    pub async fn scan_position(&self, position: &Position, today: NaiveDate) -> ScanOutcome {
        let dte = position.dte(today);

        if dte > self.config.scan.dte_alert_threshold {
            return ScanOutcome::NotDue { dte };
        }

        // Missing close price: expected noise on imminent expiries, a data
        // gap on anything else.
        let Some(buyback_cost) = position.current_mark else {
            return if dte <= self.config.scan.expiring_dte {
                info!(
                    position = %position.display_name(),
                    dte,
                    "No market data on imminent expiry — skipping"
                );
                ScanOutcome::SkippedExpiring { dte }
            } else {
                warn!(
                    position = %position.display_name(),
                    dte,
                    "No current market price — cannot evaluate rolls"
                );
                ScanOutcome::MissingData { dte }
            };
        };

        let spot = self.fetch_spot(&position.symbol).await;
        if spot.is_none() {
            warn!(symbol = %position.symbol, "No spot price — strike selection degraded");
        }

        let expiries = match self.fetcher.expiries(&position.symbol).await {
            Ok(expiries) => expiries,
            Err(error) => {
                warn!(symbol = %position.symbol, error = %error, "Expiry listing failed");
                Vec::new()
            }
        };
        let Some(target_expiry) =
            resolve_roll_expiry(&expiries, position.expiry, today, &self.config.expiry)
        else {
            return ScanOutcome::NoSuitableExpiry { dte };
        };

        // Same-strike roll first so it wins the evaluator's dedup, then
        // the banded delta scan.
        let mut quotes = Vec::new();
        let same_strike_key = QuoteKey::option(
            &position.symbol,
            target_expiry,
            position.strike,
            position.right,
        );
        if let Some(quote) =
            get_or_fetch(self.cache, self.fetcher, &same_strike_key, None).await
        {
            quotes.push(quote);
        }

        let strikes = match self.fetcher.strikes(&position.symbol, target_expiry).await {
            Ok(strikes) => strikes,
            Err(error) => {
                warn!(symbol = %position.symbol, error = %error, "Strike listing failed");
                Vec::new()
            }
        };

        let matcher_config = self.matcher_config_for(position);
        let sampled = sample_strikes(
            spot,
            matcher_config.target_delta,
            &strikes,
            self.config.scan.max_strike_samples,
        );
        debug!(
            symbol = %position.symbol,
            %target_expiry,
            listed = strikes.len(),
            sampled = sampled.len(),
            "Scanning strike band"
        );

        let matcher = DeltaMatcher::new(self.cache, self.fetcher, matcher_config);
        quotes.extend(
            matcher
                .scan(&position.symbol, target_expiry, position.right, &sampled)
                .await,
        );

        let candidates = crate::evaluator::evaluate_rolls(position, &quotes, buyback_cost);
        if candidates.is_empty() {
            return ScanOutcome::NoQuotes;
        }

        ScanOutcome::Report(RollReport {
            position: position.clone(),
            spot,
            buyback_cost,
            current_pnl: position.entry_credit - buyback_cost,
            target_expiry,
            candidates,
        })
    }

    /// The configured target delta carries the magnitude; the position's
    /// side fixes the sign (calls positive, puts negative).
    fn matcher_config_for(&self, position: &Position) -> MatcherConfig {
        let magnitude = self.config.matcher.target_delta.abs();
        let target_delta = match position.right {
            roll_scout_core::OptionRight::Call => magnitude,
            roll_scout_core::OptionRight::Put => -magnitude,
        };
        MatcherConfig {
            target_delta,
            ..self.config.matcher.clone()
        }
    }

    /// Spot price through the cache, with the shorter underlying TTL.
    async fn fetch_spot(&self, symbol: &str) -> Option<Decimal> {
        let key = QuoteKey::underlying(symbol);
        get_or_fetch(
            self.cache,
            self.fetcher,
            &key,
            Some(self.config.cache.underlying_ttl()),
        )
        .await
        .map(|snapshot| snapshot.mark)
    }
}
