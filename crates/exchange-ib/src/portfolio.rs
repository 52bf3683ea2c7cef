//! Portfolio queries — short option positions eligible for rolling.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use roll_scout_core::{OptionRight, Position, QuoteFetcher, QuoteKey, RetryPolicy};
use roll_scout_engine::fetch_with_retry;

use crate::client::IbClient;

/// One account position row as the broker reports it.
#[derive(Debug, Clone)]
pub struct RawPosition {
    pub symbol: String,
    /// Security type tag, e.g. "OPT" or "STK".
    pub security_type: String,
    pub right: Option<OptionRight>,
    pub strike: Decimal,
    pub expiry: Option<NaiveDate>,
    /// Signed contract count; short positions are negative.
    pub quantity: i64,
    /// Average cost as reported — per contract, multiplier included.
    pub avg_cost: Decimal,
}

/// Map raw account rows to the short option positions worth monitoring.
///
/// Keeps only short option legs; stock rows and long options are not roll
/// candidates. The entry credit is the reported average cost scaled back
/// to per-share terms (standard US equity multiplier of 100).
pub fn map_short_options(rows: &[RawPosition]) -> Vec<Position> {
    rows.iter()
        .filter_map(|row| {
            if row.security_type != "OPT" || row.quantity >= 0 {
                return None;
            }
            let right = row.right?;
            let expiry = row.expiry?;

            Some(Position {
                symbol: row.symbol.clone(),
                right,
                strike: row.strike,
                expiry,
                contracts: u32::try_from(row.quantity.unsigned_abs()).unwrap_or(u32::MAX),
                entry_credit: (row.avg_cost / Decimal::ONE_HUNDRED).abs(),
                current_mark: None,
                current_delta: None,
            })
        })
        .collect()
}

/// Refresh mark and delta on each position through the fetch capability.
///
/// Retries per `policy` — the model-greeks feed often needs a second
/// request before it populates. A position that stays dark keeps
/// `current_mark = None`; the scanner decides whether that is expected.
pub async fn refresh_position_quotes<F>(
    positions: &mut [Position],
    fetcher: &F,
    policy: &RetryPolicy,
) where
    F: QuoteFetcher + ?Sized,
{
    for position in positions.iter_mut() {
        let key = QuoteKey::option(
            &position.symbol,
            position.expiry,
            position.strike,
            position.right,
        );
        match fetch_with_retry(fetcher, &key, policy).await {
            Ok(Some(quote)) => {
                position.current_mark = Some(quote.mark);
                position.current_delta = quote.delta;
            }
            Ok(None) => {
                debug!(position = %position.display_name(), "No market data for position");
            }
            Err(error) => {
                warn!(
                    position = %position.display_name(),
                    error = %error,
                    "Position refresh failed"
                );
            }
        }
    }
}

impl IbClient {
    /// Fetch raw account position rows.
    pub async fn raw_positions(&self) -> Result<Vec<RawPosition>> {
        debug!("Requesting account positions");

        // TODO: Subscribe to ibapi positions() and collect rows until the
        // position-end marker arrives.

        Ok(Vec::new())
    }

    /// Short option positions, refreshed with current marks and deltas.
    pub async fn short_option_positions<F>(
        &self,
        fetcher: &F,
        policy: &RetryPolicy,
    ) -> Result<Vec<Position>>
    where
        F: QuoteFetcher + ?Sized,
    {
        let rows = self.raw_positions().await?;
        let mut positions = map_short_options(&rows);
        refresh_position_quotes(&mut positions, fetcher, policy).await;
        Ok(positions)
    }
}
