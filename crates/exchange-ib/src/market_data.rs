//! Market data — mark-price derivation and quote assembly.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use roll_scout_core::{OptionRight, QuoteSnapshot};

use crate::client::IbClient;

/// Raw ticker fields as the wire delivers them.
///
/// Any field can be missing or garbage depending on session, liquidity,
/// and how long the subscription has been alive.
#[derive(Debug, Clone, Default)]
pub struct TickerSnapshot {
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub last: Option<Decimal>,
    pub close: Option<Decimal>,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub iv: Option<f64>,
}

/// Derive a usable mark price from a raw ticker.
///
/// Bid/ask midpoint when both sides are sane (`0 < bid ≤ ask`), otherwise
/// the first positive value of bid, ask, last, close. `None` when nothing
/// on the ticker is positive.
pub fn safe_mark(ticker: &TickerSnapshot) -> Option<Decimal> {
    if let (Some(bid), Some(ask)) = (ticker.bid, ticker.ask) {
        if bid > Decimal::ZERO && bid <= ask {
            return Some((bid + ask) / Decimal::from(2));
        }
    }

    [ticker.bid, ticker.ask, ticker.last, ticker.close]
        .into_iter()
        .flatten()
        .find(|price| *price > Decimal::ZERO)
}

/// Assemble a [`QuoteSnapshot`] from a raw ticker.
///
/// `None` when no mark can be derived — the fetch contract treats a
/// markless ticker as "no usable data", not as a zero price.
pub fn assemble_quote(
    ticker: &TickerSnapshot,
    strike: Decimal,
    expiry: NaiveDate,
    today: NaiveDate,
) -> Option<QuoteSnapshot> {
    let mark = safe_mark(ticker)?;
    Some(QuoteSnapshot {
        strike,
        expiry,
        bid: ticker.bid,
        ask: ticker.ask,
        mark,
        delta: ticker.delta,
        gamma: ticker.gamma,
        theta: ticker.theta,
        iv: ticker.iv,
        dte: (expiry - today).num_days(),
    })
}

impl IbClient {
    /// Snapshot the raw ticker for one option contract.
    pub async fn option_ticker(
        &self,
        symbol: &str,
        expiry: NaiveDate,
        strike: Decimal,
        right: OptionRight,
    ) -> Result<TickerSnapshot> {
        debug!(symbol, %expiry, %strike, %right, "Requesting option market data");

        // TODO: Request a market data snapshot with generic tick 106 via
        // ibapi and map the model-greeks ticks into the snapshot fields.
        // Requires a live Gateway session to exercise.

        Ok(TickerSnapshot::default())
    }

    /// Snapshot the raw ticker for the underlying stock.
    pub async fn stock_ticker(&self, symbol: &str) -> Result<TickerSnapshot> {
        debug!(symbol, "Requesting stock market data");

        let _contract = ibapi::contracts::Contract::stock(symbol);

        // TODO: Request a snapshot quote via ibapi and fill
        // bid/ask/last/close from the tick stream.

        Ok(TickerSnapshot::default())
    }
}
