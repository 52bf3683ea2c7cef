//! Core types for option quotes, positions, and roll candidates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

/// What a cached snapshot refers to: an option leg, or the underlying itself.
///
/// `Underlying` is the synthetic marker for cached spot prices, so stock and
/// option quotes share one store with heterogeneous TTLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteRight {
    Call,
    Put,
    Underlying,
}

impl From<OptionRight> for QuoteRight {
    fn from(right: OptionRight) -> Self {
        match right {
            OptionRight::Call => Self::Call,
            OptionRight::Put => Self::Put,
        }
    }
}

impl std::fmt::Display for QuoteRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
            Self::Underlying => write!(f, "U"),
        }
    }
}

/// Composable cache/fetch key: `(symbol, expiry, strike, right)`.
///
/// Underlying-price lookups use [`QuoteKey::underlying`], which pins the
/// expiry to `NaiveDate::MIN` and the strike to zero so the key stays a
/// plain tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteKey {
    pub symbol: String,
    pub expiry: NaiveDate,
    pub strike: Decimal,
    pub right: QuoteRight,
}

impl QuoteKey {
    /// Key for a single option leg.
    pub fn option(symbol: &str, expiry: NaiveDate, strike: Decimal, right: OptionRight) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            expiry,
            strike,
            right: right.into(),
        }
    }

    /// Key for the underlying's spot price.
    pub fn underlying(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            expiry: NaiveDate::MIN,
            strike: Decimal::ZERO,
            right: QuoteRight::Underlying,
        }
    }
}

impl std::fmt::Display for QuoteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.symbol, self.expiry, self.strike, self.right
        )
    }
}

/// One quote snapshot as returned by the fetch collaborator.
///
/// A usable mark price is required for a snapshot to exist at all — fetchers
/// return `Ok(None)` when no mark can be derived. Greeks may be absent when
/// the model feed has not populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub mark: Decimal,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub iv: Option<f64>,
    /// Days to expiration at fetch time.
    pub dte: i64,
}

/// A short option position eligible for rolling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub right: OptionRight,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub contracts: u32,
    /// Credit received per contract when the position was opened.
    pub entry_credit: Decimal,
    pub current_mark: Option<Decimal>,
    pub current_delta: Option<f64>,
}

impl Position {
    /// Days until expiration relative to `today`.
    pub fn dte(&self, today: NaiveDate) -> i64 {
        (self.expiry - today).num_days()
    }

    /// Human-readable description (e.g., "NVDA 140C 2026-03-20").
    pub fn display_name(&self) -> String {
        format!(
            "{} {}{} {}",
            self.symbol, self.strike, self.right, self.expiry
        )
    }
}

/// How a roll candidate moves the strike relative to the current position.
///
/// "Up" always means further out of the money for the position's side: a
/// higher strike for a short call, a lower strike for a short put. Read
/// `RollUp` as "less assignment risk". The payload is the absolute dollar
/// distance between the two strikes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollKind {
    SameStrike,
    RollUp(Decimal),
    RollDown(Decimal),
}

impl std::fmt::Display for RollKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SameStrike => write!(f, "Same Strike"),
            Self::RollUp(offset) => write!(f, "Roll Up (+${offset:.0})"),
            Self::RollDown(offset) => write!(f, "Roll Down (-${offset:.0})"),
        }
    }
}

/// One profitable roll transaction, fully priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollCandidate {
    pub kind: RollKind,
    pub quote: QuoteSnapshot,
    /// New premium minus the cost to close the current position.
    pub net_credit: Decimal,
    pub net_delta: Option<f64>,
    /// Fraction of the new premium retained, in percent. `None` when the
    /// new premium is zero.
    pub premium_efficiency: Option<Decimal>,
    /// Net credit over the *current* strike, in percent. The denominator is
    /// constant across all candidates of one position so they compare.
    pub capital_roi: Decimal,
    pub annualized_roi: Decimal,
}

/// Output surface for one position: the ordered candidates plus the
/// originating position summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollReport {
    pub position: Position,
    pub spot: Option<Decimal>,
    pub buyback_cost: Decimal,
    pub current_pnl: Decimal,
    pub target_expiry: NaiveDate,
    pub candidates: Vec<RollCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn position_dte_counts_calendar_days() {
        let pos = Position {
            symbol: "NVDA".to_string(),
            right: OptionRight::Call,
            strike: dec!(140),
            expiry: d("2025-10-17"),
            contracts: 2,
            entry_credit: dec!(3.50),
            current_mark: Some(dec!(1.20)),
            current_delta: Some(-0.18),
        };
        assert_eq!(pos.dte(d("2025-10-03")), 14);
        assert_eq!(pos.dte(d("2025-10-17")), 0);
        assert_eq!(pos.dte(d("2025-10-20")), -3);
    }

    #[test]
    fn option_and_underlying_keys_do_not_collide() {
        let opt = QuoteKey::option("nvda", d("2025-10-17"), dec!(140), OptionRight::Call);
        let spot = QuoteKey::underlying("nvda");

        assert_eq!(opt.symbol, "NVDA");
        assert_eq!(spot.symbol, "NVDA");
        assert_ne!(opt, spot);
        assert_eq!(spot.right, QuoteRight::Underlying);
        assert_eq!(spot.strike, Decimal::ZERO);
    }

    #[test]
    fn equal_keys_hash_equal() {
        use std::collections::HashSet;

        let a = QuoteKey::option("TSLA", d("2025-11-21"), dec!(320), OptionRight::Put);
        let b = QuoteKey::option("TSLA", d("2025-11-21"), dec!(320), OptionRight::Put);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn roll_kind_labels_encode_strike_distance() {
        assert_eq!(RollKind::SameStrike.to_string(), "Same Strike");
        assert_eq!(RollKind::RollUp(dec!(50)).to_string(), "Roll Up (+$50)");
        assert_eq!(
            RollKind::RollDown(dec!(25)).to_string(),
            "Roll Down (-$25)"
        );
    }
}
