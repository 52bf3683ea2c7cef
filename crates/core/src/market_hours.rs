//! US equity market-hours gating.
//!
//! Regular session only (9:30–16:00 US/Eastern, weekdays). Exchange
//! holidays are not modeled; the monitor just wastes one quiet pass on
//! those days.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::US::Eastern;

const OPEN_MINUTE: u32 = 9 * 60 + 30;
const CLOSE_MINUTE: u32 = 16 * 60;

/// Where the clock currently falls relative to the regular session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketState {
    Open,
    Weekend,
    PreMarket,
    AfterHours,
}

impl MarketState {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl std::fmt::Display for MarketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Market open"),
            Self::Weekend => write!(f, "Weekend"),
            Self::PreMarket => write!(f, "Pre-market (opens 9:30 AM ET)"),
            Self::AfterHours => write!(f, "After-hours (opens 9:30 AM ET next weekday)"),
        }
    }
}

/// Classify an instant against the regular US session.
pub fn market_state(now: DateTime<Utc>) -> MarketState {
    let local = now.with_timezone(&Eastern);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return MarketState::Weekend;
    }

    let minute_of_day = local.hour() * 60 + local.minute();
    if minute_of_day < OPEN_MINUTE {
        MarketState::PreMarket
    } else if minute_of_day >= CLOSE_MINUTE {
        MarketState::AfterHours
    } else {
        MarketState::Open
    }
}

pub fn is_market_open(now: DateTime<Utc>) -> bool {
    market_state(now).is_open()
}
