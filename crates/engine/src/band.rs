//! Strike band selection and sampling.
//!
//! An option chain can list hundreds of strikes; fetching a quote for each
//! is far too slow against a rate-limited upstream. The target delta tells
//! us roughly where matching strikes live relative to spot, so we only
//! sample a bounded band around that region.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Below this |delta| the target lives deep out of the money.
const DEEP_OTM_DELTA: f64 = 0.15;
/// At or above this |delta| the target is near the money.
const NEAR_ATM_DELTA: f64 = 0.35;

/// Inclusive strike range to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrikeBand {
    pub low: Decimal,
    pub high: Decimal,
}

impl StrikeBand {
    pub fn contains(&self, strike: Decimal) -> bool {
        self.low <= strike && strike <= self.high
    }
}

/// Compute the strike band for a signed target delta.
///
/// Positive targets are calls, negative are puts. Band offsets are
/// fractions of spot keyed on |delta|: near the money the band hugs spot;
/// deep out of the money it is shifted entirely to the OTM side — above
/// spot for calls, below for puts — so the scan never wastes fetches on
/// strikes that cannot carry the target delta.
pub fn strike_band(spot: Decimal, target_delta: f64) -> StrikeBand {
    let magnitude = target_delta.abs();
    let is_call = target_delta >= 0.0;

    let (low_frac, high_frac) = if magnitude < DEEP_OTM_DELTA {
        if is_call {
            (dec!(1.05), dec!(1.60))
        } else {
            (dec!(0.40), dec!(0.95))
        }
    } else if magnitude < NEAR_ATM_DELTA {
        if is_call {
            (dec!(0.90), dec!(1.35))
        } else {
            (dec!(0.65), dec!(1.10))
        }
    } else {
        (dec!(0.85), dec!(1.15))
    };

    StrikeBand {
        low: spot * low_frac,
        high: spot * high_frac,
    }
}

/// Pick at most `max_samples` candidate strikes for the scan.
///
/// With a spot price: strikes inside the computed band, selected at an
/// even stride when the band holds more than the budget — never a prefix
/// slice, which would cluster every sample at one edge of the band.
/// Without a spot price (rare during market hours) the selection degrades
/// to the first listed strikes.
///
/// `strikes` must be in ascending order; the output preserves that order.
pub fn sample_strikes(
    spot: Option<Decimal>,
    target_delta: f64,
    strikes: &[Decimal],
    max_samples: usize,
) -> Vec<Decimal> {
    if max_samples == 0 {
        return Vec::new();
    }

    let Some(spot) = spot else {
        return strikes.iter().copied().take(max_samples).collect();
    };

    let band = strike_band(spot, target_delta);
    let in_band: Vec<Decimal> = strikes
        .iter()
        .copied()
        .filter(|strike| band.contains(*strike))
        .collect();

    if in_band.len() <= max_samples {
        return in_band;
    }

    let stride = in_band.len() / max_samples;
    in_band
        .into_iter()
        .step_by(stride)
        .take(max_samples)
        .collect()
}
