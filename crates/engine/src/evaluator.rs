//! Roll candidate pricing, filtering, and ranking.
//!
//! Turns candidate quotes plus the current position into
//! profitability-filtered roll transactions. Only rolls that pay
//! (`net_credit > 0`) are ever surfaced; every ratio is guarded against a
//! zero or undefined denominator before any division happens.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use roll_scout_core::{OptionRight, Position, QuoteSnapshot, RollCandidate, RollKind};

/// Strikes within this distance count as the same strike.
fn same_strike_tolerance() -> Decimal {
    dec!(1)
}

/// Price and rank roll candidates for one position.
///
/// `buyback_cost` is the cost to close the current position. A caller
/// analyzing a position whose close price is unobtainable near expiry
/// passes zero explicitly — the documented assumption lives with the
/// caller, not here.
///
/// Candidates with no time left (`dte ≤ 0`) are excluded before any
/// annualization. Duplicate strikes (within $1) keep their first
/// occurrence, so a same-strike quote listed ahead of the delta scan wins.
/// Ranking: `capital_roi` descending, ties broken by `premium_efficiency`
/// descending.
pub fn evaluate_rolls(
    position: &Position,
    quotes: &[QuoteSnapshot],
    buyback_cost: Decimal,
) -> Vec<RollCandidate> {
    if position.strike <= Decimal::ZERO {
        // Nothing sane to measure capital ROI against.
        return Vec::new();
    }

    let mut candidates: Vec<RollCandidate> = Vec::new();

    for quote in quotes {
        if quote.dte <= 0 {
            continue;
        }
        if candidates
            .iter()
            .any(|c| (c.quote.strike - quote.strike).abs() < same_strike_tolerance())
        {
            continue;
        }

        let net_credit = quote.mark - buyback_cost;
        if net_credit <= Decimal::ZERO {
            continue;
        }

        let net_delta = match (quote.delta, position.current_delta) {
            (Some(new), Some(current)) => Some(new - current),
            _ => None,
        };

        let premium_efficiency = if quote.mark > Decimal::ZERO {
            Some(net_credit / quote.mark * dec!(100))
        } else {
            None
        };

        let capital_roi = net_credit / position.strike * dec!(100);
        let annualized_roi = capital_roi * dec!(365) / Decimal::from(quote.dte);

        candidates.push(RollCandidate {
            kind: classify(position.right, position.strike, quote.strike),
            quote: quote.clone(),
            net_credit,
            net_delta,
            premium_efficiency,
            capital_roi,
            annualized_roi,
        });
    }

    candidates.sort_by(rank);
    candidates
}

/// Relative strike movement for the position's side.
///
/// "Up" is the defensive direction — further out of the money: a higher
/// strike for a short call, a lower strike for a short put.
fn classify(right: OptionRight, current_strike: Decimal, candidate_strike: Decimal) -> RollKind {
    let diff = candidate_strike - current_strike;
    if diff.abs() < same_strike_tolerance() {
        return RollKind::SameStrike;
    }

    let defensive = match right {
        OptionRight::Call => diff > Decimal::ZERO,
        OptionRight::Put => diff < Decimal::ZERO,
    };

    if defensive {
        RollKind::RollUp(diff.abs())
    } else {
        RollKind::RollDown(diff.abs())
    }
}

fn rank(a: &RollCandidate, b: &RollCandidate) -> Ordering {
    b.capital_roi.cmp(&a.capital_roi).then_with(|| {
        let eff_a = a.premium_efficiency.unwrap_or(Decimal::MIN);
        let eff_b = b.premium_efficiency.unwrap_or(Decimal::MIN);
        eff_b.cmp(&eff_a)
    })
}
