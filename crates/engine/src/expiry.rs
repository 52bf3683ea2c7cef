//! Roll-expiry resolution.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use roll_scout_core::ExpiryWindow;

/// Pick the expiry to roll into.
///
/// The target date is the current expiry plus the configured forward
/// offset (default one week). Candidates must fall inside the DTE window
/// measured from `today` AND land on or after the target — we never roll
/// to an earlier date than the target. Among candidates, the one closest
/// to the target wins.
///
/// `None` means no listed expiry fits the window — a distinct, named
/// outcome for the caller, not a data-fetch failure.
pub fn resolve_roll_expiry(
    expiries: &[NaiveDate],
    current_expiry: NaiveDate,
    today: NaiveDate,
    window: &ExpiryWindow,
) -> Option<NaiveDate> {
    let target = current_expiry + Duration::days(window.roll_offset_days);

    let chosen = expiries
        .iter()
        .copied()
        .filter(|expiry| {
            let dte = (*expiry - today).num_days();
            dte >= window.min_dte && dte <= window.max_dte && *expiry >= target
        })
        .min_by_key(|expiry| (*expiry - target).num_days().abs());

    match chosen {
        Some(expiry) => debug!(%target, %expiry, "Resolved roll expiry"),
        None => debug!(
            %target,
            min_dte = window.min_dte,
            max_dte = window.max_dte,
            "No listed expiry fits the roll window"
        ),
    }

    chosen
}
