//! Plain-text rendering of positions, roll reports, and pass summaries.

use chrono::{DateTime, Utc};

use roll_scout_core::{Position, RollReport};
use roll_scout_engine::ScanOutcome;

/// Counts accumulated over one scan pass for the closing summary line.
#[derive(Debug, Default)]
pub struct PassTally {
    pub reports: usize,
    pub skipped_expiring: usize,
    pub data_gaps: usize,
    pub not_due: usize,
    pub quiet: usize,
}

pub fn print_positions_summary(positions: &[Position], now: DateTime<Utc>, pass: u64) {
    println!("[{}] Check #{}", now.format("%Y-%m-%d %H:%M:%S UTC"), pass);
    println!("{}", "-".repeat(75));

    if positions.is_empty() {
        return;
    }

    println!("Short option positions:");
    for position in positions {
        let mark = position
            .current_mark
            .map(|mark| format!("{mark:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:<28} x{:<3} credit {:>7.2}  mark {:>7}",
            position.display_name(),
            position.contracts,
            position.entry_credit,
            mark,
        );
    }
    println!();
}

pub fn print_outcome(
    position: &Position,
    outcome: &ScanOutcome,
    dte_threshold: i64,
    tally: &mut PassTally,
) {
    match outcome {
        ScanOutcome::Report(report) => {
            print_roll_report(report);
            tally.reports += 1;
        }
        ScanOutcome::NotDue { dte } => {
            println!(
                "  {} ({dte} DTE) - not ready (DTE > {dte_threshold})",
                position.display_name()
            );
            tally.not_due += 1;
        }
        ScanOutcome::SkippedExpiring { dte } => {
            println!(
                "  {} ({dte} DTE) - skipped: expiring, no market data available",
                position.display_name()
            );
            tally.skipped_expiring += 1;
        }
        ScanOutcome::MissingData { dte } => {
            println!(
                "  {} ({dte} DTE) - WARNING: no current market price, cannot evaluate rolls",
                position.display_name()
            );
            tally.data_gaps += 1;
        }
        ScanOutcome::NoSuitableExpiry { dte } => {
            println!(
                "  {} ({dte} DTE) - no suitable expiry in the roll window",
                position.display_name()
            );
            tally.quiet += 1;
        }
        ScanOutcome::NoQuotes => {
            println!(
                "  {} - no profitable roll options right now",
                position.display_name()
            );
            tally.quiet += 1;
        }
    }
}

fn print_roll_report(report: &RollReport) {
    let position = &report.position;
    let spot = report
        .spot
        .map(|spot| format!("{spot:.2}"))
        .unwrap_or_else(|| "n/a".to_string());

    println!("  {} -> {}", position.display_name(), report.target_expiry);
    println!(
        "    spot {}  buyback {:.2}  open P&L {:+.2}",
        spot, report.buyback_cost, report.current_pnl
    );
    println!(
        "    {:<18} {:>8} {:>8} {:>8} {:>10} {:>8} {:>9} {:>9}",
        "Type", "Strike", "Mark", "Delta", "NetCredit", "NetΔ", "CapROI", "AnnROI"
    );

    for candidate in &report.candidates {
        let delta = candidate
            .quote
            .delta
            .map(|delta| format!("{delta:.3}"))
            .unwrap_or_else(|| "n/a".to_string());
        let net_delta = candidate
            .net_delta
            .map(|net| format!("{net:+.3}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "    {:<18} {:>8.2} {:>8.2} {:>8} {:>10.2} {:>8} {:>8.2}% {:>8.1}%",
            candidate.kind.to_string(),
            candidate.quote.strike,
            candidate.quote.mark,
            delta,
            candidate.net_credit,
            net_delta,
            candidate.capital_roi,
            candidate.annualized_roi,
        );
    }
    println!();
}

pub fn print_pass_summary(tally: &PassTally) {
    if tally.reports == 0 && tally.skipped_expiring == 0 && tally.data_gaps == 0 {
        println!("\n  No roll options at this time");
        return;
    }

    let mut parts = Vec::new();
    if tally.reports > 0 {
        parts.push(format!("{} roll option set(s) found", tally.reports));
    }
    if tally.skipped_expiring > 0 {
        parts.push(format!(
            "{} expiring position(s) skipped",
            tally.skipped_expiring
        ));
    }
    if tally.data_gaps > 0 {
        parts.push(format!("{} data gap(s)", tally.data_gaps));
    }
    println!("\n  Summary: {}", parts.join(", "));
}
