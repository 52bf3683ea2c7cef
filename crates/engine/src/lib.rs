//! Quote caching, strike selection, and roll evaluation.
//!
//! The pipeline for one position:
//! expiry resolution → strike band sampling → delta matching (consulting
//! the quote cache) → roll evaluation → ranked report. Everything here is
//! deterministic given a deterministic fetch source; the only suspension
//! point is the injected quote-fetch capability.

pub mod band;
pub mod cache;
pub mod evaluator;
pub mod expiry;
pub mod matcher;
pub mod retry;
pub mod scanner;

pub use band::{sample_strikes, strike_band, StrikeBand};
pub use cache::{CacheStats, QuoteCache};
pub use evaluator::evaluate_rolls;
pub use expiry::resolve_roll_expiry;
pub use matcher::DeltaMatcher;
pub use retry::fetch_with_retry;
pub use scanner::{RollScanner, ScanOutcome};
