//! Core types, capability traits, and configuration for the roll scout.
//!
//! Everything here is broker-agnostic: the IB adapter and the roll engine
//! both depend on this crate and nothing else in the workspace.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod market_hours;
pub mod traits;
pub mod types;

pub use config::{
    CacheConfig, ConnectionConfig, ExpiryWindow, MatcherConfig, MonitorConfig, RetryPolicy,
    ScanConfig,
};
pub use config_loader::ConfigLoader;
pub use error::FetchError;
pub use market_hours::{is_market_open, market_state, MarketState};
pub use traits::{ChainProvider, QuoteFetcher};
pub use types::{
    OptionRight, Position, QuoteKey, QuoteRight, QuoteSnapshot, RollCandidate, RollKind,
    RollReport,
};
