//! Capability seams for market data access.
//!
//! The engine is written against these traits so it can be unit-tested with
//! synthetic, deterministic fetchers — no network dependency.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::FetchError;
use crate::types::{QuoteKey, QuoteSnapshot};

/// Single-method quote-fetch capability.
///
/// Potentially slow (seconds) and rate-limited upstream. `Ok(None)` means
/// the upstream had no usable data for the key; callers skip those keys
/// rather than treating them as failures.
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    async fn fetch_quote(&self, key: &QuoteKey) -> Result<Option<QuoteSnapshot>, FetchError>;
}

/// Option-chain discovery: which expiries and strikes are listed.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// All listed expiration dates for the underlying, ascending.
    async fn expiries(&self, symbol: &str) -> Result<Vec<NaiveDate>, FetchError>;

    /// All listed strikes for one expiry, ascending.
    async fn strikes(&self, symbol: &str, expiry: NaiveDate)
        -> Result<Vec<Decimal>, FetchError>;
}
