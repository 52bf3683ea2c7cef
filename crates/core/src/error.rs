//! Error taxonomy for the quote-fetch boundary.

use thiserror::Error;

/// Transport-level failure from the quote-fetch collaborator.
///
/// "No usable data" is not an error: fetchers return `Ok(None)` for quotes
/// the upstream cannot price. These variants cover the cases where the
/// request itself failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Broker session dropped mid-request.
    #[error("broker session disconnected")]
    Disconnected,

    /// Upstream did not answer within the collaborator's own timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Any other broker-side failure.
    #[error("broker error: {0}")]
    Broker(String),
}
