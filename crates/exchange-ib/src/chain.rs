//! Options chain queries — listed expiries and strikes.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::client::IbClient;

impl IbClient {
    /// All listed expiration dates for an underlying, ascending.
    pub async fn listed_expiries(&self, symbol: &str) -> Result<Vec<NaiveDate>> {
        debug!(symbol, "Requesting listed expiries");

        let _contract = ibapi::contracts::Contract::stock(symbol);

        // TODO: Request security definition option parameters via ibapi
        // and collect the expiration set, sorted ascending.

        Ok(Vec::new())
    }

    /// All listed strikes for one expiry, ascending.
    pub async fn listed_strikes(
        &self,
        symbol: &str,
        expiry: NaiveDate,
    ) -> Result<Vec<Decimal>> {
        debug!(symbol, %expiry, "Requesting listed strikes");

        // TODO: Filter the security definition option parameters to this
        // expiry and collect the strike set, sorted ascending.

        Ok(Vec::new())
    }
}
