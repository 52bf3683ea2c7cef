//! Quote-fetch capability over a live IB session.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use roll_scout_core::{
    ChainProvider, FetchError, OptionRight, QuoteFetcher, QuoteKey, QuoteRight, QuoteSnapshot,
};

use crate::client::IbClient;
use crate::market_data::{assemble_quote, safe_mark};

/// [`QuoteFetcher`] and [`ChainProvider`] backed by a connected client.
///
/// Owns the session; the engine only ever sees the capability traits, so
/// unit tests swap this for scripted fetchers.
pub struct IbQuoteFetcher {
    client: IbClient,
}

impl IbQuoteFetcher {
    pub fn new(client: IbClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &IbClient {
        &self.client
    }
}

#[async_trait]
impl QuoteFetcher for IbQuoteFetcher {
    async fn fetch_quote(&self, key: &QuoteKey) -> Result<Option<QuoteSnapshot>, FetchError> {
        if !self.client.is_connected() {
            return Err(FetchError::Disconnected);
        }

        match key.right {
            QuoteRight::Underlying => {
                let ticker = self
                    .client
                    .stock_ticker(&key.symbol)
                    .await
                    .map_err(|error| FetchError::Broker(error.to_string()))?;

                Ok(safe_mark(&ticker).map(|mark| QuoteSnapshot {
                    strike: Decimal::ZERO,
                    expiry: key.expiry,
                    bid: ticker.bid,
                    ask: ticker.ask,
                    mark,
                    delta: None,
                    gamma: None,
                    theta: None,
                    iv: None,
                    dte: 0,
                }))
            }
            QuoteRight::Call | QuoteRight::Put => {
                let right = match key.right {
                    QuoteRight::Put => OptionRight::Put,
                    _ => OptionRight::Call,
                };
                let ticker = self
                    .client
                    .option_ticker(&key.symbol, key.expiry, key.strike, right)
                    .await
                    .map_err(|error| FetchError::Broker(error.to_string()))?;

                Ok(assemble_quote(
                    &ticker,
                    key.strike,
                    key.expiry,
                    Utc::now().date_naive(),
                ))
            }
        }
    }
}

#[async_trait]
impl ChainProvider for IbQuoteFetcher {
    async fn expiries(&self, symbol: &str) -> Result<Vec<NaiveDate>, FetchError> {
        self.client
            .listed_expiries(symbol)
            .await
            .map_err(|error| FetchError::Broker(error.to_string()))
    }

    async fn strikes(
        &self,
        symbol: &str,
        expiry: NaiveDate,
    ) -> Result<Vec<Decimal>, FetchError> {
        self.client
            .listed_strikes(symbol, expiry)
            .await
            .map_err(|error| FetchError::Broker(error.to_string()))
    }
}
