//! IB Gateway/TWS client connection management.

use anyhow::{Context, Result};
use tracing::info;

use roll_scout_core::ConnectionConfig;

/// Wrapper around `ibapi::Client` with convenience accessors.
pub struct IbClient {
    config: ConnectionConfig,
    client: ibapi::Client,
}

impl IbClient {
    /// Connect to IB Gateway/TWS.
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        let url = format!("{}:{}", config.host, config.port);
        info!(url = %url, client_id = config.client_id, "Connecting to IB Gateway");

        let client = ibapi::Client::connect(&url, config.client_id)
            .await
            .context("Failed to connect to IB Gateway")?;

        info!("Connected to IB Gateway");
        Ok(Self { config, client })
    }

    /// Get a reference to the underlying ibapi client.
    pub fn inner(&self) -> &ibapi::Client {
        &self.client
    }

    /// Check if the connection is alive.
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}
