//! The polling loop: positions → per-position scans → display.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use tracing::{debug, error, info};

use roll_scout_core::{market_state, ConfigLoader, MonitorConfig};
use roll_scout_engine::{QuoteCache, RollScanner};
use roll_scout_ib::{IbClient, IbQuoteFetcher};

use crate::display;

#[derive(Args)]
pub struct MonitorArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
    /// Gateway/TWS host
    #[arg(long)]
    pub host: Option<String>,
    /// Gateway/TWS port (7496 = TWS live, 7497 = TWS paper)
    #[arg(long)]
    pub port: Option<u16>,
    /// Client ID (unique per connection)
    #[arg(long)]
    pub client_id: Option<i32>,
    /// Target delta magnitude for new strikes
    #[arg(long)]
    pub target_delta: Option<f64>,
    /// Analyze positions with DTE at or below this
    #[arg(long)]
    pub dte_threshold: Option<i64>,
    /// Check interval in seconds
    #[arg(long)]
    pub interval: Option<u64>,
    /// Run even when the market is closed
    #[arg(long)]
    pub skip_market_check: bool,
}

impl MonitorArgs {
    /// Layer CLI flags over the loaded configuration.
    fn apply(&self, mut config: MonitorConfig) -> MonitorConfig {
        if let Some(host) = &self.host {
            config.connection.host = host.clone();
        }
        if let Some(port) = self.port {
            config.connection.port = port;
        }
        if let Some(client_id) = self.client_id {
            config.connection.client_id = client_id;
        }
        if let Some(target_delta) = self.target_delta {
            config.matcher.target_delta = target_delta;
        }
        if let Some(dte_threshold) = self.dte_threshold {
            config.scan.dte_alert_threshold = dte_threshold;
        }
        if let Some(interval) = self.interval {
            config.scan.check_interval_secs = interval;
        }
        config
    }
}

pub async fn run(args: MonitorArgs, once: bool) -> Result<()> {
    let config = args.apply(ConfigLoader::load_from(&args.config)?);

    info!(
        target_delta = config.matcher.target_delta,
        dte_threshold = config.scan.dte_alert_threshold,
        min_dte = config.expiry.min_dte,
        max_dte = config.expiry.max_dte,
        interval_secs = config.scan.check_interval_secs,
        "Roll scout started"
    );

    // One cache for the life of the run, owned here and passed by
    // reference to every scanner that needs it.
    let cache = QuoteCache::new(config.cache.quote_ttl());
    let interval = Duration::from_secs(config.scan.check_interval_secs);
    let mut pass = 0u64;

    loop {
        pass += 1;

        if !args.skip_market_check {
            let state = market_state(Utc::now());
            if !state.is_open() {
                info!(pass, %state, "Market closed — skipping pass");
                if once {
                    break;
                }
                tokio::time::sleep(interval).await;
                continue;
            }
        }

        if let Err(error) = run_pass(&cache, &config, pass).await {
            // A failed pass (connection refused, session recycled) must
            // not kill the monitor; the next tick retries from scratch.
            error!(pass, error = %error, "Scan pass failed");
        }

        let stats = cache.stats();
        debug!(
            requests = stats.total_requests,
            hits = stats.hits,
            expired = stats.expired,
            hit_rate_pct = stats.hit_rate(),
            size = stats.size,
            "Cache stats"
        );
        cache.clear_expired();

        if once {
            break;
        }
        info!(secs = config.scan.check_interval_secs, "Next check scheduled");
        tokio::time::sleep(interval).await;
    }

    Ok(())
}

async fn run_pass(cache: &QuoteCache, config: &MonitorConfig, pass: u64) -> Result<()> {
    // Fresh session each pass — the Gateway recycles idle connections.
    let client = IbClient::connect(config.connection.clone()).await?;
    let fetcher = IbQuoteFetcher::new(client);

    let positions = fetcher
        .client()
        .short_option_positions(&fetcher, &config.retry)
        .await?;
    display::print_positions_summary(&positions, Utc::now(), pass);

    if positions.is_empty() {
        info!("No positions to monitor");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let scanner = RollScanner::new(cache, &fetcher, config.clone());
    let mut tally = display::PassTally::default();

    for position in &positions {
        let outcome = scanner.scan_position(position, today).await;
        display::print_outcome(
            position,
            &outcome,
            config.scan.dte_alert_threshold,
            &mut tally,
        );
    }

    display::print_pass_summary(&tally);
    Ok(())
}
