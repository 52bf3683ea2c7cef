use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::config::MonitorConfig;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads monitor configuration by layering `config/Config.toml` and
    /// `ROLL_`-prefixed environment variables over the built-in defaults.
    ///
    /// Nested fields use `__` in the environment, e.g.
    /// `ROLL_MATCHER__TARGET_DELTA=0.15`.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source cannot be read or parsed.
    pub fn load() -> Result<MonitorConfig> {
        Self::load_from("config/Config.toml")
    }

    /// Loads monitor configuration from a specific TOML file path.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<MonitorConfig> {
        let config: MonitorConfig = Figment::new()
            .merge(Serialized::defaults(MonitorConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ROLL_").split("__"))
            .extract()?;

        Ok(config)
    }
}
