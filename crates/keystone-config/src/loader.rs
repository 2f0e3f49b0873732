//! Layered loading of [`AppConfig`] from TOML files and the environment.

use crate::{AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use keystone_core::KeystoneError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Holds the active configuration and can re-read it from disk.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Load and validate the configuration found in `config_dir`.
    ///
    /// Later sources override earlier ones:
    /// 1. `default.toml`
    /// 2. `{KEYSTONE_ENVIRONMENT}.toml` (`development` when unset)
    /// 3. `local.toml`
    /// 4. `KEYSTONE__SECTION__KEY` environment variables, e.g.
    ///    `KEYSTONE__REDIS__POOL_SIZE=32`
    ///
    /// Missing files are skipped.
    pub fn new(config_dir: impl Into<String>) -> Result<Self, KeystoneError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Load from `./config`.
    pub fn from_default_location() -> Result<Self, KeystoneError> {
        Self::new("./config")
    }

    /// Snapshot of the active configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Re-read every source.
    ///
    /// The previous configuration stays active if the new one fails to load
    /// or validate.
    pub async fn reload(&self) -> Result<(), KeystoneError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded");
        Ok(())
    }

    fn load_config(config_dir: &str) -> Result<AppConfig, KeystoneError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!(error = %e, "No .env file loaded");
        }

        let environment = std::env::var("KEYSTONE_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!(environment = %environment, "Loading configuration");

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{config_dir}/{name}.toml");
            if Path::new(&path).exists() {
                debug!(path = %path, "Adding config file");
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("KEYSTONE")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e: ConfigError| KeystoneError::configuration(e.to_string()))?;

        ConfigValidator::validate(&app_config).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            KeystoneError::configuration(messages.join("; "))
        })?;

        Ok(app_config)
    }
}
