//! Checks a loaded configuration before the store is built.
//!
//! Every problem is collected so a misconfigured deployment fails at startup
//! with the full list.

use crate::{AppConfig, RedisConfig, StoreBackend};
use keystone_core::LoggingConfig;
use std::fmt;
use url::Url;

/// A single problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// `redis.pool_size` is zero.
    EmptyPool,
    /// `redis.pool_size` is above the supported ceiling.
    PoolSizeTooLarge { value: usize, maximum: usize },
    /// `redis.url` does not parse or is not a redis URL.
    InvalidRedisUrl { url: String, reason: String },
    /// `redis.connect_timeout_secs` is zero.
    ZeroConnectTimeout,
    /// `logging.level` is not a tracing level.
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPool => write!(f, "redis.pool_size must be at least 1"),
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "redis.pool_size {value} is above the maximum of {maximum}")
            }
            Self::InvalidRedisUrl { url, reason } => write!(f, "redis.url '{url}': {reason}"),
            Self::ZeroConnectTimeout => write!(f, "redis.connect_timeout_secs must be greater than 0"),
            Self::InvalidLogLevel { value } => write!(
                f,
                "logging.level '{value}' is not one of {}",
                ConfigValidator::LOG_LEVELS.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Validates an [`AppConfig`].
pub struct ConfigValidator;

impl ConfigValidator {
    const MAX_POOL_SIZE: usize = 1000;
    const LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Returns every problem found in `config`.
    ///
    /// Redis settings are only checked when the Redis backend is in use.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if config.store_backend() == StoreBackend::Redis {
            Self::check_redis(&config.redis, &mut errors);
        }
        Self::check_logging(&config.logging, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check_redis(redis: &RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        let reason = match Url::parse(&redis.url) {
            Ok(url) if matches!(url.scheme(), "redis" | "rediss") => None,
            Ok(url) => Some(format!("unsupported scheme '{}', expected redis or rediss", url.scheme())),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = reason {
            errors.push(ConfigValidationError::InvalidRedisUrl {
                url: redis.url.clone(),
                reason,
            });
        }

        match redis.pool_size {
            0 => errors.push(ConfigValidationError::EmptyPool),
            size if size > Self::MAX_POOL_SIZE => errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: size,
                maximum: Self::MAX_POOL_SIZE,
            }),
            _ => {}
        }

        if redis.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::ZeroConnectTimeout);
        }
    }

    fn check_logging(logging: &LoggingConfig, errors: &mut Vec<ConfigValidationError>) {
        if !Self::LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: logging.level.clone(),
            });
        }
    }
}
