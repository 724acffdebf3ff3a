use anyhow::Result;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::DispenserError;
use crate::identifiers::DEFAULT_CATALOG_SIZE;
use crate::sampling::{DEFAULT_INCREMENT_MAX, DEFAULT_INCREMENT_MIN};
use crate::weight::{DEFAULT_TARGET_MAX, DEFAULT_TARGET_MIN, DEFAULT_TOLERANCE};

/// Main configuration structure for the powder dispenser
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispenserConfig {
    /// Dispensing run settings
    pub dispensing: DispensingConfig,
    /// Target weight generation settings
    pub target: TargetConfig,
    /// Product catalog settings
    pub catalog: CatalogConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispensingConfig {
    /// Sampling period of an active run
    pub tick_interval_ms: u64,
    /// Fractional tolerance around the target (0.05 = ±5%)
    pub tolerance: f64,
    /// Smallest weight increment per tick, in grams
    pub increment_min: f64,
    /// Exclusive upper limit of the increment per tick, in grams
    pub increment_max: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Exclusive lower limit for generated targets, in grams
    pub min: f64,
    /// Exclusive upper limit for generated targets, in grams
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Number of product identifiers offered for selection
    pub size: usize,
    /// Seed for every random source; unset draws from the OS
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for DispensingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            tolerance: DEFAULT_TOLERANCE,
            increment_min: DEFAULT_INCREMENT_MIN,
            increment_max: DEFAULT_INCREMENT_MAX,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_TARGET_MIN,
            max: DEFAULT_TARGET_MAX,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CATALOG_SIZE,
            seed: None,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl DispensingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl DispenserConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (powder-dispenser.toml)
    /// 3. Environment variables (prefixed with POWDER_DISPENSER_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("powder-dispenser.toml").exists() {
            builder = builder.add_source(File::with_name("powder-dispenser"));
        }

        builder = builder.add_source(
            Environment::with_prefix("POWDER_DISPENSER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(DispenserError::from)?;
        let dispenser_config: DispenserConfig =
            config.try_deserialize().map_err(DispenserError::from)?;
        dispenser_config.validate()?;

        Ok(dispenser_config)
    }

    pub fn validate(&self) -> Result<(), DispenserError> {
        let invalid = |reason: &str| {
            Err(DispenserError::ConfigInvalid {
                reason: reason.to_string(),
            })
        };

        if self.dispensing.tick_interval_ms == 0 {
            return invalid("dispensing.tick_interval_ms must be positive");
        }
        if !(0.0..1.0).contains(&self.dispensing.tolerance) {
            return invalid("dispensing.tolerance must be within [0, 1)");
        }
        if self.dispensing.increment_min <= 0.0
            || self.dispensing.increment_min >= self.dispensing.increment_max
        {
            return invalid("dispensing.increment_min must be positive and below increment_max");
        }
        // At least one two-decimal value must fit strictly between min and max
        if self.target.min < 0.0 || self.target.max - self.target.min <= 0.02 {
            return invalid("target.min must be non-negative and well below target.max");
        }
        if self.catalog.size == 0 {
            return invalid("catalog.size must be at least 1");
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<DispenserConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = DispenserConfig::load_env_file();
        DispenserConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static DispenserConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
