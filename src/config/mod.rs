//! Configuration management for the pipeline check tool and its components.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
mod processor;
mod producer;
mod retry;
mod store;
mod watch;
use std::fmt::Debug;

pub use processor::*;
pub use producer::*;
pub use retry::*;
pub use store::*;
pub use watch::*;
#[cfg(test)]
mod config_test;
use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

const ENV_PREFIX: &str = "PIPELINE";

/// Main configuration container
///
/// Combines all component configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct PipelineConfig {
    /// Completion watch timing
    #[serde(default)]
    pub watch: WatchConfig,
    /// Retry policy for result store count queries
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Batch insert pacing
    #[serde(default)]
    pub producer: ProducerConfig,
    /// Backing store selection and layout
    #[serde(default)]
    pub store: StoreConfig,
    /// Local processing stage
    #[serde(default)]
    pub processor: ProcessorConfig,
}
impl Debug for PipelineConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("watch", &self.watch)
            .field("store", &self.store)
            .finish()
    }
}
impl PipelineConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `PIPELINE__` prefix (highest priority)
    ///
    /// # Note
    /// This method does NOT validate the configuration. Callers MUST call `validate()`
    /// before using the configuration.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("PIPELINE__WATCH__DEADLINE_MS", "30000");
    /// let cfg = PipelineConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.watch.validate()?;
        self.retry.validate()?;
        self.producer.validate()?;
        self.store.validate()?;
        self.processor.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
