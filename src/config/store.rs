use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Embedded sled database on disk
    Sled,
    /// Process-local, lost on exit
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// Default: sled
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Root directory of the sled database
    /// Default: "./db/pipeline"
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Collection receiving submitted input records
    #[serde(default = "default_incoming_tree")]
    pub incoming_tree: String,

    /// Collection the processing stage writes results to
    #[serde(default = "default_results_tree")]
    pub results_tree: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            db_path: default_db_path(),
            incoming_tree: default_incoming_tree(),
            results_tree: default_results_tree(),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.incoming_tree.trim().is_empty() || self.results_tree.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "store tree names cannot be empty".into(),
            )));
        }

        if self.incoming_tree == self.results_tree {
            return Err(Error::Config(ConfigError::Message(format!(
                "store.incoming_tree and store.results_tree must differ (both are {:?})",
                self.incoming_tree
            ))));
        }

        if self.backend == StoreBackend::Sled && self.db_path.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "store.db_path is required for the sled backend".into(),
            )));
        }

        Ok(())
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Sled
}
fn default_db_path() -> PathBuf {
    PathBuf::from("./db/pipeline")
}
fn default_incoming_tree() -> String {
    "incoming_reviews".to_string()
}
fn default_results_tree() -> String {
    "sentiment_analysis".to_string()
}
