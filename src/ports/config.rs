use std::path::PathBuf;

use crate::domain::{AccountConfig, LoadError, SaveError};

/// Configuration store port for the persisted account configuration.
pub trait ConfigStore: Send + Sync {
    /// Load the stored configuration.
    ///
    /// A missing file is `LoadError::NotFound`; anything unreadable or invalid
    /// is `LoadError::Corrupt`. Never falls back to a default.
    fn load(&self) -> Result<AccountConfig, LoadError>;

    /// Replace the stored configuration with `config`.
    fn save(&self, config: &AccountConfig) -> Result<(), SaveError>;

    /// Remove the stored configuration. Returns false if there was none.
    fn clear(&self) -> Result<bool, SaveError>;

    /// Get the path to the configuration file.
    fn config_path(&self) -> PathBuf;
}
