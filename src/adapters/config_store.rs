use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::{AccountConfig, DomainError, LoadError, SaveError};
use crate::ports::ConfigStore;

/// File name of the account configuration.
pub const CONFIG_FILE_NAME: &str = "droplink.toml";

const FILE_HEADER: &str = "# Droplink account configuration. Safe to edit by hand.\n";

/// TOML-based configuration store bound to a single file.
pub struct TomlConfigStore {
    config_path: PathBuf,
}

impl TomlConfigStore {
    /// Create a store for `droplink.toml` next to the running executable.
    pub fn new() -> Result<Self, DomainError> {
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| DomainError::Config("Could not find executable directory".to_string()))?;

        Ok(Self::at(dir.join(CONFIG_FILE_NAME)))
    }

    /// Create a store for an explicit file path.
    pub fn at(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        info!(path = ?config_path, "ConfigStore initialized");
        Self { config_path }
    }

    fn parent_dir(&self) -> &Path {
        match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn save_error(&self, detail: impl ToString) -> SaveError {
        SaveError {
            path: self.config_path.clone(),
            detail: detail.to_string(),
        }
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<AccountConfig, LoadError> {
        let path = &self.config_path;
        debug!(path = ?path, "Loading configuration");

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = ?path, "Configuration file not found");
                return Err(LoadError::NotFound { path: path.clone() });
            }
            Err(e) => {
                return Err(LoadError::Corrupt {
                    path: path.clone(),
                    detail: format!("could not read file: {}", e),
                });
            }
        };

        let config: AccountConfig = toml::from_str(&content).map_err(|e| LoadError::Corrupt {
            path: path.clone(),
            detail: e.message().to_string(),
        })?;

        info!(path = ?path, account_id = config.account_id(), "Configuration loaded");
        Ok(config)
    }

    fn save(&self, config: &AccountConfig) -> Result<(), SaveError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| self.save_error(e))?;

        let body = toml::to_string_pretty(config).map_err(|e| self.save_error(e))?;

        // Write beside the target, then rename over it
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| self.save_error(e))?;
        write_synced(&mut temp, &body).map_err(|e| self.save_error(e))?;
        temp.persist(&self.config_path)
            .map_err(|e| self.save_error(e.error))?;

        info!(path = ?self.config_path, account_id = config.account_id(), "Configuration saved");
        Ok(())
    }

    fn clear(&self) -> Result<bool, SaveError> {
        match fs::remove_file(&self.config_path) {
            Ok(()) => {
                info!(path = ?self.config_path, "Configuration removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.save_error(e)),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.config_path.clone()
    }
}

fn write_synced(temp: &mut NamedTempFile, body: &str) -> io::Result<()> {
    temp.write_all(FILE_HEADER.as_bytes())?;
    temp.write_all(body.as_bytes())?;
    temp.as_file().sync_all()
}
