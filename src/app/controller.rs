use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{HttpLinkVerifier, TomlConfigStore};
use crate::app::LinkService;
use crate::domain::{AccountConfig, DomainError, LinkSettings, LoadError, SaveError};
use crate::infrastructure::{default_logs_dir, init_logging};
use crate::ports::ConfigStore;

/// Startup options collected by the caller.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    /// Explicit config file; `None` means next to the executable.
    pub config_path: Option<PathBuf>,
    pub settings: LinkSettings,
    pub log_level: String,
    pub file_logging: bool,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            settings: LinkSettings::default(),
            log_level: "warn".to_string(),
            file_logging: false,
        }
    }
}

/// Application controller that wires the adapters together and owns
/// process-wide resources.
pub struct AppController {
    store: Arc<TomlConfigStore>,
    service: LinkService,
    logs_dir: PathBuf,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Initialize logging, the config store, and the link service.
    pub fn new(options: StartupOptions) -> Result<Self, DomainError> {
        // Step 1: Initialize logging
        let logs_dir = default_logs_dir();
        let log_guard = init_logging(&logs_dir, &options.log_level, options.file_logging)?;

        // Step 2: Validate runtime settings
        options.settings.validate()?;

        // Step 3: Initialize config store
        let store = Arc::new(match options.config_path {
            Some(path) => TomlConfigStore::at(path),
            None => TomlConfigStore::new()?,
        });

        // Step 4: Build the verifier and service
        let verifier = Arc::new(HttpLinkVerifier::new(&options.settings)?);
        let service = LinkService::new(store.clone(), verifier, &options.settings);

        info!(
            config_path = ?store.config_path(),
            base_url = %options.settings.base_url,
            "AppController initialized"
        );

        Ok(Self {
            store,
            service,
            logs_dir,
            _log_guard: log_guard,
        })
    }

    pub fn service(&self) -> &LinkService {
        &self.service
    }

    /// Get the stored configuration.
    pub fn stored_config(&self) -> Result<AccountConfig, LoadError> {
        self.store.load()
    }

    /// Delete the stored configuration. Returns false if there was none.
    pub fn reset_config(&self) -> Result<bool, SaveError> {
        self.store.clear()
    }

    /// Get the config file path.
    pub fn config_path(&self) -> PathBuf {
        self.store.config_path()
    }

    /// Get the logs directory path.
    pub fn logs_dir(&self) -> PathBuf {
        self.logs_dir.clone()
    }
}
