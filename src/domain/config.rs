use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::error::{ConfigError, DomainError};

/// Public link prefix used when no other base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://dl.dropbox.com/u";

/// Upper bound on a single reachability probe.
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 5;

/// Account ids issued by the provider are usually this many digits long.
pub const CONVENTIONAL_ACCOUNT_ID_DIGITS: usize = 7;

/// Largest account id the config file can store.
pub const MAX_ACCOUNT_ID: u64 = i64::MAX as u64;

/// Persisted account configuration.
///
/// Both fields are always present together. Values are replaced wholesale,
/// never edited in place, so the fields are only reachable through getters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawAccountConfig")]
pub struct AccountConfig {
    account_id: u64,
    public_folder_root: PathBuf,
}

/// Wire shape of [`AccountConfig`] before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAccountConfig {
    account_id: u64,
    public_folder_root: PathBuf,
}

impl TryFrom<RawAccountConfig> for AccountConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAccountConfig) -> Result<Self, Self::Error> {
        Self::new(raw.account_id, raw.public_folder_root)
    }
}

impl AccountConfig {
    /// Create a validated account configuration.
    pub fn new(account_id: u64, public_folder_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let public_folder_root = public_folder_root.into();

        if account_id == 0 {
            return Err(ConfigError::ZeroAccountId);
        }
        // TOML integers are signed 64-bit
        if account_id > MAX_ACCOUNT_ID {
            return Err(ConfigError::AccountIdTooLarge(account_id));
        }
        if public_folder_root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPublicFolderRoot);
        }

        Ok(Self {
            account_id,
            public_folder_root,
        })
    }

    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    pub fn public_folder_root(&self) -> &Path {
        &self.public_folder_root
    }

    /// Soft check: does the id have the usual number of digits?
    ///
    /// Only used to warn the user. Ids of other lengths are still accepted.
    #[must_use]
    pub fn has_conventional_account_id(&self) -> bool {
        self.account_id.to_string().len() == CONVENTIONAL_ACCOUNT_ID_DIGITS
    }
}

/// Runtime settings for link resolution. Not persisted.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Prefix of every public link, without the account id.
    pub base_url: String,
    /// Deadline for one reachability probe.
    pub verify_timeout: Duration,
    /// User agent sent with the probe.
    pub user_agent: String,
    /// Honour HTTP(S)_PROXY style environment variables.
    pub use_system_proxy: bool,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            verify_timeout: Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS),
            user_agent: format!("Droplink/{}", env!("CARGO_PKG_VERSION")),
            use_system_proxy: true,
        }
    }
}

impl LinkSettings {
    /// Reject base URLs that could never produce a probeable link.
    pub fn validate(&self) -> Result<(), DomainError> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| DomainError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::Config(format!(
                "Base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.verify_timeout.is_zero() {
            return Err(DomainError::Config("Verification timeout must be greater than zero".to_string()));
        }

        Ok(())
    }
}
