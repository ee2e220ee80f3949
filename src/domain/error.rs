use std::path::PathBuf;

use thiserror::Error;

use crate::domain::session::ResolveState;

/// Setup and infrastructure errors for Droplink.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

/// Why the stored account configuration could not be used.
///
/// Both variants are recoverable: the caller collects a fresh configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("no configuration file at {path}")]
    NotFound { path: PathBuf },

    #[error("configuration file {path} is corrupt: {detail}")]
    Corrupt { path: PathBuf, detail: String },
}

/// Failure to persist a verified configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not save configuration to {path}: {detail}")]
pub struct SaveError {
    pub path: PathBuf,
    pub detail: String,
}

/// Rejected account configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("account id must be a positive integer")]
    ZeroAccountId,

    #[error("account id {0} is too large to store")]
    AccountIdTooLarge(u64),

    #[error("public folder root must not be empty")]
    EmptyPublicFolderRoot,
}

/// The file does not sit under the configured public folder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{file} is not inside the public folder {root}")]
pub struct InvalidPathError {
    pub file: String,
    pub root: String,
}

/// Terminal failure of a single link request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    #[error("{url} is not reachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("could not verify {url}: {detail}")]
    NetworkError { url: String, detail: String },

    #[error("Invalid resolve state transition from {from:?} to {to:?}")]
    StateTransition { from: ResolveState, to: ResolveState },
}
