use std::path::Path;

use serde::Serialize;

use crate::domain::config::AccountConfig;
use crate::domain::error::{InvalidPathError, LinkError, SaveError};

/// Maps local files inside the public folder to their public URLs.
///
/// Pure and deterministic: the same inputs always give the same URL and no
/// filesystem or network access happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    base_url: String,
}

impl PathMapper {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `<base-url>/<account_id>/<relative-path>` for `file_path`.
    ///
    /// The file must sit strictly below `public_folder_root`. Separators are
    /// turned into `/` and spaces into `%20`; nothing else is escaped.
    pub fn build_link(
        &self,
        account_id: u64,
        public_folder_root: &Path,
        file_path: &Path,
    ) -> Result<String, InvalidPathError> {
        let invalid = || InvalidPathError {
            file: file_path.to_string_lossy().into_owned(),
            root: public_folder_root.to_string_lossy().into_owned(),
        };

        let root = public_folder_root.to_str().ok_or_else(invalid)?;
        let file = file_path.to_str().ok_or_else(invalid)?;

        let root = root.trim_end_matches(is_separator);
        let rest = strip_root(file, root).ok_or_else(invalid)?;

        // "C:\Pub" must not match "C:\Public\x"
        if !rest.starts_with(is_separator) {
            return Err(invalid());
        }

        let relative = rest.trim_start_matches(is_separator);
        if relative.is_empty() {
            return Err(invalid());
        }

        let relative: String = relative
            .chars()
            .map(|c| if is_separator(c) { '/' } else { c })
            .collect();

        Ok(format!(
            "{}/{}/{}",
            self.base_url,
            account_id,
            relative.replace(' ', "%20")
        ))
    }

    /// Convenience wrapper taking the ids from a stored configuration.
    pub fn link_for(&self, config: &AccountConfig, file_path: &Path) -> Result<String, InvalidPathError> {
        self.build_link(config.account_id(), config.public_folder_root(), file_path)
    }
}

/// Backslash is always a separator so Windows-style paths map the same on every host.
fn is_separator(c: char) -> bool {
    c == '\\' || std::path::is_separator(c)
}

#[cfg(windows)]
fn strip_root<'a>(file: &'a str, root: &str) -> Option<&'a str> {
    let head = file.get(..root.len())?;
    if head.eq_ignore_ascii_case(root) {
        file.get(root.len()..)
    } else {
        None
    }
}

#[cfg(not(windows))]
fn strip_root<'a>(file: &'a str, root: &str) -> Option<&'a str> {
    file.strip_prefix(root)
}

/// Result of one reachability probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// The URL answered with a success status.
    Verified { url: String },
    /// Refused, timed out, or answered with a non-success status.
    Unreachable { status: Option<u16>, reason: String },
    /// The probe itself could not be carried out.
    NetworkError { detail: String },
}

impl VerificationOutcome {
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified { .. })
    }

    /// Collapse into the accept/reject decision for `url`.
    pub fn into_result(self, url: &str) -> Result<String, LinkError> {
        match self {
            VerificationOutcome::Verified { url } => Ok(url),
            VerificationOutcome::Unreachable { reason, .. } => Err(LinkError::Unreachable {
                url: url.to_string(),
                reason,
            }),
            VerificationOutcome::NetworkError { detail } => Err(LinkError::NetworkError {
                url: url.to_string(),
                detail,
            }),
        }
    }
}

/// A verified public link, ready to hand to the user.
#[derive(Debug, Clone)]
pub struct ResolvedLink {
    /// The verified public URL.
    pub url: String,
    /// Configuration the link was derived from.
    pub config: AccountConfig,
    /// Set when the verified configuration could not be persisted.
    pub save_warning: Option<SaveError>,
}
