pub mod config;
pub mod error;
pub mod link;
pub mod session;

pub use config::{AccountConfig, LinkSettings};
pub use error::{ConfigError, DomainError, InvalidPathError, LinkError, LoadError, SaveError};
pub use link::{PathMapper, ResolvedLink, VerificationOutcome};
pub use session::{FailureReason, ResolveState};
