use async_trait::async_trait;

use crate::domain::VerificationOutcome;

/// Port for checking that a public link resolves.
///
/// Implementations issue one lightweight probe per call, never retry, and
/// report failures as outcomes rather than errors.
#[async_trait]
pub trait LinkVerifier: Send + Sync {
    /// Probe `url` and report whether it is reachable.
    async fn check(&self, url: &str) -> VerificationOutcome;
}
