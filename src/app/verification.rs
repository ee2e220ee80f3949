use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::domain::VerificationOutcome;
use crate::ports::LinkVerifier;

/// A reachability probe running on its own task.
///
/// The probe starts as soon as the task is spawned. Dropping the handle or
/// missing the deadline in [`VerificationTask::wait`] aborts it.
pub struct VerificationTask {
    url: String,
    handle: JoinHandle<VerificationOutcome>,
}

impl VerificationTask {
    /// Spawn a probe of `url` on the current tokio runtime.
    pub fn spawn(verifier: Arc<dyn LinkVerifier>, url: String) -> Self {
        let probe_url = url.clone();
        let handle = tokio::spawn(async move { verifier.check(&probe_url).await });
        Self { url, handle }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Abandon the probe. Waiting afterwards yields a `NetworkError`.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Wait for the probe to finish, giving up after `deadline`.
    pub async fn wait(mut self, deadline: Duration) -> VerificationOutcome {
        match tokio::time::timeout(deadline, &mut self.handle).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) if e.is_cancelled() => VerificationOutcome::NetworkError {
                detail: "verification was cancelled".to_string(),
            },
            Ok(Err(e)) => VerificationOutcome::NetworkError {
                detail: format!("verification task failed: {}", e),
            },
            Err(_) => {
                self.handle.abort();
                warn!(url = %self.url, deadline = ?deadline, "Verification abandoned after deadline");
                VerificationOutcome::Unreachable {
                    status: None,
                    reason: format!("no answer within {} ms", deadline.as_millis()),
                }
            }
        }
    }
}

impl Drop for VerificationTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
