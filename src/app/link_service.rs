use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::verification::VerificationTask;
use crate::domain::{
    AccountConfig, ConfigError, FailureReason, LinkError, LinkSettings, LoadError, PathMapper,
    ResolveState, ResolvedLink,
};
use crate::ports::{ConfigStore, LinkVerifier};

/// Slack on top of the HTTP timeout before the probe task is abandoned.
const VERIFY_GRACE: Duration = Duration::from_millis(500);

/// Turns local file paths into verified public links.
///
/// Cheap to clone. Every call to [`LinkService::resolve`] runs its own state
/// machine and its own verification task, so concurrent requests never share
/// mutable state.
#[derive(Clone)]
pub struct LinkService {
    store: Arc<dyn ConfigStore>,
    verifier: Arc<dyn LinkVerifier>,
    mapper: PathMapper,
    verify_deadline: Duration,
}

impl LinkService {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        verifier: Arc<dyn LinkVerifier>,
        settings: &LinkSettings,
    ) -> Self {
        Self {
            store,
            verifier,
            mapper: PathMapper::new(settings.base_url.clone()),
            verify_deadline: settings.verify_timeout + VERIFY_GRACE,
        }
    }

    /// Start resolving the public link for `file_path`.
    ///
    /// With a usable stored configuration this runs to completion. Otherwise
    /// it stops in `AwaitingUserConfig` and hands back a [`PendingResolve`].
    pub async fn resolve(&self, file_path: impl Into<PathBuf>) -> Resolution {
        let mut session = ResolveSession::new(file_path.into());
        if let Err(e) = session.advance(ResolveState::ConfigLoading) {
            return Resolution::Complete(session.complete(Err(e)));
        }

        match self.store.load() {
            Ok(config) => {
                debug!(file = ?session.file_path, "Using stored configuration");
                Resolution::Complete(self.finish(session, config).await)
            }
            Err(reason) => {
                match &reason {
                    LoadError::NotFound { .. } => info!("No stored configuration, asking for one"),
                    LoadError::Corrupt { detail, .. } => {
                        warn!(detail = %detail, "Stored configuration is unusable, asking for a new one")
                    }
                }

                if let Err(e) = session.advance(ResolveState::AwaitingUserConfig) {
                    return Resolution::Complete(session.complete(Err(e)));
                }

                Resolution::NeedsConfig(PendingResolve {
                    service: self.clone(),
                    session,
                    reason,
                })
            }
        }
    }

    async fn finish(&self, mut session: ResolveSession, config: AccountConfig) -> Completed {
        let result = self.build_and_verify(&mut session, config).await;
        session.complete(result)
    }

    async fn build_and_verify(
        &self,
        session: &mut ResolveSession,
        config: AccountConfig,
    ) -> Result<ResolvedLink, LinkError> {
        if !config.has_conventional_account_id() {
            warn!(account_id = config.account_id(), "Account id is not the usual 7 digits");
        }

        session.advance(ResolveState::LinkBuilding)?;
        let candidate = match self.mapper.link_for(&config, &session.file_path) {
            Ok(url) => url,
            Err(e) => {
                session.advance(ResolveState::Failed(FailureReason::InvalidPath))?;
                warn!(error = %e, "File is outside the public folder");
                return Err(e.into());
            }
        };
        debug!(url = %candidate, "Link built");

        session.advance(ResolveState::Verifying)?;
        let outcome = VerificationTask::spawn(Arc::clone(&self.verifier), candidate.clone())
            .wait(self.verify_deadline)
            .await;

        let url = match outcome.into_result(&candidate) {
            Ok(url) => url,
            Err(e) => {
                session.advance(ResolveState::Failed(FailureReason::Unreachable))?;
                return Err(e);
            }
        };
        session.advance(ResolveState::Succeeded)?;

        // The link stands even if the config cannot be written
        let save_warning = match self.store.save(&config) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Verified configuration was not saved");
                Some(e)
            }
        };

        info!(url = %url, "Public link resolved");
        Ok(ResolvedLink {
            url,
            config,
            save_warning,
        })
    }
}

/// Per-request state machine.
struct ResolveSession {
    file_path: PathBuf,
    state: ResolveState,
}

impl ResolveSession {
    fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            state: ResolveState::Idle,
        }
    }

    fn advance(&mut self, next: ResolveState) -> Result<(), LinkError> {
        if !self.state.can_transition_to(next) {
            return Err(LinkError::StateTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(from = ?self.state, to = ?next, "Resolve state changed");
        self.state = next;
        Ok(())
    }

    fn complete(self, result: Result<ResolvedLink, LinkError>) -> Completed {
        Completed {
            file_path: self.file_path,
            state: self.state,
            result,
        }
    }
}

/// What [`LinkService::resolve`] hands back.
pub enum Resolution {
    /// The request reached a terminal state.
    Complete(Completed),
    /// No usable stored configuration; the caller must supply one.
    NeedsConfig(PendingResolve),
}

/// A finished request.
#[derive(Debug)]
pub struct Completed {
    pub file_path: PathBuf,
    /// `Succeeded` or `Failed(_)`.
    pub state: ResolveState,
    pub result: Result<ResolvedLink, LinkError>,
}

impl Completed {
    pub fn into_result(self) -> Result<ResolvedLink, LinkError> {
        self.result
    }
}

/// A request suspended in `AwaitingUserConfig`.
pub struct PendingResolve {
    service: LinkService,
    session: ResolveSession,
    reason: LoadError,
}

/// A submitted configuration was invalid. The request is still pending.
pub struct RejectedConfig {
    pub pending: PendingResolve,
    pub error: ConfigError,
}

impl PendingResolve {
    /// Why the stored configuration could not be used.
    pub fn reason(&self) -> &LoadError {
        &self.reason
    }

    pub fn file_path(&self) -> &Path {
        &self.session.file_path
    }

    pub fn state(&self) -> ResolveState {
        self.session.state
    }

    /// Resume the request with a configuration collected from the user.
    pub async fn submit_config(
        self,
        account_id: u64,
        public_folder_root: impl Into<PathBuf>,
    ) -> Result<Completed, RejectedConfig> {
        match AccountConfig::new(account_id, public_folder_root) {
            Ok(config) => Ok(self.submit(config).await),
            Err(error) => {
                warn!(error = %error, "Submitted configuration rejected");
                Err(RejectedConfig {
                    pending: self,
                    error,
                })
            }
        }
    }

    /// Resume the request with an already validated configuration.
    pub async fn submit(self, config: AccountConfig) -> Completed {
        info!(account_id = config.account_id(), "Configuration submitted");
        self.service.finish(self.session, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::adapters::TomlConfigStore;
    use crate::domain::{SaveError, VerificationOutcome};

    /// Verifies every URL and counts the probes.
    #[derive(Default)]
    struct CountingVerifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LinkVerifier for CountingVerifier {
        async fn check(&self, url: &str) -> VerificationOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            VerificationOutcome::Verified { url: url.to_string() }
        }
    }

    struct RejectingVerifier;

    #[async_trait]
    impl LinkVerifier for RejectingVerifier {
        async fn check(&self, _url: &str) -> VerificationOutcome {
            VerificationOutcome::Unreachable {
                status: Some(404),
                reason: "HTTP 404 Not Found".to_string(),
            }
        }
    }

    struct SlowVerifier;

    #[async_trait]
    impl LinkVerifier for SlowVerifier {
        async fn check(&self, url: &str) -> VerificationOutcome {
            tokio::time::sleep(Duration::from_secs(30)).await;
            VerificationOutcome::Verified { url: url.to_string() }
        }
    }

    /// Loads a fixed config but can never save.
    struct ReadOnlyStore(AccountConfig);

    impl ConfigStore for ReadOnlyStore {
        fn load(&self) -> Result<AccountConfig, LoadError> {
            Ok(self.0.clone())
        }

        fn save(&self, _config: &AccountConfig) -> Result<(), SaveError> {
            Err(SaveError {
                path: self.config_path(),
                detail: "read-only".to_string(),
            })
        }

        fn clear(&self) -> Result<bool, SaveError> {
            Ok(false)
        }

        fn config_path(&self) -> PathBuf {
            PathBuf::from("/read-only/droplink.toml")
        }
    }

    fn settings() -> LinkSettings {
        LinkSettings {
            verify_timeout: Duration::from_millis(100),
            ..LinkSettings::default()
        }
    }

    fn service_with(store: Arc<dyn ConfigStore>, verifier: Arc<dyn LinkVerifier>) -> LinkService {
        LinkService::new(store, verifier, &settings())
    }

    fn expect_pending(resolution: Resolution) -> PendingResolve {
        match resolution {
            Resolution::NeedsConfig(pending) => pending,
            Resolution::Complete(done) => panic!("expected NeedsConfig, got {:?}", done),
        }
    }

    fn expect_complete(resolution: Resolution) -> Completed {
        match resolution {
            Resolution::Complete(done) => done,
            Resolution::NeedsConfig(pending) => panic!("unexpected NeedsConfig: {}", pending.reason()),
        }
    }

    #[tokio::test]
    async fn test_first_run_asks_for_config_then_saves() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TomlConfigStore::at(dir.path().join("droplink.toml")));
        let service = service_with(store.clone(), Arc::new(CountingVerifier::default()));

        let pending = expect_pending(service.resolve("/home/me/Public/img/shot.png").await);
        assert!(matches!(pending.reason(), LoadError::NotFound { .. }));
        assert_eq!(pending.state(), ResolveState::AwaitingUserConfig);

        let done = pending.submit_config(1234567, "/home/me/Public").await.ok().unwrap();
        assert_eq!(done.state, ResolveState::Succeeded);

        let link = done.into_result().unwrap();
        assert_eq!(link.url, "http://dl.dropbox.com/u/1234567/img/shot.png");
        assert!(link.save_warning.is_none());

        let saved = store.load().unwrap();
        assert_eq!(saved, link.config);
    }

    #[tokio::test]
    async fn test_stored_config_skips_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TomlConfigStore::at(dir.path().join("droplink.toml")));
        store.save(&AccountConfig::new(7654321, "/srv/pub").unwrap()).unwrap();

        let verifier = Arc::new(CountingVerifier::default());
        let service = service_with(store, verifier.clone());

        let done = expect_complete(service.resolve("/srv/pub/a b.txt").await);
        assert_eq!(done.state, ResolveState::Succeeded);
        assert_eq!(done.into_result().unwrap().url, "http://dl.dropbox.com/u/7654321/a%20b.txt");
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_corrupt_config_asks_for_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("droplink.toml");
        std::fs::write(&path, "accountId = \n").unwrap();
        let service = service_with(Arc::new(TomlConfigStore::at(path)), Arc::new(CountingVerifier::default()));

        let pending = expect_pending(service.resolve("/p/a.png").await);
        assert!(matches!(pending.reason(), LoadError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_invalid_submission_keeps_request_pending() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            Arc::new(TomlConfigStore::at(dir.path().join("droplink.toml"))),
            Arc::new(CountingVerifier::default()),
        );

        let pending = expect_pending(service.resolve("/p/a.png").await);
        let rejected = match pending.submit_config(0, "/p").await {
            Err(rejected) => rejected,
            Ok(done) => panic!("zero id accepted: {:?}", done),
        };
        assert_eq!(rejected.error, ConfigError::ZeroAccountId);
        assert_eq!(rejected.pending.state(), ResolveState::AwaitingUserConfig);

        // An id the config file cannot hold is rejected before any probe
        let rejected = match rejected.pending.submit_config(u64::MAX, "/p").await {
            Err(rejected) => rejected,
            Ok(done) => panic!("oversized id accepted: {:?}", done),
        };
        assert_eq!(rejected.error, ConfigError::AccountIdTooLarge(u64::MAX));
        assert!(!dir.path().join("droplink.toml").exists());

        let done = rejected.pending.submit_config(1234567, "/p").await.ok().unwrap();
        assert_eq!(done.state, ResolveState::Succeeded);
    }

    #[tokio::test]
    async fn test_file_outside_public_folder_fails_without_probe() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TomlConfigStore::at(dir.path().join("droplink.toml")));
        let verifier = Arc::new(CountingVerifier::default());
        let service = service_with(store.clone(), verifier.clone());

        let pending = expect_pending(service.resolve("/elsewhere/a.png").await);
        let done = pending.submit_config(1234567, "/home/me/Public").await.ok().unwrap();

        assert_eq!(done.state, ResolveState::Failed(FailureReason::InvalidPath));
        assert!(matches!(done.result, Err(LinkError::InvalidPath(_))));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(store.load(), Err(LoadError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_link_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TomlConfigStore::at(dir.path().join("droplink.toml")));
        let service = service_with(store.clone(), Arc::new(RejectingVerifier));

        let pending = expect_pending(service.resolve("/p/a.png").await);
        let done = pending.submit_config(1234567, "/p").await.ok().unwrap();

        assert_eq!(done.state, ResolveState::Failed(FailureReason::Unreachable));
        match done.result {
            Err(LinkError::Unreachable { url, reason }) => {
                assert_eq!(url, "http://dl.dropbox.com/u/1234567/a.png");
                assert!(reason.contains("404"));
            }
            other => panic!("expected Unreachable, got {:?}", other),
        }
        assert!(matches!(store.load(), Err(LoadError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_slow_probe_is_abandoned() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            Arc::new(TomlConfigStore::at(dir.path().join("droplink.toml"))),
            Arc::new(SlowVerifier),
        );

        let started = std::time::Instant::now();
        let pending = expect_pending(service.resolve("/p/a.png").await);
        let done = pending.submit_config(1234567, "/p").await.ok().unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(done.state, ResolveState::Failed(FailureReason::Unreachable));
    }

    #[tokio::test]
    async fn test_save_failure_is_a_warning() {
        let config = AccountConfig::new(1234567, "/p").unwrap();
        let service = service_with(
            Arc::new(ReadOnlyStore(config)),
            Arc::new(CountingVerifier::default()),
        );

        let done = expect_complete(service.resolve("/p/a.png").await);
        assert_eq!(done.state, ResolveState::Succeeded);

        let link = done.into_result().unwrap();
        assert_eq!(link.url, "http://dl.dropbox.com/u/1234567/a.png");
        assert_eq!(link.save_warning.unwrap().detail, "read-only");
    }

    #[tokio::test]
    async fn test_concurrent_requests_do_not_interfere() {
        let config = AccountConfig::new(1234567, "/p").unwrap();
        let verifier = Arc::new(CountingVerifier::default());
        let service = service_with(Arc::new(ReadOnlyStore(config)), verifier.clone());

        let (a, b, c) = tokio::join!(
            service.resolve("/p/a.png"),
            service.resolve("/p/b.png"),
            service.resolve("/elsewhere/c.png"),
        );

        let a = expect_complete(a).into_result().unwrap();
        let b = expect_complete(b).into_result().unwrap();
        let c = expect_complete(c);

        assert!(a.url.ends_with("/a.png"));
        assert!(b.url.ends_with("/b.png"));
        assert_eq!(c.state, ResolveState::Failed(FailureReason::InvalidPath));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
    }
}
