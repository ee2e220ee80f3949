use serde::Serialize;

/// Why a resolve request ended without a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The file is not under the configured public folder.
    InvalidPath,
    /// The probe failed or the URL did not answer with success.
    Unreachable,
}

/// Lifecycle of a single resolve request.
///
/// State transitions:
/// - Idle -> ConfigLoading (resolve)
/// - ConfigLoading -> AwaitingUserConfig (stored config missing or corrupt)
/// - ConfigLoading -> LinkBuilding (stored config loaded)
/// - AwaitingUserConfig -> LinkBuilding (config submitted)
/// - LinkBuilding -> Verifying | Failed(InvalidPath)
/// - Verifying -> Succeeded | Failed(Unreachable)
///
/// Succeeded and Failed are terminal. Each request gets its own instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ResolveState {
    #[default]
    Idle,
    ConfigLoading,
    AwaitingUserConfig,
    LinkBuilding,
    Verifying,
    Succeeded,
    Failed(FailureReason),
}

impl ResolveState {
    /// Check if `next` is a legal successor of this state.
    #[must_use]
    pub fn can_transition_to(&self, next: ResolveState) -> bool {
        use ResolveState::*;

        matches!(
            (self, next),
            (Idle, ConfigLoading)
                | (ConfigLoading, AwaitingUserConfig)
                | (ConfigLoading, LinkBuilding)
                | (AwaitingUserConfig, LinkBuilding)
                | (LinkBuilding, Verifying)
                | (LinkBuilding, Failed(FailureReason::InvalidPath))
                | (Verifying, Succeeded)
                | (Verifying, Failed(FailureReason::Unreachable))
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolveState::Succeeded | ResolveState::Failed(_))
    }
}
