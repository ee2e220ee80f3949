use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Port for handing a resolved link to the user.
#[async_trait]
pub trait OutputManager: Send + Sync {
    /// Place `text` where the user can paste it.
    async fn copy_text(&self, text: &str) -> Result<(), DomainError>;
}
