//! Campus identity gateway (port)

use async_trait::async_trait;

use crate::domain::ExternalIdentity;
use crate::error::GatewayError;

/// Looks people up in the campus identity service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn lookup(&self, email: &str) -> Result<ExternalIdentity, GatewayError>;

    /// Everyone the campus service knows about, for picking a guest.
    async fn list_identities(&self) -> Result<Vec<ExternalIdentity>, GatewayError>;
}
