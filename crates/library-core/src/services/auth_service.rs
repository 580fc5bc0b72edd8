// ============================================================================
// Library Core - Authentication Service
// File: crates/library-core/src/services/auth_service.rs
// ============================================================================
//! Campus login, local sync, token issuance and user administration

use std::sync::Arc;

use library_security::JwtService;
use library_shared::utils::{looks_like_email, mask_email};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Caller, ExternalIdentity, User, UserChanges, UserStatus, SUPER_ADMIN_ONLY};
use crate::error::{DomainError, GatewayError};
use crate::gateway::IdentityGateway;
use crate::repositories::UserRepository;
use crate::services::identity_sync::{IdentitySyncService, SyncedAccount};

/// Authentication service for the campus login flow
pub struct AuthService {
    gateway: Arc<dyn IdentityGateway>,
    sync: Arc<IdentitySyncService>,
    users: Arc<dyn UserRepository>,
    jwt: JwtService,
}

/// Result of a successful campus login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub campus_data: ExternalIdentity,
    pub local_user: SyncedAccount,
    pub access_token: String,
}

impl AuthService {
    pub fn new(
        gateway: Arc<dyn IdentityGateway>,
        sync: Arc<IdentitySyncService>,
        users: Arc<dyn UserRepository>,
        jwt: JwtService,
    ) -> Self {
        Self { gateway, sync, users, jwt }
    }

    /// Verify `email` with the campus, sync local records and issue a token
    pub async fn login_with_campus(&self, email: &str) -> Result<LoginOutcome, DomainError> {
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(DomainError::Validation("Invalid email format".into()));
        }
        info!("Login attempt for email: {}", mask_email(email));

        // 1. Verify with campus
        let campus = self.gateway.lookup(email).await.map_err(|e| {
            warn!("Campus verification failed for {}: {}", mask_email(email), e);
            match e {
                GatewayError::NotFound => {
                    DomainError::Unauthorized("User is not registered in Campus API".into())
                }
                other => other.into(),
            }
        })?;

        // 2. Mirror into local records
        let account = self.sync.sync_local_records(&campus).await?;

        // 3. Blacklisted accounts stay locked out
        if account.user.is_blacklisted() {
            warn!(user_id = %account.user.id, "Login refused: account blacklisted");
            return Err(DomainError::Forbidden("Account is blacklisted".into()));
        }

        // 4. Session token
        let access_token = self
            .jwt
            .generate_access_token(&account.user.id, account.user.role.as_str())
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        info!(user_id = %account.user.id, "Login successful");

        Ok(LoginOutcome {
            campus_data: campus,
            local_user: account,
            access_token,
        })
    }

    pub async fn list_users(&self, caller: &Caller) -> Result<Vec<User>, DomainError> {
        caller.require_any(SUPER_ADMIN_ONLY)?;
        self.users.list().await
    }

    /// Change role and/or status of an account
    pub async fn update_user(
        &self,
        caller: &Caller,
        id: &Uuid,
        changes: UserChanges,
    ) -> Result<User, DomainError> {
        caller.require_any(SUPER_ADMIN_ONLY)?;

        if changes.is_empty() {
            return Err(DomainError::Validation("Nothing to update".into()));
        }
        if *id == caller.user_id && changes.status == Some(UserStatus::Blacklist) {
            return Err(DomainError::Validation("You cannot blacklist your own account".into()));
        }

        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("User not found".into()))?;

        user.apply_changes(changes);
        let updated = self.users.update(&user).await?;

        info!(user_id = %updated.id, role = updated.role.as_str(), status = updated.status.as_str(), "User updated");
        Ok(updated)
    }
}
