// ============================================================================
// Library Core - Identity Synchronization Service
// File: crates/library-core/src/services/identity_sync.rs
// ============================================================================
//! Mirrors a verified campus identity into local user/member records.

use std::sync::Arc;

use library_shared::utils::{looks_like_email, mask_email};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::{ExternalIdentity, Member, User};
use crate::error::DomainError;
use crate::repositories::{MemberRepository, UserRepository};

/// Local records backing a campus identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedAccount {
    pub user: User,
    pub member: Option<Member>,
}

pub struct IdentitySyncService {
    users: Arc<dyn UserRepository>,
    members: Arc<dyn MemberRepository>,
}

impl IdentitySyncService {
    pub fn new(users: Arc<dyn UserRepository>, members: Arc<dyn MemberRepository>) -> Self {
        Self { users, members }
    }

    /// Ensures a local user exists for `identity` and, when it carries a
    /// NIM/NIDN, exactly one member. Existing rows are returned untouched.
    pub async fn sync_local_records(&self, identity: &ExternalIdentity) -> Result<SyncedAccount, DomainError> {
        let email = identity.email.trim();
        if !looks_like_email(email) {
            return Err(DomainError::Validation("Campus identity has no valid email".into()));
        }

        info!(email = %mask_email(email), role = %identity.role, "Syncing local records");

        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                let user = User::verified(
                    identity.display_name().to_string(),
                    email.to_string(),
                    identity.local_role(),
                );
                let member = identity.new_member_for(user.id);

                match self.users.create_with_member(&user, member).await {
                    Ok((user, member)) => {
                        info!(user_id = %user.id, has_member = member.is_some(), "Local user created");
                        return Ok(SyncedAccount { user, member });
                    }
                    Err(e) if e.is_conflict() => {
                        // Another request created the user first; continue with its row.
                        warn!(email = %mask_email(email), "User created concurrently, re-reading");
                        self.users.find_by_email(email).await?.ok_or_else(|| {
                            DomainError::Persistence(format!("User {} missing after conflict", mask_email(email)))
                        })?
                    }
                    Err(e) => {
                        error!(email = %mask_email(email), "Failed to create local user: {}", e);
                        return Err(e);
                    }
                }
            }
        };

        let member = self.ensure_member(&user, identity).await?;
        Ok(SyncedAccount { user, member })
    }

    async fn ensure_member(&self, user: &User, identity: &ExternalIdentity) -> Result<Option<Member>, DomainError> {
        if let Some(existing) = self.members.find_by_user_id(&user.id).await? {
            debug!(user_id = %user.id, "Member already synced");
            return Ok(Some(existing));
        }

        let Some(new_member) = identity.new_member_for(user.id) else {
            return Ok(None);
        };

        match self.members.create(&new_member).await {
            Ok(member) => {
                info!(user_id = %user.id, member_type = member.member_type.as_str(), "Member synced");
                Ok(Some(member))
            }
            Err(e) if e.is_conflict() => {
                warn!(user_id = %user.id, "Member created concurrently, re-reading");
                self.members.find_by_user_id(&user.id).await
            }
            Err(e) => {
                error!(user_id = %user.id, "Failed to sync member: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MemberType, Role};
    use crate::repositories::{MockMemberRepository, MockUserRepository};
    use crate::testing::{student_identity, InMemoryLibrary};

    fn service(store: &Arc<InMemoryLibrary>) -> IdentitySyncService {
        IdentitySyncService::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_first_sync_creates_user_and_member() {
        let store = Arc::new(InMemoryLibrary::new());
        let identity = student_identity("rizqi@campus.ac.id", "12345678");

        let account = service(&store).sync_local_records(&identity).await.unwrap();

        assert_eq!(account.user.email, "rizqi@campus.ac.id");
        assert_eq!(account.user.role, Role::Student);
        assert!(account.user.email_verified);
        let member = account.member.unwrap();
        assert_eq!(member.member_type, MemberType::Student);
        assert_eq!(member.nim_nidn, "12345678");
        assert_eq!(store.users().len(), 1);
        assert_eq!(store.members().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let store = Arc::new(InMemoryLibrary::new());
        let identity = student_identity("rizqi@campus.ac.id", "12345678");
        let sync = service(&store);

        let first = sync.sync_local_records(&identity).await.unwrap();
        let second = sync.sync_local_records(&identity).await.unwrap();

        assert_eq!(store.users().len(), 1);
        assert_eq!(store.members().len(), 1);
        assert_eq!(first.user.id, second.user.id);
        assert_eq!(first.member, second.member);
    }

    #[tokio::test]
    async fn test_existing_member_is_not_overwritten() {
        let store = Arc::new(InMemoryLibrary::new());
        let sync = service(&store);
        let first = sync
            .sync_local_records(&student_identity("rizqi@campus.ac.id", "12345678"))
            .await
            .unwrap();

        let mut changed = student_identity("rizqi@campus.ac.id", "87654321");
        changed.faculty = Some("Ekonomi".into());
        let second = sync.sync_local_records(&changed).await.unwrap();

        assert_eq!(second.member, first.member);
        assert_eq!(second.member.unwrap().nim_nidn, "12345678");
    }

    #[tokio::test]
    async fn test_identity_without_institutional_id_has_no_member() {
        let store = Arc::new(InMemoryLibrary::new());
        let mut identity = student_identity("staff@campus.ac.id", "");
        identity.role = "staff".into();
        identity.nim = None;

        let account = service(&store).sync_local_records(&identity).await.unwrap();

        assert_eq!(account.user.role, Role::Staff);
        assert!(account.member.is_none());
        assert!(store.members().is_empty());
    }

    #[tokio::test]
    async fn test_existing_user_without_member_gets_one() {
        let store = Arc::new(InMemoryLibrary::new());
        let user = User::verified("Old".into(), "old@campus.ac.id".into(), Role::Student);
        store.seed_user(user.clone());

        let account = service(&store)
            .sync_local_records(&student_identity("old@campus.ac.id", "11112222"))
            .await
            .unwrap();

        assert_eq!(account.user.id, user.id);
        assert_eq!(account.member.unwrap().user_id, user.id);
    }

    #[tokio::test]
    async fn test_insert_failure_is_persistence_error() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create_with_member()
            .times(1)
            .returning(|_, _| Err(DomainError::Persistence("connection reset".into())));
        let mut members = MockMemberRepository::new();
        members.expect_create().never();

        let sync = IdentitySyncService::new(Arc::new(users), Arc::new(members));
        let result = sync
            .sync_local_records(&student_identity("rizqi@campus.ac.id", "12345678"))
            .await;

        assert!(matches!(result, Err(DomainError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_concurrent_user_creation_uses_winner() {
        let winner = User::verified("Winner".into(), "race@campus.ac.id".into(), Role::Student);
        let winner_id = winner.id;

        let mut users = MockUserRepository::new();
        let mut lookups = 0;
        users.expect_find_by_email().times(2).returning(move |_| {
            lookups += 1;
            Ok(if lookups == 1 { None } else { Some(winner.clone()) })
        });
        users
            .expect_create_with_member()
            .returning(|_, _| Err(DomainError::Conflict("email taken".into())));

        let mut members = MockMemberRepository::new();
        members.expect_find_by_user_id().returning(|_| Ok(None));
        members.expect_create().returning(|m| {
            let now = chrono::Utc::now();
            Ok(Member {
                id: 7,
                user_id: m.user_id,
                member_type: m.member_type,
                nim_nidn: m.nim_nidn.clone(),
                faculty: m.faculty.clone(),
                phone: m.phone.clone(),
                created_at: now,
                updated_at: now,
            })
        });

        let sync = IdentitySyncService::new(Arc::new(users), Arc::new(members));
        let account = sync
            .sync_local_records(&student_identity("race@campus.ac.id", "12345678"))
            .await
            .unwrap();

        assert_eq!(account.user.id, winner_id);
        assert_eq!(account.member.unwrap().id, 7);
    }
}
