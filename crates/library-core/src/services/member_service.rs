// ============================================================================
// Library Core - Member Service
// File: crates/library-core/src/services/member_service.rs
// ============================================================================

use std::sync::Arc;

use library_shared::constants::PLACEHOLDER_VALUE;
use tracing::info;
use validator::Validate;

use crate::domain::{
    Caller, Member, MemberDraft, MemberPatch, MemberProfile, NewMember, ProfileUpdate, LIBRARY_STAFF,
};
use crate::error::DomainError;
use crate::repositories::{MemberRepository, UserRepository};

pub struct MemberService {
    members: Arc<dyn MemberRepository>,
    users: Arc<dyn UserRepository>,
}

impl MemberService {
    pub fn new(members: Arc<dyn MemberRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { members, users }
    }

    /// The caller's own member profile, joined with the user.
    pub async fn get_me(&self, caller: &Caller) -> Result<MemberProfile, DomainError> {
        self.members
            .find_profile_by_user_id(&caller.user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Member profile not found".into()))
    }

    pub async fn update_me(&self, caller: &Caller, update: ProfileUpdate) -> Result<MemberProfile, DomainError> {
        update.validate()?;

        let mut member = self
            .members
            .find_by_user_id(&caller.user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Member profile not found".into()))?;

        member.apply_profile(update);
        self.members.update(&member).await?;

        info!(member_id = member.id, "Member updated own profile");
        self.get_me(caller).await
    }

    pub async fn list(&self, caller: &Caller) -> Result<Vec<Member>, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        self.members.list().await
    }

    pub async fn get_by_id(&self, caller: &Caller, id: i32) -> Result<Member, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        self.find(id).await
    }

    /// Registers a member for an existing user.
    pub async fn create(&self, caller: &Caller, draft: MemberDraft) -> Result<Member, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        draft.validate()?;

        if self.users.find_by_id(&draft.user_id).await?.is_none() {
            return Err(DomainError::NotFound("User not found".into()));
        }
        if self.members.find_by_user_id(&draft.user_id).await?.is_some() {
            return Err(already_member());
        }

        let new_member = NewMember {
            user_id: draft.user_id,
            member_type: draft.member_type,
            nim_nidn: draft.nim_nidn.trim().to_string(),
            faculty: draft
                .faculty
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_VALUE.to_string()),
            phone: draft.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
        };

        let member = self
            .members
            .create(&new_member)
            .await
            .map_err(|e| if e.is_conflict() { already_member() } else { e })?;

        info!(member_id = member.id, user_id = %member.user_id, "Member created");
        Ok(member)
    }

    pub async fn update(&self, caller: &Caller, id: i32, patch: MemberPatch) -> Result<Member, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        patch.validate()?;

        let mut member = self.find(id).await?;
        member.apply_patch(patch);
        let updated = self.members.update(&member).await?;

        info!(member_id = id, "Member updated");
        Ok(updated)
    }

    pub async fn delete(&self, caller: &Caller, id: i32) -> Result<(), DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        if !self.members.delete(id).await? {
            return Err(DomainError::NotFound("Member not found".into()));
        }
        info!(member_id = id, "Member deleted");
        Ok(())
    }

    async fn find(&self, id: i32) -> Result<Member, DomainError> {
        self.members
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Member not found".into()))
    }
}

fn already_member() -> DomainError {
    DomainError::Conflict("User is already registered as a member".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MemberType, Role, User};
    use crate::testing::InMemoryLibrary;
    use uuid::Uuid;

    fn staff() -> Caller {
        Caller::new(Uuid::new_v4(), Role::Staff)
    }

    fn draft(user_id: Uuid) -> MemberDraft {
        MemberDraft {
            user_id,
            member_type: MemberType::Student,
            nim_nidn: "12345678".into(),
            faculty: None,
            phone: Some("0812".into()),
        }
    }

    fn seeded() -> (Arc<InMemoryLibrary>, MemberService, User) {
        let store = Arc::new(InMemoryLibrary::new());
        let user = User::verified("Andi".into(), "andi@campus.ac.id".into(), Role::Student);
        store.seed_user(user.clone());
        let service = MemberService::new(store.clone(), store.clone());
        (store, service, user)
    }

    #[tokio::test]
    async fn test_create_member_for_existing_user() {
        let (_, service, user) = seeded();

        let member = service.create(&staff(), draft(user.id)).await.unwrap();

        assert_eq!(member.user_id, user.id);
        assert_eq!(member.faculty, "-");
    }

    #[tokio::test]
    async fn test_second_member_for_user_conflicts() {
        let (store, service, user) = seeded();
        service.create(&staff(), draft(user.id)).await.unwrap();

        let err = service.create(&staff(), draft(user.id)).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(store.members().len(), 1);
    }

    #[tokio::test]
    async fn test_create_for_missing_user() {
        let (_, service, _) = seeded();
        let err = service.create(&staff(), draft(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_me_roundtrip() {
        let (_, service, user) = seeded();
        service.create(&staff(), draft(user.id)).await.unwrap();
        let me = Caller::new(user.id, Role::Student);

        let profile = service
            .update_me(&me, ProfileUpdate { faculty: Some("Teknik".into()), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(profile.member.faculty, "Teknik");
        assert_eq!(profile.user.email, "andi@campus.ac.id");
    }

    #[tokio::test]
    async fn test_me_without_member() {
        let (_, service, user) = seeded();
        let me = Caller::new(user.id, Role::Student);
        assert!(matches!(service.get_me(&me).await, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_me_rejects_short_nim() {
        let (_, service, user) = seeded();
        service.create(&staff(), draft(user.id)).await.unwrap();
        let me = Caller::new(user.id, Role::Student);

        let err = service
            .update_me(&me, ProfileUpdate { nim_nidn: Some("12".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_admin_update_and_delete() {
        let (store, service, user) = seeded();
        let member = service.create(&staff(), draft(user.id)).await.unwrap();

        let updated = service
            .update(&staff(), member.id, MemberPatch { member_type: Some(MemberType::Lecturer), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.member_type, MemberType::Lecturer);

        service.delete(&staff(), member.id).await.unwrap();
        assert!(store.members().is_empty());
        assert!(matches!(service.delete(&staff(), member.id).await, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_students_cannot_list_members() {
        let (_, service, user) = seeded();
        let me = Caller::new(user.id, Role::Student);
        assert!(matches!(service.list(&me).await, Err(DomainError::Forbidden(_))));
    }
}
