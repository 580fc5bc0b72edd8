// ============================================================================
// Library Core - Guest Book Service
// File: crates/library-core/src/services/guest_service.rs
// ============================================================================
//! Daily visitor check-in backed by the campus identity service.
//!
//! A guest is keyed by the lower-cased email and the calendar day in the
//! library's local offset; the `(email, visit_day)` unique index is the final
//! word on duplicates.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use library_shared::constants::PLACEHOLDER_VALUE;
use library_shared::utils::{local_day, looks_like_email, mask_email, offset_from_hours};
use library_shared::{PageMeta, Pagination};
use tracing::{info, warn};

use crate::domain::{Caller, ExternalIdentity, GuestLog, GuestPage, GuestStats, NewGuestLog, LIBRARY_STAFF};
use crate::error::{DomainError, GatewayError};
use crate::gateway::IdentityGateway;
use crate::repositories::GuestLogRepository;

pub struct GuestService {
    gateway: Arc<dyn IdentityGateway>,
    guests: Arc<dyn GuestLogRepository>,
    offset: FixedOffset,
    institution: String,
}

impl GuestService {
    pub fn new(
        gateway: Arc<dyn IdentityGateway>,
        guests: Arc<dyn GuestLogRepository>,
        utc_offset_hours: i32,
        default_institution: String,
    ) -> Self {
        Self {
            gateway,
            guests,
            offset: offset_from_hours(utc_offset_hours),
            institution: default_institution,
        }
    }

    pub async fn check_in(&self, caller: &Caller, email: &str) -> Result<GuestLog, DomainError> {
        self.check_in_at(caller, email, Utc::now()).await
    }

    pub(crate) async fn check_in_at(
        &self,
        caller: &Caller,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<GuestLog, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;

        let email = email.trim().to_lowercase();
        if !looks_like_email(&email) {
            return Err(DomainError::Validation("Invalid email format".into()));
        }

        let identity = self.gateway.lookup(&email).await.map_err(|e| {
            warn!(email = %mask_email(&email), "Guest lookup failed: {}", e);
            match e {
                GatewayError::NotFound => DomainError::NotFound("Guest not found in Campus API".into()),
                other => other.into(),
            }
        })?;

        let visit_day = local_day(now, self.offset);
        if let Some(existing) = self.guests.find_for_day(&email, visit_day).await? {
            info!(guest_log_id = existing.id, %visit_day, "Guest already checked in");
            return Err(DomainError::AlreadyCheckedIn(Box::new(existing)));
        }

        let log = NewGuestLog {
            name: identity.display_name().to_string(),
            email: email.clone(),
            identifier: identity
                .institutional_id()
                .unwrap_or(PLACEHOLDER_VALUE)
                .to_string(),
            institution: self.institution.clone(),
            faculty: identity.faculty.clone(),
            major: identity.major.clone(),
            visit_date: now,
            visit_day,
        };

        match self.guests.create(&log).await {
            Ok(created) => {
                info!(guest_log_id = created.id, %visit_day, "Guest checked in");
                Ok(created)
            }
            Err(e) if e.is_conflict() => {
                let existing = self.guests.find_for_day(&email, visit_day).await?.ok_or_else(|| {
                    DomainError::Persistence("Guest log missing after conflict".into())
                })?;
                Err(DomainError::AlreadyCheckedIn(Box::new(existing)))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self, caller: &Caller, pagination: Pagination) -> Result<GuestPage, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;

        let logs = self.guests.list(pagination).await?;
        let total = self.guests.count().await?;

        Ok(GuestPage {
            logs,
            meta: PageMeta::new(total, pagination),
        })
    }

    pub async fn get_by_id(&self, caller: &Caller, id: i32) -> Result<GuestLog, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        self.guests
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Guest log not found".into()))
    }

    pub async fn delete(&self, caller: &Caller, id: i32) -> Result<(), DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        if !self.guests.delete(id).await? {
            return Err(DomainError::NotFound("Guest log not found".into()));
        }
        info!(guest_log_id = id, "Guest log deleted");
        Ok(())
    }

    /// Campus people a guest can be picked from before checking in.
    pub async fn campus_directory(&self, caller: &Caller) -> Result<Vec<ExternalIdentity>, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        let people = self.gateway.list_identities().await.map_err(|e| {
            warn!("Campus directory fetch failed: {}", e);
            DomainError::from(e)
        })?;
        info!(count = people.len(), "Campus directory fetched");
        Ok(people)
    }

    pub async fn stats(&self, caller: &Caller) -> Result<GuestStats, DomainError> {
        caller.require_any(LIBRARY_STAFF)?;
        Ok(GuestStats {
            by_faculty: self.guests.count_by_faculty().await?,
            by_major: self.guests.count_by_major().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::repositories::MockGuestLogRepository;
    use crate::testing::{student_identity, InMemoryLibrary, StubGateway};
    use chrono::{NaiveDate, TimeZone};
    use uuid::Uuid;

    fn staff() -> Caller {
        Caller::new(Uuid::new_v4(), Role::Staff)
    }

    fn gateway() -> Arc<StubGateway> {
        let mut identity = student_identity("guest@campus.ac.id", "12345678");
        identity.faculty = Some("Teknik".into());
        identity.major = Some("Informatika".into());
        Arc::new(StubGateway::new().with_identity(identity))
    }

    fn service(store: &Arc<InMemoryLibrary>, gateway: Arc<StubGateway>) -> GuestService {
        GuestService::new(gateway, store.clone(), 7, "UMC".into())
    }

    #[tokio::test]
    async fn test_check_in_records_identity() {
        let store = Arc::new(InMemoryLibrary::new());
        let guests = service(&store, gateway());

        let log = guests.check_in(&staff(), " Guest@Campus.ac.id ").await.unwrap();

        assert_eq!(log.email, "guest@campus.ac.id");
        assert_eq!(log.identifier, "12345678");
        assert_eq!(log.institution, "UMC");
        assert_eq!(log.faculty.as_deref(), Some("Teknik"));
        assert_eq!(log.major.as_deref(), Some("Informatika"));
    }

    #[tokio::test]
    async fn test_second_check_in_same_day_returns_original() {
        let store = Arc::new(InMemoryLibrary::new());
        let guests = service(&store, gateway());
        let morning = Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap();
        let afternoon = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

        let first = guests.check_in_at(&staff(), "guest@campus.ac.id", morning).await.unwrap();
        let err = guests
            .check_in_at(&staff(), "guest@campus.ac.id", afternoon)
            .await
            .unwrap_err();

        match err {
            DomainError::AlreadyCheckedIn(existing) => assert_eq!(*existing, first),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.guest_logs().len(), 1);
    }

    #[tokio::test]
    async fn test_day_follows_library_offset() {
        let store = Arc::new(InMemoryLibrary::new());
        let guests = service(&store, gateway());
        // 16:30 UTC is already the next day at UTC+7
        let late = Utc.with_ymd_and_hms(2026, 3, 1, 16, 30, 0).unwrap();
        let next_morning = Utc.with_ymd_and_hms(2026, 3, 2, 2, 0, 0).unwrap();

        let log = guests.check_in_at(&staff(), "guest@campus.ac.id", late).await.unwrap();
        assert_eq!(log.visit_day, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());

        let err = guests
            .check_in_at(&staff(), "guest@campus.ac.id", next_morning)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyCheckedIn(_)));
    }

    #[tokio::test]
    async fn test_unknown_guest_is_not_found() {
        let store = Arc::new(InMemoryLibrary::new());
        let guests = service(&store, gateway());

        let err = guests.check_in(&staff(), "ghost@campus.ac.id").await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(store.guest_logs().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_timeout_bubbles_up() {
        let store = Arc::new(InMemoryLibrary::new());
        let gw = gateway();
        gw.fail_with(GatewayError::UpstreamTimeout);

        let err = service(&store, gw).check_in(&staff(), "guest@campus.ac.id").await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamTimeout));
    }

    #[tokio::test]
    async fn test_malformed_email_skips_lookup() {
        let store = Arc::new(InMemoryLibrary::new());
        let gw = gateway();
        let guests = service(&store, gw.clone());

        let err = guests.check_in(&staff(), "not-an-email").await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(gw.calls(), 0);
    }

    #[tokio::test]
    async fn test_insert_race_reports_existing_log() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 3, 0, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let winner = GuestLog {
            id: 11,
            name: "Guest".into(),
            email: "guest@campus.ac.id".into(),
            identifier: "12345678".into(),
            institution: "UMC".into(),
            faculty: None,
            major: None,
            visit_date: now,
            visit_day: day,
        };

        let mut repo = MockGuestLogRepository::new();
        let mut reads = 0;
        repo.expect_find_for_day().times(2).returning(move |_, _| {
            reads += 1;
            Ok(if reads == 1 { None } else { Some(winner.clone()) })
        });
        repo.expect_create()
            .times(1)
            .returning(|_| Err(DomainError::Conflict("duplicate visit".into())));

        let guests = GuestService::new(gateway(), Arc::new(repo), 7, "UMC".into());
        let err = guests.check_in_at(&staff(), "guest@campus.ac.id", now).await.unwrap_err();

        assert!(matches!(err, DomainError::AlreadyCheckedIn(ref log) if log.id == 11));
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let store = Arc::new(InMemoryLibrary::new());
        for email in ["a@campus.ac.id", "b@campus.ac.id", "c@campus.ac.id"] {
            store.seed_guest_log(email, Utc::now());
        }
        let guests = service(&store, gateway());

        let page = guests.list(&staff(), Pagination::from_query(Some(1), Some(2))).await.unwrap();

        assert_eq!(page.logs.len(), 2);
        assert_eq!(page.logs[0].email, "c@campus.ac.id");
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.limit, 2);
    }

    #[tokio::test]
    async fn test_stats_group_counts() {
        let store = Arc::new(InMemoryLibrary::new());
        let guests = service(&store, gateway());
        guests.check_in(&staff(), "guest@campus.ac.id").await.unwrap();

        let stats = guests.stats(&staff()).await.unwrap();

        assert_eq!(stats.by_faculty.len(), 1);
        assert_eq!(stats.by_faculty[0].faculty.as_deref(), Some("Teknik"));
        assert_eq!(stats.by_faculty[0].count, 1);
        assert_eq!(stats.by_major[0].major.as_deref(), Some("Informatika"));
    }

    #[tokio::test]
    async fn test_students_cannot_view_guest_book() {
        let store = Arc::new(InMemoryLibrary::new());
        let guests = service(&store, gateway());
        let student = Caller::new(Uuid::new_v4(), Role::Student);

        assert!(matches!(
            guests.list(&student, Pagination::default()).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_campus_directory_for_staff_only() {
        let store = Arc::new(InMemoryLibrary::new());
        let stub = gateway();
        stub.insert(student_identity("another@campus.ac.id", ""));
        let guests = service(&store, stub);

        let people = guests.campus_directory(&staff()).await.unwrap();
        let emails: Vec<&str> = people.iter().map(|p| p.email.as_str()).collect();
        assert_eq!(emails, vec!["another@campus.ac.id", "guest@campus.ac.id"]);

        let student = Caller::new(Uuid::new_v4(), Role::Student);
        let err = guests.campus_directory(&student).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_campus_directory_timeout_surfaces() {
        let store = Arc::new(InMemoryLibrary::new());
        let stub = gateway();
        stub.fail_with(GatewayError::UpstreamTimeout);
        let guests = service(&store, stub);

        let err = guests.campus_directory(&staff()).await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamTimeout));
    }
}
