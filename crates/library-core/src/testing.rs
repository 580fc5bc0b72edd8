//! In-memory adapters for service and handler tests.
//!
//! `InMemoryLibrary` enforces the same unique and foreign-key rules as the
//! Postgres schema so conflict paths behave like production.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use library_shared::utils::looks_like_email;
use library_shared::Pagination;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryInput, CategorySummary, Collection, CollectionDetail, CollectionDraft, CollectionType,
    ExternalIdentity, FacultyCount, GuestLog, MajorCount, Member, MemberProfile, NewGuestLog, NewMember, User,
};
use crate::error::{DomainError, GatewayError};
use crate::gateway::IdentityGateway;
use crate::repositories::{
    CategoryRepository, CollectionRepository, GuestLogRepository, MemberRepository, UserRepository,
};
use crate::storage::{CoverStore, CoverUpload};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    members: Vec<Member>,
    categories: Vec<Category>,
    collections: Vec<Collection>,
    guest_logs: Vec<GuestLog>,
    next_id: i32,
    fail_writes: bool,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes {
            Err(DomainError::Persistence("storage unavailable".into()))
        } else {
            Ok(())
        }
    }

    fn insert_member(&mut self, new: &NewMember) -> Result<Member, DomainError> {
        if !self.users.iter().any(|u| u.id == new.user_id) {
            return Err(DomainError::Validation("User not found".into()));
        }
        if self.members.iter().any(|m| m.user_id == new.user_id) {
            return Err(DomainError::Conflict("members_user_id_key".into()));
        }
        let now = Utc::now();
        let member = Member {
            id: self.next_id(),
            user_id: new.user_id,
            member_type: new.member_type,
            nim_nidn: new.nim_nidn.clone(),
            faculty: new.faculty.clone(),
            phone: new.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        self.members.push(member.clone());
        Ok(member)
    }

    fn detail(&self, collection: &Collection) -> CollectionDetail {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == collection.category_id)
            .map(|c| CategorySummary { id: c.id, name: c.name.clone() });
        CollectionDetail { collection: collection.clone(), category }
    }
}

#[derive(Default)]
pub struct InMemoryLibrary {
    tables: Mutex<Tables>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes every subsequent write fail with a persistence error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.tables().fail_writes = fail;
    }

    pub fn users(&self) -> Vec<User> {
        self.tables().users.clone()
    }

    pub fn members(&self) -> Vec<Member> {
        self.tables().members.clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.tables().categories.clone()
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.tables().collections.clone()
    }

    pub fn guest_logs(&self) -> Vec<GuestLog> {
        self.tables().guest_logs.clone()
    }

    pub fn seed_user(&self, user: User) {
        self.tables().users.push(user);
    }

    /// Replaces the stored row with the same id.
    pub fn set_user(&self, user: User) {
        let mut tables = self.tables();
        tables.users.retain(|u| u.id != user.id);
        tables.users.push(user);
    }

    pub async fn create_category(&self, input: CategoryInput) -> Category {
        CategoryRepository::create(self, &input)
            .await
            .unwrap_or_else(|e| panic!("seed category: {e}"))
    }

    pub fn seed_collection(&self, category_id: i32, title: &str) -> Collection {
        let mut tables = self.tables();
        let now = Utc::now();
        let collection = Collection {
            id: tables.next_id(),
            title: title.to_string(),
            author: "Andrea Hirata".into(),
            publisher: "Bentang Pustaka".into(),
            publication_year: "2005".into(),
            isbn: None,
            collection_type: CollectionType::PhysicalBook,
            category_id,
            description: None,
            image: None,
            created_at: now,
            updated_at: now,
        };
        tables.collections.push(collection.clone());
        collection
    }

    pub fn seed_guest_log(&self, email: &str, at: DateTime<Utc>) -> GuestLog {
        let mut tables = self.tables();
        let log = GuestLog {
            id: tables.next_id(),
            name: email.to_string(),
            email: email.to_string(),
            identifier: "-".into(),
            institution: "UMC".into(),
            faculty: None,
            major: None,
            visit_date: at,
            visit_day: at.date_naive(),
        };
        tables.guest_logs.push(log.clone());
        log
    }
}

#[async_trait]
impl UserRepository for InMemoryLibrary {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.tables().users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let mut users = self.users();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn create_with_member(
        &self,
        user: &User,
        member: Option<NewMember>,
    ) -> Result<(User, Option<Member>), DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict("users_email_key".into()));
        }
        tables.users.push(user.clone());

        let member = match member {
            Some(new) => match tables.insert_member(&new) {
                Ok(member) => Some(member),
                Err(e) => {
                    // roll back the user row
                    tables.users.retain(|u| u.id != user.id);
                    return Err(e);
                }
            },
            None => None,
        };
        Ok((user.clone(), member))
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| DomainError::NotFound("User not found".into()))?;
        *row = user.clone();
        Ok(user.clone())
    }
}

#[async_trait]
impl MemberRepository for InMemoryLibrary {
    async fn find_by_id(&self, id: i32) -> Result<Option<Member>, DomainError> {
        Ok(self.tables().members.iter().find(|m| m.id == id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &Uuid) -> Result<Option<Member>, DomainError> {
        Ok(self.tables().members.iter().find(|m| m.user_id == *user_id).cloned())
    }

    async fn find_profile_by_user_id(&self, user_id: &Uuid) -> Result<Option<MemberProfile>, DomainError> {
        let tables = self.tables();
        let member = tables.members.iter().find(|m| m.user_id == *user_id);
        let user = tables.users.iter().find(|u| u.id == *user_id);
        Ok(match (member, user) {
            (Some(member), Some(user)) => Some(MemberProfile { member: member.clone(), user: user.clone() }),
            _ => None,
        })
    }

    async fn list(&self) -> Result<Vec<Member>, DomainError> {
        let mut members = self.members();
        members.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(members)
    }

    async fn create(&self, member: &NewMember) -> Result<Member, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        tables.insert_member(member)
    }

    async fn update(&self, member: &Member) -> Result<Member, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        let row = tables
            .members
            .iter_mut()
            .find(|m| m.id == member.id)
            .ok_or_else(|| DomainError::NotFound("Member not found".into()))?;
        *row = member.clone();
        Ok(member.clone())
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        let before = tables.members.len();
        tables.members.retain(|m| m.id != id);
        Ok(tables.members.len() < before)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryLibrary {
    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = self.categories();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, DomainError> {
        Ok(self.tables().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, DomainError> {
        Ok(self.tables().categories.iter().find(|c| c.name == name).cloned())
    }

    async fn create(&self, input: &CategoryInput) -> Result<Category, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        if tables.categories.iter().any(|c| c.name == input.name) {
            return Err(DomainError::Conflict("categories_name_key".into()));
        }
        let now = Utc::now();
        let category = Category {
            id: tables.next_id(),
            name: input.name.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, category: &Category) -> Result<Category, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        if tables
            .categories
            .iter()
            .any(|c| c.name == category.name && c.id != category.id)
        {
            return Err(DomainError::Conflict("categories_name_key".into()));
        }
        let row = tables
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| DomainError::NotFound("Category not found".into()))?;
        *row = category.clone();
        Ok(category.clone())
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        if tables.collections.iter().any(|c| c.category_id == id) {
            return Err(DomainError::Conflict("collections_category_id_fkey".into()));
        }
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        Ok(tables.categories.len() < before)
    }

    async fn count_collections(&self, id: i32) -> Result<i64, DomainError> {
        Ok(self.tables().collections.iter().filter(|c| c.category_id == id).count() as i64)
    }
}

#[async_trait]
impl CollectionRepository for InMemoryLibrary {
    async fn list(&self, limit: i64) -> Result<Vec<CollectionDetail>, DomainError> {
        let tables = self.tables();
        let mut rows: Vec<&Collection> = tables.collections.iter().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|c| tables.detail(c))
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CollectionDetail>, DomainError> {
        let tables = self.tables();
        Ok(tables.collections.iter().find(|c| c.id == id).map(|c| tables.detail(c)))
    }

    async fn create(&self, draft: &CollectionDraft, image: Option<String>) -> Result<Collection, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        if !tables.categories.iter().any(|c| c.id == draft.category_id) {
            return Err(DomainError::Validation("Category not found".into()));
        }
        let now = Utc::now();
        let collection = Collection {
            id: tables.next_id(),
            title: draft.title.clone(),
            author: draft.author.clone(),
            publisher: draft.publisher.clone(),
            publication_year: draft.publication_year.clone(),
            isbn: draft.isbn.clone(),
            collection_type: draft.collection_type,
            category_id: draft.category_id,
            description: draft.description.clone(),
            image,
            created_at: now,
            updated_at: now,
        };
        tables.collections.push(collection.clone());
        Ok(collection)
    }

    async fn update(&self, collection: &Collection) -> Result<Collection, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        if !tables.categories.iter().any(|c| c.id == collection.category_id) {
            return Err(DomainError::Validation("Category not found".into()));
        }
        let row = tables
            .collections
            .iter_mut()
            .find(|c| c.id == collection.id)
            .ok_or_else(|| DomainError::NotFound("Collection not found".into()))?;
        *row = collection.clone();
        Ok(collection.clone())
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        let before = tables.collections.len();
        tables.collections.retain(|c| c.id != id);
        Ok(tables.collections.len() < before)
    }
}

#[async_trait]
impl GuestLogRepository for InMemoryLibrary {
    async fn list(&self, page: Pagination) -> Result<Vec<GuestLog>, DomainError> {
        let mut logs = self.guest_logs();
        logs.sort_by(|a, b| b.visit_date.cmp(&a.visit_date).then(b.id.cmp(&a.id)));
        Ok(logs
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(0))
            .take(page.limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, DomainError> {
        Ok(self.tables().guest_logs.len() as i64)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<GuestLog>, DomainError> {
        Ok(self.tables().guest_logs.iter().find(|g| g.id == id).cloned())
    }

    async fn find_for_day(&self, email: &str, day: NaiveDate) -> Result<Option<GuestLog>, DomainError> {
        Ok(self
            .tables()
            .guest_logs
            .iter()
            .find(|g| g.email == email && g.visit_day == day)
            .cloned())
    }

    async fn create(&self, log: &NewGuestLog) -> Result<GuestLog, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        if tables
            .guest_logs
            .iter()
            .any(|g| g.email == log.email && g.visit_day == log.visit_day)
        {
            return Err(DomainError::Conflict("guest_logs_email_visit_day_key".into()));
        }
        let created = GuestLog {
            id: tables.next_id(),
            name: log.name.clone(),
            email: log.email.clone(),
            identifier: log.identifier.clone(),
            institution: log.institution.clone(),
            faculty: log.faculty.clone(),
            major: log.major.clone(),
            visit_date: log.visit_date,
            visit_day: log.visit_day,
        };
        tables.guest_logs.push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        tables.check_writable()?;
        let before = tables.guest_logs.len();
        tables.guest_logs.retain(|g| g.id != id);
        Ok(tables.guest_logs.len() < before)
    }

    async fn count_by_faculty(&self) -> Result<Vec<FacultyCount>, DomainError> {
        let counts = group_counts(self.tables().guest_logs.iter().map(|g| g.faculty.clone()));
        Ok(counts
            .into_iter()
            .map(|(faculty, count)| FacultyCount { faculty, count })
            .collect())
    }

    async fn count_by_major(&self) -> Result<Vec<MajorCount>, DomainError> {
        let counts = group_counts(self.tables().guest_logs.iter().map(|g| g.major.clone()));
        Ok(counts
            .into_iter()
            .map(|(major, count)| MajorCount { major, count })
            .collect())
    }
}

/// Counts per key, largest group first.
fn group_counts(keys: impl Iterator<Item = Option<String>>) -> Vec<(Option<String>, i64)> {
    let mut counts: BTreeMap<Option<String>, i64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Campus directory backed by a map of known identities.
#[derive(Default)]
pub struct StubGateway {
    identities: Mutex<HashMap<String, ExternalIdentity>>,
    failure: Mutex<Option<GatewayError>>,
    calls: AtomicUsize,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(self, identity: ExternalIdentity) -> Self {
        self.insert(identity);
        self
    }

    pub fn insert(&self, identity: ExternalIdentity) {
        let key = identity.email.trim().to_lowercase();
        self.identities
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key, identity);
    }

    /// Every lookup from now on fails with `err`.
    pub fn fail_with(&self, err: GatewayError) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(err);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityGateway for StubGateway {
    async fn lookup(&self, email: &str) -> Result<ExternalIdentity, GatewayError> {
        if !looks_like_email(email) {
            return Err(GatewayError::InvalidInput);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure.lock().unwrap_or_else(|p| p.into_inner()).clone() {
            return Err(err);
        }
        self.identities
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&email.trim().to_lowercase())
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn list_identities(&self) -> Result<Vec<ExternalIdentity>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure.lock().unwrap_or_else(|p| p.into_inner()).clone() {
            return Err(err);
        }
        let mut all: Vec<ExternalIdentity> = self
            .identities
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(all)
    }
}

/// Cover store that only remembers references.
#[derive(Default)]
pub struct MemoryCoverStore {
    stored: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl MemoryCoverStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl CoverStore for MemoryCoverStore {
    async fn save(&self, upload: CoverUpload) -> Result<String, DomainError> {
        let ext = upload.check()?;
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = format!("/uploads/covers/cover-{n}.{ext}");
        self.stored
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(reference.clone());
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> Result<(), DomainError> {
        self.stored
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .retain(|r| r != reference);
        Ok(())
    }
}

pub fn student_identity(email: &str, nim: &str) -> ExternalIdentity {
    ExternalIdentity {
        full_name: "Rizqi Noor Fauzan".into(),
        email: email.into(),
        role: "mahasiswa".into(),
        nim: Some(nim.to_string()).filter(|n| !n.is_empty()),
        nidn: None,
        faculty: None,
        major: None,
        phone: None,
    }
}

pub fn staff_identity(email: &str) -> ExternalIdentity {
    ExternalIdentity {
        full_name: "Library Staff".into(),
        email: email.into(),
        role: "staff".into(),
        nim: None,
        nidn: None,
        faculty: None,
        major: None,
        phone: None,
    }
}
