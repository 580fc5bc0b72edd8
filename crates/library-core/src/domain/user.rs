// ============================================================================
// Library Core - User Entity
// File: crates/library-core/src/domain/user.rs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Local role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Lecturer,
    Staff,
    SuperAdmin,
    Unauthorized,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Lecturer => "lecturer",
            Role::Staff => "staff",
            Role::SuperAdmin => "super_admin",
            Role::Unauthorized => "unauthorized",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "lecturer" => Some(Role::Lecturer),
            "staff" => Some(Role::Staff),
            "super_admin" => Some(Role::SuperAdmin),
            "unauthorized" => Some(Role::Unauthorized),
            _ => None,
        }
    }

    /// Maps the role string used by the campus identity service.
    pub fn from_campus(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "mahasiswa" | "student" => Role::Student,
            "dosen" | "lecturer" => Role::Lecturer,
            "staff" => Role::Staff,
            "super_admin" => Role::SuperAdmin,
            _ => Role::Unauthorized,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Unauthorized
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blacklist,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blacklist => "blacklist",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(UserStatus::Active),
            "blacklist" => Some(UserStatus::Blacklist),
            _ => None,
        }
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin changes to an account (`PATCH /auth/users/:id`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.status.is_none()
    }
}

impl User {
    /// A user mirrored from a verified campus identity.
    pub fn verified(name: String, email: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            image: None,
            role,
            status: UserStatus::Active,
            email_verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_blacklisted(&self) -> bool {
        self.status == UserStatus::Blacklist
    }

    pub fn apply_changes(&mut self, changes: UserChanges) {
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}
