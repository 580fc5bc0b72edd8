// ============================================================================
// Library Core - Member Entity
// File: crates/library-core/src/domain/member.rs
// Description: Role-specific library profile, one per user
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberType {
    Student,
    Lecturer,
    Staff,
    SuperAdmin,
}

impl MemberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::Student => "student",
            MemberType::Lecturer => "lecturer",
            MemberType::Staff => "staff",
            MemberType::SuperAdmin => "super_admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(MemberType::Student),
            "lecturer" => Some(MemberType::Lecturer),
            "staff" => Some(MemberType::Staff),
            "super_admin" => Some(MemberType::SuperAdmin),
            _ => None,
        }
    }
}

impl Default for MemberType {
    fn default() -> Self {
        MemberType::Student
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i32,
    pub user_id: Uuid,
    pub member_type: MemberType,
    pub nim_nidn: String,
    pub faculty: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Member row as it is about to be inserted; the id comes from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub user_id: Uuid,
    pub member_type: MemberType,
    pub nim_nidn: String,
    pub faculty: String,
    pub phone: Option<String>,
}

/// Member joined with its owning user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    #[serde(flatten)]
    pub member: Member,
    pub user: User,
}

/// Self-service profile update (`PATCH /members/me`).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 5, max = 50, message = "NIM/NIDN must be between 5 and 50 characters"))]
    pub nim_nidn: Option<String>,

    #[validate(length(max = 200, message = "Faculty must be at most 200 characters"))]
    pub faculty: Option<String>,

    #[validate(length(max = 100, message = "Phone must be at most 100 characters"))]
    pub phone: Option<String>,
}

/// Admin-created member for an existing user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub user_id: Uuid,
    pub member_type: MemberType,

    #[validate(length(min = 5, max = 50, message = "NIM/NIDN must be between 5 and 50 characters"))]
    pub nim_nidn: String,

    #[validate(length(max = 200, message = "Faculty must be at most 200 characters"))]
    pub faculty: Option<String>,

    #[validate(length(max = 100, message = "Phone must be at most 100 characters"))]
    pub phone: Option<String>,
}

/// Admin update; every field optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberPatch {
    pub member_type: Option<MemberType>,

    #[validate(length(min = 5, max = 50, message = "NIM/NIDN must be between 5 and 50 characters"))]
    pub nim_nidn: Option<String>,

    #[validate(length(max = 200, message = "Faculty must be at most 200 characters"))]
    pub faculty: Option<String>,

    #[validate(length(max = 100, message = "Phone must be at most 100 characters"))]
    pub phone: Option<String>,
}

impl Member {
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        if let Some(nim_nidn) = update.nim_nidn {
            self.nim_nidn = nim_nidn.trim().to_string();
        }
        if let Some(faculty) = update.faculty {
            self.faculty = faculty.trim().to_string();
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone.trim().to_string()).filter(|p| !p.is_empty());
        }
        self.updated_at = Utc::now();
    }

    pub fn apply_patch(&mut self, patch: MemberPatch) {
        if let Some(member_type) = patch.member_type {
            self.member_type = member_type;
        }
        self.apply_profile(ProfileUpdate {
            nim_nidn: patch.nim_nidn,
            faculty: patch.faculty,
            phone: patch.phone,
        });
    }
}
