//! Identity record returned by the campus gateway

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use library_shared::constants::PLACEHOLDER_VALUE;

use super::member::{MemberType, NewMember};
use super::user::Role;

/// A person as known by the campus identity service.
///
/// Parsed leniently: every field except `email` may be missing or null upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdentity {
    #[serde(default, alias = "full_name", alias = "name", deserialize_with = "null_as_empty")]
    pub full_name: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub role: String,
    #[serde(default)]
    pub nim: Option<String>,
    #[serde(default)]
    pub nidn: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default, alias = "prodi")]
    pub major: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ExternalIdentity {
    pub fn nidn(&self) -> Option<&str> {
        present(&self.nidn)
    }

    pub fn nim(&self) -> Option<&str> {
        present(&self.nim)
    }

    /// NIDN wins over NIM when both are populated.
    pub fn institutional_id(&self) -> Option<&str> {
        self.nidn().or_else(|| self.nim())
    }

    pub fn local_role(&self) -> Role {
        Role::from_campus(&self.role)
    }

    /// `dosen` and NIDN holders are lecturers, `staff` is staff, everyone else
    /// is a student.
    pub fn member_type(&self) -> MemberType {
        match self.role.trim().to_lowercase().as_str() {
            "staff" => MemberType::Staff,
            "dosen" | "lecturer" => MemberType::Lecturer,
            _ if self.nidn().is_some() => MemberType::Lecturer,
            _ => MemberType::Student,
        }
    }

    pub fn display_name(&self) -> &str {
        let name = self.full_name.trim();
        if name.is_empty() {
            self.email.trim()
        } else {
            name
        }
    }

    /// Member row to create for `user_id`, if this identity carries a NIM/NIDN.
    pub fn new_member_for(&self, user_id: Uuid) -> Option<NewMember> {
        let nim_nidn = self.institutional_id()?;
        Some(NewMember {
            user_id,
            member_type: self.member_type(),
            nim_nidn: nim_nidn.to_string(),
            faculty: present(&self.faculty).unwrap_or(PLACEHOLDER_VALUE).to_string(),
            phone: present(&self.phone).map(str::to_string),
        })
    }
}
