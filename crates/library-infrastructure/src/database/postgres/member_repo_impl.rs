// ============================================================================
// Library Infrastructure - PostgreSQL Member Repository
// File: crates/library-infrastructure/src/database/postgres/member_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use library_core::domain::{Member, MemberProfile, MemberType, NewMember, Role, User, UserStatus};
use library_core::error::DomainError;
use library_core::repositories::MemberRepository;

use crate::database::error::{db_error, map_db_error, ConstraintMessages};

pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) const MEMBER_COLUMNS: &str =
    "id, user_id, member_type, nim_nidn, faculty, phone, created_at, updated_at";

#[derive(Debug, FromRow)]
pub(crate) struct MemberRow {
    pub id: i32,
    pub user_id: Uuid,
    pub member_type: String,
    pub nim_nidn: String,
    pub faculty: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id,
            user_id: row.user_id,
            member_type: MemberType::from_str(&row.member_type).unwrap_or_default(),
            nim_nidn: row.nim_nidn,
            faculty: row.faculty,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Member joined with its user (`/members/me`).
#[derive(Debug, FromRow)]
struct ProfileRow {
    pub id: i32,
    pub user_id: Uuid,
    pub member_type: String,
    pub nim_nidn: String,
    pub faculty: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
    pub user_image: Option<String>,
    pub user_role: String,
    pub user_status: String,
    pub user_email_verified: bool,
    pub user_created_at: DateTime<Utc>,
    pub user_updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for MemberProfile {
    fn from(row: ProfileRow) -> Self {
        MemberProfile {
            user: User {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                image: row.user_image,
                role: Role::from_str(&row.user_role).unwrap_or_default(),
                status: UserStatus::from_str(&row.user_status).unwrap_or_default(),
                email_verified: row.user_email_verified,
                created_at: row.user_created_at,
                updated_at: row.user_updated_at,
            },
            member: Member {
                id: row.id,
                user_id: row.user_id,
                member_type: MemberType::from_str(&row.member_type).unwrap_or_default(),
                nim_nidn: row.nim_nidn,
                faculty: row.faculty,
                phone: row.phone,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const MEMBER_CONSTRAINTS: ConstraintMessages<'static> = ConstraintMessages {
    unique: "Member already exists for this user",
    foreign_key: "User not found",
};

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find member by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_user_id(&self, user_id: &Uuid) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find member by user", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_profile_by_user_id(&self, user_id: &Uuid) -> Result<Option<MemberProfile>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT
                m.id, m.user_id, m.member_type, m.nim_nidn, m.faculty, m.phone,
                m.created_at, m.updated_at,
                u.name AS user_name, u.email AS user_email, u.image AS user_image,
                u.role AS user_role, u.status AS user_status,
                u.email_verified AS user_email_verified,
                u.created_at AS user_created_at, u.updated_at AS user_updated_at
            FROM members m
            JOIN users u ON u.id = m.user_id
            WHERE m.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find member profile", e))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Member>, DomainError> {
        let rows: Vec<MemberRow> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list members", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, member: &NewMember) -> Result<Member, DomainError> {
        let row: MemberRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO members (user_id, member_type, nim_nidn, faculty, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(member.user_id)
        .bind(member.member_type.as_str())
        .bind(&member.nim_nidn)
        .bind(&member.faculty)
        .bind(&member.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("insert member", e, MEMBER_CONSTRAINTS))?;

        Ok(row.into())
    }

    async fn update(&self, member: &Member) -> Result<Member, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            r#"
            UPDATE members
            SET member_type = $2, nim_nidn = $3, faculty = $4, phone = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(member.id)
        .bind(member.member_type.as_str())
        .bind(&member.nim_nidn)
        .bind(&member.faculty)
        .bind(&member.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update member", e, MEMBER_CONSTRAINTS))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::NotFound("Member not found".into()))
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete member", e))?;

        Ok(result.rows_affected() > 0)
    }
}
