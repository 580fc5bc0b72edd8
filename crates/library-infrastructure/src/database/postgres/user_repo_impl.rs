// ============================================================================
// Library Infrastructure - PostgreSQL User Repository
// File: crates/library-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use library_core::domain::{Member, NewMember, Role, User, UserStatus};
use library_core::error::DomainError;
use library_core::repositories::UserRepository;

use super::member_repo_impl::{MemberRow, MEMBER_COLUMNS};
use crate::database::error::{db_error, map_db_error, ConstraintMessages};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) const USER_COLUMNS: &str =
    "id, name, email, image, role, status, email_verified, created_at, updated_at";

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: String,
    pub status: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            image: row.image,
            role: Role::from_str(&row.role).unwrap_or_default(),
            status: UserStatus::from_str(&row.status).unwrap_or_default(),
            email_verified: row.email_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const EMAIL_TAKEN: ConstraintMessages<'static> = ConstraintMessages {
    unique: "User with this email already exists",
    foreign_key: "Referenced record not found",
};

const MEMBER_TAKEN: ConstraintMessages<'static> = ConstraintMessages {
    unique: "Member already exists for this user",
    foreign_key: "User not found",
};

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find user by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find user by email", e))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list users", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_with_member(
        &self,
        user: &User,
        member: Option<NewMember>,
    ) -> Result<(User, Option<Member>), DomainError> {
        debug!(user_id = %user.id, with_member = member.is_some(), "Inserting user");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin user transaction", e))?;

        let user_row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, name, email, image, role, status, email_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.image)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.email_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("insert user", e, EMAIL_TAKEN))?;

        let member_row: Option<MemberRow> = match &member {
            Some(new) => Some(
                sqlx::query_as(&format!(
                    r#"
                    INSERT INTO members (user_id, member_type, nim_nidn, faculty, phone)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING {MEMBER_COLUMNS}
                    "#
                ))
                .bind(new.user_id)
                .bind(new.member_type.as_str())
                .bind(&new.nim_nidn)
                .bind(&new.faculty)
                .bind(&new.phone)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_db_error("insert member", e, MEMBER_TAKEN))?,
            ),
            None => None,
        };

        tx.commit()
            .await
            .map_err(|e| db_error("commit user transaction", e))?;

        info!(user_id = %user_row.id, "User inserted");
        Ok((user_row.into(), member_row.map(Into::into)))
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET name = $2, image = $3, role = $4, status = $5, email_verified = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.image)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.email_verified)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update user", e, EMAIL_TAKEN))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::NotFound("User not found".into()))
    }
}
