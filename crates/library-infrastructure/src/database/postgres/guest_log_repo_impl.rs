// ============================================================================
// Library Infrastructure - PostgreSQL Guest Log Repository
// File: crates/library-infrastructure/src/database/postgres/guest_log_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use library_core::domain::{FacultyCount, GuestLog, MajorCount, NewGuestLog};
use library_core::error::DomainError;
use library_core::repositories::GuestLogRepository;
use library_shared::Pagination;

use crate::database::error::{db_error, map_db_error, ConstraintMessages};

pub struct PgGuestLogRepository {
    pool: PgPool,
}

impl PgGuestLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const GUEST_COLUMNS: &str =
    "id, name, email, identifier, institution, faculty, major, visit_date, visit_day";

#[derive(Debug, FromRow)]
struct GuestLogRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub identifier: String,
    pub institution: String,
    pub faculty: Option<String>,
    pub major: Option<String>,
    pub visit_date: DateTime<Utc>,
    pub visit_day: NaiveDate,
}

impl From<GuestLogRow> for GuestLog {
    fn from(row: GuestLogRow) -> Self {
        GuestLog {
            id: row.id,
            name: row.name,
            email: row.email,
            identifier: row.identifier,
            institution: row.institution,
            faculty: row.faculty,
            major: row.major,
            visit_date: row.visit_date,
            visit_day: row.visit_day,
        }
    }
}

#[derive(Debug, FromRow)]
struct GroupRow {
    pub key: Option<String>,
    pub count: i64,
}

const ONE_VISIT_PER_DAY: ConstraintMessages<'static> = ConstraintMessages {
    unique: "Guest already checked in today",
    foreign_key: "Referenced record not found",
};

#[async_trait]
impl GuestLogRepository for PgGuestLogRepository {
    async fn list(&self, page: Pagination) -> Result<Vec<GuestLog>, DomainError> {
        let rows: Vec<GuestLogRow> = sqlx::query_as(&format!(
            "SELECT {GUEST_COLUMNS} FROM guest_logs ORDER BY visit_date DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list guest logs", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM guest_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("count guest logs", e))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<GuestLog>, DomainError> {
        let row: Option<GuestLogRow> = sqlx::query_as(&format!(
            "SELECT {GUEST_COLUMNS} FROM guest_logs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find guest log", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_for_day(&self, email: &str, day: NaiveDate) -> Result<Option<GuestLog>, DomainError> {
        let row: Option<GuestLogRow> = sqlx::query_as(&format!(
            "SELECT {GUEST_COLUMNS} FROM guest_logs WHERE email = $1 AND visit_day = $2"
        ))
        .bind(email)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find guest visit", e))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, log: &NewGuestLog) -> Result<GuestLog, DomainError> {
        let row: GuestLogRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO guest_logs
                (name, email, identifier, institution, faculty, major, visit_date, visit_day)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {GUEST_COLUMNS}
            "#
        ))
        .bind(&log.name)
        .bind(&log.email)
        .bind(&log.identifier)
        .bind(&log.institution)
        .bind(&log.faculty)
        .bind(&log.major)
        .bind(log.visit_date)
        .bind(log.visit_day)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("insert guest log", e, ONE_VISIT_PER_DAY))?;

        Ok(row.into())
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM guest_logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete guest log", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_faculty(&self) -> Result<Vec<FacultyCount>, DomainError> {
        let rows: Vec<GroupRow> = sqlx::query_as(
            "SELECT faculty AS key, COUNT(*) AS count FROM guest_logs GROUP BY faculty ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("count guests by faculty", e))?;

        Ok(rows
            .into_iter()
            .map(|r| FacultyCount { faculty: r.key, count: r.count })
            .collect())
    }

    async fn count_by_major(&self) -> Result<Vec<MajorCount>, DomainError> {
        let rows: Vec<GroupRow> = sqlx::query_as(
            "SELECT major AS key, COUNT(*) AS count FROM guest_logs GROUP BY major ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("count guests by major", e))?;

        Ok(rows
            .into_iter()
            .map(|r| MajorCount { major: r.key, count: r.count })
            .collect())
    }
}
