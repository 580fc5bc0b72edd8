// ============================================================================
// Library Infrastructure - PostgreSQL Category Repository
// File: crates/library-infrastructure/src/database/postgres/category_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use library_core::domain::{Category, CategoryInput};
use library_core::error::DomainError;
use library_core::repositories::CategoryRepository;

use crate::database::error::{db_error, map_db_error, ConstraintMessages};

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CATEGORY_CONSTRAINTS: ConstraintMessages<'static> = ConstraintMessages {
    unique: "Category name already exists",
    foreign_key: "Category is still used by collections",
};

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description, created_at, updated_at FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list categories", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, DomainError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find category by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, DomainError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find category by name", e))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, input: &CategoryInput) -> Result<Category, DomainError> {
        let row: CategoryRow = sqlx::query_as(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("insert category", e, CATEGORY_CONSTRAINTS))?;

        Ok(row.into())
    }

    async fn update(&self, category: &Category) -> Result<Category, DomainError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r#"
            UPDATE categories
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update category", e, CATEGORY_CONSTRAINTS))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::NotFound("Category not found".into()))
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match map_db_error("delete category", e, CATEGORY_CONSTRAINTS) {
                // RESTRICT fired: a collection was added after the pre-check
                DomainError::Validation(msg) => DomainError::Conflict(msg),
                other => other,
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_collections(&self, id: i32) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collections WHERE category_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("count category collections", e))?;

        Ok(count)
    }
}
