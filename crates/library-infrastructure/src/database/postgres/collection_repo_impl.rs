// ============================================================================
// Library Infrastructure - PostgreSQL Collection Repository
// File: crates/library-infrastructure/src/database/postgres/collection_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::warn;

use library_core::domain::{CategorySummary, Collection, CollectionDetail, CollectionDraft, CollectionType};
use library_core::error::DomainError;
use library_core::repositories::CollectionRepository;

use crate::database::error::{db_error, map_db_error, ConstraintMessages};

pub struct PgCollectionRepository {
    pool: PgPool,
}

impl PgCollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RETURNING: &str = "id, title, author, publisher, publication_year, isbn, type AS collection_type, \
     category_id, description, image, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT
        c.id, c.title, c.author, c.publisher, c.publication_year, c.isbn,
        c.type AS collection_type, c.category_id, c.description, c.image,
        c.created_at, c.updated_at,
        cat.name AS category_name
    FROM collections c
    LEFT JOIN categories cat ON cat.id = c.category_id
"#;

#[derive(Debug, FromRow)]
struct CollectionRow {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publication_year: String,
    pub isbn: Option<String>,
    pub collection_type: String,
    pub category_id: i32,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        let collection_type = CollectionType::from_str(&row.collection_type).unwrap_or_else(|| {
            warn!(collection_id = row.id, value = %row.collection_type, "Unknown collection type");
            CollectionType::PhysicalBook
        });
        Collection {
            id: row.id,
            title: row.title,
            author: row.author,
            publisher: row.publisher,
            publication_year: row.publication_year,
            isbn: row.isbn,
            collection_type,
            category_id: row.category_id,
            description: row.description,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct DetailRow {
    #[sqlx(flatten)]
    pub collection: CollectionRow,
    pub category_name: Option<String>,
}

impl From<DetailRow> for CollectionDetail {
    fn from(row: DetailRow) -> Self {
        let collection: Collection = row.collection.into();
        let category = row.category_name.map(|name| CategorySummary {
            id: collection.category_id,
            name,
        });
        CollectionDetail { collection, category }
    }
}

const COLLECTION_CONSTRAINTS: ConstraintMessages<'static> = ConstraintMessages {
    unique: "Collection already exists",
    foreign_key: "Category not found",
};

#[async_trait]
impl CollectionRepository for PgCollectionRepository {
    async fn list(&self, limit: i64) -> Result<Vec<CollectionDetail>, DomainError> {
        let rows: Vec<DetailRow> = sqlx::query_as(&format!(
            "{DETAIL_SELECT} ORDER BY c.created_at DESC, c.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list collections", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CollectionDetail>, DomainError> {
        let row: Option<DetailRow> = sqlx::query_as(&format!("{DETAIL_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find collection by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, draft: &CollectionDraft, image: Option<String>) -> Result<Collection, DomainError> {
        let row: CollectionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO collections
                (title, author, publisher, publication_year, isbn, type, category_id, description, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RETURNING}
            "#
        ))
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&draft.publisher)
        .bind(&draft.publication_year)
        .bind(&draft.isbn)
        .bind(draft.collection_type.as_str())
        .bind(draft.category_id)
        .bind(&draft.description)
        .bind(&image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("insert collection", e, COLLECTION_CONSTRAINTS))?;

        Ok(row.into())
    }

    async fn update(&self, collection: &Collection) -> Result<Collection, DomainError> {
        let row: Option<CollectionRow> = sqlx::query_as(&format!(
            r#"
            UPDATE collections
            SET title = $2, author = $3, publisher = $4, publication_year = $5, isbn = $6,
                type = $7, category_id = $8, description = $9, image = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {RETURNING}
            "#
        ))
        .bind(collection.id)
        .bind(&collection.title)
        .bind(&collection.author)
        .bind(&collection.publisher)
        .bind(&collection.publication_year)
        .bind(&collection.isbn)
        .bind(collection.collection_type.as_str())
        .bind(collection.category_id)
        .bind(&collection.description)
        .bind(&collection.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update collection", e, COLLECTION_CONSTRAINTS))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::NotFound("Collection not found".into()))
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete collection", e))?;

        Ok(result.rows_affected() > 0)
    }
}
