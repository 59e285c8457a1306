use std::collections::BTreeMap;

use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use crate::error::AppResult;
use crate::models::{CatalogItem, RelatedItem, ScriptureRef, SimilarityEdge};

use super::{CatalogStore, RelatednessStore};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Catalog reader backed by the catalog database
///
/// The catalog schema is owned by the catalog service; this adapter only
/// ever reads it.
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalog {
    async fn list_items(&self) -> AppResult<Vec<CatalogItem>> {
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            "SELECT id, name, COALESCE(description, '') FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items: BTreeMap<i64, CatalogItem> = rows
            .into_iter()
            .map(|(id, name, description)| (id, CatalogItem::new(id, name, description)))
            .collect();

        let tags: Vec<(i64, i64)> = sqlx::query_as("SELECT item_id, tag_id FROM item_tags")
            .fetch_all(&self.pool)
            .await?;
        for (item_id, tag_id) in tags {
            if let Some(item) = items.get_mut(&item_id) {
                item.tags.push(tag_id);
            }
        }

        let speakers: Vec<(i64, i64)> =
            sqlx::query_as("SELECT item_id, speaker_id FROM item_speakers")
                .fetch_all(&self.pool)
                .await?;
        for (item_id, speaker_id) in speakers {
            if let Some(item) = items.get_mut(&item_id) {
                item.speakers.push(speaker_id);
            }
        }

        let characters: Vec<(i64, i64)> =
            sqlx::query_as("SELECT item_id, character_id FROM item_characters")
                .fetch_all(&self.pool)
                .await?;
        for (item_id, character_id) in characters {
            if let Some(item) = items.get_mut(&item_id) {
                item.characters.push(character_id);
            }
        }

        let scriptures: Vec<(i64, String, Option<i32>, Option<i32>)> =
            sqlx::query_as("SELECT item_id, book, chapter, verse FROM item_scriptures")
                .fetch_all(&self.pool)
                .await?;
        for (item_id, book, chapter, verse) in scriptures {
            let Some(item) = items.get_mut(&item_id) else {
                continue;
            };
            match (chapter, verse) {
                (Some(chapter), Some(verse)) => {
                    item.scriptures.push(ScriptureRef::new(book, chapter, verse));
                }
                // Malformed reference: log and skip so the scripture metric
                // degrades toward zero instead of failing the whole run
                _ => {
                    tracing::warn!(
                        item_id,
                        book = %book,
                        "Skipping scripture reference with missing chapter or verse"
                    );
                }
            }
        }

        Ok(items.into_values().collect())
    }
}

/// Relatedness store backed by a single canonical-pair table
pub struct PostgresRelatednessStore {
    pool: PgPool,
}

// Postgres bind limit is 65535; 3 binds per row
const INSERT_CHUNK: usize = 1000;

impl PostgresRelatednessStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the relationship table if it does not exist
    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS related_scores (
                lower_id BIGINT NOT NULL,
                higher_id BIGINT NOT NULL,
                score DOUBLE PRECISION NOT NULL,
                PRIMARY KEY (lower_id, higher_id),
                CHECK (lower_id < higher_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RelatednessStore for PostgresRelatednessStore {
    async fn replace_all(&self, edges: &[SimilarityEdge]) -> AppResult<()> {
        // Delete and insert inside one transaction; readers see the old set
        // until commit, never a partial one
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM related_scores")
            .execute(&mut *tx)
            .await?;

        for chunk in edges.chunks(INSERT_CHUNK) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO related_scores (lower_id, higher_id, score) ",
            );
            builder.push_values(chunk, |mut row, edge| {
                row.push_bind(edge.lower_id)
                    .push_bind(edge.higher_id)
                    .push_bind(edge.score);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(edges = edges.len(), "Relationship set replaced");
        Ok(())
    }

    async fn get_related(&self, item_id: i64, limit: usize) -> AppResult<Vec<RelatedItem>> {
        let rows: Vec<(i64, f64)> = sqlx::query_as(
            r#"
            SELECT CASE WHEN lower_id = $1 THEN higher_id ELSE lower_id END AS related_id, score
            FROM related_scores
            WHERE lower_id = $1 OR higher_id = $1
            ORDER BY score DESC, related_id ASC
            LIMIT $2
            "#,
        )
        .bind(item_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(item_id, score)| RelatedItem { item_id, score })
            .collect())
    }
}
