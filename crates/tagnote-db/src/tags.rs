//! Tag repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use tagnote_core::{Error, Result, Tag, TagPrefixMatch, TagRepository, TagUsage};

use crate::escape_like;

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Persist tags within a transaction.
    ///
    /// Re-inserting an existing normalized value is a no-op; the UNIQUE
    /// constraint on `normalized_value` absorbs concurrent identical
    /// inserts.
    pub async fn save_batch_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tags: &[Tag],
    ) -> Result<()> {
        for tag in tags {
            sqlx::query(
                "INSERT INTO tag (id, normalized_value, created_at) VALUES ($1, $2, $3)
                 ON CONFLICT (normalized_value) DO NOTHING",
            )
            .bind(tag.id())
            .bind(tag.normalized_value())
            .bind(tag.created_at())
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }
        Ok(())
    }

    /// Tags referenced by zero records, as seen by the transaction.
    pub async fn find_orphaned_tx(&self, tx: &mut Transaction<'_, Postgres>) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.normalized_value, t.created_at
            FROM tag t
            WHERE NOT EXISTS (SELECT 1 FROM record_tag rt WHERE rt.tag_id = t.id)
            ORDER BY t.normalized_value
            "#,
        )
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row_to_tag).collect())
    }

    /// Delete tags within a transaction; returns the number removed.
    pub async fn delete_batch_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ids: &[Uuid],
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM tag WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

fn map_row_to_tag(row: sqlx::postgres::PgRow) -> Tag {
    Tag::from_parts(
        row.get("id"),
        row.get("normalized_value"),
        row.get("created_at"),
    )
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, normalized_value, created_at FROM tag WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.map(map_row_to_tag))
    }

    async fn find_all(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT id, normalized_value, created_at FROM tag ORDER BY normalized_value",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.into_iter().map(map_row_to_tag).collect())
    }

    async fn find_by_normalized_value(&self, value: &str) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "SELECT id, normalized_value, created_at FROM tag WHERE normalized_value = $1",
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.map(map_row_to_tag))
    }

    async fn find_by_normalized_values(&self, values: &[String]) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT id, normalized_value, created_at FROM tag WHERE normalized_value = ANY($1)",
        )
        .bind(values)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.into_iter().map(map_row_to_tag).collect())
    }

    async fn find_by_prefix(&self, prefix: &str, limit: i64) -> Result<Vec<TagPrefixMatch>> {
        let pattern = format!("{}%", escape_like(prefix));
        let rows = sqlx::query(
            r#"
            SELECT id, normalized_value, created_at,
                   CHAR_LENGTH($1)::float4 / CHAR_LENGTH(normalized_value)::float4 AS match_score
            FROM tag
            WHERE normalized_value LIKE $2 ESCAPE '\'
            ORDER BY match_score DESC, normalized_value ASC
            LIMIT $3
            "#,
        )
        .bind(prefix)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| TagPrefixMatch {
                match_score: row.get("match_score"),
                tag: map_row_to_tag(row),
            })
            .collect())
    }

    async fn get_usage_info(&self) -> Result<Vec<TagUsage>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.normalized_value, t.created_at,
                   COUNT(rt.record_id) AS record_count
            FROM tag t
            LEFT JOIN record_tag rt ON rt.tag_id = t.id
            GROUP BY t.id, t.normalized_value, t.created_at
            ORDER BY t.normalized_value
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| TagUsage {
                record_count: row.get("record_count"),
                tag: map_row_to_tag(row),
            })
            .collect())
    }

    async fn find_orphaned(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.normalized_value, t.created_at
            FROM tag t
            WHERE NOT EXISTS (SELECT 1 FROM record_tag rt WHERE rt.tag_id = t.id)
            ORDER BY t.normalized_value
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.into_iter().map(map_row_to_tag).collect())
    }

    async fn save(&self, tag: &Tag) -> Result<()> {
        sqlx::query(
            "INSERT INTO tag (id, normalized_value, created_at) VALUES ($1, $2, $3)
             ON CONFLICT (normalized_value) DO NOTHING",
        )
        .bind(tag.id())
        .bind(tag.normalized_value())
        .bind(tag.created_at())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn save_batch(&self, tags: &[Tag]) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.save_batch_tx(&mut tx, tags).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM tag WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn delete_batch(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM tag WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tag")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
