//! Record repository implementation.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use tagnote_core::{Error, Record, RecordContent, RecordRepository, Result};

use crate::escape_like;

const RECORD_COLUMNS: &str = r#"
    r.id, r.content, r.created_at, r.updated_at,
    COALESCE(ARRAY_AGG(rt.tag_id) FILTER (WHERE rt.tag_id IS NOT NULL), '{}') AS tag_ids
"#;

/// PostgreSQL implementation of RecordRepository.
#[derive(Clone)]
pub struct PgRecordRepository {
    pool: Pool<Postgres>,
}

impl PgRecordRepository {
    /// Create a new PgRecordRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Persist a new record within a transaction.
    pub async fn save_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &Record,
    ) -> Result<()> {
        sqlx::query("INSERT INTO record (id, content, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(record.id())
            .bind(record.content().as_str())
            .bind(record.created_at())
            .bind(record.updated_at())
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        self.link_tags_tx(tx, record).await
    }

    /// Replace a stored record within a transaction.
    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &Record,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE record SET content = $2, updated_at = $3 WHERE id = $1")
            .bind(record.id())
            .bind(record.content().as_str())
            .bind(record.updated_at())
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(record.id()));
        }

        sqlx::query("DELETE FROM record_tag WHERE record_id = $1")
            .bind(record.id())
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        self.link_tags_tx(tx, record).await
    }

    /// Delete a record within a transaction (tag links cascade).
    pub async fn delete_tx(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM record WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn link_tags_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &Record,
    ) -> Result<()> {
        let tag_ids: Vec<Uuid> = record.tag_ids().into_iter().collect();
        if tag_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO record_tag (record_id, tag_id) SELECT $1, x FROM UNNEST($2::uuid[]) AS x",
        )
        .bind(record.id())
        .bind(&tag_ids)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}

/// Map a row carrying record columns plus an aggregated `tag_ids` array.
fn map_row_to_record(row: sqlx::postgres::PgRow) -> Result<Record> {
    let content: String = row.get("content");
    let tag_ids: Vec<Uuid> = row.get("tag_ids");
    Record::from_parts(
        row.get("id"),
        RecordContent::new(content)?,
        tag_ids.into_iter().collect(),
        row.get("created_at"),
        row.get("updated_at"),
    )
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Record>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM record r
            LEFT JOIN record_tag rt ON rt.record_id = r.id
            WHERE r.id = $1
            GROUP BY r.id
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row_to_record).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM record r
            LEFT JOIN record_tag rt ON rt.record_id = r.id
            GROUP BY r.id
            ORDER BY r.created_at, r.id
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_row_to_record).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<Record>> {
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM record r
            LEFT JOIN record_tag rt ON rt.record_id = r.id
            WHERE r.content ILIKE $1 ESCAPE '\'
               OR EXISTS (
                    SELECT 1
                    FROM record_tag rt2
                    JOIN tag t ON t.id = rt2.tag_id
                    WHERE rt2.record_id = r.id
                      AND t.normalized_value ILIKE $1 ESCAPE '\'
               )
            GROUP BY r.id
            ORDER BY r.created_at, r.id
            "#
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_row_to_record).collect()
    }

    async fn find_by_tag_ids(&self, tag_ids: &[Uuid]) -> Result<Vec<Record>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM record r
            LEFT JOIN record_tag rt ON rt.record_id = r.id
            WHERE EXISTS (
                SELECT 1 FROM record_tag rt2
                WHERE rt2.record_id = r.id AND rt2.tag_id = ANY($1)
            )
            GROUP BY r.id
            ORDER BY r.created_at, r.id
            "#
        ))
        .bind(tag_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_row_to_record).collect()
    }

    async fn find_by_tag_set(
        &self,
        tag_ids: &HashSet<Uuid>,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Record>> {
        let wanted: Vec<Uuid> = tag_ids.iter().copied().collect();
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM record r
            LEFT JOIN record_tag rt ON rt.record_id = r.id
            WHERE $2::uuid IS NULL OR r.id <> $2
            GROUP BY r.id
            HAVING COALESCE(ARRAY_AGG(rt.tag_id ORDER BY rt.tag_id)
                            FILTER (WHERE rt.tag_id IS NOT NULL), '{{}}')
                 = (SELECT COALESCE(ARRAY_AGG(x ORDER BY x), '{{}}')
                    FROM UNNEST($1::uuid[]) AS x)
            "#
        ))
        .bind(&wanted)
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_row_to_record).collect()
    }

    async fn save(&self, record: &Record) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.save_tx(&mut tx, record).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn update(&self, record: &Record) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.update_tx(&mut tx, record).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.delete_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn save_batch(&self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        for record in records {
            self.save_tx(&mut tx, record).await?;
        }
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM record")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM record")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM record WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
