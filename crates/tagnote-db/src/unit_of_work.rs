//! Transaction-backed unit of work.
//!
//! Wraps a single sqlx transaction behind the `UnitOfWork` port. The
//! discipline is strict two-phase: `begin` before any write, `commit` only
//! after all writes succeed, `rollback` on any failure in between. An
//! unfinished transaction rolls back on drop (sqlx's default), so `dispose`
//! needs no separate method.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use tagnote_core::{Error, Record, Result, Tag, UnitOfWork, UnitOfWorkProvider};

use crate::records::PgRecordRepository;
use crate::tags::PgTagRepository;

/// PostgreSQL implementation of UnitOfWork.
pub struct PgUnitOfWork {
    pool: PgPool,
    records: PgRecordRepository,
    tags: PgTagRepository,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self {
            records: PgRecordRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            pool,
            tx: None,
        }
    }

    fn active_tx(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| Error::Transaction("no active transaction".to_string()))
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn begin(&mut self) -> Result<()> {
        if self.tx.is_some() {
            return Err(Error::Transaction("transaction already active".to_string()));
        }
        self.tx = Some(self.pool.begin().await.map_err(Error::Database)?);
        debug!(
            subsystem = "db",
            component = "unit_of_work",
            op = "begin",
            "Transaction opened"
        );
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| Error::Transaction("no active transaction".to_string()))?;
        tx.commit().await.map_err(Error::Database)?;
        debug!(
            subsystem = "db",
            component = "unit_of_work",
            op = "commit",
            "Transaction committed"
        );
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| Error::Transaction("no active transaction".to_string()))?;
        tx.rollback().await.map_err(Error::Database)?;
        debug!(
            subsystem = "db",
            component = "unit_of_work",
            op = "rollback",
            "Transaction rolled back"
        );
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.tx.is_some()
    }

    async fn save_record(&mut self, record: &Record) -> Result<()> {
        let records = self.records.clone();
        let tx = self.active_tx()?;
        records.save_tx(tx, record).await
    }

    async fn update_record(&mut self, record: &Record) -> Result<()> {
        let records = self.records.clone();
        let tx = self.active_tx()?;
        records.update_tx(tx, record).await
    }

    async fn delete_record(&mut self, id: Uuid) -> Result<()> {
        let records = self.records.clone();
        let tx = self.active_tx()?;
        records.delete_tx(tx, id).await
    }

    async fn save_tags(&mut self, tags: &[Tag]) -> Result<()> {
        let repo = self.tags.clone();
        let tx = self.active_tx()?;
        repo.save_batch_tx(tx, tags).await
    }

    async fn find_orphaned_tags(&mut self) -> Result<Vec<Tag>> {
        let repo = self.tags.clone();
        let tx = self.active_tx()?;
        repo.find_orphaned_tx(tx).await
    }

    async fn delete_tags(&mut self, ids: &[Uuid]) -> Result<u64> {
        let repo = self.tags.clone();
        let tx = self.active_tx()?;
        repo.delete_batch_tx(tx, ids).await
    }
}

/// Hands out request-scoped units of work over the shared pool.
#[derive(Clone)]
pub struct PgUnitOfWorkProvider {
    pool: PgPool,
}

impl PgUnitOfWorkProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkProvider for PgUnitOfWorkProvider {
    async fn unit_of_work(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(PgUnitOfWork::new(self.pool.clone())))
    }
}
