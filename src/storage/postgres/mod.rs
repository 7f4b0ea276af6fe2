//! # Postgres Storage Engine
//!
//! sqlx-backed implementations of the storage traits.
//!
//! ## Execution Modes
//!
//! A store is bound either to a [`PgPool`] or to a [`PgUnitOfWork`]:
//! - Pool-bound stores acquire a connection per call; every call commits on
//!   its own.
//! - Unit-bound stores run every call inside the caller's transaction.
//!   Nothing is visible outside the unit until the caller commits, and reads
//!   within the unit observe the unit's own writes.
//!
//! The unit of work belongs to the caller: this module never begins, commits
//! or rolls back a transaction on its own. A typical embedding engine opens
//! one unit per engine command and binds the live and historic stores for
//! that command to it.
//!
//! ```rust,no_run
//! use entitylink_core::storage::{PgEntityLinkStore, PgUnitOfWork};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), entitylink_core::EntityLinkError> {
//! let unit = PgUnitOfWork::begin(&pool).await?;
//! let store = PgEntityLinkStore::with_unit_of_work(unit.clone());
//! // ... run operations against the store ...
//! unit.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;
mod queries;

pub use connection::DatabaseConnection;
pub use migrations::DatabaseMigrations;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{EntityLinkError, Result};
use crate::models::{EntityLink, HistoricEntityLink};
use crate::storage::{EntityLinkStore, HistoricEntityLinkStore};

/// A caller-managed database transaction shared by the stores bound to it.
///
/// Completing the unit (commit or rollback) consumes the underlying
/// transaction; operations issued through a completed unit fail with a
/// storage error rather than silently running outside it.
pub struct PgUnitOfWork {
    tx: Mutex<Option<Transaction<'static, Postgres>>>,
}

impl PgUnitOfWork {
    /// Open a transaction on the pool and wrap it as a unit of work.
    pub async fn begin(pool: &PgPool) -> Result<Arc<Self>> {
        let tx = pool.begin().await?;
        Ok(Arc::new(Self {
            tx: Mutex::new(Some(tx)),
        }))
    }

    /// Commit the unit, making its writes visible outside it.
    pub async fn commit(&self) -> Result<()> {
        let tx = self.take("commit").await?;
        tx.commit().await?;
        tracing::debug!("entity link unit of work committed");
        Ok(())
    }

    /// Roll the unit back, discarding all writes issued through it.
    pub async fn rollback(&self) -> Result<()> {
        let tx = self.take("rollback").await?;
        tx.rollback().await?;
        tracing::debug!("entity link unit of work rolled back");
        Ok(())
    }

    /// Check if the unit can still accept operations.
    pub async fn is_active(&self) -> bool {
        self.tx.lock().await.is_some()
    }

    async fn take(&self, operation: &str) -> Result<Transaction<'static, Postgres>> {
        self.tx.lock().await.take().ok_or_else(|| {
            EntityLinkError::storage(operation, "unit of work already completed")
        })
    }

    async fn guard(&self) -> UnitGuard<'_> {
        UnitGuard(self.tx.lock().await)
    }
}

struct UnitGuard<'a>(MutexGuard<'a, Option<Transaction<'static, Postgres>>>);

impl UnitGuard<'_> {
    fn conn(&mut self) -> Result<&mut PgConnection> {
        match self.0.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(EntityLinkError::storage(
                "unit_of_work",
                "unit of work already completed",
            )),
        }
    }
}

enum PgExec {
    Pool(PgPool),
    Unit(Arc<PgUnitOfWork>),
}

/// Postgres implementation of [`EntityLinkStore`].
pub struct PgEntityLinkStore {
    exec: PgExec,
}

impl PgEntityLinkStore {
    /// Bind the store to a pool; each call runs in its own transaction.
    pub fn new(pool: PgPool) -> Self {
        Self {
            exec: PgExec::Pool(pool),
        }
    }

    /// Bind the store to a caller-managed unit of work.
    pub fn with_unit_of_work(unit: Arc<PgUnitOfWork>) -> Self {
        Self {
            exec: PgExec::Unit(unit),
        }
    }
}

#[async_trait]
impl EntityLinkStore for PgEntityLinkStore {
    async fn insert(&self, link: EntityLink) -> Result<EntityLink> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::insert_entity_link(&mut conn, &link).await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::insert_entity_link(guard.conn()?, &link).await
            }
        }
    }

    async fn find_by_scope_and_type(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::find_entity_links_by_scope(&mut conn, scope_id, scope_type, link_type)
                    .await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::find_entity_links_by_scope(guard.conn()?, scope_id, scope_type, link_type)
                    .await
            }
        }
    }

    async fn find_by_reference_scope_and_type(
        &self,
        reference_scope_id: &str,
        reference_scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::find_entity_links_by_reference_scope(
                    &mut conn,
                    reference_scope_id,
                    reference_scope_type,
                    link_type,
                )
                .await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::find_entity_links_by_reference_scope(
                    guard.conn()?,
                    reference_scope_id,
                    reference_scope_type,
                    link_type,
                )
                .await
            }
        }
    }

    async fn find_with_same_root_scope(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::find_entity_links_with_same_root_scope(
                    &mut conn, scope_id, scope_type, link_type,
                )
                .await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::find_entity_links_with_same_root_scope(
                    guard.conn()?,
                    scope_id,
                    scope_type,
                    link_type,
                )
                .await
            }
        }
    }

    async fn delete_by_scope_and_type(&self, scope_id: &str, scope_type: &str) -> Result<u64> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::delete_entity_links_by_scope(&mut conn, scope_id, scope_type).await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::delete_entity_links_by_scope(guard.conn()?, scope_id, scope_type).await
            }
        }
    }
}

/// Postgres implementation of [`HistoricEntityLinkStore`].
pub struct PgHistoricEntityLinkStore {
    exec: PgExec,
}

impl PgHistoricEntityLinkStore {
    /// Bind the store to a pool; each call runs in its own transaction.
    pub fn new(pool: PgPool) -> Self {
        Self {
            exec: PgExec::Pool(pool),
        }
    }

    /// Bind the store to a caller-managed unit of work.
    pub fn with_unit_of_work(unit: Arc<PgUnitOfWork>) -> Self {
        Self {
            exec: PgExec::Unit(unit),
        }
    }
}

#[async_trait]
impl HistoricEntityLinkStore for PgHistoricEntityLinkStore {
    async fn insert(&self, link: HistoricEntityLink) -> Result<HistoricEntityLink> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::insert_historic_entity_link(&mut conn, &link).await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::insert_historic_entity_link(guard.conn()?, &link).await
            }
        }
    }

    async fn find_by_scope_and_type(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::find_historic_entity_links_by_scope(
                    &mut conn, scope_id, scope_type, link_type,
                )
                .await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::find_historic_entity_links_by_scope(
                    guard.conn()?,
                    scope_id,
                    scope_type,
                    link_type,
                )
                .await
            }
        }
    }

    async fn find_by_reference_scope_and_type(
        &self,
        reference_scope_id: &str,
        reference_scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::find_historic_entity_links_by_reference_scope(
                    &mut conn,
                    reference_scope_id,
                    reference_scope_type,
                    link_type,
                )
                .await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::find_historic_entity_links_by_reference_scope(
                    guard.conn()?,
                    reference_scope_id,
                    reference_scope_type,
                    link_type,
                )
                .await
            }
        }
    }

    async fn find_with_same_root_scope(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::find_historic_entity_links_with_same_root_scope(
                    &mut conn, scope_id, scope_type, link_type,
                )
                .await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::find_historic_entity_links_with_same_root_scope(
                    guard.conn()?,
                    scope_id,
                    scope_type,
                    link_type,
                )
                .await
            }
        }
    }

    async fn delete_by_scope_and_type(&self, scope_id: &str, scope_type: &str) -> Result<u64> {
        match &self.exec {
            PgExec::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                queries::delete_historic_entity_links_by_scope(&mut conn, scope_id, scope_type)
                    .await
            }
            PgExec::Unit(unit) => {
                let mut guard = unit.guard().await;
                queries::delete_historic_entity_links_by_scope(
                    guard.conn()?,
                    scope_id,
                    scope_type,
                )
                .await
            }
        }
    }
}
