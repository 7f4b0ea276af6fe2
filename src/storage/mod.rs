//! # Storage Engines
//!
//! Persistence seam for entity links. Services depend on the two traits in
//! this module; engines implement them.
//!
//! Two engines ship with the crate:
//! - [`memory`]: process-local tables behind `parking_lot` locks, used by
//!   embedding engines in tests and by deployments that do not need
//!   durability.
//! - [`postgres`]: sqlx-backed tables, either pool-bound (each call is its
//!   own transaction) or bound to a caller-managed [`PgUnitOfWork`].
//!
//! Both engines implement identical query semantics, including the ancestor
//! walk behind `find_with_same_root_scope`. Tests that assert behavior on the
//! in-memory engine hold for the Postgres engine as well.

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryEntityLinkStore, InMemoryHistoricEntityLinkStore};
pub use postgres::{
    DatabaseConnection, DatabaseMigrations, PgEntityLinkStore, PgHistoricEntityLinkStore,
    PgUnitOfWork,
};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{EntityLink, HistoricEntityLink};

/// Persistence operations for live entity links.
///
/// Implementations stamp `create_time` at insertion and treat the
/// (`scope_id`, `scope_type`) pair as the primary retrieval key.
#[async_trait]
pub trait EntityLinkStore: Send + Sync {
    /// Persist a link and return the stored snapshot.
    ///
    /// The returned record carries the authoritative `create_time`. Inserting
    /// a second record with an id already present fails with a storage error.
    async fn insert(&self, link: EntityLink) -> Result<EntityLink>;

    /// Find links recorded against a scope, filtered by link type.
    async fn find_by_scope_and_type(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>>;

    /// Find links pointing at a referenced scope, filtered by link type.
    async fn find_by_reference_scope_and_type(
        &self,
        reference_scope_id: &str,
        reference_scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>>;

    /// Find root links that hang off any ancestor of the given scope.
    ///
    /// Ancestors are collected by walking `Parent` links (of the same link
    /// type) upward from the scope. A scope with no parent link has no
    /// ancestors, so the result is empty even when the scope itself carries
    /// root links.
    async fn find_with_same_root_scope(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>>;

    /// Delete every link recorded against a scope, returning the count.
    ///
    /// Deleting a scope with no links is not an error; the count is zero.
    async fn delete_by_scope_and_type(&self, scope_id: &str, scope_type: &str) -> Result<u64>;
}

/// Persistence operations for historic entity links.
///
/// Mirrors [`EntityLinkStore`] against the historic table. The `removed`
/// flag on stored records never filters query results.
#[async_trait]
pub trait HistoricEntityLinkStore: Send + Sync {
    /// Persist a historic link and return the stored snapshot.
    async fn insert(&self, link: HistoricEntityLink) -> Result<HistoricEntityLink>;

    /// Find historic links recorded against a scope, filtered by link type.
    async fn find_by_scope_and_type(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>>;

    /// Find historic links pointing at a referenced scope, filtered by link type.
    async fn find_by_reference_scope_and_type(
        &self,
        reference_scope_id: &str,
        reference_scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>>;

    /// Find historic root links that hang off any ancestor of the given scope.
    async fn find_with_same_root_scope(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>>;

    /// Hard-delete every historic link recorded against a scope.
    ///
    /// This is the only way historic records leave the store; marking a
    /// record as removed at insert time does not.
    async fn delete_by_scope_and_type(&self, scope_id: &str, scope_type: &str) -> Result<u64>;
}
