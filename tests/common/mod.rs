#![allow(dead_code)] // Not every test binary uses every helper

pub mod builders;
pub mod strategies;

pub use builders::*;
pub use strategies::*;

use std::sync::Arc;

use entitylink_core::services::{EntityLinkService, HistoricEntityLinkService};
use entitylink_core::storage::{InMemoryEntityLinkStore, InMemoryHistoricEntityLinkStore};

/// Generate a unique scope identifier for test isolation.
///
/// Postgres-backed tests share one database, so every test namespaces its
/// scopes with a fresh suffix instead of cleaning up after itself.
pub fn unique_scope_id(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::new_v4().simple())
}

/// Live facade backed by a fresh in-memory store.
pub fn memory_link_service() -> EntityLinkService {
    EntityLinkService::new(Arc::new(InMemoryEntityLinkStore::new()))
}

/// Historic facade backed by a fresh in-memory store.
pub fn memory_historic_link_service() -> HistoricEntityLinkService {
    HistoricEntityLinkService::new(Arc::new(InMemoryHistoricEntityLinkStore::new()))
}
