//! # Entity Link Service
//!
//! Facade for the live side of the store.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use entitylink_core::constants::{link_types, scope_types, HierarchyType};
//! use entitylink_core::services::EntityLinkService;
//! use entitylink_core::storage::InMemoryEntityLinkStore;
//!
//! # tokio_test::block_on(async {
//! let service = EntityLinkService::new(Arc::new(InMemoryEntityLinkStore::new()));
//!
//! let mut link = service.create_link();
//! link.scope_id = "task-1".to_string();
//! link.scope_type = scope_types::TASK.to_string();
//! link.reference_scope_id = Some("proc-1".to_string());
//! link.reference_scope_type = Some(scope_types::PROCESS.to_string());
//! link.link_type = link_types::CHILD.to_string();
//! link.hierarchy_type = Some(HierarchyType::Parent);
//!
//! let stored = service.insert_link(link).await.unwrap();
//! let found = service
//!     .find_links_by_scope_and_type("task-1", scope_types::TASK, link_types::CHILD)
//!     .await
//!     .unwrap();
//! assert_eq!(found, vec![stored]);
//! # });
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::EntityLink;
use crate::storage::EntityLinkStore;

/// Facade over an [`EntityLinkStore`].
///
/// The store is injected at construction; the service holds no other state
/// and is cheap to build per call site.
pub struct EntityLinkService {
    store: Arc<dyn EntityLinkStore>,
}

impl EntityLinkService {
    pub fn new(store: Arc<dyn EntityLinkStore>) -> Self {
        Self { store }
    }

    /// Create an unpersisted link for the caller to populate.
    ///
    /// Nothing is stored until the record is handed to [`insert_link`].
    ///
    /// [`insert_link`]: EntityLinkService::insert_link
    pub fn create_link(&self) -> EntityLink {
        EntityLink::new()
    }

    /// Validate and persist a link, returning the stored snapshot.
    ///
    /// Records missing `scope_id`, `scope_type` or `link_type` are rejected
    /// with a validation error before touching storage.
    pub async fn insert_link(&self, link: EntityLink) -> Result<EntityLink> {
        if let Err(err) = link.validate_for_insert() {
            warn!(link_id = %link.id, error = %err, "rejecting entity link insert");
            return Err(err);
        }

        let stored = self.store.insert(link).await?;
        debug!(
            link_id = %stored.id,
            scope_id = %stored.scope_id,
            scope_type = %stored.scope_type,
            link_type = %stored.link_type,
            "entity link inserted"
        );
        Ok(stored)
    }

    /// Find links recorded against a scope, filtered by link type.
    pub async fn find_links_by_scope_and_type(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>> {
        self.store
            .find_by_scope_and_type(scope_id, scope_type, link_type)
            .await
    }

    /// Find links pointing at a referenced scope, filtered by link type.
    pub async fn find_links_by_reference_scope_and_type(
        &self,
        reference_scope_id: &str,
        reference_scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>> {
        self.store
            .find_by_reference_scope_and_type(reference_scope_id, reference_scope_type, link_type)
            .await
    }

    /// Find root links recorded against any ancestor of the given scope.
    ///
    /// Ancestors are reached by walking `Parent` links of the same link type
    /// upward from the scope. The query is asymmetric by design: a scope
    /// that carries root links but has no parent link gets an empty result,
    /// because it has no ancestors to collect roots from.
    pub async fn find_links_with_same_root_scope(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>> {
        self.store
            .find_with_same_root_scope(scope_id, scope_type, link_type)
            .await
    }

    /// Delete every link recorded against a scope, returning the count.
    ///
    /// Safe to call for scopes with no links; the count is zero and no error
    /// is raised.
    pub async fn delete_links_by_scope_and_type(
        &self,
        scope_id: &str,
        scope_type: &str,
    ) -> Result<u64> {
        let deleted = self
            .store
            .delete_by_scope_and_type(scope_id, scope_type)
            .await?;
        debug!(
            scope_id = %scope_id,
            scope_type = %scope_type,
            deleted = deleted,
            "entity links deleted"
        );
        Ok(deleted)
    }
}
