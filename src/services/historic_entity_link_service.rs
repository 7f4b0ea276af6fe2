//! # Historic Entity Link Service
//!
//! Facade for the audit side of the store. Mirrors the live facade with one
//! addition: inserts take a `mark_removed` flag that sets the record's
//! initial lifecycle state.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::HistoricEntityLink;
use crate::storage::HistoricEntityLinkStore;

/// Facade over a [`HistoricEntityLinkStore`].
pub struct HistoricEntityLinkService {
    store: Arc<dyn HistoricEntityLinkStore>,
}

impl HistoricEntityLinkService {
    pub fn new(store: Arc<dyn HistoricEntityLinkStore>) -> Self {
        Self { store }
    }

    /// Create an unpersisted historic link for the caller to populate.
    pub fn create_historic_link(&self) -> HistoricEntityLink {
        HistoricEntityLink::new()
    }

    /// Validate and persist a historic link, returning the stored snapshot.
    ///
    /// `mark_removed` sets the record's initial `removed` state, overriding
    /// whatever the caller left on the record. A record inserted with
    /// `mark_removed = true` is stored and stays queryable; the flag is
    /// reporting metadata, not a filter.
    pub async fn insert_historic_link(
        &self,
        mut link: HistoricEntityLink,
        mark_removed: bool,
    ) -> Result<HistoricEntityLink> {
        if let Err(err) = link.validate_for_insert() {
            warn!(link_id = %link.id, error = %err, "rejecting historic entity link insert");
            return Err(err);
        }

        link.removed = mark_removed;
        let stored = self.store.insert(link).await?;
        debug!(
            link_id = %stored.id,
            scope_id = %stored.scope_id,
            scope_type = %stored.scope_type,
            link_type = %stored.link_type,
            removed = stored.removed,
            "historic entity link inserted"
        );
        Ok(stored)
    }

    /// Find historic links recorded against a scope, filtered by link type.
    pub async fn find_historic_links_by_scope_and_type(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>> {
        self.store
            .find_by_scope_and_type(scope_id, scope_type, link_type)
            .await
    }

    /// Find historic links pointing at a referenced scope, filtered by link type.
    pub async fn find_historic_links_by_reference_scope_and_type(
        &self,
        reference_scope_id: &str,
        reference_scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>> {
        self.store
            .find_by_reference_scope_and_type(reference_scope_id, reference_scope_type, link_type)
            .await
    }

    /// Find historic root links recorded against any ancestor of the scope.
    ///
    /// Same asymmetric semantics as the live query: no parent link means no
    /// ancestors, so the result is empty regardless of the scope's own root
    /// links.
    pub async fn find_historic_links_with_same_root_scope(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>> {
        self.store
            .find_with_same_root_scope(scope_id, scope_type, link_type)
            .await
    }

    /// Hard-delete every historic link recorded against a scope.
    ///
    /// This is the only operation that removes historic records; inserting
    /// with `mark_removed = true` does not. Idempotent for scopes with no
    /// records.
    pub async fn delete_historic_links_by_scope_and_type(
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
            "historic entity links deleted"
        );
        Ok(deleted)
    }
}
