//! # Historic Entity Link
//!
//! Audit-side counterpart of [`EntityLink`](crate::models::EntityLink).
//!
//! Historic records share the live record's shape plus a `removed` flag.
//! The flag is reporting metadata: it marks that the corresponding live link
//! no longer exists, but it never hides the record from queries. Historic
//! records only leave the store through an explicit historic delete.
//!
//! The live and historic sides are fully decoupled. Inserting a live link
//! records nothing here; engines that want an audit trail mirror records
//! explicitly (see [`HistoricEntityLink::from`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::HierarchyType;
use crate::error::{EntityLinkError, Result};
use crate::models::EntityLink;

/// A directed relationship between two scopes in the historic store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricEntityLink {
    pub id: Uuid,
    pub scope_id: String,
    pub scope_type: String,
    pub reference_scope_id: Option<String>,
    pub reference_scope_type: Option<String>,
    pub link_type: String,
    pub hierarchy_type: Option<HierarchyType>,
    pub create_time: DateTime<Utc>,
    /// Lifecycle marker: the mirrored live link has been deleted.
    ///
    /// Queries return the record regardless of this flag.
    pub removed: bool,
}

impl HistoricEntityLink {
    /// Create an unpersisted historic link with a fresh id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            scope_id: String::new(),
            scope_type: String::new(),
            reference_scope_id: None,
            reference_scope_type: None,
            link_type: String::new(),
            hierarchy_type: None,
            create_time: Utc::now(),
            removed: false,
        }
    }

    /// Validate that the fields required for persistence are populated.
    pub fn validate_for_insert(&self) -> Result<()> {
        if self.scope_id.is_empty() {
            return Err(EntityLinkError::validation("scope_id"));
        }
        if self.scope_type.is_empty() {
            return Err(EntityLinkError::validation("scope_type"));
        }
        if self.link_type.is_empty() {
            return Err(EntityLinkError::validation("link_type"));
        }
        Ok(())
    }

    /// Check if this link references another scope with both id and type set.
    pub fn has_complete_reference(&self) -> bool {
        self.reference_scope_id.is_some() && self.reference_scope_type.is_some()
    }
}

impl Default for HistoricEntityLink {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirror a live link into its historic counterpart.
///
/// The historic record keeps the live record's id so the two sides stay
/// correlated, and starts out not marked as removed.
impl From<EntityLink> for HistoricEntityLink {
    fn from(link: EntityLink) -> Self {
        Self {
            id: link.id,
            scope_id: link.scope_id,
            scope_type: link.scope_type,
            reference_scope_id: link.reference_scope_id,
            reference_scope_type: link.reference_scope_type,
            link_type: link.link_type,
            hierarchy_type: link.hierarchy_type,
            create_time: link.create_time,
            removed: false,
        }
    }
}
