//! # Entity Link
//!
//! Directed link records between scopes (process instances, case instances,
//! task instances) for the live side of the store.
//!
//! ## Direction Convention
//!
//! Every link points FROM the scope identified by `scope_id`/`scope_type`
//! TO the scope identified by `reference_scope_id`/`reference_scope_type`.
//! For a `Parent` link the referenced scope is the parent; for a `Root` link
//! the referenced scope is the hierarchy root. Reverse navigation is never
//! implied: if both directions are needed, two records are inserted.
//!
//! ## Lifecycle
//!
//! Records are created unpersisted (via [`EntityLink::new`] or the owning
//! service's factory), populated by the caller, then handed to an explicit
//! insert call. `create_time` is stamped by the storage engine at insertion;
//! the value carried before insert is provisional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::HierarchyType;
use crate::error::{EntityLinkError, Result};

/// A directed relationship between two scopes in the live store.
///
/// `scope_id` + `scope_type` identify the referencing scope; the optional
/// `reference_scope_id` + `reference_scope_type` identify the referenced
/// scope. `link_type` discriminates why the link exists (for example
/// parent/child containment), while `hierarchy_type` captures the role the
/// referenced scope plays in the referencing scope's hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityLink {
    pub id: Uuid,
    pub scope_id: String,
    pub scope_type: String,
    pub reference_scope_id: Option<String>,
    pub reference_scope_type: Option<String>,
    pub link_type: String,
    pub hierarchy_type: Option<HierarchyType>,
    pub create_time: DateTime<Utc>,
}

impl EntityLink {
    /// Create an unpersisted link with a fresh id and empty required fields.
    ///
    /// The caller is expected to populate `scope_id`, `scope_type` and
    /// `link_type` (at minimum) before handing the record to an insert call.
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
        }
    }

    /// Validate that the fields required for persistence are populated.
    ///
    /// Checks `scope_id`, `scope_type` and `link_type` in that order and
    /// reports the first missing field. Reference fields and hierarchy role
    /// are optional by design.
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
    ///
    /// Hierarchy traversal only follows fully specified references; a link
    /// carrying an id without a type (or vice versa) is stored but never
    /// walked.
    pub fn has_complete_reference(&self) -> bool {
        self.reference_scope_id.is_some() && self.reference_scope_type.is_some()
    }
}

impl Default for EntityLink {
    fn default() -> Self {
        Self::new()
    }
}
