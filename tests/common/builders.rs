//! Test data builders for entity link records.
//!
//! Builders produce unpersisted records; tests hand them to a facade for
//! insertion so validation and timestamping run the same way they do in
//! production code.

#![allow(dead_code)] // Not every test binary uses every builder

use entitylink_core::constants::{link_types, scope_types, HierarchyType};
use entitylink_core::models::{EntityLink, HistoricEntityLink};

/// Builder pattern for creating test EntityLinks
pub struct EntityLinkBuilder {
    scope_id: String,
    scope_type: String,
    reference_scope_id: Option<String>,
    reference_scope_type: Option<String>,
    link_type: String,
    hierarchy_type: Option<HierarchyType>,
}

impl EntityLinkBuilder {
    pub fn new() -> Self {
        Self {
            scope_id: String::new(),
            scope_type: scope_types::PROCESS.to_string(),
            reference_scope_id: None,
            reference_scope_type: None,
            link_type: link_types::CHILD.to_string(),
            hierarchy_type: None,
        }
    }

    pub fn with_scope(mut self, scope_id: &str) -> Self {
        self.scope_id = scope_id.to_string();
        self
    }

    pub fn with_scope_type(mut self, scope_type: &str) -> Self {
        self.scope_type = scope_type.to_string();
        self
    }

    pub fn with_reference(mut self, reference_scope_id: &str) -> Self {
        self.reference_scope_id = Some(reference_scope_id.to_string());
        self
    }

    pub fn with_reference_type(mut self, reference_scope_type: &str) -> Self {
        self.reference_scope_type = Some(reference_scope_type.to_string());
        self
    }

    pub fn with_link_type(mut self, link_type: &str) -> Self {
        self.link_type = link_type.to_string();
        self
    }

    pub fn with_hierarchy(mut self, hierarchy_type: HierarchyType) -> Self {
        self.hierarchy_type = Some(hierarchy_type);
        self
    }

    pub fn build(self) -> EntityLink {
        let mut link = EntityLink::new();
        link.scope_id = self.scope_id;
        link.scope_type = self.scope_type;
        link.reference_scope_id = self.reference_scope_id;
        link.reference_scope_type = self.reference_scope_type;
        link.link_type = self.link_type;
        link.hierarchy_type = self.hierarchy_type;
        link
    }
}

impl Default for EntityLinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder pattern for creating test HistoricEntityLinks
pub struct HistoricEntityLinkBuilder {
    inner: EntityLinkBuilder,
    removed: bool,
}

impl HistoricEntityLinkBuilder {
    pub fn new() -> Self {
        Self {
            inner: EntityLinkBuilder::new(),
            removed: false,
        }
    }

    pub fn with_scope(mut self, scope_id: &str) -> Self {
        self.inner = self.inner.with_scope(scope_id);
        self
    }

    pub fn with_scope_type(mut self, scope_type: &str) -> Self {
        self.inner = self.inner.with_scope_type(scope_type);
        self
    }

    pub fn with_reference(mut self, reference_scope_id: &str) -> Self {
        self.inner = self.inner.with_reference(reference_scope_id);
        self
    }

    pub fn with_reference_type(mut self, reference_scope_type: &str) -> Self {
        self.inner = self.inner.with_reference_type(reference_scope_type);
        self
    }

    pub fn with_link_type(mut self, link_type: &str) -> Self {
        self.inner = self.inner.with_link_type(link_type);
        self
    }

    pub fn with_hierarchy(mut self, hierarchy_type: HierarchyType) -> Self {
        self.inner = self.inner.with_hierarchy(hierarchy_type);
        self
    }

    pub fn with_removed(mut self, removed: bool) -> Self {
        self.removed = removed;
        self
    }

    pub fn build(self) -> HistoricEntityLink {
        let mut link = HistoricEntityLink::from(self.inner.build());
        link.removed = self.removed;
        link
    }
}

impl Default for HistoricEntityLinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A `Root` hierarchy link between two process scopes.
///
/// Matches the shape an orchestration engine records when a nested scope is
/// registered under its root process instance.
pub fn root_link(scope_id: &str, reference_scope_id: &str) -> EntityLink {
    EntityLinkBuilder::new()
        .with_scope(scope_id)
        .with_reference(reference_scope_id)
        .with_reference_type(scope_types::PROCESS)
        .with_hierarchy(HierarchyType::Root)
        .build()
}

/// A `Parent` hierarchy link between two process scopes.
///
/// The referenced scope is the parent of the recording scope.
pub fn parent_link(scope_id: &str, reference_scope_id: &str) -> EntityLink {
    EntityLinkBuilder::new()
        .with_scope(scope_id)
        .with_reference(reference_scope_id)
        .with_reference_type(scope_types::PROCESS)
        .with_hierarchy(HierarchyType::Parent)
        .build()
}
