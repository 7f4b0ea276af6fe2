//! # System Constants
//!
//! Core constants and enums that define the operational boundaries of the
//! entity link subsystem.
//!
//! The hierarchy role enumeration is expected to grow. Traversal only
//! reasons about `Root` and `Parent`, so adding a role never changes what
//! existing queries return.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchy role a link plays when reasoning about scope ancestry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyType {
    /// The referenced scope is the root of the referencing scope's hierarchy
    Root,
    /// The referenced scope is the direct parent of the referencing scope
    Parent,
    /// The referenced scope is two levels above the referencing scope
    Grandparent,
}

impl HierarchyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HierarchyType::Root => "root",
            HierarchyType::Parent => "parent",
            HierarchyType::Grandparent => "grandparent",
        }
    }

    /// Check if links with this role are followed when walking up the hierarchy
    pub fn is_traversable(&self) -> bool {
        matches!(self, HierarchyType::Parent)
    }

    /// Check if links with this role anchor a hierarchy
    pub fn is_root(&self) -> bool {
        matches!(self, HierarchyType::Root)
    }
}

impl fmt::Display for HierarchyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HierarchyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(Self::Root),
            "parent" => Ok(Self::Parent),
            "grandparent" => Ok(Self::Grandparent),
            _ => Err(format!("Invalid hierarchy type: {s}")),
        }
    }
}

/// Well-known link type discriminators
pub mod link_types {
    /// Parent/child containment between scopes
    pub const CHILD: &str = "child";
}

/// Well-known scope type discriminators
pub mod scope_types {
    /// Workflow process instances
    pub const PROCESS: &str = "process";

    /// Case instances
    pub const CASE: &str = "case";

    /// Task instances
    pub const TASK: &str = "task";
}

/// System-wide constants
pub mod system {
    /// Version compatibility marker
    pub const ENTITYLINK_CORE_VERSION: &str = "0.1.0";

    /// Maximum recursion depth when walking parent links to collect ancestors
    pub const MAX_HIERARCHY_DEPTH: usize = 50;
}
