use entitylink_core::constants::{link_types, HierarchyType};
use entitylink_core::models::EntityLink;
use proptest::prelude::*;
use proptest::strategy::Just;

/// Strategy for generating valid scope identifiers
pub fn scope_id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,31}"
}

/// Strategy for generating scope type names
pub fn scope_type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("process".to_string()),
        Just("case".to_string()),
        Just("task".to_string()),
    ]
}

/// Strategy for generating link type names
pub fn link_type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(link_types::CHILD.to_string()),
        Just("association".to_string()),
    ]
}

/// Strategy for generating hierarchy roles
pub fn hierarchy_type_strategy() -> impl Strategy<Value = HierarchyType> {
    prop_oneof![
        Just(HierarchyType::Root),
        Just(HierarchyType::Parent),
        Just(HierarchyType::Grandparent),
    ]
}

/// Strategy for generating an optional fully-specified scope reference
pub fn reference_strategy() -> impl Strategy<Value = Option<(String, String)>> {
    prop::option::of((scope_id_strategy(), scope_type_strategy()))
}

/// A generated hierarchy population: `Parent` edges and `Root` links over a
/// small scope universe as (subject index, referenced index, link type)
/// tuples, plus the scope index to query.
pub type RecordedHierarchy = (
    Vec<(usize, usize, String)>,
    Vec<(usize, usize, String)>,
    usize,
);

/// Strategy for generating recorded hierarchies, dense enough that cycles,
/// diamonds and mixed link types all come up
pub fn recorded_hierarchy_strategy() -> impl Strategy<Value = RecordedHierarchy> {
    let parent_edges = prop::collection::vec((0..6usize, 0..6usize, link_type_strategy()), 0..12);
    let root_links = prop::collection::vec((0..6usize, 0..4usize, link_type_strategy()), 0..12);
    (parent_edges, root_links, 0..6usize)
}

/// Strategy for generating complete, insertable EntityLink records
pub fn entity_link_strategy() -> impl Strategy<Value = EntityLink> {
    (
        scope_id_strategy(),
        scope_type_strategy(),
        reference_strategy(),
        link_type_strategy(),
        prop::option::of(hierarchy_type_strategy()),
    )
        .prop_map(|(scope_id, scope_type, reference, link_type, hierarchy_type)| {
            let mut link = EntityLink::new();
            link.scope_id = scope_id;
            link.scope_type = scope_type;
            if let Some((id, scope_type)) = reference {
                link.reference_scope_id = Some(id);
                link.reference_scope_type = Some(scope_type);
            }
            link.link_type = link_type;
            link.hierarchy_type = hierarchy_type;
            link
        })
}
