//! Same-root query semantics over recorded parent chains.
//!
//! A same-root lookup walks `Parent` links upward from the queried scope and
//! collects the `Root` links recorded against every ancestor it reaches. The
//! walk never runs at insert time; these tests pin down what the read-side
//! reasoning returns for chains, diamonds, cycles and over-deep hierarchies.

mod common;

use std::collections::HashSet;

use common::*;
use entitylink_core::constants::{link_types, scope_types, system, HierarchyType};
use entitylink_core::models::HistoricEntityLink;

#[tokio::test]
async fn test_same_root_one_hop_chain() {
    let service = memory_link_service();

    service
        .insert_link(parent_link("sub", "parent"))
        .await
        .unwrap();
    let r1 = service
        .insert_link(root_link("parent", "leaf-1"))
        .await
        .unwrap();
    let r2 = service
        .insert_link(root_link("parent", "leaf-2"))
        .await
        .unwrap();

    let shared = service
        .find_links_with_same_root_scope("sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    let found: HashSet<_> = shared.iter().map(|link| link.id).collect();
    assert_eq!(found, HashSet::from([r1.id, r2.id]));
    assert!(shared
        .iter()
        .all(|link| link.hierarchy_type == Some(HierarchyType::Root)));
}

#[tokio::test]
async fn test_directly_rooted_scope_has_no_same_root_links() {
    let service = memory_link_service();

    // "parent" carries root links itself but was never recorded as anyone's
    // child, so there is no parent chain to reason through
    service
        .insert_link(root_link("parent", "leaf-1"))
        .await
        .unwrap();
    service
        .insert_link(root_link("parent", "leaf-2"))
        .await
        .unwrap();

    let shared = service
        .find_links_with_same_root_scope("parent", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert!(shared.is_empty());
}

#[tokio::test]
async fn test_same_root_multi_hop_chain() {
    let service = memory_link_service();

    service
        .insert_link(parent_link("sub", "mid"))
        .await
        .unwrap();
    service
        .insert_link(parent_link("mid", "top"))
        .await
        .unwrap();
    let mid_root = service
        .insert_link(root_link("mid", "leaf-1"))
        .await
        .unwrap();
    let top_root = service
        .insert_link(root_link("top", "leaf-2"))
        .await
        .unwrap();

    // Every ancestor on the chain contributes its root links
    let shared = service
        .find_links_with_same_root_scope("sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    let found: HashSet<_> = shared.iter().map(|link| link.id).collect();
    assert_eq!(found, HashSet::from([mid_root.id, top_root.id]));

    // One level up, only "top" is an ancestor
    let shared = service
        .find_links_with_same_root_scope("mid", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    let found: HashSet<_> = shared.iter().map(|link| link.id).collect();
    assert_eq!(found, HashSet::from([top_root.id]));
}

#[tokio::test]
async fn test_same_root_diamond_merges_both_branches() {
    let service = memory_link_service();

    service
        .insert_link(parent_link("sub", "left"))
        .await
        .unwrap();
    service
        .insert_link(parent_link("sub", "right"))
        .await
        .unwrap();
    let left_root = service
        .insert_link(root_link("left", "leaf-1"))
        .await
        .unwrap();
    let right_root = service
        .insert_link(root_link("right", "leaf-2"))
        .await
        .unwrap();

    let shared = service
        .find_links_with_same_root_scope("sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    let found: HashSet<_> = shared.iter().map(|link| link.id).collect();
    assert_eq!(found, HashSet::from([left_root.id, right_root.id]));
}

#[tokio::test]
async fn test_same_root_filters_by_link_type() {
    let service = memory_link_service();

    service
        .insert_link(parent_link("sub", "parent"))
        .await
        .unwrap();
    let child_root = service
        .insert_link(root_link("parent", "leaf-1"))
        .await
        .unwrap();
    service
        .insert_link(
            EntityLinkBuilder::new()
                .with_scope("parent")
                .with_reference("doc-1")
                .with_reference_type(scope_types::PROCESS)
                .with_link_type("association")
                .with_hierarchy(HierarchyType::Root)
                .build(),
        )
        .await
        .unwrap();

    // Root links of another link type are not collected
    let shared = service
        .find_links_with_same_root_scope("sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].id, child_root.id);

    // Parent hops of another link type are not walked either
    service
        .insert_link(
            EntityLinkBuilder::new()
                .with_scope("other-sub")
                .with_reference("parent")
                .with_reference_type(scope_types::PROCESS)
                .with_link_type("association")
                .with_hierarchy(HierarchyType::Parent)
                .build(),
        )
        .await
        .unwrap();
    let shared = service
        .find_links_with_same_root_scope("other-sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert!(shared.is_empty());
}

#[tokio::test]
async fn test_same_root_treats_grandparent_links_as_informational() {
    let service = memory_link_service();

    // A grandparent link is bookkeeping, not a hop: the walk must neither
    // follow it upward nor collect it as a shared root
    service
        .insert_link(
            EntityLinkBuilder::new()
                .with_scope("sub")
                .with_reference("grandparent")
                .with_reference_type(scope_types::PROCESS)
                .with_hierarchy(HierarchyType::Grandparent)
                .build(),
        )
        .await
        .unwrap();
    service
        .insert_link(root_link("grandparent", "leaf-1"))
        .await
        .unwrap();

    let shared = service
        .find_links_with_same_root_scope("sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert!(shared.is_empty());

    // A real parent hop still works alongside the grandparent record
    service
        .insert_link(parent_link("sub", "parent"))
        .await
        .unwrap();
    let root = service
        .insert_link(root_link("parent", "leaf-2"))
        .await
        .unwrap();

    let shared = service
        .find_links_with_same_root_scope("sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].id, root.id);
}

#[tokio::test]
async fn test_same_root_ignores_incomplete_references() {
    let service = memory_link_service();

    // A parent link without a reference scope type cannot be followed
    service
        .insert_link(
            EntityLinkBuilder::new()
                .with_scope("sub")
                .with_reference("parent")
                .with_hierarchy(HierarchyType::Parent)
                .build(),
        )
        .await
        .unwrap();
    service
        .insert_link(root_link("parent", "leaf-1"))
        .await
        .unwrap();

    let shared = service
        .find_links_with_same_root_scope("sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert!(shared.is_empty());
}

#[tokio::test]
async fn test_same_root_terminates_on_cyclic_parent_links() {
    let service = memory_link_service();

    service.insert_link(parent_link("a", "b")).await.unwrap();
    service.insert_link(parent_link("b", "a")).await.unwrap();
    let a_root = service.insert_link(root_link("a", "leaf-1")).await.unwrap();
    let b_root = service.insert_link(root_link("b", "leaf-2")).await.unwrap();

    // The cycle makes each scope an ancestor of the other, so both root
    // links are visible from both sides and the walk still terminates
    for scope in ["a", "b"] {
        let shared = service
            .find_links_with_same_root_scope(scope, scope_types::PROCESS, link_types::CHILD)
            .await
            .unwrap();
        let found: HashSet<_> = shared.iter().map(|link| link.id).collect();
        assert_eq!(found, HashSet::from([a_root.id, b_root.id]));
    }
}

#[tokio::test]
async fn test_same_root_results_are_time_ordered() {
    let service = memory_link_service();

    service
        .insert_link(parent_link("sub", "parent"))
        .await
        .unwrap();
    let older = service
        .insert_link(root_link("parent", "leaf-1"))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = service
        .insert_link(root_link("parent", "leaf-2"))
        .await
        .unwrap();

    let shared = service
        .find_links_with_same_root_scope("sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert_eq!(
        shared.iter().map(|link| link.id).collect::<Vec<_>>(),
        vec![older.id, newer.id]
    );
}

#[tokio::test]
async fn test_same_root_walk_is_depth_bounded() {
    let service = memory_link_service();

    // Chain deeper than the walk limit: s0 -> s1 -> ... -> s{MAX+4}
    for i in 0..system::MAX_HIERARCHY_DEPTH + 4 {
        let scope = format!("s{i}");
        let parent = format!("s{}", i + 1);
        service
            .insert_link(parent_link(&scope, &parent))
            .await
            .unwrap();
    }

    let reachable = format!("s{}", system::MAX_HIERARCHY_DEPTH);
    let unreachable = format!("s{}", system::MAX_HIERARCHY_DEPTH + 1);
    let near = service
        .insert_link(root_link(&reachable, "leaf-near"))
        .await
        .unwrap();
    service
        .insert_link(root_link(&unreachable, "leaf-far"))
        .await
        .unwrap();

    let shared = service
        .find_links_with_same_root_scope("s0", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].id, near.id);
}

#[tokio::test]
async fn test_historic_same_root_matches_live_semantics() {
    let service = memory_historic_link_service();

    service
        .insert_historic_link(HistoricEntityLink::from(parent_link("sub", "parent")), false)
        .await
        .unwrap();
    let root = service
        .insert_historic_link(HistoricEntityLink::from(root_link("parent", "leaf-1")), true)
        .await
        .unwrap();

    // Removed records still participate in hierarchy reasoning
    let shared = service
        .find_historic_links_with_same_root_scope("sub", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].id, root.id);
    assert!(shared[0].removed);

    let shared = service
        .find_historic_links_with_same_root_scope("parent", scope_types::PROCESS, link_types::CHILD)
        .await
        .unwrap();
    assert!(shared.is_empty());
}
