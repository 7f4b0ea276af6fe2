//! # In-Memory Storage Engine
//!
//! Process-local entity link tables behind `parking_lot` locks.
//!
//! Records live in a `HashMap` keyed by id, with a secondary index on the
//! (`scope_id`, `scope_type`) pair so scope-keyed lookups and deletes avoid
//! scanning the table. Reference-keyed lookups scan; they are off the hot
//! path for embedding engines.
//!
//! The ancestor walk behind `find_with_same_root_scope` is a level-bounded
//! frontier expansion over `Parent` links, capped at
//! [`system::MAX_HIERARCHY_DEPTH`](crate::constants::system) levels to match
//! the recursion guard in the Postgres engine. Already-visited scopes are
//! never re-expanded, so cyclic link data terminates.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::constants::system;
use crate::error::{EntityLinkError, Result};
use crate::models::{EntityLink, HistoricEntityLink};
use crate::storage::{EntityLinkStore, HistoricEntityLinkStore};

/// Composite key identifying a scope.
type ScopeKey = (String, String);

#[derive(Default)]
struct LiveTable {
    records: HashMap<Uuid, EntityLink>,
    by_scope: HashMap<ScopeKey, HashSet<Uuid>>,
}

#[derive(Default)]
struct HistoricTable {
    records: HashMap<Uuid, HistoricEntityLink>,
    by_scope: HashMap<ScopeKey, HashSet<Uuid>>,
}

/// In-memory implementation of [`EntityLinkStore`].
#[derive(Default)]
pub struct InMemoryEntityLinkStore {
    table: RwLock<LiveTable>,
}

/// In-memory implementation of [`HistoricEntityLinkStore`].
#[derive(Default)]
pub struct InMemoryHistoricEntityLinkStore {
    table: RwLock<HistoricTable>,
}

impl InMemoryEntityLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryHistoricEntityLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Walk parent links upward from `start`, collecting every reachable scope.
///
/// `parents_of` returns the parent scope keys recorded for a scope. The walk
/// expands level by level and stops after `MAX_HIERARCHY_DEPTH` levels or
/// when a level yields nothing new. The starting scope itself only appears
/// in the result if the link data cycles back to it.
fn walk_ancestors<F>(start: ScopeKey, parents_of: F) -> HashSet<ScopeKey>
where
    F: Fn(&ScopeKey) -> Vec<ScopeKey>,
{
    let mut ancestors: HashSet<ScopeKey> = HashSet::new();
    let mut frontier = vec![start];

    for _ in 0..system::MAX_HIERARCHY_DEPTH {
        let mut next = Vec::new();
        for key in frontier.drain(..) {
            for parent in parents_of(&key) {
                if ancestors.insert(parent.clone()) {
                    next.push(parent);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    ancestors
}

fn sort_live(links: &mut [EntityLink]) {
    links.sort_by(|a, b| {
        a.create_time
            .cmp(&b.create_time)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn sort_historic(links: &mut [HistoricEntityLink]) {
    links.sort_by(|a, b| {
        a.create_time
            .cmp(&b.create_time)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl EntityLinkStore for InMemoryEntityLinkStore {
    async fn insert(&self, mut link: EntityLink) -> Result<EntityLink> {
        let mut table = self.table.write();
        if table.records.contains_key(&link.id) {
            return Err(EntityLinkError::storage(
                "insert_link",
                format!("link {} already exists", link.id),
            ));
        }

        link.create_time = Utc::now();
        table
            .by_scope
            .entry((link.scope_id.clone(), link.scope_type.clone()))
            .or_default()
            .insert(link.id);
        table.records.insert(link.id, link.clone());

        Ok(link)
    }

    async fn find_by_scope_and_type(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>> {
        let table = self.table.read();
        let key = (scope_id.to_string(), scope_type.to_string());
        let mut links: Vec<EntityLink> = table
            .by_scope
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(|id| table.records.get(id))
            .filter(|link| link.link_type == link_type)
            .cloned()
            .collect();
        sort_live(&mut links);
        Ok(links)
    }

    async fn find_by_reference_scope_and_type(
        &self,
        reference_scope_id: &str,
        reference_scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>> {
        let table = self.table.read();
        let mut links: Vec<EntityLink> = table
            .records
            .values()
            .filter(|link| {
                link.reference_scope_id.as_deref() == Some(reference_scope_id)
                    && link.reference_scope_type.as_deref() == Some(reference_scope_type)
                    && link.link_type == link_type
            })
            .cloned()
            .collect();
        sort_live(&mut links);
        Ok(links)
    }

    async fn find_with_same_root_scope(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<EntityLink>> {
        let table = self.table.read();

        let parents_of = |key: &ScopeKey| -> Vec<ScopeKey> {
            table
                .by_scope
                .get(key)
                .into_iter()
                .flatten()
                .filter_map(|id| table.records.get(id))
                .filter(|link| {
                    link.link_type == link_type
                        && link.hierarchy_type.is_some_and(|h| h.is_traversable())
                })
                .filter_map(|link| {
                    match (&link.reference_scope_id, &link.reference_scope_type) {
                        (Some(ref_id), Some(ref_type)) => {
                            Some((ref_id.clone(), ref_type.clone()))
                        }
                        _ => None,
                    }
                })
                .collect()
        };

        let ancestors = walk_ancestors(
            (scope_id.to_string(), scope_type.to_string()),
            parents_of,
        );
        if ancestors.is_empty() {
            return Ok(Vec::new());
        }

        let mut links: Vec<EntityLink> = table
            .records
            .values()
            .filter(|link| {
                link.link_type == link_type
                    && link.hierarchy_type.is_some_and(|h| h.is_root())
                    && ancestors.contains(&(link.scope_id.clone(), link.scope_type.clone()))
            })
            .cloned()
            .collect();
        sort_live(&mut links);
        Ok(links)
    }

    async fn delete_by_scope_and_type(&self, scope_id: &str, scope_type: &str) -> Result<u64> {
        let mut table = self.table.write();
        let key = (scope_id.to_string(), scope_type.to_string());
        let Some(ids) = table.by_scope.remove(&key) else {
            return Ok(0);
        };

        let mut deleted = 0u64;
        for id in ids {
            if table.records.remove(&id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl HistoricEntityLinkStore for InMemoryHistoricEntityLinkStore {
    async fn insert(&self, mut link: HistoricEntityLink) -> Result<HistoricEntityLink> {
        let mut table = self.table.write();
        if table.records.contains_key(&link.id) {
            return Err(EntityLinkError::storage(
                "insert_historic_link",
                format!("historic link {} already exists", link.id),
            ));
        }

        link.create_time = Utc::now();
        table
            .by_scope
            .entry((link.scope_id.clone(), link.scope_type.clone()))
            .or_default()
            .insert(link.id);
        table.records.insert(link.id, link.clone());

        Ok(link)
    }

    async fn find_by_scope_and_type(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>> {
        let table = self.table.read();
        let key = (scope_id.to_string(), scope_type.to_string());
        let mut links: Vec<HistoricEntityLink> = table
            .by_scope
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(|id| table.records.get(id))
            .filter(|link| link.link_type == link_type)
            .cloned()
            .collect();
        sort_historic(&mut links);
        Ok(links)
    }

    async fn find_by_reference_scope_and_type(
        &self,
        reference_scope_id: &str,
        reference_scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>> {
        let table = self.table.read();
        let mut links: Vec<HistoricEntityLink> = table
            .records
            .values()
            .filter(|link| {
                link.reference_scope_id.as_deref() == Some(reference_scope_id)
                    && link.reference_scope_type.as_deref() == Some(reference_scope_type)
                    && link.link_type == link_type
            })
            .cloned()
            .collect();
        sort_historic(&mut links);
        Ok(links)
    }

    async fn find_with_same_root_scope(
        &self,
        scope_id: &str,
        scope_type: &str,
        link_type: &str,
    ) -> Result<Vec<HistoricEntityLink>> {
        let table = self.table.read();

        let parents_of = |key: &ScopeKey| -> Vec<ScopeKey> {
            table
                .by_scope
                .get(key)
                .into_iter()
                .flatten()
                .filter_map(|id| table.records.get(id))
                .filter(|link| {
                    link.link_type == link_type
                        && link.hierarchy_type.is_some_and(|h| h.is_traversable())
                })
                .filter_map(|link| {
                    match (&link.reference_scope_id, &link.reference_scope_type) {
                        (Some(ref_id), Some(ref_type)) => {
                            Some((ref_id.clone(), ref_type.clone()))
                        }
                        _ => None,
                    }
                })
                .collect()
        };

        let ancestors = walk_ancestors(
            (scope_id.to_string(), scope_type.to_string()),
            parents_of,
        );
        if ancestors.is_empty() {
            return Ok(Vec::new());
        }

        let mut links: Vec<HistoricEntityLink> = table
            .records
            .values()
            .filter(|link| {
                link.link_type == link_type
                    && link.hierarchy_type.is_some_and(|h| h.is_root())
                    && ancestors.contains(&(link.scope_id.clone(), link.scope_type.clone()))
            })
            .cloned()
            .collect();
        sort_historic(&mut links);
        Ok(links)
    }

    async fn delete_by_scope_and_type(&self, scope_id: &str, scope_type: &str) -> Result<u64> {
        let mut table = self.table.write();
        let key = (scope_id.to_string(), scope_type.to_string());
        let Some(ids) = table.by_scope.remove(&key) else {
            return Ok(0);
        };

        let mut deleted = 0u64;
        for id in ids {
            if table.records.remove(&id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
