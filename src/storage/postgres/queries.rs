//! SQL for the entity link tables.
//!
//! Every function takes `&mut PgConnection` so the pool-bound and
//! unit-of-work execution paths in the parent module share a single SQL
//! implementation. Queries use the runtime API with explicit binds; rows are
//! decoded through plain row structs and converted into domain records,
//! parsing the hierarchy role out of its text column.
//!
//! The ancestor resolution behind `find_with_same_root_scope` is a recursive
//! CTE bounded by a depth guard, the same shape used for cycle checks in
//! workflow DAGs: walk `parent` rows upward from the queried scope, then
//! return every `root` row recorded against a scope the walk reached.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::{system, HierarchyType};
use crate::error::{EntityLinkError, Result};
use crate::models::{EntityLink, HistoricEntityLink};

#[derive(Debug, FromRow)]
struct EntityLinkRow {
    id: Uuid,
    scope_id: String,
    scope_type: String,
    reference_scope_id: Option<String>,
    reference_scope_type: Option<String>,
    link_type: String,
    hierarchy_type: Option<String>,
    create_time: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct HistoricEntityLinkRow {
    id: Uuid,
    scope_id: String,
    scope_type: String,
    reference_scope_id: Option<String>,
    reference_scope_type: Option<String>,
    link_type: String,
    hierarchy_type: Option<String>,
    create_time: DateTime<Utc>,
    removed: bool,
}

fn parse_hierarchy(raw: Option<String>) -> Result<Option<HierarchyType>> {
    raw.as_deref()
        .map(HierarchyType::from_str)
        .transpose()
        .map_err(|message| EntityLinkError::storage("decode_link", message))
}

impl TryFrom<EntityLinkRow> for EntityLink {
    type Error = EntityLinkError;

    fn try_from(row: EntityLinkRow) -> Result<Self> {
        Ok(EntityLink {
            id: row.id,
            scope_id: row.scope_id,
            scope_type: row.scope_type,
            reference_scope_id: row.reference_scope_id,
            reference_scope_type: row.reference_scope_type,
            link_type: row.link_type,
            hierarchy_type: parse_hierarchy(row.hierarchy_type)?,
            create_time: row.create_time,
        })
    }
}

impl TryFrom<HistoricEntityLinkRow> for HistoricEntityLink {
    type Error = EntityLinkError;

    fn try_from(row: HistoricEntityLinkRow) -> Result<Self> {
        Ok(HistoricEntityLink {
            id: row.id,
            scope_id: row.scope_id,
            scope_type: row.scope_type,
            reference_scope_id: row.reference_scope_id,
            reference_scope_type: row.reference_scope_type,
            link_type: row.link_type,
            hierarchy_type: parse_hierarchy(row.hierarchy_type)?,
            create_time: row.create_time,
            removed: row.removed,
        })
    }
}

pub(crate) async fn insert_entity_link(
    conn: &mut PgConnection,
    link: &EntityLink,
) -> Result<EntityLink> {
    let row = sqlx::query_as::<_, EntityLinkRow>(
        r#"
        INSERT INTO entity_links
            (id, scope_id, scope_type, reference_scope_id, reference_scope_type,
             link_type, hierarchy_type, create_time)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        RETURNING id, scope_id, scope_type, reference_scope_id, reference_scope_type,
                  link_type, hierarchy_type, create_time
        "#,
    )
    .bind(link.id)
    .bind(&link.scope_id)
    .bind(&link.scope_type)
    .bind(&link.reference_scope_id)
    .bind(&link.reference_scope_type)
    .bind(&link.link_type)
    .bind(link.hierarchy_type.map(|h| h.as_str()))
    .fetch_one(&mut *conn)
    .await?;

    row.try_into()
}

pub(crate) async fn find_entity_links_by_scope(
    conn: &mut PgConnection,
    scope_id: &str,
    scope_type: &str,
    link_type: &str,
) -> Result<Vec<EntityLink>> {
    let rows = sqlx::query_as::<_, EntityLinkRow>(
        r#"
        SELECT id, scope_id, scope_type, reference_scope_id, reference_scope_type,
               link_type, hierarchy_type, create_time
        FROM entity_links
        WHERE scope_id = $1 AND scope_type = $2 AND link_type = $3
        ORDER BY create_time, id
        "#,
    )
    .bind(scope_id)
    .bind(scope_type)
    .bind(link_type)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(EntityLink::try_from).collect()
}

pub(crate) async fn find_entity_links_by_reference_scope(
    conn: &mut PgConnection,
    reference_scope_id: &str,
    reference_scope_type: &str,
    link_type: &str,
) -> Result<Vec<EntityLink>> {
    let rows = sqlx::query_as::<_, EntityLinkRow>(
        r#"
        SELECT id, scope_id, scope_type, reference_scope_id, reference_scope_type,
               link_type, hierarchy_type, create_time
        FROM entity_links
        WHERE reference_scope_id = $1 AND reference_scope_type = $2 AND link_type = $3
        ORDER BY create_time, id
        "#,
    )
    .bind(reference_scope_id)
    .bind(reference_scope_type)
    .bind(link_type)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(EntityLink::try_from).collect()
}

pub(crate) async fn find_entity_links_with_same_root_scope(
    conn: &mut PgConnection,
    scope_id: &str,
    scope_type: &str,
    link_type: &str,
) -> Result<Vec<EntityLink>> {
    let rows = sqlx::query_as::<_, EntityLinkRow>(
        r#"
        WITH RECURSIVE scope_ancestors AS (
            -- Base case: direct parents of the queried scope
            SELECT el.reference_scope_id AS scope_id,
                   el.reference_scope_type AS scope_type,
                   1 AS depth
            FROM entity_links el
            WHERE el.scope_id = $1
              AND el.scope_type = $2
              AND el.link_type = $3
              AND el.hierarchy_type = $4
              AND el.reference_scope_id IS NOT NULL
              AND el.reference_scope_type IS NOT NULL

            UNION ALL

            -- Recursive case: keep walking parent links upward
            SELECT el.reference_scope_id,
                   el.reference_scope_type,
                   sa.depth + 1
            FROM entity_links el
            JOIN scope_ancestors sa
              ON el.scope_id = sa.scope_id AND el.scope_type = sa.scope_type
            WHERE el.link_type = $3
              AND el.hierarchy_type = $4
              AND el.reference_scope_id IS NOT NULL
              AND el.reference_scope_type IS NOT NULL
              AND sa.depth < $6
        )
        SELECT l.id, l.scope_id, l.scope_type, l.reference_scope_id, l.reference_scope_type,
               l.link_type, l.hierarchy_type, l.create_time
        FROM entity_links l
        WHERE l.link_type = $3
          AND l.hierarchy_type = $5
          AND EXISTS (
              SELECT 1 FROM scope_ancestors sa
              WHERE sa.scope_id = l.scope_id AND sa.scope_type = l.scope_type
          )
        ORDER BY l.create_time, l.id
        "#,
    )
    .bind(scope_id)
    .bind(scope_type)
    .bind(link_type)
    .bind(HierarchyType::Parent.as_str())
    .bind(HierarchyType::Root.as_str())
    .bind(system::MAX_HIERARCHY_DEPTH as i32)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(EntityLink::try_from).collect()
}

pub(crate) async fn delete_entity_links_by_scope(
    conn: &mut PgConnection,
    scope_id: &str,
    scope_type: &str,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM entity_links
        WHERE scope_id = $1 AND scope_type = $2
        "#,
    )
    .bind(scope_id)
    .bind(scope_type)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn insert_historic_entity_link(
    conn: &mut PgConnection,
    link: &HistoricEntityLink,
) -> Result<HistoricEntityLink> {
    let row = sqlx::query_as::<_, HistoricEntityLinkRow>(
        r#"
        INSERT INTO historic_entity_links
            (id, scope_id, scope_type, reference_scope_id, reference_scope_type,
             link_type, hierarchy_type, create_time, removed)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8)
        RETURNING id, scope_id, scope_type, reference_scope_id, reference_scope_type,
                  link_type, hierarchy_type, create_time, removed
        "#,
    )
    .bind(link.id)
    .bind(&link.scope_id)
    .bind(&link.scope_type)
    .bind(&link.reference_scope_id)
    .bind(&link.reference_scope_type)
    .bind(&link.link_type)
    .bind(link.hierarchy_type.map(|h| h.as_str()))
    .bind(link.removed)
    .fetch_one(&mut *conn)
    .await?;

    row.try_into()
}

pub(crate) async fn find_historic_entity_links_by_scope(
    conn: &mut PgConnection,
    scope_id: &str,
    scope_type: &str,
    link_type: &str,
) -> Result<Vec<HistoricEntityLink>> {
    let rows = sqlx::query_as::<_, HistoricEntityLinkRow>(
        r#"
        SELECT id, scope_id, scope_type, reference_scope_id, reference_scope_type,
               link_type, hierarchy_type, create_time, removed
        FROM historic_entity_links
        WHERE scope_id = $1 AND scope_type = $2 AND link_type = $3
        ORDER BY create_time, id
        "#,
    )
    .bind(scope_id)
    .bind(scope_type)
    .bind(link_type)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(HistoricEntityLink::try_from).collect()
}

pub(crate) async fn find_historic_entity_links_by_reference_scope(
    conn: &mut PgConnection,
    reference_scope_id: &str,
    reference_scope_type: &str,
    link_type: &str,
) -> Result<Vec<HistoricEntityLink>> {
    let rows = sqlx::query_as::<_, HistoricEntityLinkRow>(
        r#"
        SELECT id, scope_id, scope_type, reference_scope_id, reference_scope_type,
               link_type, hierarchy_type, create_time, removed
        FROM historic_entity_links
        WHERE reference_scope_id = $1 AND reference_scope_type = $2 AND link_type = $3
        ORDER BY create_time, id
        "#,
    )
    .bind(reference_scope_id)
    .bind(reference_scope_type)
    .bind(link_type)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(HistoricEntityLink::try_from).collect()
}

pub(crate) async fn find_historic_entity_links_with_same_root_scope(
    conn: &mut PgConnection,
    scope_id: &str,
    scope_type: &str,
    link_type: &str,
) -> Result<Vec<HistoricEntityLink>> {
    let rows = sqlx::query_as::<_, HistoricEntityLinkRow>(
        r#"
        WITH RECURSIVE scope_ancestors AS (
            SELECT el.reference_scope_id AS scope_id,
                   el.reference_scope_type AS scope_type,
                   1 AS depth
            FROM historic_entity_links el
            WHERE el.scope_id = $1
              AND el.scope_type = $2
              AND el.link_type = $3
              AND el.hierarchy_type = $4
              AND el.reference_scope_id IS NOT NULL
              AND el.reference_scope_type IS NOT NULL

            UNION ALL

            SELECT el.reference_scope_id,
                   el.reference_scope_type,
                   sa.depth + 1
            FROM historic_entity_links el
            JOIN scope_ancestors sa
              ON el.scope_id = sa.scope_id AND el.scope_type = sa.scope_type
            WHERE el.link_type = $3
              AND el.hierarchy_type = $4
              AND el.reference_scope_id IS NOT NULL
              AND el.reference_scope_type IS NOT NULL
              AND sa.depth < $6
        )
        SELECT l.id, l.scope_id, l.scope_type, l.reference_scope_id, l.reference_scope_type,
               l.link_type, l.hierarchy_type, l.create_time, l.removed
        FROM historic_entity_links l
        WHERE l.link_type = $3
          AND l.hierarchy_type = $5
          AND EXISTS (
              SELECT 1 FROM scope_ancestors sa
              WHERE sa.scope_id = l.scope_id AND sa.scope_type = l.scope_type
          )
        ORDER BY l.create_time, l.id
        "#,
    )
    .bind(scope_id)
    .bind(scope_type)
    .bind(link_type)
    .bind(HierarchyType::Parent.as_str())
    .bind(HierarchyType::Root.as_str())
    .bind(system::MAX_HIERARCHY_DEPTH as i32)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(HistoricEntityLink::try_from).collect()
}

pub(crate) async fn delete_historic_entity_links_by_scope(
    conn: &mut PgConnection,
    scope_id: &str,
    scope_type: &str,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM historic_entity_links
        WHERE scope_id = $1 AND scope_type = $2
        "#,
    )
    .bind(scope_id)
    .bind(scope_type)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
