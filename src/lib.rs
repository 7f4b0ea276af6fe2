#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # EntityLink Core
//!
//! Entity link store for workflow orchestration engines: directed
//! relationships between scopes (process instances, case instances, task
//! instances) with hierarchy-aware queries.
//!
//! ## Overview
//!
//! The store is dual-tracked. The live side holds links for currently
//! running scopes and is queried on the hot path; the historic side is an
//! append-oriented audit mirror that survives the live records. The two
//! sides never synchronize implicitly: embedding engines decide what to
//! mirror and when.
//!
//! Links are directed and typed. Each record points from a referencing scope
//! to a referenced scope, discriminated by a link type and an optional
//! hierarchy role (`Root`, `Parent`, ...). Hierarchy-aware retrieval walks
//! recorded `Parent` links upward and collects the `Root` links hanging off
//! the ancestors, without recomputing hierarchies at query time from
//! anything but the link records themselves.
//!
//! ## Architecture
//!
//! - [`services`] - validation, logging and record factories over a store
//! - [`storage`] - the storage trait seam plus in-memory and Postgres engines
//! - [`models`] - the live and historic record types
//! - [`constants`] - hierarchy roles and well-known discriminators
//! - [`config`] - file + environment configuration loading
//! - [`error`] - structured error handling
//!
//! Storage is injected: services receive an `Arc<dyn EntityLinkStore>` (or
//! the historic counterpart) at construction, so engines pick the engine and
//! transaction binding per call site. The Postgres engine binds either to a
//! pool or to a caller-managed [`storage::PgUnitOfWork`], which keeps link
//! writes atomic with whatever else the engine persists in the same command.
//!
//! ## Quick Start
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
//! link.scope_id = "proc-1".to_string();
//! link.scope_type = scope_types::PROCESS.to_string();
//! link.reference_scope_id = Some("task-1".to_string());
//! link.reference_scope_type = Some(scope_types::TASK.to_string());
//! link.link_type = link_types::CHILD.to_string();
//! link.hierarchy_type = Some(HierarchyType::Root);
//!
//! let stored = service.insert_link(link).await.unwrap();
//! assert_eq!(stored.scope_id, "proc-1");
//! # });
//! ```
//!
//! ## Testing
//!
//! Unit and behavior tests run against the in-memory engine and need no
//! database. Database-backed tests opt in through `DATABASE_URL`:
//!
//! ```bash
//! cargo test                # in-memory coverage
//! DATABASE_URL=... cargo test   # adds the Postgres engine tests
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod test_utils;

pub use config::{DatabaseConfig, EntityLinkConfig};
pub use constants::{link_types, scope_types, system, HierarchyType};
pub use error::{EntityLinkError, Result};
pub use models::{EntityLink, HistoricEntityLink};
pub use services::{EntityLinkService, HistoricEntityLinkService};
pub use storage::{
    DatabaseConnection, DatabaseMigrations, EntityLinkStore, HistoricEntityLinkStore,
    InMemoryEntityLinkStore, InMemoryHistoricEntityLinkStore, PgEntityLinkStore,
    PgHistoricEntityLinkStore, PgUnitOfWork,
};
