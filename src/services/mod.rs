//! # Entity Link Services
//!
//! Facades over the storage engines. Services validate records before they
//! reach storage and emit structured logs; query calls pass through to the
//! bound store unchanged.
//!
//! Embedding engines construct services with whichever store binding fits
//! the call site: a pool-bound store for standalone operations, or a store
//! bound to the current unit of work when link changes must commit together
//! with engine state.

pub mod entity_link_service;
pub mod historic_entity_link_service;

pub use entity_link_service::EntityLinkService;
pub use historic_entity_link_service::HistoricEntityLinkService;
