pub mod entity_link;
pub mod historic_entity_link;

// Re-export core models for easy access
pub use entity_link::EntityLink;
pub use historic_entity_link::HistoricEntityLink;
