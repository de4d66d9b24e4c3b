//! Store abstraction layer
//!
//! Trait-based access to the operational and warehouse stores, plus factory
//! functions that pick an implementation from configuration.

pub mod factory;
pub mod traits;

pub use factory::{create_source_reader, create_warehouse_store};
pub use traits::{RowChunk, SourceReader, WarehouseStore};
