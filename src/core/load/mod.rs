//! Load orchestration and bulk writing
//!
//! This module provides the load side of Medstar, including:
//! - Chunked bulk writes into the warehouse
//! - Dimension loading and key read-back
//! - Run coordination and summary reporting

pub mod bulk;
pub mod coordinator;
pub mod dimensions;
pub mod summary;

pub use bulk::BulkWriter;
pub use coordinator::{EtlCoordinator, RunOptions};
pub use dimensions::{DimensionCounts, DimensionKeys, DimensionLoader};
pub use summary::{EtlSummary, StageReport, TableLoad};
