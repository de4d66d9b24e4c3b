//! In-memory stores
//!
//! [`MemoryWarehouse`] stands in for the warehouse during dry runs and tests;
//! [`MemorySource`] serves a fixed
//! [`SourceSnapshot`](crate::domain::SourceSnapshot) for tests.

pub mod source;
pub mod warehouse;

pub use source::MemorySource;
pub use warehouse::MemoryWarehouse;
