//! Transformation logic
//!
//! Everything between the source snapshot and the warehouse rows, with no I/O:
//!
//! - **Calendar**: one `dim_date` row per day of the configured range
//! - **Dimensions**: source records to dimension rows, providers denormalized
//! - **Keys**: natural-key to surrogate-key lookups read back after a load
//! - **Facts**: encounter facts with measures and the readmission flag
//! - **Bridges**: junction rows resolved to fact and dimension keys

pub mod bridges;
pub mod calendar;
pub mod dimensions;
pub mod facts;
pub mod keys;
pub mod readmission;

pub use bridges::{BridgeLoader, BridgeOutcome, BridgeStats};
pub use calendar::{calendar_row, CalendarRange};
pub use facts::{FactBatch, FactKeys, FactTransformer, RejectedFact};
pub use keys::{IdKeyMap, KeyMap, NameKeyMap};
pub use readmission::{readmission_flags, ReadmissionRule};
