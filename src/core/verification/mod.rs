//! Warehouse verification
//!
//! This module provides post-load integrity checks: row counts, NULL
//! foreign keys and orphaned foreign keys.

pub mod report;
pub mod verify;

pub use report::{CheckResult, TableCount, VerificationReport};
pub use verify::{ExpectedCounts, Verifier};
