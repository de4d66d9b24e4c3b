//! Core business logic for Medstar.
//!
//! This module contains the transformation logic and the orchestration of a
//! warehouse load.
//!
//! # Modules
//!
//! - [`load`] - Run coordination, dimension loading and bulk writes
//! - [`transform`] - Calendar, dimension, fact and bridge row construction
//! - [`verification`] - Post-load integrity checks
//!
//! # Load Workflow
//!
//! 1. **Extract**: Read the operational tables into a snapshot
//! 2. **Prepare**: Truncate the warehouse, or require it to be empty
//! 3. **Dimensions**: Generate the calendar, load dimensions, read keys back
//! 4. **Facts**: Resolve keys, flag readmissions, load encounter facts
//! 5. **Bridges**: Resolve junction rows against fact and dimension keys
//! 6. **Verify** (optional): Count rows, NULL keys and orphaned keys
//!
//! # Example
//!
//! ```rust,no_run
//! use medstar::adapters::database::{create_source_reader, create_warehouse_store};
//! use medstar::config::load_config;
//! use medstar::core::load::{EtlCoordinator, RunOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("medstar.toml")?;
//!
//! let source = create_source_reader(&config).await?;
//! let warehouse = create_warehouse_store(&config, false).await?;
//! let coordinator = EtlCoordinator::new(RunOptions::from_config(&config)?, source, warehouse);
//!
//! let summary = coordinator.run().await?;
//! println!("Facts: {:?}", summary.rows_written("fact_encounters"));
//! println!("Readmissions: {}", summary.readmissions);
//! # Ok(())
//! # }
//! ```

pub mod load;
pub mod transform;
pub mod verification;
