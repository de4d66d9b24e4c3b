// Medstar - Healthcare Star-Schema ETL Tool
// Copyright (c) 2025 Medstar Contributors
// Licensed under the MIT License

//! # Medstar - Healthcare Star-Schema ETL
//!
//! Medstar reads a hospital's operational database (patients, providers,
//! encounters, diagnoses, procedures, billing) and reloads an analytical star
//! schema: eight dimensions, one encounter fact table and two bridge tables.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Extracting** a consistent snapshot of the operational tables
//! - **Loading dimensions** and reading back their surrogate keys
//! - **Generating** the calendar dimension for a configured date range
//! - **Transforming** encounters into fact rows, including 30-day readmission detection
//! - **Linking** encounters to diagnoses and procedures through bridge tables
//! - **Verifying** row counts, NULL keys and orphaned references after a load
//!
//! ## Architecture
//!
//! Medstar follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (transform, load, verification)
//! - [`adapters`] - Store integrations (PostgreSQL, in-memory)
//! - [`domain`] - Source records, warehouse rows and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medstar::adapters::database::{create_source_reader, create_warehouse_store};
//! use medstar::config::load_config;
//! use medstar::core::load::{EtlCoordinator, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("medstar.toml")?;
//!
//!     let source = create_source_reader(&config).await?;
//!     let warehouse = create_warehouse_store(&config, false).await?;
//!
//!     let coordinator = EtlCoordinator::new(RunOptions::from_config(&config)?, source, warehouse);
//!     let summary = coordinator.run().await?;
//!
//!     println!(
//!         "Loaded {} rows, {} readmissions",
//!         summary.total_rows_written(),
//!         summary.readmissions
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Readmissions
//!
//! The readmission scan is a pure function over the encounter list and can be
//! used on its own:
//!
//! ```rust,no_run
//! use medstar::core::transform::{readmission_flags, ReadmissionRule};
//! use medstar::domain::EncounterRecord;
//!
//! # fn example(encounters: &[EncounterRecord]) {
//! let flags = readmission_flags(encounters, &ReadmissionRule::default());
//! let readmitted = flags.iter().filter(|f| **f).count();
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Medstar uses the [`domain::EtlError`] type for all library errors. Failures
//! inside the pipeline carry the stage they happened in.
//!
//! ## Logging
//!
//! Medstar uses structured logging with the `tracing` crate. Every stage logs
//! a start and completion event with row counts and duration.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
