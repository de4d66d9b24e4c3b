//! External system integrations for Medstar.
//!
//! - [`database`] - Store traits ([`SourceReader`](database::SourceReader),
//!   [`WarehouseStore`](database::WarehouseStore)) and factories
//! - [`postgresql`] - PostgreSQL implementations of both stores
//! - [`memory`] - In-memory stores for dry runs and tests
//!
//! # Design Pattern
//!
//! Adapters isolate the database driver from the pipeline. The core only sees
//! the traits, so the same pipeline runs against PostgreSQL, an in-memory
//! warehouse (dry run), or fully in-memory stores in tests.
//!
//! ```rust,no_run
//! use medstar::adapters::database::{create_source_reader, create_warehouse_store};
//! use medstar::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("medstar.toml")?;
//! let source = create_source_reader(&config).await?;
//! let warehouse = create_warehouse_store(&config, false).await?;
//!
//! source.test_connection().await?;
//! warehouse.test_connection().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
