//! Configuration management for Medstar.
//!
//! Medstar uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MEDSTAR_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation that names the offending key
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use medstar::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("medstar.toml")?;
//!
//! println!("Chunk size: {}", config.etl.chunk_size);
//! println!("Calendar: {} .. {}", config.etl.calendar_start, config.etl.calendar_end);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run mode
//! - [`DatabaseConfig`] - Connection settings, used for `[source]` and `[warehouse]`
//! - [`EtlConfig`] - Chunk size, load mode, calendar range, readmission rules
//! - [`VerificationConfig`] - Post-load verification
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! connection_string = "${MEDSTAR_SOURCE_URL}"
//!
//! [warehouse]
//! connection_string = "${MEDSTAR_WAREHOUSE_URL}"
//!
//! [etl]
//! chunk_size = 5000
//! load_mode = "truncate"
//! calendar_start = "2020-01-01"
//! calendar_end = "2030-12-31"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DatabaseConfig, EtlConfig, LoadMode, LoggingConfig, MedstarConfig,
    VerificationConfig,
};
pub use secret::{secret_string, ConnectionUrl, SecretString};
