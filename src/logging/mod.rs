//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs
//! - Configurable log levels (overridable with `RUST_LOG`)
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use medstar::logging::init_logging;
//! use medstar::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use medstar::log_stage_start;
/// use medstar::domain::Stage;
///
/// log_stage_start!(Stage::Dimensions);
/// ```
#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr) => {
        tracing::info!(stage = %$stage, "Stage started");
    };
}

/// Log the completion of a pipeline stage with its row count
///
/// # Example
///
/// ```no_run
/// use medstar::log_stage_complete;
/// use medstar::domain::Stage;
/// use std::time::Duration;
///
/// log_stage_complete!(Stage::Facts, 1200, Duration::from_millis(850));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $rows:expr, $duration:expr) => {
        tracing::info!(
            stage = %$stage,
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Stage completed"
        );
    };
}

/// Log progress of a chunked table write
///
/// # Example
///
/// ```no_run
/// use medstar::log_chunk_progress;
///
/// log_chunk_progress!("fact_encounters", 2, 4, 5000);
/// ```
#[macro_export]
macro_rules! log_chunk_progress {
    ($table:expr, $chunk:expr, $total_chunks:expr, $rows:expr) => {
        tracing::debug!(
            table = $table,
            chunk = $chunk,
            total_chunks = $total_chunks,
            rows = $rows,
            progress_pct = ($chunk as f64 / $total_chunks as f64 * 100.0),
            "Chunk written"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use medstar::log_error_with_context;
/// use medstar::domain::EtlError;
///
/// let error = EtlError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
