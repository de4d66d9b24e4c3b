//! Domain error types
//!
//! This module defines the error hierarchy for Medstar. Driver types from
//! `tokio-postgres` and `deadpool-postgres` are converted to strings at the
//! adapter boundary and never appear here.

use std::fmt;
use thiserror::Error;

/// Pipeline stage in which an error occurred
///
/// Stages run strictly in this order; a failed stage stops the run so that
/// later stages never consume partial output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading the operational store
    Extract,
    /// Truncating or checking the warehouse before loading
    PrepareTarget,
    /// Loading dimension tables (including the calendar)
    Dimensions,
    /// Transforming and loading the encounter fact table
    Facts,
    /// Loading the diagnosis and procedure bridge tables
    Bridges,
    /// Post-load integrity checks
    Verification,
}

impl Stage {
    /// Stable lowercase name used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::PrepareTarget => "prepare_target",
            Stage::Dimensions => "dimensions",
            Stage::Facts => "facts",
            Stage::Bridges => "bridges",
            Stage::Verification => "verification",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main Medstar error type
#[derive(Debug, Error)]
pub enum EtlError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operational (source) store errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Warehouse (target) store errors
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    /// Key mapping invariant violated
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A pipeline stage failed; later stages did not run
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<EtlError>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl EtlError {
    /// Wrap an error with the stage it occurred in
    ///
    /// Already-wrapped errors keep their original stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            EtlError::StageFailed { .. } => self,
            other => EtlError::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage the error occurred in, if known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            EtlError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the root cause is a lost or refused connection
    pub fn is_connection(&self) -> bool {
        match self {
            EtlError::Source(SourceError::ConnectionFailed(_)) => true,
            EtlError::Warehouse(WarehouseError::ConnectionFailed(_)) => true,
            EtlError::StageFailed { source, .. } => source.is_connection(),
            _ => false,
        }
    }
}

/// Errors raised while reading the operational store
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to connect to the operational database
    #[error("Failed to connect to source database: {0}")]
    ConnectionFailed(String),

    /// Query failed
    #[error("Source query failed on {table}: {message}")]
    QueryFailed { table: String, message: String },

    /// A row could not be decoded into its record type
    #[error("Malformed source row in {table}: {message}")]
    MalformedRow { table: String, message: String },
}

/// Errors raised while writing to or reading from the warehouse
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// Failed to connect to the warehouse database
    #[error("Failed to connect to warehouse database: {0}")]
    ConnectionFailed(String),

    /// A chunk insert violated a constraint or otherwise failed
    #[error("Insert into {table} failed at chunk {chunk}: {message}")]
    InsertFailed {
        table: String,
        chunk: usize,
        message: String,
    },

    /// Transaction could not be opened or committed
    #[error("Transaction on {table} failed: {message}")]
    TransactionFailed { table: String, message: String },

    /// Query failed
    #[error("Warehouse query failed on {table}: {message}")]
    QueryFailed { table: String, message: String },

    /// Warehouse already holds rows and the load mode forbids loading on top
    #[error("Warehouse is not empty: {0}")]
    NotEmpty(String),

    /// Schema bootstrap failed
    #[error("Failed to initialize warehouse schema: {0}")]
    SchemaFailed(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        EtlError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for EtlError {
    fn from(err: serde_json::Error) -> Self {
        EtlError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for EtlError {
    fn from(err: toml::de::Error) -> Self {
        EtlError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etl_error_display() {
        let err = EtlError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_stage_failed_names_stage_and_cause() {
        let err = EtlError::from(WarehouseError::InsertFailed {
            table: "fact_encounters".to_string(),
            chunk: 3,
            message: "duplicate key".to_string(),
        })
        .in_stage(Stage::Facts);

        let text = err.to_string();
        assert!(text.starts_with("Stage 'facts' failed"));
        assert!(text.contains("fact_encounters"));
        assert!(text.contains("chunk 3"));
        assert_eq!(err.stage(), Some(Stage::Facts));
    }

    #[test]
    fn test_in_stage_keeps_first_stage() {
        let err = EtlError::Validation("x".to_string())
            .in_stage(Stage::Dimensions)
            .in_stage(Stage::Facts);
        assert_eq!(err.stage(), Some(Stage::Dimensions));
    }

    #[test]
    fn test_is_connection_through_stage() {
        let err = EtlError::from(SourceError::ConnectionFailed("refused".to_string()))
            .in_stage(Stage::Extract);
        assert!(err.is_connection());

        let err = EtlError::Integrity("dup".to_string()).in_stage(Stage::Dimensions);
        assert!(!err.is_connection());
    }

    #[test]
    fn test_source_error_conversion() {
        let src = SourceError::QueryFailed {
            table: "patients".to_string(),
            message: "timeout".to_string(),
        };
        let err: EtlError = src.into();
        assert!(matches!(err, EtlError::Source(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: EtlError = io_err.into();
        assert!(matches!(err, EtlError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: EtlError = toml_err.into();
        assert!(matches!(err, EtlError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_etl_error_implements_std_error() {
        let err = EtlError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
