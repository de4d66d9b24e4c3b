//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "medstar.toml")]
    pub output: String,

    /// Include explanatory comments for every setting
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Medstar configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let content = if self.with_examples {
            commented_config()
        } else {
            minimal_config()
        };

        match fs::write(&self.output, content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [source] and [warehouse] at your databases");
                println!(
                    "  2. Keep passwords out of the file with ${{MEDSTAR_PG_PASSWORD}} references"
                );
                println!("  3. Validate configuration: medstar validate-config");
                println!("  4. Load the warehouse: medstar run");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

fn minimal_config() -> &'static str {
    r#"# Medstar Configuration File

[application]
log_level = "info"
dry_run = false

[source]
connection_string = "postgresql://medstar_reader@localhost:5432/hospital"
ssl_mode = "prefer"

[warehouse]
connection_string = "postgresql://medstar_loader@localhost:5432/hospital_dw"
ssl_mode = "prefer"

[etl]
chunk_size = 5000
load_mode = "truncate"
calendar_start = "2020-01-01"
calendar_end = "2030-12-31"
readmission_window_days = 30
inpatient_encounter_type = "Inpatient"
initialize_schema = true

[verification]
enable_verification = true

[logging]
local_enabled = true
local_path = "./logs"
local_rotation = "daily"
"#
}

fn commented_config() -> &'static str {
    r#"# Medstar Configuration File
# Operational hospital database to star-schema warehouse ETL
#
# Any value may reference an environment variable as ${NAME}. Variables
# prefixed with MEDSTAR_ override individual settings after parsing, e.g.
# MEDSTAR_ETL_CHUNK_SIZE or MEDSTAR_WAREHOUSE_CONNECTION_STRING.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (extract and transform, but write nothing)
dry_run = false

# ============================================================================
# Operational Source (read-only)
# ============================================================================
[source]
# Connection string format: postgresql://[user[:password]@][host][:port][/dbname]
connection_string = "postgresql://medstar_reader@localhost:5432/hospital"

# Connection pool settings
max_connections = 10
connection_timeout_seconds = 30
statement_timeout_seconds = 300

# SSL/TLS mode: disable | allow | prefer | require | verify-ca | verify-full
ssl_mode = "prefer"

# ============================================================================
# Warehouse Target
# ============================================================================
[warehouse]
connection_string = "postgresql://medstar_loader@localhost:5432/hospital_dw"
max_connections = 10
connection_timeout_seconds = 30
statement_timeout_seconds = 300
ssl_mode = "prefer"

# ============================================================================
# Load Settings
# ============================================================================
[etl]
# Rows per bulk insert statement (1-5000)
chunk_size = 5000

# What to do with existing warehouse rows:
# - truncate: empty every warehouse table before loading
# - require_empty: refuse to run unless every warehouse table is empty
load_mode = "truncate"

# Inclusive calendar range for dim_date
calendar_start = "2020-01-01"
calendar_end = "2030-12-31"

# An inpatient encounter admitted within this many days of the patient's
# previous inpatient discharge is flagged as a readmission
readmission_window_days = 30
inpatient_encounter_type = "Inpatient"

# Create the warehouse tables if they do not exist
initialize_schema = true

# Reference date for patient ages (defaults to today)
# as_of_date = "2025-01-01"

# ============================================================================
# Verification
# ============================================================================
[verification]
# Check row counts, NULL keys and orphaned references after loading
enable_verification = true

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = true

# Local log directory
local_path = "./logs"

# Log rotation (daily or hourly)
local_rotation = "daily"

# Maximum log file size in MB
local_max_size_mb = 100
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, LoadMode, MedstarConfig};
    use tempfile::TempDir;

    #[test]
    fn test_minimal_config_parses_and_validates() {
        let config: MedstarConfig = toml::from_str(minimal_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.etl.load_mode, LoadMode::Truncate);
        assert!(config.etl.initialize_schema);
    }

    #[test]
    fn test_commented_config_parses_and_validates() {
        let config: MedstarConfig = toml::from_str(commented_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.etl.readmission_window_days, 30);
        assert!(config.etl.as_of_date.is_none());
    }

    #[tokio::test]
    async fn test_init_writes_loadable_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("medstar.toml");
        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: true,
            force: false,
        };

        assert_eq!(args.execute().await.unwrap(), EXIT_SUCCESS);
        assert!(load_config(&output).is_ok());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("medstar.toml");
        fs::write(&output, "# existing").unwrap();

        let mut args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# existing");

        args.force = true;
        assert_eq!(args.execute().await.unwrap(), EXIT_SUCCESS);
        assert!(fs::read_to_string(&output).unwrap().contains("[warehouse]"));
    }
}
