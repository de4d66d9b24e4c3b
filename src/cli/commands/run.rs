//! Run command implementation
//!
//! This module implements the `run` command, which extracts the operational
//! store and reloads the star-schema warehouse.

use crate::adapters::database::{create_source_reader, create_warehouse_store};
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::config::{load_config, LoadMode, MedstarConfig};
use crate::core::load::{EtlCoordinator, EtlSummary, RunOptions};
use chrono::NaiveDate;
use clap::Args;
use secrecy::ExposeSecret;
use std::path::PathBuf;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - transform everything without writing to the warehouse
    #[arg(long)]
    pub dry_run: bool,

    /// Override load mode (truncate or require_empty)
    #[arg(long, value_name = "MODE")]
    pub load_mode: Option<LoadMode>,

    /// Override first calendar day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub calendar_start: Option<NaiveDate>,

    /// Override last calendar day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub calendar_end: Option<NaiveDate>,

    /// Skip post-load verification
    #[arg(long)]
    pub skip_verification: bool,

    /// Also write the run summary as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub summary_file: Option<PathBuf>,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut MedstarConfig) {
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Some(mode) = self.load_mode {
            tracing::info!(mode = %mode, "Overriding load mode from CLI");
            config.etl.load_mode = mode;
        }

        if let Some(start) = self.calendar_start {
            tracing::info!(calendar_start = %start, "Overriding calendar start from CLI");
            config.etl.calendar_start = start;
        }

        if let Some(end) = self.calendar_end {
            tracing::info!(calendar_end = %end, "Overriding calendar end from CLI");
            config.etl.calendar_end = end;
        }

        if self.skip_verification {
            tracing::info!("Disabling verification from CLI");
            config.verification.enable_verification = false;
        }
    }

    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let options = match RunOptions::from_config(&config) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Configuration validation failed: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if options.dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("🔍 DRY RUN MODE - No data will be written to the warehouse");
            println!();
        }

        if !self.yes && !options.dry_run && !confirm(&config)? {
            println!("Run cancelled.");
            return Ok(EXIT_SUCCESS);
        }

        let source = match create_source_reader(&config).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create source reader");
                eprintln!("Failed to initialize source: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        let warehouse = match create_warehouse_store(&config, options.dry_run).await {
            Ok(w) => w,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create warehouse store");
                eprintln!("Failed to initialize warehouse: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("🚀 Starting load...");
        println!();

        let coordinator = EtlCoordinator::new(options, source, warehouse);
        let summary = match coordinator.run().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                match e.stage() {
                    Some(stage) => eprintln!("❌ Run failed in stage '{stage}'"),
                    None => eprintln!("❌ Run failed"),
                }
                eprintln!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print_summary(&summary);

        if let Some(path) = &self.summary_file {
            std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
            println!("📝 Summary written to {}", path.display());
        }

        if summary.is_clean() {
            Ok(EXIT_SUCCESS)
        } else {
            Ok(EXIT_PARTIAL)
        }
    }
}

fn confirm(config: &MedstarConfig) -> anyhow::Result<bool> {
    use std::io::{self, Write};

    println!("Run Configuration:");
    println!(
        "  Source: {}",
        config.source.connection_string.expose_secret().redacted()
    );
    println!(
        "  Warehouse: {}",
        config.warehouse.connection_string.expose_secret().redacted()
    );
    println!("  Load mode: {}", config.etl.load_mode);
    println!(
        "  Calendar: {} .. {}",
        config.etl.calendar_start, config.etl.calendar_end
    );
    println!("  Chunk size: {}", config.etl.chunk_size);
    println!();
    if config.etl.load_mode == LoadMode::Truncate {
        println!("⚠️  Every warehouse table will be truncated before loading.");
    }
    print!("Proceed with run? [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_summary(summary: &EtlSummary) {
    println!();
    println!("📊 Run Summary:");
    println!("  Run ID: {}", summary.run_id);
    println!("  Source rows: {}", summary.source_rows);
    for table in &summary.tables {
        println!("  {:<30} {:>10}", table.table, table.rows);
    }
    println!("  Readmissions: {}", summary.readmissions);
    println!("  Rejected encounters: {}", summary.rejected_facts.len());
    println!(
        "  Dropped diagnosis links: {}",
        summary.diagnosis_bridges.unresolved_encounters
            + summary.diagnosis_bridges.unresolved_entities
    );
    println!(
        "  Dropped procedure links: {}",
        summary.procedure_bridges.unresolved_encounters
            + summary.procedure_bridges.unresolved_entities
    );
    println!("  Duration: {:.2}s", summary.duration_ms as f64 / 1000.0);
    println!();

    if !summary.rejected_facts.is_empty() {
        println!("  ⚠️  Rejected encounters:");
        for rejected in summary.rejected_facts.iter().take(10) {
            println!(
                "    - {} (missing: {})",
                rejected.encounter_id,
                rejected.missing.join(", ")
            );
        }
        if summary.rejected_facts.len() > 10 {
            println!("    ... and {} more", summary.rejected_facts.len() - 10);
        }
        println!();
    }

    if let Some(report) = &summary.verification {
        print!("{}", report.format_summary());
        println!();
    }

    if summary.is_clean() {
        println!("✅ Load completed successfully");
    } else {
        println!("⚠️  Load completed with problems");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::config::{
        ApplicationConfig, DatabaseConfig, EtlConfig, LoggingConfig, VerificationConfig,
    };

    fn database(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            connection_string: secret_string(url.to_string()),
            max_connections: 2,
            connection_timeout_seconds: 5,
            statement_timeout_seconds: 60,
            ssl_mode: "disable".to_string(),
        }
    }

    fn config() -> MedstarConfig {
        MedstarConfig {
            application: ApplicationConfig::default(),
            source: database("postgresql://reader:pw@oltp:5432/hospital"),
            warehouse: database("postgresql://loader:pw@dw:5432/hospital_dw"),
            etl: EtlConfig::default(),
            verification: VerificationConfig::default(),
            logging: LoggingConfig::console_only(),
        }
    }

    #[test]
    fn test_apply_overrides() {
        let args = RunArgs {
            dry_run: true,
            load_mode: Some(LoadMode::RequireEmpty),
            calendar_start: NaiveDate::from_ymd_opt(2022, 1, 1),
            skip_verification: true,
            ..Default::default()
        };
        let mut config = config();
        args.apply_overrides(&mut config);

        assert!(config.application.dry_run);
        assert_eq!(config.etl.load_mode, LoadMode::RequireEmpty);
        assert_eq!(
            config.etl.calendar_start,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
        assert!(!config.verification.enable_verification);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let mut config = config();
        RunArgs::default().apply_overrides(&mut config);

        assert!(!config.application.dry_run);
        assert_eq!(config.etl.load_mode, LoadMode::Truncate);
        assert!(config.verification.enable_verification);
    }

    #[tokio::test]
    async fn test_missing_config_file_is_config_error() {
        let args = RunArgs {
            yes: true,
            ..Default::default()
        };
        let code = args.execute("/nonexistent/medstar.toml").await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
