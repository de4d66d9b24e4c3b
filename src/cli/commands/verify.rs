//! Verify command implementation
//!
//! This module implements the `verify` command, which runs the integrity
//! checks against the warehouse without loading anything.

use crate::adapters::database::create_warehouse_store;
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::config::load_config;
use crate::core::verification::Verifier;
use clap::Args;

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {}

impl VerifyArgs {
    /// Execute the verify command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Verifying warehouse");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match create_warehouse_store(&config, false).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to connect to warehouse");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let report = match Verifier::new(store).verify(None).await {
            Ok(r) => r,
            Err(e) => {
                println!("❌ Verification could not run");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print!("{}", report.format_summary());

        if report.is_success() {
            println!("✅ Warehouse integrity checks passed");
            Ok(EXIT_SUCCESS)
        } else {
            println!("⚠️  Warehouse integrity checks failed");
            Ok(EXIT_PARTIAL)
        }
    }
}
