//! Status command implementation
//!
//! This module implements the `status` command for displaying the row count
//! of every warehouse table.

use crate::adapters::database::{create_warehouse_store, WarehouseStore};
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::load_config;
use crate::domain::warehouse::ALL_TABLES;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking warehouse status");

        println!("📊 Warehouse Status");
        println!();

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

        println!("  Warehouse: {}", store.describe());
        println!();

        let mut total = 0u64;
        for &table in ALL_TABLES.iter() {
            let rows = match store.count_rows(table).await {
                Ok(rows) => rows,
                Err(e) => {
                    println!("❌ Failed to count rows in {}", table.name);
                    println!("   Error: {e}");
                    return Ok(exit_code_for(&e));
                }
            };
            total += rows;
            println!("  {:<30} {:>10}", table.name, rows);
        }

        println!();
        if total == 0 {
            println!("ℹ️  The warehouse is empty. Run 'medstar run' to load it.");
        } else {
            println!("  Total rows: {total}");
        }

        Ok(EXIT_SUCCESS)
    }
}
