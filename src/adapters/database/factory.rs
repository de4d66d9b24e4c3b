//! Store factory
//!
//! Creates the source reader and warehouse store for a run based on configuration.

use crate::adapters::database::traits::{SourceReader, WarehouseStore};
use crate::adapters::memory::MemoryWarehouse;
use crate::adapters::postgresql::{PostgresClient, PostgresSource, PostgresWarehouse, StoreRole};
use crate::config::schema::MedstarConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the reader for the operational store
///
/// # Errors
///
/// Returns an error if the connection pool cannot be created
pub async fn create_source_reader(
    config: &MedstarConfig,
) -> Result<Arc<dyn SourceReader + Send + Sync>> {
    tracing::info!("Creating PostgreSQL source reader");
    let client = PostgresClient::new(StoreRole::Source, config.source.clone()).await?;
    Ok(Arc::new(PostgresSource::new(client)) as Arc<dyn SourceReader + Send + Sync>)
}

/// Create the warehouse store
///
/// With `dry_run` set, an empty in-memory warehouse stands in for the real
/// one so the full transformation runs without writing anything.
///
/// # Errors
///
/// Returns an error if the connection pool cannot be created
pub async fn create_warehouse_store(
    config: &MedstarConfig,
    dry_run: bool,
) -> Result<Arc<dyn WarehouseStore + Send + Sync>> {
    if dry_run {
        tracing::info!("DRY RUN: using in-memory warehouse, the target database is not touched");
        return Ok(Arc::new(MemoryWarehouse::new()) as Arc<dyn WarehouseStore + Send + Sync>);
    }

    tracing::info!("Creating PostgreSQL warehouse store");
    let client = PostgresClient::new(StoreRole::Warehouse, config.warehouse.clone()).await?;
    Ok(Arc::new(PostgresWarehouse::new(client)) as Arc<dyn WarehouseStore + Send + Sync>)
}
