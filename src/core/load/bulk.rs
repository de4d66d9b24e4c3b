//! Chunked bulk writes
//!
//! Splits a table's rows into chunks of at most `chunk_size` and hands them to
//! the warehouse store, which inserts one multi-row statement per chunk inside
//! a single transaction for the table.

use crate::adapters::database::traits::{RowChunk, WarehouseStore};
use crate::domain::value::WarehouseRow;
use crate::domain::Result;
use std::sync::Arc;
use std::time::Instant;

/// Largest chunk the writer will ever send
pub const MAX_CHUNK_SIZE: usize = 5000;

/// Writes warehouse rows in chunks
#[derive(Clone)]
pub struct BulkWriter {
    store: Arc<dyn WarehouseStore + Send + Sync>,
    chunk_size: usize,
}

impl BulkWriter {
    /// Create a writer; `chunk_size` is clamped to `1..=MAX_CHUNK_SIZE`
    pub fn new(store: Arc<dyn WarehouseStore + Send + Sync>, chunk_size: usize) -> Self {
        Self {
            store,
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_SIZE),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn store(&self) -> &Arc<dyn WarehouseStore + Send + Sync> {
        &self.store
    }

    /// Split rows into value chunks
    pub fn chunk<R: WarehouseRow>(&self, rows: &[R]) -> Vec<RowChunk> {
        rows.chunks(self.chunk_size)
            .map(|chunk| chunk.iter().map(WarehouseRow::values).collect())
            .collect()
    }

    /// Write all rows of one table
    ///
    /// Returns the number of rows written. An empty input writes nothing and
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns the store's error; no row of the table is committed then.
    pub async fn write<R: WarehouseRow>(&self, rows: &[R]) -> Result<u64> {
        let table = R::shape();
        if rows.is_empty() {
            tracing::debug!(table = table.name, "No rows to write");
            return Ok(0);
        }

        let start = Instant::now();
        let chunks = self.chunk(rows);
        let total_chunks = chunks.len();

        let written = self.store.write_table(table, chunks).await?;

        tracing::info!(
            table = table.name,
            rows = written,
            chunks = total_chunks,
            duration_ms = start.elapsed().as_millis() as u64,
            "Table written"
        );
        Ok(written)
    }
}
