//! Star-schema store held in memory
//!
//! Mirrors the constraints of the real warehouse that the pipeline relies on:
//! generated keys start at 1 per table and restart after a truncate, primary
//! and natural keys are unique, and a table write commits all chunks or none.

use crate::adapters::database::traits::{RowChunk, WarehouseStore};
use crate::domain::source::NaturalId;
use crate::domain::value::{SqlValue, TableShape};
use crate::domain::warehouse::ForeignKey;
use crate::domain::{EtlError, Result, SurrogateKey, WarehouseError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct StoredRow {
    key: i64,
    values: Vec<SqlValue>,
}

#[derive(Debug, Default)]
struct TableData {
    last_key: i64,
    rows: Vec<StoredRow>,
}

/// In-memory warehouse used for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    tables: Mutex<HashMap<&'static str, TableData>>,
    fail_on_table: Option<&'static str>,
    lossy_table: Option<&'static str>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write to `table` fail, for exercising stage failures
    pub fn failing_on(table: &'static str) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            fail_on_table: Some(table),
            lossy_table: None,
        }
    }

    /// Silently discards the last row of every write to `table` while still
    /// reporting it as written
    pub fn losing_rows_of(table: &'static str) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            fail_on_table: None,
            lossy_table: Some(table),
        }
    }

    /// Column values of every row in insertion order
    pub async fn rows(&self, table: &TableShape) -> Vec<Vec<SqlValue>> {
        let tables = self.tables.lock().await;
        tables
            .get(table.name)
            .map(|data| data.rows.iter().map(|r| r.values.clone()).collect())
            .unwrap_or_default()
    }

    /// Values of one column across all rows of a table
    pub async fn column(&self, table: &TableShape, column: &str) -> Vec<SqlValue> {
        let Some(idx) = table.column_index(column) else {
            return Vec::new();
        };
        self.rows(table)
            .await
            .into_iter()
            .map(|mut values| values.swap_remove(idx))
            .collect()
    }
}

fn insert_error(table: &TableShape, chunk: usize, message: impl Into<String>) -> EtlError {
    WarehouseError::InsertFailed {
        table: table.name.to_string(),
        chunk,
        message: message.into(),
    }
    .into()
}

fn unknown_column(table: &TableShape, column: &str) -> EtlError {
    WarehouseError::QueryFailed {
        table: table.name.to_string(),
        message: format!("column \"{column}\" does not exist"),
    }
    .into()
}

#[async_trait]
impl WarehouseStore for MemoryWarehouse {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn initialize_schema(&self) -> Result<()> {
        tracing::debug!("In-memory warehouse needs no schema");
        Ok(())
    }

    async fn truncate_all(&self, tables: &[&'static TableShape]) -> Result<()> {
        let mut data = self.tables.lock().await;
        for table in tables {
            data.remove(table.name);
        }
        Ok(())
    }

    async fn count_rows(&self, table: &'static TableShape) -> Result<u64> {
        let data = self.tables.lock().await;
        Ok(data.get(table.name).map_or(0, |t| t.rows.len() as u64))
    }

    async fn write_table(&self, table: &'static TableShape, chunks: Vec<RowChunk>) -> Result<u64> {
        let total_chunks = chunks.len();
        let mut data = self.tables.lock().await;
        let existing = data.entry(table.name).or_default();

        let mut last_key = existing.last_key;
        let mut keys: HashSet<i64> = existing.rows.iter().map(|r| r.key).collect();
        let natural_idx = table.natural_key.and_then(|c| table.column_index(c));
        let mut natural_keys: HashSet<String> = natural_idx
            .map(|idx| existing.rows.iter().map(|r| r.values[idx].to_string()).collect())
            .unwrap_or_default();
        let key_idx = table.column_index(table.primary_key);

        let mut staged = Vec::new();
        for (chunk_idx, chunk) in chunks.into_iter().enumerate() {
            let chunk_no = chunk_idx + 1;
            if self.fail_on_table == Some(table.name) {
                return Err(insert_error(table, chunk_no, "injected failure"));
            }

            let rows_in_chunk = chunk.len();
            for values in chunk {
                if values.len() != table.columns.len() {
                    return Err(insert_error(
                        table,
                        chunk_no,
                        format!(
                            "expected {} values per row, got {}",
                            table.columns.len(),
                            values.len()
                        ),
                    ));
                }

                let key = if table.generated_key {
                    last_key += 1;
                    last_key
                } else {
                    key_idx
                        .and_then(|idx| values[idx].as_i64())
                        .ok_or_else(|| insert_error(table, chunk_no, "missing primary key"))?
                };
                if !keys.insert(key) {
                    return Err(insert_error(
                        table,
                        chunk_no,
                        format!("duplicate key value violates unique constraint ({key})"),
                    ));
                }

                if let Some(idx) = natural_idx {
                    if !natural_keys.insert(values[idx].to_string()) {
                        return Err(insert_error(
                            table,
                            chunk_no,
                            format!("duplicate natural key {}", values[idx]),
                        ));
                    }
                }

                staged.push(StoredRow { key, values });
            }
            crate::log_chunk_progress!(table.name, chunk_no, total_chunks, rows_in_chunk);
        }

        let written = staged.len() as u64;
        if self.lossy_table == Some(table.name) {
            staged.pop();
        }
        existing.last_key = last_key;
        existing.rows.extend(staged);
        Ok(written)
    }

    async fn read_id_keys(
        &self,
        table: &'static TableShape,
    ) -> Result<Vec<(NaturalId, SurrogateKey)>> {
        let column = table.natural_key.unwrap_or(table.primary_key);
        let idx = table
            .column_index(column)
            .ok_or_else(|| unknown_column(table, column))?;

        let data = self.tables.lock().await;
        let Some(rows) = data.get(table.name) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .rows
            .iter()
            .filter_map(|r| r.values[idx].as_i64().map(|id| (id, SurrogateKey::new(r.key))))
            .collect())
    }

    async fn read_name_keys(
        &self,
        table: &'static TableShape,
    ) -> Result<Vec<(String, SurrogateKey)>> {
        let column = table.natural_key.unwrap_or(table.primary_key);
        let idx = table
            .column_index(column)
            .ok_or_else(|| unknown_column(table, column))?;

        let data = self.tables.lock().await;
        let Some(rows) = data.get(table.name) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .rows
            .iter()
            .filter_map(|r| {
                r.values[idx]
                    .as_text()
                    .map(|name| (name.to_string(), SurrogateKey::new(r.key)))
            })
            .collect())
    }

    async fn count_nulls(&self, table: &'static TableShape, column: &str) -> Result<u64> {
        if column == table.primary_key && table.column_index(column).is_none() {
            return Ok(0);
        }
        let idx = table
            .column_index(column)
            .ok_or_else(|| unknown_column(table, column))?;

        let data = self.tables.lock().await;
        Ok(data.get(table.name).map_or(0, |t| {
            t.rows.iter().filter(|r| r.values[idx].is_null()).count() as u64
        }))
    }

    async fn count_orphans(&self, foreign_key: &ForeignKey) -> Result<u64> {
        let idx = foreign_key
            .child
            .column_index(foreign_key.column)
            .ok_or_else(|| unknown_column(foreign_key.child, foreign_key.column))?;

        let data = self.tables.lock().await;
        let parent_keys: HashSet<i64> = data
            .get(foreign_key.parent.name)
            .map(|t| t.rows.iter().map(|r| r.key).collect())
            .unwrap_or_default();

        Ok(data.get(foreign_key.child.name).map_or(0, |t| {
            t.rows
                .iter()
                .filter_map(|r| r.values[idx].as_i64())
                .filter(|key| !parent_keys.contains(key))
                .count() as u64
        }))
    }

    fn describe(&self) -> String {
        "in-memory warehouse".to_string()
    }
}
