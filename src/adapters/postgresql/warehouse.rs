//! PostgreSQL implementation of the warehouse store

use crate::adapters::database::traits::{RowChunk, WarehouseStore};
use crate::adapters::postgresql::client::PostgresClient;
use crate::domain::source::NaturalId;
use crate::domain::value::{SqlValue, TableShape};
use crate::domain::warehouse::ForeignKey;
use crate::domain::{EtlError, Result, SurrogateKey, WarehouseError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Upper bound on bind parameters in one statement (protocol limit)
const MAX_BIND_PARAMETERS: usize = 65_535;

/// Writes the star schema over a pooled PostgreSQL connection
pub struct PostgresWarehouse {
    client: Arc<PostgresClient>,
}

impl PostgresWarehouse {
    pub fn new(client: PostgresClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    async fn count(&self, table: &str, sql: &str) -> Result<u64> {
        let rows = self.client.query(table, sql, &[]).await?;
        let count: i64 = rows
            .first()
            .map(|row| row.try_get::<_, i64>(0))
            .transpose()
            .map_err(|e| self.client.query_error(table, e))?
            .unwrap_or(0);
        Ok(count.max(0) as u64)
    }
}

fn sql_param(value: &SqlValue) -> &(dyn ToSql + Sync) {
    match value {
        SqlValue::Int(v) => v,
        SqlValue::BigInt(v) => v,
        SqlValue::Float(v) => v,
        SqlValue::Text(v) => v,
        SqlValue::Date(v) => v,
        SqlValue::Bool(v) => v,
    }
}

/// Multi-row INSERT for `rows` rows of `table`
pub(crate) fn insert_statement(table: &TableShape, rows: usize) -> String {
    let width = table.columns.len();
    let values = (0..rows)
        .map(|r| {
            let placeholders = (1..=width)
                .map(|c| format!("${}", r * width + c))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({placeholders})")
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        table.name,
        table.columns.join(", "),
        values
    )
}

/// Rows per statement so that one statement stays within the parameter limit
pub(crate) fn rows_per_statement(table: &TableShape) -> usize {
    (MAX_BIND_PARAMETERS / table.columns.len().max(1)).max(1)
}

fn check_column(table: &TableShape, column: &str) -> Result<()> {
    if column == table.primary_key || table.column_index(column).is_some() {
        Ok(())
    } else {
        Err(WarehouseError::QueryFailed {
            table: table.name.to_string(),
            message: format!("unknown column {column}"),
        }
        .into())
    }
}

fn natural_key(table: &TableShape) -> Result<&'static str> {
    table.natural_key.ok_or_else(|| {
        EtlError::Validation(format!("{} has no natural key to read back", table.name))
    })
}

#[async_trait]
impl WarehouseStore for PostgresWarehouse {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn initialize_schema(&self) -> Result<()> {
        let client = self.client.get_connection().await?;

        let migration_sql = include_str!("../../../migrations/001_star_schema.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| WarehouseError::SchemaFailed(e.to_string()))?;

        tracing::info!("Warehouse schema initialized successfully");
        Ok(())
    }

    async fn truncate_all(&self, tables: &[&'static TableShape]) -> Result<()> {
        if tables.is_empty() {
            return Ok(());
        }
        let names = tables.iter().map(|t| t.name).collect::<Vec<_>>().join(", ");
        let tx_error = |message: String| -> EtlError {
            WarehouseError::TransactionFailed {
                table: names.clone(),
                message,
            }
            .into()
        };

        let mut client = self.client.get_connection().await?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| tx_error(e.to_string()))?;
        tx.batch_execute(&format!("TRUNCATE TABLE {names} RESTART IDENTITY CASCADE"))
            .await
            .map_err(|e| tx_error(e.to_string()))?;
        tx.commit().await.map_err(|e| tx_error(e.to_string()))?;

        tracing::info!(tables = %names, "Warehouse tables truncated");
        Ok(())
    }

    async fn count_rows(&self, table: &'static TableShape) -> Result<u64> {
        self.count(table.name, &format!("SELECT COUNT(*) FROM {}", table.name))
            .await
    }

    async fn write_table(&self, table: &'static TableShape, chunks: Vec<RowChunk>) -> Result<u64> {
        let total_chunks = chunks.len();
        let max_rows = rows_per_statement(table);
        let tx_error = |message: String| -> EtlError {
            WarehouseError::TransactionFailed {
                table: table.name.to_string(),
                message,
            }
            .into()
        };

        let mut client = self.client.get_connection().await?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| tx_error(e.to_string()))?;

        let mut written = 0u64;
        for (chunk_idx, chunk) in chunks.iter().enumerate() {
            let chunk_no = chunk_idx + 1;
            for rows in chunk.chunks(max_rows) {
                if rows.is_empty() {
                    continue;
                }
                let sql = insert_statement(table, rows.len());
                let params: Vec<&(dyn ToSql + Sync)> =
                    rows.iter().flatten().map(sql_param).collect();

                written += tx.execute(sql.as_str(), &params).await.map_err(|e| {
                    if e.is_closed() {
                        EtlError::from(WarehouseError::ConnectionFailed(format!(
                            "Connection lost: {e}"
                        )))
                    } else {
                        EtlError::from(WarehouseError::InsertFailed {
                            table: table.name.to_string(),
                            chunk: chunk_no,
                            message: e.to_string(),
                        })
                    }
                })?;
            }
            crate::log_chunk_progress!(table.name, chunk_no, total_chunks, chunk.len());
        }

        tx.commit().await.map_err(|e| tx_error(e.to_string()))?;
        Ok(written)
    }

    async fn read_id_keys(
        &self,
        table: &'static TableShape,
    ) -> Result<Vec<(NaturalId, SurrogateKey)>> {
        let natural = natural_key(table)?;
        let sql = format!(
            "SELECT {natural}::bigint, {}::bigint FROM {}",
            table.primary_key, table.name
        );
        let rows = self.client.query(table.name, &sql, &[]).await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.try_get(0)?;
                let key: i64 = row.try_get(1)?;
                Ok((id, SurrogateKey::new(key)))
            })
            .collect::<std::result::Result<Vec<_>, tokio_postgres::Error>>()
            .map_err(|e| self.client.query_error(table.name, e))
    }

    async fn read_name_keys(
        &self,
        table: &'static TableShape,
    ) -> Result<Vec<(String, SurrogateKey)>> {
        let natural = natural_key(table)?;
        let sql = format!(
            "SELECT {natural}::text, {}::bigint FROM {}",
            table.primary_key, table.name
        );
        let rows = self.client.query(table.name, &sql, &[]).await?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get(0)?;
                let key: i64 = row.try_get(1)?;
                Ok((name, SurrogateKey::new(key)))
            })
            .collect::<std::result::Result<Vec<_>, tokio_postgres::Error>>()
            .map_err(|e| self.client.query_error(table.name, e))
    }

    async fn count_nulls(&self, table: &'static TableShape, column: &str) -> Result<u64> {
        check_column(table, column)?;
        self.count(
            table.name,
            &format!("SELECT COUNT(*) FROM {} WHERE {column} IS NULL", table.name),
        )
        .await
    }

    async fn count_orphans(&self, foreign_key: &ForeignKey) -> Result<u64> {
        check_column(foreign_key.child, foreign_key.column)?;
        let sql = format!(
            "SELECT COUNT(*) FROM {child} c \
             WHERE c.{column} IS NOT NULL \
             AND NOT EXISTS (SELECT 1 FROM {parent} p WHERE p.{pk} = c.{column})",
            child = foreign_key.child.name,
            column = foreign_key.column,
            parent = foreign_key.parent.name,
            pk = foreign_key.parent.primary_key,
        );
        self.count(foreign_key.child.name, &sql).await
    }

    fn describe(&self) -> String {
        self.client.connection_string_safe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::warehouse::{BRIDGE_ENCOUNTER_DIAGNOSES, FACT_ENCOUNTERS};

    #[test]
    fn test_insert_statement_numbers_parameters_row_major() {
        let sql = insert_statement(&BRIDGE_ENCOUNTER_DIAGNOSES, 2);
        assert_eq!(
            sql,
            "INSERT INTO bridge_encounter_diagnoses \
             (encounter_key, diagnosis_key, diagnosis_sequence) \
             VALUES ($1, $2, $3), ($4, $5, $6)"
        );
    }

    #[test]
    fn test_rows_per_statement_respects_parameter_limit() {
        let rows = rows_per_statement(&FACT_ENCOUNTERS);
        assert!(rows * FACT_ENCOUNTERS.columns.len() <= MAX_BIND_PARAMETERS);
        assert!(rows >= 4000);
    }

    #[test]
    fn test_check_column() {
        assert!(check_column(&FACT_ENCOUNTERS, "patient_key").is_ok());
        assert!(check_column(&FACT_ENCOUNTERS, "encounter_key").is_ok());
        assert!(check_column(&FACT_ENCOUNTERS, "patient_key; DROP TABLE x").is_err());
    }

    #[test]
    fn test_sql_param_binds_nulls() {
        let value = SqlValue::BigInt(None);
        let param = sql_param(&value);
        assert!(format!("{param:?}").contains("None"));
    }
}
