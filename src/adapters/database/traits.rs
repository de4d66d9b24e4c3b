//! Store abstraction traits
//!
//! The pipeline talks to the operational store through [`SourceReader`] and to
//! the star-schema store through [`WarehouseStore`]. Both are implemented for
//! PostgreSQL and for in-memory stores (dry runs and tests).

use crate::domain::source::{
    DepartmentRecord, DiagnosisRecord, EncounterDiagnosisRecord, EncounterProcedureRecord,
    EncounterRecord, NaturalId, PatientRecord, ProcedureRecord, ProviderRecord, SourceSnapshot,
    SpecialtyRecord,
};
use crate::domain::value::{SqlValue, TableShape};
use crate::domain::warehouse::ForeignKey;
use crate::domain::{Result, SurrogateKey};
use async_trait::async_trait;

/// One chunk of rows, each row holding its values in column order
pub type RowChunk = Vec<Vec<SqlValue>>;

/// Read access to the operational (source) store
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Test the connection
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    async fn read_patients(&self) -> Result<Vec<PatientRecord>>;

    async fn read_specialties(&self) -> Result<Vec<SpecialtyRecord>>;

    async fn read_departments(&self) -> Result<Vec<DepartmentRecord>>;

    async fn read_providers(&self) -> Result<Vec<ProviderRecord>>;

    async fn read_diagnoses(&self) -> Result<Vec<DiagnosisRecord>>;

    async fn read_procedures(&self) -> Result<Vec<ProcedureRecord>>;

    /// Encounters with their billing totals summed per encounter
    async fn read_encounters(&self) -> Result<Vec<EncounterRecord>>;

    async fn read_encounter_diagnoses(&self) -> Result<Vec<EncounterDiagnosisRecord>>;

    async fn read_encounter_procedures(&self) -> Result<Vec<EncounterProcedureRecord>>;

    /// Human-readable description of the store, safe to log
    fn describe(&self) -> String;

    /// Read every table needed for one run
    ///
    /// # Errors
    ///
    /// Returns the first read failure; nothing partial is returned.
    async fn read_snapshot(&self) -> Result<SourceSnapshot> {
        let snapshot = SourceSnapshot {
            patients: self.read_patients().await?,
            specialties: self.read_specialties().await?,
            departments: self.read_departments().await?,
            providers: self.read_providers().await?,
            diagnoses: self.read_diagnoses().await?,
            procedures: self.read_procedures().await?,
            encounters: self.read_encounters().await?,
            encounter_diagnoses: self.read_encounter_diagnoses().await?,
            encounter_procedures: self.read_encounter_procedures().await?,
        };

        tracing::info!(
            patients = snapshot.patients.len(),
            providers = snapshot.providers.len(),
            encounters = snapshot.encounters.len(),
            encounter_diagnoses = snapshot.encounter_diagnoses.len(),
            encounter_procedures = snapshot.encounter_procedures.len(),
            total_rows = snapshot.total_rows(),
            "Source snapshot extracted"
        );

        Ok(snapshot)
    }
}

/// Write and inspection access to the star-schema (warehouse) store
#[async_trait]
pub trait WarehouseStore: Send + Sync {
    /// Test the connection
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Create the star schema if it does not exist
    async fn initialize_schema(&self) -> Result<()>;

    /// Empty the given tables in one transaction and reset their key sequences
    async fn truncate_all(&self, tables: &[&'static TableShape]) -> Result<()>;

    /// Number of rows in a table
    async fn count_rows(&self, table: &'static TableShape) -> Result<u64>;

    /// Insert all chunks for one table
    ///
    /// Each chunk is one multi-row statement. Either every chunk commits or
    /// none does.
    ///
    /// # Errors
    ///
    /// Returns `WarehouseError::InsertFailed` naming the failing chunk.
    async fn write_table(&self, table: &'static TableShape, chunks: Vec<RowChunk>) -> Result<u64>;

    /// Read back `(natural key, surrogate key)` pairs for a table with an
    /// integer natural key
    async fn read_id_keys(&self, table: &'static TableShape)
        -> Result<Vec<(NaturalId, SurrogateKey)>>;

    /// Read back `(natural key, surrogate key)` pairs for a table with a
    /// text natural key
    async fn read_name_keys(&self, table: &'static TableShape)
        -> Result<Vec<(String, SurrogateKey)>>;

    /// Number of rows where `column` is NULL
    async fn count_nulls(&self, table: &'static TableShape, column: &str) -> Result<u64>;

    /// Number of non-NULL foreign-key values with no matching parent row
    async fn count_orphans(&self, foreign_key: &ForeignKey) -> Result<u64>;

    /// Human-readable description of the store, safe to log
    fn describe(&self) -> String;

    /// Whether any of the given tables holds rows
    ///
    /// Returns the names of the non-empty tables.
    async fn non_empty_tables(&self, tables: &[&'static TableShape]) -> Result<Vec<&'static str>> {
        let mut non_empty = Vec::new();
        for &table in tables {
            if self.count_rows(table).await? > 0 {
                non_empty.push(table.name);
            }
        }
        Ok(non_empty)
    }
}
