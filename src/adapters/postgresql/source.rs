//! PostgreSQL implementation of the source reader

use crate::adapters::database::traits::SourceReader;
use crate::adapters::postgresql::client::PostgresClient;
use crate::adapters::postgresql::models::SourceRow;
use crate::domain::source::{
    DepartmentRecord, DiagnosisRecord, EncounterDiagnosisRecord, EncounterProcedureRecord,
    EncounterRecord, PatientRecord, ProcedureRecord, ProviderRecord, SpecialtyRecord,
};
use crate::domain::{Result, SourceError};
use async_trait::async_trait;
use std::sync::Arc;

/// Reads the operational schema over a pooled PostgreSQL connection
pub struct PostgresSource {
    client: Arc<PostgresClient>,
}

impl PostgresSource {
    pub fn new(client: PostgresClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    async fn read_all<T: SourceRow>(&self) -> Result<Vec<T>> {
        let rows = self.client.query(T::TABLE, T::QUERY, &[]).await?;

        let records = rows
            .iter()
            .map(T::from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| SourceError::MalformedRow {
                table: T::TABLE.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(table = T::TABLE, rows = records.len(), "Source table read");
        Ok(records)
    }
}

#[async_trait]
impl SourceReader for PostgresSource {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn read_patients(&self) -> Result<Vec<PatientRecord>> {
        self.read_all().await
    }

    async fn read_specialties(&self) -> Result<Vec<SpecialtyRecord>> {
        self.read_all().await
    }

    async fn read_departments(&self) -> Result<Vec<DepartmentRecord>> {
        self.read_all().await
    }

    async fn read_providers(&self) -> Result<Vec<ProviderRecord>> {
        self.read_all().await
    }

    async fn read_diagnoses(&self) -> Result<Vec<DiagnosisRecord>> {
        self.read_all().await
    }

    async fn read_procedures(&self) -> Result<Vec<ProcedureRecord>> {
        self.read_all().await
    }

    async fn read_encounters(&self) -> Result<Vec<EncounterRecord>> {
        self.read_all().await
    }

    async fn read_encounter_diagnoses(&self) -> Result<Vec<EncounterDiagnosisRecord>> {
        self.read_all().await
    }

    async fn read_encounter_procedures(&self) -> Result<Vec<EncounterProcedureRecord>> {
        self.read_all().await
    }

    fn describe(&self) -> String {
        self.client.connection_string_safe()
    }
}
