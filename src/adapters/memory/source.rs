//! Operational store backed by an in-memory snapshot

use crate::adapters::database::traits::SourceReader;
use crate::domain::source::{
    DepartmentRecord, DiagnosisRecord, EncounterDiagnosisRecord, EncounterProcedureRecord,
    EncounterRecord, PatientRecord, ProcedureRecord, ProviderRecord, SourceSnapshot,
    SpecialtyRecord,
};
use crate::domain::{Result, SourceError};
use async_trait::async_trait;

/// Serves a fixed snapshot as if it were the operational store
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    snapshot: SourceSnapshot,
    unreachable: bool,
}

impl MemorySource {
    pub fn new(snapshot: SourceSnapshot) -> Self {
        Self {
            snapshot,
            unreachable: false,
        }
    }

    /// A source whose every call fails with a connection error
    pub fn unreachable() -> Self {
        Self {
            snapshot: SourceSnapshot::default(),
            unreachable: true,
        }
    }

    fn read<T: Clone>(&self, rows: &[T]) -> Result<Vec<T>> {
        if self.unreachable {
            return Err(
                SourceError::ConnectionFailed("in-memory source is unreachable".to_string())
                    .into(),
            );
        }
        Ok(rows.to_vec())
    }
}

#[async_trait]
impl SourceReader for MemorySource {
    async fn test_connection(&self) -> Result<()> {
        self.read::<()>(&[]).map(|_| ())
    }

    async fn read_patients(&self) -> Result<Vec<PatientRecord>> {
        self.read(&self.snapshot.patients)
    }

    async fn read_specialties(&self) -> Result<Vec<SpecialtyRecord>> {
        self.read(&self.snapshot.specialties)
    }

    async fn read_departments(&self) -> Result<Vec<DepartmentRecord>> {
        self.read(&self.snapshot.departments)
    }

    async fn read_providers(&self) -> Result<Vec<ProviderRecord>> {
        self.read(&self.snapshot.providers)
    }

    async fn read_diagnoses(&self) -> Result<Vec<DiagnosisRecord>> {
        self.read(&self.snapshot.diagnoses)
    }

    async fn read_procedures(&self) -> Result<Vec<ProcedureRecord>> {
        self.read(&self.snapshot.procedures)
    }

    async fn read_encounters(&self) -> Result<Vec<EncounterRecord>> {
        self.read(&self.snapshot.encounters)
    }

    async fn read_encounter_diagnoses(&self) -> Result<Vec<EncounterDiagnosisRecord>> {
        self.read(&self.snapshot.encounter_diagnoses)
    }

    async fn read_encounter_procedures(&self) -> Result<Vec<EncounterProcedureRecord>> {
        self.read(&self.snapshot.encounter_procedures)
    }

    fn describe(&self) -> String {
        "in-memory source".to_string()
    }
}
