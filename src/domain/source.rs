//! Operational (source) records
//!
//! Plain row structs as extracted from the operational store. Natural keys are
//! the source system's integer identifiers, except the encounter type, which
//! the source stores as free text on each encounter.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Natural key of a source entity
pub type NaturalId = i64;

/// A row from `patients`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: NaturalId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub mrn: Option<String>,
}

/// A row from `specialties`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialtyRecord {
    pub specialty_id: NaturalId,
    pub specialty_name: String,
    pub specialty_code: Option<String>,
}

/// A row from `departments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub department_id: NaturalId,
    pub department_name: String,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
}

/// A row from `providers`
///
/// Specialty and department are foreign keys in the source; the provider
/// dimension carries their names inline instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub provider_id: NaturalId,
    pub first_name: String,
    pub last_name: String,
    pub credential: Option<String>,
    pub specialty_id: Option<NaturalId>,
    pub department_id: Option<NaturalId>,
}

/// A row from `diagnoses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub diagnosis_id: NaturalId,
    pub icd10_code: String,
    pub icd10_description: Option<String>,
}

/// A row from `procedures`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureRecord {
    pub procedure_id: NaturalId,
    pub cpt_code: String,
    pub cpt_description: Option<String>,
}

/// A row from `encounters` with its billing totals folded in
///
/// Claim and allowed amounts are `0.0` when the encounter has no billing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRecord {
    pub encounter_id: NaturalId,
    pub patient_id: NaturalId,
    pub provider_id: Option<NaturalId>,
    pub department_id: Option<NaturalId>,
    pub encounter_type: String,
    pub admitted_at: NaiveDateTime,
    pub discharged_at: Option<NaiveDateTime>,
    pub claim_amount: f64,
    pub allowed_amount: f64,
}

/// A row from `encounter_diagnoses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterDiagnosisRecord {
    pub encounter_id: NaturalId,
    pub diagnosis_id: NaturalId,
    pub diagnosis_sequence: i32,
}

/// A row from `encounter_procedures`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterProcedureRecord {
    pub encounter_id: NaturalId,
    pub procedure_id: NaturalId,
    pub procedure_date: Option<NaiveDate>,
}

/// Everything extracted from the operational store for one run
///
/// Held in memory for the whole run; its size bounds the feasible data volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub patients: Vec<PatientRecord>,
    pub specialties: Vec<SpecialtyRecord>,
    pub departments: Vec<DepartmentRecord>,
    pub providers: Vec<ProviderRecord>,
    pub diagnoses: Vec<DiagnosisRecord>,
    pub procedures: Vec<ProcedureRecord>,
    pub encounters: Vec<EncounterRecord>,
    pub encounter_diagnoses: Vec<EncounterDiagnosisRecord>,
    pub encounter_procedures: Vec<EncounterProcedureRecord>,
}

impl SourceSnapshot {
    /// Total number of extracted rows across all tables
    pub fn total_rows(&self) -> usize {
        self.patients.len()
            + self.specialties.len()
            + self.departments.len()
            + self.providers.len()
            + self.diagnoses.len()
            + self.procedures.len()
            + self.encounters.len()
            + self.encounter_diagnoses.len()
            + self.encounter_procedures.len()
    }
}
