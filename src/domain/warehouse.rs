//! Star-schema (warehouse) rows
//!
//! Dimension rows are immutable once written. Their surrogate keys are
//! assigned by the warehouse and read back by natural key; the calendar
//! dimension is the exception and carries its own `YYYYMMDD` key.

use crate::domain::ids::{DateKey, SurrogateKey};
use crate::domain::source::NaturalId;
use crate::domain::value::{SqlValue, TableShape, WarehouseRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub static DIM_DATE: TableShape = TableShape {
    name: "dim_date",
    primary_key: "date_key",
    generated_key: false,
    natural_key: None,
    columns: &[
        "date_key",
        "full_date",
        "year",
        "month",
        "month_name",
        "quarter",
        "day_of_week",
        "day_name",
        "is_weekend",
    ],
};

pub static DIM_PATIENT: TableShape = TableShape {
    name: "dim_patient",
    primary_key: "patient_key",
    generated_key: true,
    natural_key: Some("patient_id"),
    columns: &[
        "patient_id",
        "first_name",
        "last_name",
        "full_name",
        "date_of_birth",
        "current_age",
        "gender",
        "mrn",
    ],
};

pub static DIM_SPECIALTY: TableShape = TableShape {
    name: "dim_specialty",
    primary_key: "specialty_key",
    generated_key: true,
    natural_key: Some("specialty_id"),
    columns: &["specialty_id", "specialty_name", "specialty_code"],
};

pub static DIM_DEPARTMENT: TableShape = TableShape {
    name: "dim_department",
    primary_key: "department_key",
    generated_key: true,
    natural_key: Some("department_id"),
    columns: &["department_id", "department_name", "floor", "capacity"],
};

pub static DIM_PROVIDER: TableShape = TableShape {
    name: "dim_provider",
    primary_key: "provider_key",
    generated_key: true,
    natural_key: Some("provider_id"),
    columns: &[
        "provider_id",
        "provider_name",
        "credential",
        "specialty_name",
        "department_name",
    ],
};

pub static DIM_ENCOUNTER_TYPE: TableShape = TableShape {
    name: "dim_encounter_type",
    primary_key: "encounter_type_key",
    generated_key: true,
    natural_key: Some("encounter_type_name"),
    columns: &["encounter_type_name"],
};

pub static DIM_DIAGNOSIS: TableShape = TableShape {
    name: "dim_diagnosis",
    primary_key: "diagnosis_key",
    generated_key: true,
    natural_key: Some("diagnosis_id"),
    columns: &["diagnosis_id", "icd10_code", "icd10_description"],
};

pub static DIM_PROCEDURE: TableShape = TableShape {
    name: "dim_procedure",
    primary_key: "procedure_key",
    generated_key: true,
    natural_key: Some("procedure_id"),
    columns: &["procedure_id", "cpt_code", "cpt_description"],
};

pub static FACT_ENCOUNTERS: TableShape = TableShape {
    name: "fact_encounters",
    primary_key: "encounter_key",
    generated_key: true,
    natural_key: Some("encounter_id"),
    columns: &[
        "encounter_id",
        "patient_key",
        "provider_key",
        "date_key",
        "specialty_key",
        "department_key",
        "encounter_type_key",
        "length_of_stay_days",
        "claim_amount",
        "allowed_amount",
        "is_inpatient",
        "diagnosis_count",
        "procedure_count",
        "is_readmission",
    ],
};

pub static BRIDGE_ENCOUNTER_DIAGNOSES: TableShape = TableShape {
    name: "bridge_encounter_diagnoses",
    primary_key: "encounter_diagnosis_key",
    generated_key: true,
    natural_key: None,
    columns: &["encounter_key", "diagnosis_key", "diagnosis_sequence"],
};

pub static BRIDGE_ENCOUNTER_PROCEDURES: TableShape = TableShape {
    name: "bridge_encounter_procedures",
    primary_key: "encounter_procedure_key",
    generated_key: true,
    natural_key: None,
    columns: &["encounter_key", "procedure_key", "procedure_date_key"],
};

/// Every warehouse table, dimensions first
pub static ALL_TABLES: [&TableShape; 11] = [
    &DIM_DATE,
    &DIM_PATIENT,
    &DIM_SPECIALTY,
    &DIM_DEPARTMENT,
    &DIM_PROVIDER,
    &DIM_ENCOUNTER_TYPE,
    &DIM_DIAGNOSIS,
    &DIM_PROCEDURE,
    &FACT_ENCOUNTERS,
    &BRIDGE_ENCOUNTER_DIAGNOSES,
    &BRIDGE_ENCOUNTER_PROCEDURES,
];

/// A foreign-key relationship between a fact/bridge column and a dimension
#[derive(Debug)]
pub struct ForeignKey {
    pub child: &'static TableShape,
    pub column: &'static str,
    pub parent: &'static TableShape,
    /// Whether the column must never be NULL
    pub required: bool,
}

const fn foreign_key(
    child: &'static TableShape,
    column: &'static str,
    parent: &'static TableShape,
    required: bool,
) -> ForeignKey {
    ForeignKey {
        child,
        column,
        parent,
        required,
    }
}

/// Every foreign key the warehouse must keep intact
pub static FOREIGN_KEYS: [ForeignKey; 11] = [
    foreign_key(&FACT_ENCOUNTERS, "patient_key", &DIM_PATIENT, true),
    foreign_key(&FACT_ENCOUNTERS, "date_key", &DIM_DATE, true),
    foreign_key(&FACT_ENCOUNTERS, "encounter_type_key", &DIM_ENCOUNTER_TYPE, true),
    foreign_key(&FACT_ENCOUNTERS, "provider_key", &DIM_PROVIDER, false),
    foreign_key(&FACT_ENCOUNTERS, "specialty_key", &DIM_SPECIALTY, false),
    foreign_key(&FACT_ENCOUNTERS, "department_key", &DIM_DEPARTMENT, false),
    foreign_key(&BRIDGE_ENCOUNTER_DIAGNOSES, "encounter_key", &FACT_ENCOUNTERS, true),
    foreign_key(&BRIDGE_ENCOUNTER_DIAGNOSES, "diagnosis_key", &DIM_DIAGNOSIS, true),
    foreign_key(&BRIDGE_ENCOUNTER_PROCEDURES, "encounter_key", &FACT_ENCOUNTERS, true),
    foreign_key(&BRIDGE_ENCOUNTER_PROCEDURES, "procedure_key", &DIM_PROCEDURE, true),
    foreign_key(&BRIDGE_ENCOUNTER_PROCEDURES, "procedure_date_key", &DIM_DATE, false),
];

fn key(value: SurrogateKey) -> SqlValue {
    SqlValue::BigInt(Some(value.value()))
}

fn opt_key(value: Option<SurrogateKey>) -> SqlValue {
    SqlValue::BigInt(value.map(|k| k.value()))
}

fn text(value: &str) -> SqlValue {
    SqlValue::Text(Some(value.to_string()))
}

fn opt_text(value: &Option<String>) -> SqlValue {
    SqlValue::Text(value.clone())
}

/// One calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimDate {
    pub date_key: DateKey,
    pub full_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub quarter: u32,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub day_name: String,
    pub is_weekend: bool,
}

impl WarehouseRow for DimDate {
    fn shape() -> &'static TableShape {
        &DIM_DATE
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Int(Some(self.date_key.value())),
            SqlValue::Date(Some(self.full_date)),
            SqlValue::Int(Some(self.year)),
            SqlValue::Int(Some(self.month as i32)),
            text(&self.month_name),
            SqlValue::Int(Some(self.quarter as i32)),
            SqlValue::Int(Some(self.day_of_week as i32)),
            text(&self.day_name),
            SqlValue::Bool(Some(self.is_weekend)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimPatient {
    pub patient_id: NaturalId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub current_age: Option<i32>,
    pub gender: Option<String>,
    pub mrn: Option<String>,
}

impl WarehouseRow for DimPatient {
    fn shape() -> &'static TableShape {
        &DIM_PATIENT
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(Some(self.patient_id)),
            text(&self.first_name),
            text(&self.last_name),
            text(&self.full_name),
            SqlValue::Date(self.date_of_birth),
            SqlValue::Int(self.current_age),
            opt_text(&self.gender),
            opt_text(&self.mrn),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimSpecialty {
    pub specialty_id: NaturalId,
    pub specialty_name: String,
    pub specialty_code: Option<String>,
}

impl WarehouseRow for DimSpecialty {
    fn shape() -> &'static TableShape {
        &DIM_SPECIALTY
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(Some(self.specialty_id)),
            text(&self.specialty_name),
            opt_text(&self.specialty_code),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimDepartment {
    pub department_id: NaturalId,
    pub department_name: String,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
}

impl WarehouseRow for DimDepartment {
    fn shape() -> &'static TableShape {
        &DIM_DEPARTMENT
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(Some(self.department_id)),
            text(&self.department_name),
            SqlValue::Int(self.floor),
            SqlValue::Int(self.capacity),
        ]
    }
}

/// Provider flattened with its specialty and department names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimProvider {
    pub provider_id: NaturalId,
    pub provider_name: String,
    pub credential: Option<String>,
    pub specialty_name: Option<String>,
    pub department_name: Option<String>,
}

impl WarehouseRow for DimProvider {
    fn shape() -> &'static TableShape {
        &DIM_PROVIDER
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(Some(self.provider_id)),
            text(&self.provider_name),
            opt_text(&self.credential),
            opt_text(&self.specialty_name),
            opt_text(&self.department_name),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimEncounterType {
    pub encounter_type_name: String,
}

impl WarehouseRow for DimEncounterType {
    fn shape() -> &'static TableShape {
        &DIM_ENCOUNTER_TYPE
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![text(&self.encounter_type_name)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimDiagnosis {
    pub diagnosis_id: NaturalId,
    pub icd10_code: String,
    pub icd10_description: Option<String>,
}

impl WarehouseRow for DimDiagnosis {
    fn shape() -> &'static TableShape {
        &DIM_DIAGNOSIS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(Some(self.diagnosis_id)),
            text(&self.icd10_code),
            opt_text(&self.icd10_description),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimProcedure {
    pub procedure_id: NaturalId,
    pub cpt_code: String,
    pub cpt_description: Option<String>,
}

impl WarehouseRow for DimProcedure {
    fn shape() -> &'static TableShape {
        &DIM_PROCEDURE
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(Some(self.procedure_id)),
            text(&self.cpt_code),
            opt_text(&self.cpt_description),
        ]
    }
}

/// One encounter in the fact table
///
/// Provider, specialty and department keys are optional: an unresolved
/// reference is written as NULL rather than dropping the encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactEncounter {
    pub encounter_id: NaturalId,
    pub patient_key: SurrogateKey,
    pub provider_key: Option<SurrogateKey>,
    pub date_key: DateKey,
    pub specialty_key: Option<SurrogateKey>,
    pub department_key: Option<SurrogateKey>,
    pub encounter_type_key: SurrogateKey,
    pub length_of_stay_days: f64,
    pub claim_amount: f64,
    pub allowed_amount: f64,
    pub is_inpatient: bool,
    pub diagnosis_count: i32,
    pub procedure_count: i32,
    pub is_readmission: bool,
}

impl WarehouseRow for FactEncounter {
    fn shape() -> &'static TableShape {
        &FACT_ENCOUNTERS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(Some(self.encounter_id)),
            key(self.patient_key),
            opt_key(self.provider_key),
            SqlValue::Int(Some(self.date_key.value())),
            opt_key(self.specialty_key),
            opt_key(self.department_key),
            key(self.encounter_type_key),
            SqlValue::Float(Some(self.length_of_stay_days)),
            SqlValue::Float(Some(self.claim_amount)),
            SqlValue::Float(Some(self.allowed_amount)),
            SqlValue::Bool(Some(self.is_inpatient)),
            SqlValue::Int(Some(self.diagnosis_count)),
            SqlValue::Int(Some(self.procedure_count)),
            SqlValue::Bool(Some(self.is_readmission)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeEncounterDiagnosis {
    pub encounter_key: SurrogateKey,
    pub diagnosis_key: SurrogateKey,
    pub diagnosis_sequence: i32,
}

impl WarehouseRow for BridgeEncounterDiagnosis {
    fn shape() -> &'static TableShape {
        &BRIDGE_ENCOUNTER_DIAGNOSES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            key(self.encounter_key),
            key(self.diagnosis_key),
            SqlValue::Int(Some(self.diagnosis_sequence)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeEncounterProcedure {
    pub encounter_key: SurrogateKey,
    pub procedure_key: SurrogateKey,
    pub procedure_date_key: Option<DateKey>,
}

impl WarehouseRow for BridgeEncounterProcedure {
    fn shape() -> &'static TableShape {
        &BRIDGE_ENCOUNTER_PROCEDURES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            key(self.encounter_key),
            key(self.procedure_key),
            SqlValue::Int(self.procedure_date_key.map(|k| k.value())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_count_matches_shape() {
        let fact = FactEncounter {
            encounter_id: 1,
            patient_key: SurrogateKey::new(1),
            provider_key: None,
            date_key: DateKey::from_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            specialty_key: None,
            department_key: Some(SurrogateKey::new(4)),
            encounter_type_key: SurrogateKey::new(2),
            length_of_stay_days: 0.0,
            claim_amount: 0.0,
            allowed_amount: 0.0,
            is_inpatient: false,
            diagnosis_count: 0,
            procedure_count: 0,
            is_readmission: false,
        };
        assert_eq!(fact.values().len(), FactEncounter::shape().columns.len());

        let provider = DimProvider {
            provider_id: 3,
            provider_name: "Ada Lovelace".to_string(),
            credential: Some("MD".to_string()),
            specialty_name: None,
            department_name: None,
        };
        assert_eq!(provider.values().len(), DimProvider::shape().columns.len());

        let bridge = BridgeEncounterProcedure {
            encounter_key: SurrogateKey::new(1),
            procedure_key: SurrogateKey::new(2),
            procedure_date_key: None,
        };
        assert_eq!(bridge.values().len(), BridgeEncounterProcedure::shape().columns.len());
        assert!(bridge.values()[2].is_null());
    }

    #[test]
    fn test_optional_fact_keys_written_as_null() {
        let fact = FactEncounter {
            encounter_id: 9,
            patient_key: SurrogateKey::new(1),
            provider_key: None,
            date_key: DateKey::from_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            specialty_key: None,
            department_key: None,
            encounter_type_key: SurrogateKey::new(2),
            length_of_stay_days: 1.5,
            claim_amount: 100.0,
            allowed_amount: 80.0,
            is_inpatient: true,
            diagnosis_count: 2,
            procedure_count: 1,
            is_readmission: false,
        };
        let values = fact.values();
        let idx = FACT_ENCOUNTERS.column_index("provider_key").unwrap();
        assert_eq!(values[idx], SqlValue::BigInt(None));
        let idx = FACT_ENCOUNTERS.column_index("patient_key").unwrap();
        assert_eq!(values[idx], SqlValue::BigInt(Some(1)));
    }

    #[test]
    fn test_foreign_key_columns_exist() {
        for fk in FOREIGN_KEYS.iter() {
            assert!(
                fk.child.column_index(fk.column).is_some(),
                "{}.{} missing",
                fk.child.name,
                fk.column
            );
        }
    }
}
