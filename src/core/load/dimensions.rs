//! Dimension loading
//!
//! Writes the calendar and the seven entity dimensions, then reads each
//! generated-key dimension back into a key map. The dimensions do not depend
//! on each other, so their writes run concurrently.

use crate::core::load::bulk::BulkWriter;
use crate::core::transform::calendar::CalendarRange;
use crate::core::transform::dimensions::{
    department_rows, diagnosis_rows, encounter_type_rows, patient_rows, procedure_rows,
    provider_rows, specialty_rows,
};
use crate::core::transform::keys::{IdKeyMap, NameKeyMap};
use crate::domain::source::SourceSnapshot;
use crate::domain::value::WarehouseRow;
use crate::domain::Result;
use chrono::NaiveDate;

/// Key maps for every loaded dimension
#[derive(Debug, Clone)]
pub struct DimensionKeys {
    pub patients: IdKeyMap,
    pub specialties: IdKeyMap,
    pub departments: IdKeyMap,
    pub providers: IdKeyMap,
    pub encounter_types: NameKeyMap,
    pub diagnoses: IdKeyMap,
    pub procedures: IdKeyMap,
    pub calendar: CalendarRange,
}

/// Rows written per dimension table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionCounts {
    pub tables: Vec<(&'static str, u64)>,
}

impl DimensionCounts {
    pub fn total(&self) -> u64 {
        self.tables.iter().map(|(_, rows)| rows).sum()
    }

    pub fn get(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, rows)| *rows)
    }
}

/// Loads all dimensions for one run
pub struct DimensionLoader<'a> {
    writer: &'a BulkWriter,
    calendar: CalendarRange,
    as_of: NaiveDate,
}

impl<'a> DimensionLoader<'a> {
    /// `as_of` is the reference date for patient ages
    pub fn new(writer: &'a BulkWriter, calendar: CalendarRange, as_of: NaiveDate) -> Self {
        Self {
            writer,
            calendar,
            as_of,
        }
    }

    /// Write every dimension and read back its keys
    ///
    /// # Errors
    ///
    /// Returns the first write or read-back failure. Tables written before
    /// the failure keep their rows.
    pub async fn load(
        &self,
        snapshot: &SourceSnapshot,
    ) -> Result<(DimensionKeys, DimensionCounts)> {
        let dates = self.calendar.generate();
        let patients = patient_rows(&snapshot.patients, self.as_of);
        let specialties = specialty_rows(&snapshot.specialties);
        let departments = department_rows(&snapshot.departments);
        let providers = provider_rows(
            &snapshot.providers,
            &snapshot.specialties,
            &snapshot.departments,
        );
        let encounter_types = encounter_type_rows(&snapshot.encounters);
        let diagnoses = diagnosis_rows(&snapshot.diagnoses);
        let procedures = procedure_rows(&snapshot.procedures);

        let (
            date_rows,
            (patient_keys, patient_rows),
            (specialty_keys, specialty_rows),
            (department_keys, department_rows),
            (provider_keys, provider_rows),
            (encounter_type_keys, encounter_type_rows),
            (diagnosis_keys, diagnosis_rows),
            (procedure_keys, procedure_rows),
        ) = futures::try_join!(
            self.writer.write(&dates),
            self.load_by_id(&patients),
            self.load_by_id(&specialties),
            self.load_by_id(&departments),
            self.load_by_id(&providers),
            self.load_by_name(&encounter_types),
            self.load_by_id(&diagnoses),
            self.load_by_id(&procedures),
        )?;

        let counts = DimensionCounts {
            tables: vec![
                ("dim_date", date_rows),
                ("dim_patient", patient_rows),
                ("dim_specialty", specialty_rows),
                ("dim_department", department_rows),
                ("dim_provider", provider_rows),
                ("dim_encounter_type", encounter_type_rows),
                ("dim_diagnosis", diagnosis_rows),
                ("dim_procedure", procedure_rows),
            ],
        };

        let keys = DimensionKeys {
            patients: patient_keys,
            specialties: specialty_keys,
            departments: department_keys,
            providers: provider_keys,
            encounter_types: encounter_type_keys,
            diagnoses: diagnosis_keys,
            procedures: procedure_keys,
            calendar: self.calendar,
        };

        Ok((keys, counts))
    }

    async fn load_by_id<R: WarehouseRow + Sync>(&self, rows: &[R]) -> Result<(IdKeyMap, u64)> {
        let written = self.writer.write(rows).await?;
        let table = R::shape();
        let pairs = self.writer.store().read_id_keys(table).await?;
        Ok((IdKeyMap::from_pairs(table.name, pairs)?, written))
    }

    async fn load_by_name<R: WarehouseRow + Sync>(&self, rows: &[R]) -> Result<(NameKeyMap, u64)> {
        let written = self.writer.write(rows).await?;
        let table = R::shape();
        let pairs = self.writer.store().read_name_keys(table).await?;
        Ok((NameKeyMap::from_pairs(table.name, pairs)?, written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryWarehouse;
    use crate::domain::source::{EncounterRecord, PatientRecord, ProviderRecord, SpecialtyRecord};
    use crate::domain::value::SqlValue;
    use crate::domain::warehouse::{DIM_PROVIDER, DIM_PATIENT};
    use crate::domain::{EtlError, SurrogateKey};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot() -> SourceSnapshot {
        SourceSnapshot {
            patients: vec![
                PatientRecord {
                    patient_id: 10,
                    first_name: "Ada".to_string(),
                    last_name: "King".to_string(),
                    date_of_birth: Some(date(1990, 1, 1)),
                    gender: None,
                    mrn: None,
                },
                PatientRecord {
                    patient_id: 20,
                    first_name: "Alan".to_string(),
                    last_name: "Turing".to_string(),
                    date_of_birth: None,
                    gender: None,
                    mrn: None,
                },
            ],
            specialties: vec![SpecialtyRecord {
                specialty_id: 1,
                specialty_name: "Neurology".to_string(),
                specialty_code: None,
            }],
            providers: vec![ProviderRecord {
                provider_id: 5,
                first_name: "Oliver".to_string(),
                last_name: "Sacks".to_string(),
                credential: Some("MD".to_string()),
                specialty_id: Some(1),
                department_id: Some(42),
            }],
            encounters: vec![EncounterRecord {
                encounter_id: 1,
                patient_id: 10,
                provider_id: Some(5),
                department_id: None,
                encounter_type: "Outpatient".to_string(),
                admitted_at: date(2024, 1, 1).and_hms_opt(9, 0, 0).unwrap(),
                discharged_at: None,
                claim_amount: 0.0,
                allowed_amount: 0.0,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_load_writes_all_dimensions_and_reads_keys() {
        let store = Arc::new(MemoryWarehouse::new());
        let writer = BulkWriter::new(store.clone(), 100);
        let calendar = CalendarRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let loader = DimensionLoader::new(&writer, calendar, date(2024, 6, 1));

        let (keys, counts) = loader.load(&snapshot()).await.unwrap();

        assert_eq!(counts.get("dim_date"), Some(31));
        assert_eq!(counts.get("dim_patient"), Some(2));
        assert_eq!(counts.get("dim_department"), Some(0));
        assert_eq!(counts.total(), 31 + 2 + 1 + 1 + 1);

        assert_eq!(keys.patients.len(), 2);
        assert_eq!(keys.patients.key_of(&10), Some(SurrogateKey::new(1)));
        assert_eq!(keys.patients.key_of(&20), Some(SurrogateKey::new(2)));
        assert!(keys.encounter_types.key_of("Outpatient").is_some());
        assert!(keys.departments.is_empty());

        let ages = store.column(&DIM_PATIENT, "current_age").await;
        assert_eq!(ages, vec![SqlValue::Int(Some(34)), SqlValue::Int(None)]);

        // department 42 does not exist: the provider still loads with no department name
        let departments = store.column(&DIM_PROVIDER, "department_name").await;
        assert_eq!(departments, vec![SqlValue::Text(None)]);
        let specialties = store.column(&DIM_PROVIDER, "specialty_name").await;
        assert_eq!(specialties, vec![SqlValue::Text(Some("Neurology".to_string()))]);
    }

    #[tokio::test]
    async fn test_duplicate_natural_key_fails_load() {
        let store = Arc::new(MemoryWarehouse::new());
        let writer = BulkWriter::new(store, 100);
        let calendar = CalendarRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        let loader = DimensionLoader::new(&writer, calendar, date(2024, 6, 1));

        let mut source = snapshot();
        source.patients.push(source.patients[0].clone());

        let err = loader.load(&source).await.unwrap_err();
        assert!(matches!(err, EtlError::Warehouse(_)));
    }
}
