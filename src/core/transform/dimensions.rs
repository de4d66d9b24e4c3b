//! Source records to dimension rows
//!
//! Pure mappings; nothing here talks to a store. The provider dimension is
//! denormalized in memory: specialty and department names are copied onto the
//! provider row, and a provider whose specialty or department is missing still
//! gets a row with those names left empty.

use crate::domain::source::{
    DepartmentRecord, DiagnosisRecord, EncounterRecord, NaturalId, PatientRecord,
    ProcedureRecord, ProviderRecord, SpecialtyRecord,
};
use crate::domain::warehouse::{
    DimDepartment, DimDiagnosis, DimEncounterType, DimPatient, DimProcedure, DimProvider,
    DimSpecialty,
};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

/// Whole years between `birth` and `as_of`, counted as days / 365
pub fn age_in_years(birth: NaiveDate, as_of: NaiveDate) -> i32 {
    (as_of - birth).num_days().div_euclid(365) as i32
}

pub fn patient_rows(patients: &[PatientRecord], as_of: NaiveDate) -> Vec<DimPatient> {
    patients
        .iter()
        .map(|p| DimPatient {
            patient_id: p.patient_id,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            full_name: full_name(&p.first_name, &p.last_name),
            date_of_birth: p.date_of_birth,
            current_age: p.date_of_birth.map(|dob| age_in_years(dob, as_of)),
            gender: p.gender.clone(),
            mrn: p.mrn.clone(),
        })
        .collect()
}

pub fn specialty_rows(specialties: &[SpecialtyRecord]) -> Vec<DimSpecialty> {
    specialties
        .iter()
        .map(|s| DimSpecialty {
            specialty_id: s.specialty_id,
            specialty_name: s.specialty_name.clone(),
            specialty_code: s.specialty_code.clone(),
        })
        .collect()
}

pub fn department_rows(departments: &[DepartmentRecord]) -> Vec<DimDepartment> {
    departments
        .iter()
        .map(|d| DimDepartment {
            department_id: d.department_id,
            department_name: d.department_name.clone(),
            floor: d.floor,
            capacity: d.capacity,
        })
        .collect()
}

/// Provider rows with specialty and department names folded in
pub fn provider_rows(
    providers: &[ProviderRecord],
    specialties: &[SpecialtyRecord],
    departments: &[DepartmentRecord],
) -> Vec<DimProvider> {
    let specialty_names: HashMap<NaturalId, &str> = specialties
        .iter()
        .map(|s| (s.specialty_id, s.specialty_name.as_str()))
        .collect();
    let department_names: HashMap<NaturalId, &str> = departments
        .iter()
        .map(|d| (d.department_id, d.department_name.as_str()))
        .collect();

    providers
        .iter()
        .map(|p| DimProvider {
            provider_id: p.provider_id,
            provider_name: full_name(&p.first_name, &p.last_name),
            credential: p.credential.clone(),
            specialty_name: p
                .specialty_id
                .and_then(|id| specialty_names.get(&id))
                .map(|name| name.to_string()),
            department_name: p
                .department_id
                .and_then(|id| department_names.get(&id))
                .map(|name| name.to_string()),
        })
        .collect()
}

/// One row per distinct encounter type, sorted by name
pub fn encounter_type_rows(encounters: &[EncounterRecord]) -> Vec<DimEncounterType> {
    encounters
        .iter()
        .map(|e| e.encounter_type.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|name| DimEncounterType {
            encounter_type_name: name.to_string(),
        })
        .collect()
}

pub fn diagnosis_rows(diagnoses: &[DiagnosisRecord]) -> Vec<DimDiagnosis> {
    diagnoses
        .iter()
        .map(|d| DimDiagnosis {
            diagnosis_id: d.diagnosis_id,
            icd10_code: d.icd10_code.clone(),
            icd10_description: d.icd10_description.clone(),
        })
        .collect()
}

pub fn procedure_rows(procedures: &[ProcedureRecord]) -> Vec<DimProcedure> {
    procedures
        .iter()
        .map(|p| DimProcedure {
            procedure_id: p.procedure_id,
            cpt_code: p.cpt_code.clone(),
            cpt_description: p.cpt_description.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn encounter(id: NaturalId, kind: &str) -> EncounterRecord {
        EncounterRecord {
            encounter_id: id,
            patient_id: 1,
            provider_id: None,
            department_id: None,
            encounter_type: kind.to_string(),
            admitted_at: NaiveDateTime::parse_from_str("2024-01-01 08:00", "%Y-%m-%d %H:%M")
                .unwrap(),
            discharged_at: None,
            claim_amount: 0.0,
            allowed_amount: 0.0,
        }
    }

    #[test_case(date(1980, 6, 15), date(2024, 6, 15), 44 ; "birthday")]
    #[test_case(date(2000, 1, 1), date(2000, 12, 31), 1 ; "leap year counts 366 days")]
    #[test_case(date(2000, 1, 1), date(2000, 12, 30), 0 ; "one day short")]
    #[test_case(date(2024, 1, 1), date(2024, 1, 1), 0 ; "born today")]
    fn test_age_in_years(birth: NaiveDate, as_of: NaiveDate, expected: i32) {
        assert_eq!(age_in_years(birth, as_of), expected);
    }

    #[test]
    fn test_patient_rows_without_birth_date() {
        let patients = vec![PatientRecord {
            patient_id: 7,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            date_of_birth: None,
            gender: Some("F".to_string()),
            mrn: Some("MRN-7".to_string()),
        }];

        let rows = patient_rows(&patients, date(2024, 1, 1));
        assert_eq!(rows[0].full_name, "Ada Lovelace");
        assert_eq!(rows[0].current_age, None);
        assert_eq!(rows[0].mrn.as_deref(), Some("MRN-7"));
    }

    #[test]
    fn test_provider_rows_left_join_names() {
        let specialties = vec![SpecialtyRecord {
            specialty_id: 1,
            specialty_name: "Cardiology".to_string(),
            specialty_code: Some("CARD".to_string()),
        }];
        let departments = vec![DepartmentRecord {
            department_id: 2,
            department_name: "Heart Center".to_string(),
            floor: Some(3),
            capacity: Some(40),
        }];
        let providers = vec![
            ProviderRecord {
                provider_id: 10,
                first_name: "Gregory".to_string(),
                last_name: "House".to_string(),
                credential: Some("MD".to_string()),
                specialty_id: Some(1),
                department_id: Some(2),
            },
            ProviderRecord {
                provider_id: 11,
                first_name: "James".to_string(),
                last_name: "Wilson".to_string(),
                credential: None,
                specialty_id: Some(99),
                department_id: None,
            },
        ];

        let rows = provider_rows(&providers, &specialties, &departments);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].provider_name, "Gregory House");
        assert_eq!(rows[0].specialty_name.as_deref(), Some("Cardiology"));
        assert_eq!(rows[0].department_name.as_deref(), Some("Heart Center"));
        assert_eq!(rows[1].specialty_name, None);
        assert_eq!(rows[1].department_name, None);
    }

    #[test]
    fn test_encounter_types_are_distinct_and_sorted() {
        let encounters = vec![
            encounter(1, "Outpatient"),
            encounter(2, "Inpatient"),
            encounter(3, "Outpatient"),
            encounter(4, "Emergency"),
        ];

        let names: Vec<_> = encounter_type_rows(&encounters)
            .into_iter()
            .map(|r| r.encounter_type_name)
            .collect();
        assert_eq!(names, vec!["Emergency", "Inpatient", "Outpatient"]);
    }

    #[test]
    fn test_encounter_types_empty_source() {
        assert!(encounter_type_rows(&[]).is_empty());
    }
}
