//! Operational-schema queries and row decoding
//!
//! Each source record type knows the query that extracts it and how to decode
//! one result row. Integer and money columns are cast in SQL so decoding does
//! not depend on the exact column types of the operational schema.

use crate::domain::source::{
    DepartmentRecord, DiagnosisRecord, EncounterDiagnosisRecord, EncounterProcedureRecord,
    EncounterRecord, PatientRecord, ProcedureRecord, ProviderRecord, SpecialtyRecord,
};
use tokio_postgres::Row;

/// A source record that can be read with a single query
pub trait SourceRow: Sized {
    /// Operational table the record comes from
    const TABLE: &'static str;

    /// Extraction query; rows come back in natural-key order
    const QUERY: &'static str;

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error>;
}

impl SourceRow for PatientRecord {
    const TABLE: &'static str = "patients";
    const QUERY: &'static str = "SELECT patient_id::bigint, first_name, last_name, \
         date_of_birth, gender, mrn \
         FROM patients ORDER BY patient_id";

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            patient_id: row.try_get(0)?,
            first_name: row.try_get(1)?,
            last_name: row.try_get(2)?,
            date_of_birth: row.try_get(3)?,
            gender: row.try_get(4)?,
            mrn: row.try_get(5)?,
        })
    }
}

impl SourceRow for SpecialtyRecord {
    const TABLE: &'static str = "specialties";
    const QUERY: &'static str = "SELECT specialty_id::bigint, specialty_name, specialty_code \
         FROM specialties ORDER BY specialty_id";

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            specialty_id: row.try_get(0)?,
            specialty_name: row.try_get(1)?,
            specialty_code: row.try_get(2)?,
        })
    }
}

impl SourceRow for DepartmentRecord {
    const TABLE: &'static str = "departments";
    const QUERY: &'static str = "SELECT department_id::bigint, department_name, \
         floor::integer, capacity::integer \
         FROM departments ORDER BY department_id";

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            department_id: row.try_get(0)?,
            department_name: row.try_get(1)?,
            floor: row.try_get(2)?,
            capacity: row.try_get(3)?,
        })
    }
}

impl SourceRow for ProviderRecord {
    const TABLE: &'static str = "providers";
    const QUERY: &'static str = "SELECT provider_id::bigint, first_name, last_name, credential, \
         specialty_id::bigint, department_id::bigint \
         FROM providers ORDER BY provider_id";

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            provider_id: row.try_get(0)?,
            first_name: row.try_get(1)?,
            last_name: row.try_get(2)?,
            credential: row.try_get(3)?,
            specialty_id: row.try_get(4)?,
            department_id: row.try_get(5)?,
        })
    }
}

impl SourceRow for DiagnosisRecord {
    const TABLE: &'static str = "diagnoses";
    const QUERY: &'static str = "SELECT diagnosis_id::bigint, icd10_code, icd10_description \
         FROM diagnoses ORDER BY diagnosis_id";

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            diagnosis_id: row.try_get(0)?,
            icd10_code: row.try_get(1)?,
            icd10_description: row.try_get(2)?,
        })
    }
}

impl SourceRow for ProcedureRecord {
    const TABLE: &'static str = "procedures";
    const QUERY: &'static str = "SELECT procedure_id::bigint, cpt_code, cpt_description \
         FROM procedures ORDER BY procedure_id";

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            procedure_id: row.try_get(0)?,
            cpt_code: row.try_get(1)?,
            cpt_description: row.try_get(2)?,
        })
    }
}

impl SourceRow for EncounterRecord {
    const TABLE: &'static str = "encounters";
    // Billing is summed per encounter so an encounter never yields two rows.
    const QUERY: &'static str = "SELECT e.encounter_id::bigint, e.patient_id::bigint, \
         e.provider_id::bigint, e.department_id::bigint, e.encounter_type, \
         e.encounter_date::timestamp, e.discharge_date::timestamp, \
         COALESCE(b.claim_amount, 0)::float8, COALESCE(b.allowed_amount, 0)::float8 \
         FROM encounters e \
         LEFT JOIN ( \
             SELECT encounter_id, SUM(claim_amount) AS claim_amount, \
                    SUM(allowed_amount) AS allowed_amount \
             FROM billing GROUP BY encounter_id \
         ) b ON b.encounter_id = e.encounter_id \
         ORDER BY e.encounter_id";

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            encounter_id: row.try_get(0)?,
            patient_id: row.try_get(1)?,
            provider_id: row.try_get(2)?,
            department_id: row.try_get(3)?,
            encounter_type: row.try_get(4)?,
            admitted_at: row.try_get(5)?,
            discharged_at: row.try_get(6)?,
            claim_amount: row.try_get(7)?,
            allowed_amount: row.try_get(8)?,
        })
    }
}

impl SourceRow for EncounterDiagnosisRecord {
    const TABLE: &'static str = "encounter_diagnoses";
    const QUERY: &'static str = "SELECT encounter_id::bigint, diagnosis_id::bigint, \
         diagnosis_sequence::integer \
         FROM encounter_diagnoses ORDER BY encounter_id, diagnosis_sequence";

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            encounter_id: row.try_get(0)?,
            diagnosis_id: row.try_get(1)?,
            diagnosis_sequence: row.try_get(2)?,
        })
    }
}

impl SourceRow for EncounterProcedureRecord {
    const TABLE: &'static str = "encounter_procedures";
    const QUERY: &'static str = "SELECT encounter_id::bigint, procedure_id::bigint, \
         procedure_date::date \
         FROM encounter_procedures ORDER BY encounter_id, procedure_id";

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            encounter_id: row.try_get(0)?,
            procedure_id: row.try_get(1)?,
            procedure_date: row.try_get(2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encounter_query_aggregates_billing() {
        assert!(EncounterRecord::QUERY.contains("GROUP BY encounter_id"));
        assert!(EncounterRecord::QUERY.contains("LEFT JOIN"));
    }

    #[test]
    fn test_queries_read_their_table() {
        assert!(PatientRecord::QUERY.contains(&format!("FROM {}", PatientRecord::TABLE)));
        assert!(ProviderRecord::QUERY.contains(&format!("FROM {}", ProviderRecord::TABLE)));
        assert!(EncounterProcedureRecord::QUERY
            .contains(&format!("FROM {}", EncounterProcedureRecord::TABLE)));
    }
}
