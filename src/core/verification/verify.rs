//! Warehouse integrity checks
//!
//! Counts rows per table, NULLs in required foreign-key columns and orphaned
//! foreign-key values. After a load it also compares the written row counts
//! with what the pipeline accepted.

use crate::adapters::database::traits::WarehouseStore;
use crate::core::verification::report::VerificationReport;
use crate::domain::warehouse::{
    ALL_TABLES, BRIDGE_ENCOUNTER_DIAGNOSES, BRIDGE_ENCOUNTER_PROCEDURES, FACT_ENCOUNTERS,
    FOREIGN_KEYS,
};
use crate::domain::Result;
use std::sync::Arc;
use std::time::Instant;

/// Row counts a load produced, for comparison with the warehouse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedCounts {
    pub facts: u64,
    pub diagnosis_bridges: u64,
    pub procedure_bridges: u64,
}

/// Verifier for post-load validation
pub struct Verifier {
    store: Arc<dyn WarehouseStore + Send + Sync>,
}

impl Verifier {
    /// Create a new verifier
    pub fn new(store: Arc<dyn WarehouseStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Run every check against the warehouse
    ///
    /// Failed checks are recorded in the report; only store errors are
    /// returned as `Err`.
    pub async fn verify(&self, expected: Option<&ExpectedCounts>) -> Result<VerificationReport> {
        let start = Instant::now();
        let mut report = VerificationReport::new();

        tracing::info!(target_store = %self.store.describe(), "Starting warehouse verification");

        for &table in ALL_TABLES.iter() {
            let rows = self.store.count_rows(table).await?;
            report.record_table(table.name, rows);
        }

        for fk in FOREIGN_KEYS.iter() {
            if fk.required {
                let nulls = self.store.count_nulls(fk.child, fk.column).await?;
                report.record_check(format!("nulls:{}.{}", fk.child.name, fk.column), 0, nulls);
            }
            let orphans = self.store.count_orphans(fk).await?;
            report.record_check(
                format!("orphans:{}.{}", fk.child.name, fk.column),
                0,
                orphans,
            );
        }

        if let Some(expected) = expected {
            for (table, want) in [
                (&FACT_ENCOUNTERS, expected.facts),
                (&BRIDGE_ENCOUNTER_DIAGNOSES, expected.diagnosis_bridges),
                (&BRIDGE_ENCOUNTER_PROCEDURES, expected.procedure_bridges),
            ] {
                let found = report.rows_in(table.name).unwrap_or(0);
                report.record_check(format!("rows:{}", table.name), want, found);
            }
        }

        report.set_duration(start.elapsed().as_millis() as u64);

        for failure in report.failures() {
            tracing::warn!(
                check = %failure.name,
                detail = %failure.detail,
                "Verification check failed"
            );
        }
        tracing::info!(
            passed = report.passed(),
            failed = report.checks.len() - report.passed(),
            duration_ms = report.duration_ms,
            "Warehouse verification completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryWarehouse;
    use crate::core::load::bulk::BulkWriter;
    use crate::domain::warehouse::{BridgeEncounterDiagnosis, DimDiagnosis};
    use crate::domain::SurrogateKey;

    #[tokio::test]
    async fn test_empty_warehouse_passes_structural_checks() {
        let verifier = Verifier::new(Arc::new(MemoryWarehouse::new()));
        let report = verifier.verify(None).await.unwrap();

        assert_eq!(report.table_counts.len(), ALL_TABLES.len());
        assert!(report.is_success());
        assert!(report.checks.iter().all(|c| !c.name.starts_with("rows:")));
    }

    #[tokio::test]
    async fn test_orphaned_bridge_rows_fail() {
        let store = Arc::new(MemoryWarehouse::new());
        let writer = BulkWriter::new(store.clone(), 100);
        writer
            .write(&[DimDiagnosis {
                diagnosis_id: 1,
                icd10_code: "I10".to_string(),
                icd10_description: None,
            }])
            .await
            .unwrap();
        writer
            .write(&[BridgeEncounterDiagnosis {
                encounter_key: SurrogateKey::new(99),
                diagnosis_key: SurrogateKey::new(1),
                diagnosis_sequence: 1,
            }])
            .await
            .unwrap();

        let report = Verifier::new(store).verify(None).await.unwrap();
        let failed: Vec<_> = report.failures().map(|c| c.name.as_str()).collect();
        assert_eq!(failed, vec!["orphans:bridge_encounter_diagnoses.encounter_key"]);
    }

    #[tokio::test]
    async fn test_expected_counts_are_compared() {
        let verifier = Verifier::new(Arc::new(MemoryWarehouse::new()));
        let expected = ExpectedCounts {
            facts: 2,
            ..Default::default()
        };

        let report = verifier.verify(Some(&expected)).await.unwrap();
        let failed: Vec<_> = report.failures().map(|c| c.name.as_str()).collect();
        assert_eq!(failed, vec!["rows:fact_encounters"]);
    }
}
