//! ETL coordinator - main orchestrator for a warehouse load
//!
//! Runs the stages strictly in order: extract, prepare target, dimensions,
//! facts, bridges, verification. A failing stage stops the run and is
//! reported with its name; later stages never see partial output.

use crate::adapters::database::traits::{SourceReader, WarehouseStore};
use crate::config::{LoadMode, MedstarConfig};
use crate::core::load::bulk::BulkWriter;
use crate::core::load::dimensions::{DimensionKeys, DimensionLoader};
use crate::core::load::summary::EtlSummary;
use crate::core::transform::bridges::{BridgeLoader, BridgeStats};
use crate::core::transform::calendar::CalendarRange;
use crate::core::transform::facts::{FactBatch, FactKeys, FactTransformer};
use crate::core::transform::keys::IdKeyMap;
use crate::core::transform::readmission::ReadmissionRule;
use crate::core::verification::{ExpectedCounts, Verifier};
use crate::domain::source::SourceSnapshot;
use crate::domain::warehouse::{
    ALL_TABLES, BRIDGE_ENCOUNTER_DIAGNOSES, BRIDGE_ENCOUNTER_PROCEDURES, FACT_ENCOUNTERS,
};
use crate::domain::{EtlError, Result, Stage, WarehouseError};
use chrono::{NaiveDate, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Settings for one run, resolved from configuration and CLI flags
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub chunk_size: usize,
    pub load_mode: LoadMode,
    pub calendar: CalendarRange,
    pub readmission: ReadmissionRule,
    pub initialize_schema: bool,
    /// Reference date for patient ages
    pub as_of: NaiveDate,
    pub verify: bool,
    pub dry_run: bool,
}

impl RunOptions {
    /// Resolve options from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns a validation error if the calendar range is inverted.
    pub fn from_config(config: &MedstarConfig) -> Result<Self> {
        let etl = &config.etl;
        Ok(Self {
            chunk_size: etl.chunk_size,
            load_mode: etl.load_mode,
            calendar: CalendarRange::new(etl.calendar_start, etl.calendar_end)?,
            readmission: ReadmissionRule::new(
                etl.readmission_window_days,
                etl.inpatient_encounter_type.clone(),
            ),
            initialize_schema: etl.initialize_schema,
            as_of: etl.as_of_date.unwrap_or_else(|| Utc::now().date_naive()),
            verify: config.verification.enable_verification,
            dry_run: config.application.dry_run,
        })
    }
}

/// ETL coordinator
pub struct EtlCoordinator {
    options: RunOptions,
    source: Arc<dyn SourceReader + Send + Sync>,
    warehouse: Arc<dyn WarehouseStore + Send + Sync>,
    writer: BulkWriter,
}

impl EtlCoordinator {
    /// Create a new coordinator over already-constructed stores
    pub fn new(
        options: RunOptions,
        source: Arc<dyn SourceReader + Send + Sync>,
        warehouse: Arc<dyn WarehouseStore + Send + Sync>,
    ) -> Self {
        let writer = BulkWriter::new(warehouse.clone(), options.chunk_size);
        Self {
            options,
            source,
            warehouse,
            writer,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Execute the run
    ///
    /// Rejected facts and dropped bridge rows do not fail the run; they are
    /// counted in the summary. Verification failures are reported the same
    /// way.
    ///
    /// # Errors
    ///
    /// Returns `EtlError::StageFailed` naming the first stage that failed.
    pub async fn run(&self) -> Result<EtlSummary> {
        let start_time = Instant::now();
        let mut summary = EtlSummary::new(self.options.dry_run, self.options.load_mode);

        tracing::info!(
            run_id = %summary.run_id,
            source = %self.source.describe(),
            warehouse = %self.warehouse.describe(),
            load_mode = %self.options.load_mode,
            dry_run = self.options.dry_run,
            "Starting ETL run"
        );

        let snapshot = run_stage(&mut summary, Stage::Extract, async {
            self.source.test_connection().await?;
            let snapshot = self.source.read_snapshot().await?;
            let rows = snapshot.total_rows() as u64;
            Ok::<_, EtlError>((snapshot, rows))
        })
        .await?;
        summary.source_rows = snapshot.total_rows();

        run_stage(&mut summary, Stage::PrepareTarget, async {
            self.prepare_target().await?;
            Ok::<_, EtlError>(((), 0))
        })
        .await?;

        let (keys, counts) = run_stage(&mut summary, Stage::Dimensions, async {
            let loader =
                DimensionLoader::new(&self.writer, self.options.calendar, self.options.as_of);
            let (keys, counts) = loader.load(&snapshot).await?;
            let rows = counts.total();
            Ok::<_, EtlError>(((keys, counts), rows))
        })
        .await?;
        for (table, rows) in &counts.tables {
            summary.record_table(table, *rows);
        }

        let (fact_keys, batch) = run_stage(&mut summary, Stage::Facts, async {
            let (fact_keys, batch, written) = self.load_facts(&snapshot, &keys).await?;
            Ok::<_, EtlError>(((fact_keys, batch), written))
        })
        .await?;
        let accepted_facts = batch.rows.len() as u64;
        summary.record_table(FACT_ENCOUNTERS.name, accepted_facts);
        summary.readmissions = batch.readmissions();
        summary.rejected_facts = batch.rejected;

        let bridges = run_stage(&mut summary, Stage::Bridges, async {
            let loaded = self
                .load_bridges(&snapshot, &keys, &fact_keys, accepted_facts)
                .await?;
            let rows = loaded.diagnosis_rows + loaded.procedure_rows;
            Ok::<_, EtlError>((loaded, rows))
        })
        .await?;
        summary.record_table(BRIDGE_ENCOUNTER_DIAGNOSES.name, bridges.diagnosis_rows);
        summary.record_table(BRIDGE_ENCOUNTER_PROCEDURES.name, bridges.procedure_rows);
        summary.diagnosis_bridges = bridges.diagnosis_stats;
        summary.procedure_bridges = bridges.procedure_stats;
        let expected = bridges.expected;

        if self.options.verify {
            let report = run_stage(&mut summary, Stage::Verification, async {
                let report = Verifier::new(self.warehouse.clone())
                    .verify(Some(&expected))
                    .await?;
                let checks = report.checks.len() as u64;
                Ok::<_, EtlError>((report, checks))
            })
            .await?;
            summary.verification = Some(report);
        } else {
            tracing::info!("Verification disabled, skipping");
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn prepare_target(&self) -> Result<()> {
        self.warehouse.test_connection().await?;

        if self.options.initialize_schema {
            self.warehouse.initialize_schema().await?;
        }

        match self.options.load_mode {
            LoadMode::Truncate => self.warehouse.truncate_all(&ALL_TABLES).await,
            LoadMode::RequireEmpty => {
                let non_empty = self.warehouse.non_empty_tables(&ALL_TABLES).await?;
                if non_empty.is_empty() {
                    Ok(())
                } else {
                    Err(WarehouseError::NotEmpty(non_empty.join(", ")).into())
                }
            }
        }
    }

    async fn load_facts(
        &self,
        snapshot: &SourceSnapshot,
        keys: &DimensionKeys,
    ) -> Result<(IdKeyMap, FactBatch, u64)> {
        let transformer = FactTransformer::new(
            FactKeys {
                patients: &keys.patients,
                providers: &keys.providers,
                specialties: &keys.specialties,
                departments: &keys.departments,
                encounter_types: &keys.encounter_types,
                diagnoses: &keys.diagnoses,
                procedures: &keys.procedures,
                calendar: &keys.calendar,
            },
            self.options.readmission.clone(),
        );
        let batch = transformer.transform(snapshot);
        let written = self.writer.write(&batch.rows).await?;

        let pairs = self.warehouse.read_id_keys(&FACT_ENCOUNTERS).await?;
        let fact_keys = IdKeyMap::from_pairs(FACT_ENCOUNTERS.name, pairs)?;

        tracing::info!(
            facts = written,
            rejected = batch.rejected.len(),
            readmissions = batch.readmissions(),
            inpatient = batch.inpatient(),
            "Encounter facts loaded"
        );
        Ok((fact_keys, batch, written))
    }

    async fn load_bridges(
        &self,
        snapshot: &SourceSnapshot,
        keys: &DimensionKeys,
        fact_keys: &IdKeyMap,
        accepted_facts: u64,
    ) -> Result<LoadedBridges> {
        let loader = BridgeLoader::new(fact_keys, &keys.calendar);
        let diagnoses = loader.diagnosis_rows(&snapshot.encounter_diagnoses, &keys.diagnoses);
        let procedures = loader.procedure_rows(&snapshot.encounter_procedures, &keys.procedures);

        let (diagnosis_rows, procedure_rows) = futures::try_join!(
            self.writer.write(&diagnoses.rows),
            self.writer.write(&procedures.rows),
        )?;

        // Expected counts come from the transform so a store that loses rows
        // fails verification.
        Ok(LoadedBridges {
            expected: ExpectedCounts {
                facts: accepted_facts,
                diagnosis_bridges: diagnoses.rows.len() as u64,
                procedure_bridges: procedures.rows.len() as u64,
            },
            diagnosis_rows,
            procedure_rows,
            diagnosis_stats: diagnoses.stats(),
            procedure_stats: procedures.stats(),
        })
    }
}

struct LoadedBridges {
    expected: ExpectedCounts,
    diagnosis_rows: u64,
    procedure_rows: u64,
    diagnosis_stats: BridgeStats,
    procedure_stats: BridgeStats,
}

/// Run one stage, logging its start and completion and recording it in the
/// summary. A failure is tagged with the stage.
async fn run_stage<T>(
    summary: &mut EtlSummary,
    stage: Stage,
    work: impl Future<Output = Result<(T, u64)>>,
) -> Result<T> {
    crate::log_stage_start!(stage);
    let start = Instant::now();

    match work.await {
        Ok((value, rows)) => {
            let duration = start.elapsed();
            crate::log_stage_complete!(stage, rows, duration);
            summary.record_stage(stage, rows, duration);
            Ok(value)
        }
        Err(e) => {
            crate::log_error_with_context!(e, stage.as_str());
            Err(e.in_stage(stage))
        }
    }
}
