//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting ETL run results.

use crate::config::LoadMode;
use crate::core::transform::bridges::BridgeStats;
use crate::core::transform::facts::RejectedFact;
use crate::core::verification::report::VerificationReport;
use crate::domain::Stage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Timing and volume of one completed stage
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub rows: u64,
    pub duration_ms: u64,
}

/// Rows written to one warehouse table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLoad {
    pub table: String,
    pub rows: u64,
}

/// Summary of an ETL run
#[derive(Debug, Clone, Serialize)]
pub struct EtlSummary {
    /// Identifier attached to every log line of the run
    pub run_id: Uuid,

    pub started_at: DateTime<Utc>,

    /// Whether the warehouse was replaced by an in-memory store
    pub dry_run: bool,

    pub load_mode: LoadMode,

    /// Rows extracted from the operational store
    pub source_rows: usize,

    pub stages: Vec<StageReport>,

    pub tables: Vec<TableLoad>,

    /// Encounters flagged as readmissions
    pub readmissions: usize,

    /// Encounters not written because a required key did not resolve
    pub rejected_facts: Vec<RejectedFact>,

    pub diagnosis_bridges: BridgeStats,

    pub procedure_bridges: BridgeStats,

    /// Duration of the run in milliseconds
    pub duration_ms: u64,

    /// Verification report (if verification was run)
    pub verification: Option<VerificationReport>,
}

impl EtlSummary {
    /// Create a new empty summary
    pub fn new(dry_run: bool, load_mode: LoadMode) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            dry_run,
            load_mode,
            source_rows: 0,
            stages: Vec::new(),
            tables: Vec::new(),
            readmissions: 0,
            rejected_facts: Vec::new(),
            diagnosis_bridges: BridgeStats::default(),
            procedure_bridges: BridgeStats::default(),
            duration_ms: 0,
            verification: None,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn record_stage(&mut self, stage: Stage, rows: u64, duration: Duration) {
        self.stages.push(StageReport {
            stage: stage.to_string(),
            rows,
            duration_ms: duration.as_millis() as u64,
        });
    }

    pub fn record_table(&mut self, table: &str, rows: u64) {
        self.tables.push(TableLoad {
            table: table.to_string(),
            rows,
        });
    }

    /// Rows written to a table during this run
    pub fn rows_written(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| t.rows)
    }

    pub fn total_rows_written(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// Whether verification ran and found problems
    pub fn verification_failed(&self) -> bool {
        self.verification
            .as_ref()
            .is_some_and(|report| !report.is_success())
    }

    /// Completed with nothing rejected and no failed checks
    pub fn is_clean(&self) -> bool {
        self.rejected_facts.is_empty() && !self.verification_failed()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            dry_run = self.dry_run,
            load_mode = %self.load_mode,
            source_rows = self.source_rows,
            rows_written = self.total_rows_written(),
            readmissions = self.readmissions,
            rejected_facts = self.rejected_facts.len(),
            diagnosis_bridges_dropped = self.diagnosis_bridges.unresolved_encounters
                + self.diagnosis_bridges.unresolved_entities,
            procedure_bridges_dropped = self.procedure_bridges.unresolved_encounters
                + self.procedure_bridges.unresolved_entities,
            duration_ms = self.duration_ms,
            "ETL run completed"
        );

        for table in &self.tables {
            tracing::debug!(table = %table.table, rows = table.rows, "Table loaded");
        }

        if !self.rejected_facts.is_empty() {
            tracing::warn!(
                rejected = self.rejected_facts.len(),
                "Some encounters were not loaded; see rejected_facts in the summary"
            );
        }
    }
}
