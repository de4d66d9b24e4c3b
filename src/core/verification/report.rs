//! Verification report structures
//!
//! This module defines the structures for reporting warehouse integrity checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rows held by one warehouse table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    pub rows: u64,
}

/// Outcome of a single integrity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check identifier, e.g. `orphans:fact_encounters.patient_key`
    pub name: String,

    pub passed: bool,

    /// Expected vs. found, for failures
    pub detail: String,
}

/// Verification report for the warehouse after a load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the verification was performed
    pub verified_at: DateTime<Utc>,

    /// Row count of every warehouse table
    pub table_counts: Vec<TableCount>,

    /// Every check that ran, passed or not
    pub checks: Vec<CheckResult>,

    /// Duration of verification in milliseconds
    pub duration_ms: u64,
}

impl VerificationReport {
    /// Create a new verification report
    pub fn new() -> Self {
        Self {
            verified_at: Utc::now(),
            table_counts: Vec::new(),
            checks: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn record_table(&mut self, table: &str, rows: u64) {
        self.table_counts.push(TableCount {
            table: table.to_string(),
            rows,
        });
    }

    /// Record a check that expects `found` to equal `expected`
    pub fn record_check(&mut self, name: impl Into<String>, expected: u64, found: u64) {
        self.checks.push(CheckResult {
            name: name.into(),
            passed: expected == found,
            detail: format!("expected {expected}, found {found}"),
        });
    }

    /// Set the duration of verification
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    pub fn rows_in(&self, table: &str) -> Option<u64> {
        self.table_counts
            .iter()
            .find(|t| t.table == table)
            .map(|t| t.rows)
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// Check if all checks passed
    pub fn is_success(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Verification Report\n");
        summary.push_str(&format!("  Verified at: {}\n", self.verified_at));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));
        summary.push_str("  Row counts:\n");
        for count in &self.table_counts {
            summary.push_str(&format!("    {:<30} {:>10}\n", count.table, count.rows));
        }
        summary.push_str(&format!("  ✅ Passed checks: {}\n", self.passed()));
        summary.push_str(&format!(
            "  ❌ Failed checks: {}\n",
            self.checks.len() - self.passed()
        ));

        if !self.is_success() {
            summary.push_str("\n❌ Failures:\n");
            for (i, failure) in self.failures().enumerate() {
                summary.push_str(&format!(
                    "  {}. {}: {}\n",
                    i + 1,
                    failure.name,
                    failure.detail
                ));
            }
        }

        summary
    }
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_successful() {
        let report = VerificationReport::new();
        assert!(report.is_success());
        assert_eq!(report.passed(), 0);
        assert!(report.table_counts.is_empty());
    }

    #[test]
    fn test_record_check() {
        let mut report = VerificationReport::new();
        report.record_check("nulls:fact_encounters.patient_key", 0, 0);
        report.record_check("orphans:fact_encounters.date_key", 0, 3);

        assert_eq!(report.passed(), 1);
        assert!(!report.is_success());

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].detail, "expected 0, found 3");
    }

    #[test]
    fn test_rows_in() {
        let mut report = VerificationReport::new();
        report.record_table("dim_date", 4018);
        assert_eq!(report.rows_in("dim_date"), Some(4018));
        assert_eq!(report.rows_in("dim_patient"), None);
    }

    #[test]
    fn test_format_summary_lists_failures() {
        let mut report = VerificationReport::new();
        report.record_table("fact_encounters", 10);
        report.record_check("rows:fact_encounters", 12, 10);
        report.set_duration(42);

        let text = report.format_summary();
        assert!(text.contains("fact_encounters"));
        assert!(text.contains("Duration: 42 ms"));
        assert!(text.contains("1. rows:fact_encounters: expected 12, found 10"));
    }
}
