//! 30-day readmission detection
//!
//! An encounter is a readmission when the same patient had an earlier
//! inpatient stay whose discharge falls at most `window_days` whole days
//! before this encounter's admission. Only the most recent inpatient discharge
//! counts, and only inpatient encounters with a discharge move that reference
//! forward; the flagged encounter itself may be of any type.
//!
//! Whole days are floored, so 30 days and 23 hours still counts as 30, and an
//! admission a few hours before the reference discharge counts as -1.

use crate::domain::source::{EncounterRecord, NaturalId};
use chrono::NaiveDateTime;
use std::collections::HashMap;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parameters of the readmission scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmissionRule {
    window_days: i64,
    inpatient_type: String,
}

impl ReadmissionRule {
    pub fn new(window_days: i64, inpatient_type: impl Into<String>) -> Self {
        Self {
            window_days,
            inpatient_type: inpatient_type.into(),
        }
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Whether an encounter type names an inpatient stay (case-insensitive)
    pub fn is_inpatient(&self, encounter_type: &str) -> bool {
        encounter_type.trim().eq_ignore_ascii_case(self.inpatient_type.trim())
    }

    fn within_window(&self, last_discharge: NaiveDateTime, admitted: NaiveDateTime) -> bool {
        let gap_days = (admitted - last_discharge)
            .num_seconds()
            .div_euclid(SECONDS_PER_DAY);
        (0..=self.window_days).contains(&gap_days)
    }
}

impl Default for ReadmissionRule {
    fn default() -> Self {
        Self::new(30, "Inpatient")
    }
}

/// Readmission flag for every encounter, aligned with the input order
///
/// Encounters are scanned per patient in admission order; ties keep their
/// input order.
pub fn readmission_flags(encounters: &[EncounterRecord], rule: &ReadmissionRule) -> Vec<bool> {
    let mut order: Vec<usize> = (0..encounters.len()).collect();
    order.sort_by_key(|&i| (encounters[i].patient_id, encounters[i].admitted_at));

    let mut last_discharge: HashMap<NaturalId, NaiveDateTime> = HashMap::new();
    let mut flags = vec![false; encounters.len()];

    for i in order {
        let encounter = &encounters[i];
        flags[i] = last_discharge
            .get(&encounter.patient_id)
            .is_some_and(|&discharge| rule.within_window(discharge, encounter.admitted_at));

        if rule.is_inpatient(&encounter.encounter_type) {
            if let Some(discharged_at) = encounter.discharged_at {
                last_discharge.insert(encounter.patient_id, discharged_at);
            }
        }
    }

    flags
}
