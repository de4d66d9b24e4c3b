//! Encounter bridge rows
//!
//! Maps the source junction tables onto fact and dimension surrogate keys. A
//! junction row is kept only when both its encounter (through the written
//! fact) and its diagnosis or procedure resolve. Procedure dates are optional:
//! a missing date or one outside the calendar becomes a NULL date key.

use crate::core::transform::calendar::CalendarRange;
use crate::core::transform::keys::IdKeyMap;
use crate::domain::source::{EncounterDiagnosisRecord, EncounterProcedureRecord};
use crate::domain::warehouse::{BridgeEncounterDiagnosis, BridgeEncounterProcedure};
use serde::Serialize;

/// Bridge rows plus what was dropped on the way
#[derive(Debug, Clone)]
pub struct BridgeOutcome<R> {
    pub rows: Vec<R>,
    /// Junction rows whose encounter has no fact row
    pub unresolved_encounters: usize,
    /// Junction rows whose diagnosis or procedure is not in its dimension
    pub unresolved_entities: usize,
    /// Procedure rows written with a NULL date key although the source had a date
    pub dates_outside_calendar: usize,
}

impl<R> Default for BridgeOutcome<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            unresolved_encounters: 0,
            unresolved_entities: 0,
            dates_outside_calendar: 0,
        }
    }
}

impl<R> BridgeOutcome<R> {
    /// Junction rows that did not produce a bridge row
    pub fn dropped(&self) -> usize {
        self.unresolved_encounters + self.unresolved_entities
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            written: self.rows.len(),
            unresolved_encounters: self.unresolved_encounters,
            unresolved_entities: self.unresolved_entities,
            dates_outside_calendar: self.dates_outside_calendar,
        }
    }
}

/// Row-free summary of a [`BridgeOutcome`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    pub written: usize,
    pub unresolved_encounters: usize,
    pub unresolved_entities: usize,
    pub dates_outside_calendar: usize,
}

/// Resolves junction rows against the fact and clinical dimension keys
pub struct BridgeLoader<'a> {
    encounters: &'a IdKeyMap,
    calendar: &'a CalendarRange,
}

impl<'a> BridgeLoader<'a> {
    /// `encounters` maps source encounter ids to fact surrogate keys
    pub fn new(encounters: &'a IdKeyMap, calendar: &'a CalendarRange) -> Self {
        Self {
            encounters,
            calendar,
        }
    }

    pub fn diagnosis_rows(
        &self,
        junction: &[EncounterDiagnosisRecord],
        diagnoses: &IdKeyMap,
    ) -> BridgeOutcome<BridgeEncounterDiagnosis> {
        let mut outcome = BridgeOutcome {
            rows: Vec::with_capacity(junction.len()),
            ..Default::default()
        };

        for row in junction {
            let Some(encounter_key) = self.encounters.key_of(&row.encounter_id) else {
                outcome.unresolved_encounters += 1;
                continue;
            };
            let Some(diagnosis_key) = diagnoses.key_of(&row.diagnosis_id) else {
                outcome.unresolved_entities += 1;
                continue;
            };
            outcome.rows.push(BridgeEncounterDiagnosis {
                encounter_key,
                diagnosis_key,
                diagnosis_sequence: row.diagnosis_sequence,
            });
        }

        log_dropped("bridge_encounter_diagnoses", &outcome);
        outcome
    }

    pub fn procedure_rows(
        &self,
        junction: &[EncounterProcedureRecord],
        procedures: &IdKeyMap,
    ) -> BridgeOutcome<BridgeEncounterProcedure> {
        let mut outcome = BridgeOutcome {
            rows: Vec::with_capacity(junction.len()),
            ..Default::default()
        };

        for row in junction {
            let Some(encounter_key) = self.encounters.key_of(&row.encounter_id) else {
                outcome.unresolved_encounters += 1;
                continue;
            };
            let Some(procedure_key) = procedures.key_of(&row.procedure_id) else {
                outcome.unresolved_entities += 1;
                continue;
            };
            let procedure_date_key = row.procedure_date.and_then(|d| self.calendar.key_of(d));
            if row.procedure_date.is_some() && procedure_date_key.is_none() {
                outcome.dates_outside_calendar += 1;
            }
            outcome.rows.push(BridgeEncounterProcedure {
                encounter_key,
                procedure_key,
                procedure_date_key,
            });
        }

        log_dropped("bridge_encounter_procedures", &outcome);
        outcome
    }
}

fn log_dropped<R>(table: &str, outcome: &BridgeOutcome<R>) {
    if outcome.dropped() > 0 {
        tracing::warn!(
            table,
            unresolved_encounters = outcome.unresolved_encounters,
            unresolved_entities = outcome.unresolved_entities,
            "Junction rows dropped: keys did not resolve"
        );
    }
}
