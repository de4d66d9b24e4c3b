//! Encounter fact assembly
//!
//! Resolves every dimension reference of an encounter through the in-memory
//! key maps, computes the measures and attaches the readmission flag.
//! Patient, date and encounter type are required; an encounter missing any of
//! them is rejected rather than written with a dangling key. Provider,
//! specialty and department may be absent and are written as NULL.

use crate::core::transform::calendar::CalendarRange;
use crate::core::transform::keys::{IdKeyMap, NameKeyMap};
use crate::core::transform::readmission::{readmission_flags, ReadmissionRule};
use crate::domain::source::{
    EncounterDiagnosisRecord, EncounterProcedureRecord, EncounterRecord, NaturalId,
    SourceSnapshot,
};
use crate::domain::warehouse::FactEncounter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Key maps the fact transformer resolves against
#[derive(Debug, Clone, Copy)]
pub struct FactKeys<'a> {
    pub patients: &'a IdKeyMap,
    pub providers: &'a IdKeyMap,
    pub specialties: &'a IdKeyMap,
    pub departments: &'a IdKeyMap,
    pub encounter_types: &'a NameKeyMap,
    pub diagnoses: &'a IdKeyMap,
    pub procedures: &'a IdKeyMap,
    pub calendar: &'a CalendarRange,
}

/// An encounter that could not become a fact row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedFact {
    pub encounter_id: NaturalId,
    /// Required dimensions that did not resolve
    pub missing: Vec<String>,
}

/// Output of one transformation pass
#[derive(Debug, Clone, Default)]
pub struct FactBatch {
    pub rows: Vec<FactEncounter>,
    pub rejected: Vec<RejectedFact>,
}

impl FactBatch {
    pub fn readmissions(&self) -> usize {
        self.rows.iter().filter(|r| r.is_readmission).count()
    }

    pub fn inpatient(&self) -> usize {
        self.rows.iter().filter(|r| r.is_inpatient).count()
    }
}

/// Length of stay in fractional days; zero while the patient is not discharged
pub fn length_of_stay_days(encounter: &EncounterRecord) -> f64 {
    encounter
        .discharged_at
        .map(|discharged| {
            (discharged - encounter.admitted_at).num_seconds() as f64 / SECONDS_PER_DAY
        })
        .unwrap_or(0.0)
}

/// Builds `fact_encounters` rows from a snapshot
pub struct FactTransformer<'a> {
    keys: FactKeys<'a>,
    rule: ReadmissionRule,
}

impl<'a> FactTransformer<'a> {
    pub fn new(keys: FactKeys<'a>, rule: ReadmissionRule) -> Self {
        Self { keys, rule }
    }

    /// Transform every encounter of the snapshot
    ///
    /// Diagnosis and procedure counts are the number of bridge rows the
    /// encounter will get: junction rows whose clinical entity resolves.
    pub fn transform(&self, snapshot: &SourceSnapshot) -> FactBatch {
        let readmissions = readmission_flags(&snapshot.encounters, &self.rule);
        let diagnosis_counts = self.diagnosis_tally(&snapshot.encounter_diagnoses);
        let procedure_counts = self.procedure_tally(&snapshot.encounter_procedures);
        let provider_specialty: HashMap<NaturalId, NaturalId> = snapshot
            .providers
            .iter()
            .filter_map(|p| p.specialty_id.map(|s| (p.provider_id, s)))
            .collect();

        let mut batch = FactBatch::default();
        for (encounter, is_readmission) in snapshot.encounters.iter().zip(readmissions) {
            let patient_key = self.keys.patients.key_of(&encounter.patient_id);
            let date_key = self.keys.calendar.key_of(encounter.admitted_at.date());
            let encounter_type_key = self
                .keys
                .encounter_types
                .key_of(encounter.encounter_type.as_str());

            let (Some(patient_key), Some(date_key), Some(encounter_type_key)) =
                (patient_key, date_key, encounter_type_key)
            else {
                let missing: Vec<String> = [
                    ("patient", patient_key.is_none()),
                    ("date", date_key.is_none()),
                    ("encounter_type", encounter_type_key.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name.to_string())
                .collect();

                tracing::warn!(
                    encounter_id = encounter.encounter_id,
                    missing = ?missing,
                    "Encounter rejected: required dimension did not resolve"
                );
                batch.rejected.push(RejectedFact {
                    encounter_id: encounter.encounter_id,
                    missing,
                });
                continue;
            };

            let specialty_id = encounter
                .provider_id
                .and_then(|id| provider_specialty.get(&id));

            batch.rows.push(FactEncounter {
                encounter_id: encounter.encounter_id,
                patient_key,
                provider_key: self.keys.providers.key_of_opt(encounter.provider_id.as_ref()),
                date_key,
                specialty_key: self.keys.specialties.key_of_opt(specialty_id),
                department_key: self
                    .keys
                    .departments
                    .key_of_opt(encounter.department_id.as_ref()),
                encounter_type_key,
                length_of_stay_days: length_of_stay_days(encounter),
                claim_amount: encounter.claim_amount,
                allowed_amount: encounter.allowed_amount,
                is_inpatient: self.rule.is_inpatient(&encounter.encounter_type),
                diagnosis_count: diagnosis_counts
                    .get(&encounter.encounter_id)
                    .copied()
                    .unwrap_or(0),
                procedure_count: procedure_counts
                    .get(&encounter.encounter_id)
                    .copied()
                    .unwrap_or(0),
                is_readmission,
            });
        }

        tracing::debug!(
            facts = batch.rows.len(),
            rejected = batch.rejected.len(),
            readmissions = batch.readmissions(),
            "Encounter facts assembled"
        );
        batch
    }

    fn diagnosis_tally(&self, rows: &[EncounterDiagnosisRecord]) -> HashMap<NaturalId, i32> {
        let mut tally = HashMap::new();
        for row in rows
            .iter()
            .filter(|r| self.keys.diagnoses.key_of(&r.diagnosis_id).is_some())
        {
            *tally.entry(row.encounter_id).or_insert(0) += 1;
        }
        tally
    }

    fn procedure_tally(&self, rows: &[EncounterProcedureRecord]) -> HashMap<NaturalId, i32> {
        let mut tally = HashMap::new();
        for row in rows
            .iter()
            .filter(|r| self.keys.procedures.key_of(&r.procedure_id).is_some())
        {
            *tally.entry(row.encounter_id).or_insert(0) += 1;
        }
        tally
    }
}
