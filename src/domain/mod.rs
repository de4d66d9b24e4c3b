//! Domain models and types for Medstar.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Source records** ([`PatientRecord`], [`EncounterRecord`], ...) as read from the
//!   operational store, bundled per run in a [`SourceSnapshot`]
//! - **Warehouse rows** ([`DimPatient`], [`FactEncounter`], ...) each describing its
//!   target table through a static [`TableShape`]
//! - **Key newtypes** ([`SurrogateKey`], [`DateKey`])
//! - **Error types** ([`EtlError`], [`SourceError`], [`WarehouseError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Surrogate keys and calendar keys are distinct types, so a date key cannot be
//! written into a surrogate-key column:
//!
//! ```rust
//! use chrono::NaiveDate;
//! use medstar::domain::{DateKey, SurrogateKey};
//!
//! let patient_key = SurrogateKey::new(1);
//! let date_key = DateKey::from_date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
//!
//! assert_eq!(patient_key.value(), 1);
//! assert_eq!(date_key.value(), 20240105);
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod source;
pub mod value;
pub mod warehouse;

pub use errors::{EtlError, SourceError, Stage, WarehouseError};
pub use ids::{DateKey, SurrogateKey};
pub use result::Result;
pub use source::{
    DepartmentRecord, DiagnosisRecord, EncounterDiagnosisRecord, EncounterProcedureRecord,
    EncounterRecord, NaturalId, PatientRecord, ProcedureRecord, ProviderRecord, SourceSnapshot,
    SpecialtyRecord,
};
pub use value::{SqlValue, TableShape, WarehouseRow};
pub use warehouse::{
    BridgeEncounterDiagnosis, BridgeEncounterProcedure, DimDate, DimDepartment, DimDiagnosis,
    DimEncounterType, DimPatient, DimProcedure, DimProvider, DimSpecialty, FactEncounter,
    ForeignKey,
};
