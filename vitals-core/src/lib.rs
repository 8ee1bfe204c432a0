//! Range evaluation for patient vital signs.
//!
//! A [`VitalsChecker`] owns a [`VitalsRegistry`] of evaluators and an
//! [`Alerter`]. Each present vital in a [`VitalReading`] is evaluated against
//! a range resolved from the [`PatientProfile`]; unregistered names are
//! ignored. New vital kinds are added through registration only.

mod alert;
mod catalog;
mod checker;
mod error;
mod evaluator;
mod profile;
mod range;
mod reading;
mod registry;

pub use alert::{AlertRecord, Alerter, RecordingAlerter};
pub use catalog::{ConditionRange, RangeCatalog, RangeDefinition};
pub use checker::{VitalAssessment, VitalsChecker, VitalsCheckerBuilder};
pub use error::{AlertError, VitalsError};
pub use evaluator::{resolve_range, BloodPressure, StandardVital, VitalSign, VitalSignEvaluator};
pub use profile::{AgeBracket, PatientProfile, CHILD_AGE_THRESHOLD, ELDERLY_AGE_THRESHOLD};
pub use range::{AgeRanges, ConditionOverride, NormalRange, RangePolicy};
pub use reading::{format_value, VitalReading};
pub use registry::VitalsRegistry;
