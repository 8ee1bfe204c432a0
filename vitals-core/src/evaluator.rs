//! Vital sign evaluators and the standard range tables.

use serde::{Deserialize, Serialize};

use crate::profile::PatientProfile;
use crate::range::{AgeRanges, NormalRange, RangePolicy};
use crate::registry::VitalsRegistry;

/// Decides whether a measured value is normal for a patient.
pub trait VitalSign: Send + Sync {
    fn name(&self) -> &str;

    fn unit(&self) -> &str;

    fn is_within_range(&self, value: f64, profile: Option<&PatientProfile>) -> bool;

    /// Range applied for `profile`, when the evaluator is range-based.
    fn normal_range(&self, _profile: Option<&PatientProfile>) -> Option<NormalRange> {
        None
    }
}

/// Data-driven evaluator: a name, a unit and a range policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalSignEvaluator {
    pub name: String,
    pub unit: String,
    pub policy: RangePolicy,
}

impl VitalSignEvaluator {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, policy: RangePolicy) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            policy,
        }
    }

    pub fn resolve(&self, profile: Option<&PatientProfile>) -> NormalRange {
        match profile {
            Some(profile) => self.policy.resolve(profile.age, &profile.conditions),
            None => self.policy.resolve(None, &[]),
        }
    }
}

impl VitalSign for VitalSignEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn is_within_range(&self, value: f64, profile: Option<&PatientProfile>) -> bool {
        self.resolve(profile).contains(value)
    }

    fn normal_range(&self, profile: Option<&PatientProfile>) -> Option<NormalRange> {
        Some(self.resolve(profile))
    }
}

/// The built-in vital kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StandardVital {
    Temperature,
    PulseRate,
    OxygenSaturation,
    SystolicBloodPressure,
    DiastolicBloodPressure,
    RespiratoryRate,
}

impl StandardVital {
    pub const ALL: [StandardVital; 6] = [
        Self::Temperature,
        Self::PulseRate,
        Self::OxygenSaturation,
        Self::SystolicBloodPressure,
        Self::DiastolicBloodPressure,
        Self::RespiratoryRate,
    ];

    /// Kinds every new registry starts with. Respiratory rate is opt-in.
    pub const DEFAULTS: [StandardVital; 5] = [
        Self::Temperature,
        Self::PulseRate,
        Self::OxygenSaturation,
        Self::SystolicBloodPressure,
        Self::DiastolicBloodPressure,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::PulseRate => "Pulse Rate",
            Self::OxygenSaturation => "Oxygen Saturation",
            Self::SystolicBloodPressure => "Systolic Blood Pressure",
            Self::DiastolicBloodPressure => "Diastolic Blood Pressure",
            Self::RespiratoryRate => "Respiratory Rate",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°F",
            Self::PulseRate => "BPM",
            Self::OxygenSaturation => "%",
            Self::SystolicBloodPressure | Self::DiastolicBloodPressure => "mmHg",
            Self::RespiratoryRate => "breaths/min",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn policy(self) -> RangePolicy {
        let (child, adult, elderly) = match self {
            Self::Temperature => ((95.0, 103.0), (95.0, 102.0), (94.0, 102.0)),
            Self::PulseRate => ((70.0, 120.0), (60.0, 100.0), (55.0, 105.0)),
            Self::OxygenSaturation => {
                return RangePolicy::condition_based(NormalRange::new(90.0, 100.0), Vec::new())
                    .with_override("COPD", NormalRange::new(85.0, 100.0));
            }
            Self::SystolicBloodPressure => ((80.0, 120.0), (110.0, 140.0), (110.0, 150.0)),
            Self::DiastolicBloodPressure => ((50.0, 80.0), (60.0, 90.0), (65.0, 95.0)),
            Self::RespiratoryRate => ((20.0, 30.0), (12.0, 20.0), (12.0, 28.0)),
        };
        RangePolicy::age_based(AgeRanges::new(child.into(), adult.into(), elderly.into()))
    }

    pub fn evaluator(self) -> VitalSignEvaluator {
        VitalSignEvaluator::new(self.name(), self.unit(), self.policy())
    }
}

/// Resolves the normal range of a standard vital for an age and condition list.
pub fn resolve_range(kind: StandardVital, age: Option<u32>, conditions: &[String]) -> NormalRange {
    kind.policy().resolve(age, conditions)
}

/// Two-value check that needs both component readings in range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BloodPressure {
    pub name: String,
    pub unit: String,
    /// Reading key of the first component.
    pub systolic: String,
    /// Reading key of the second component.
    pub diastolic: String,
}

impl Default for BloodPressure {
    fn default() -> Self {
        Self {
            name: "Blood Pressure".to_string(),
            unit: StandardVital::SystolicBloodPressure.unit().to_string(),
            systolic: StandardVital::SystolicBloodPressure.name().to_string(),
            diastolic: StandardVital::DiastolicBloodPressure.name().to_string(),
        }
    }
}

impl BloodPressure {
    /// Checks both components with the evaluators currently registered for
    /// them. A component without an evaluator does not fail the pair.
    pub fn is_within_range(
        &self,
        registry: &VitalsRegistry,
        systolic: f64,
        diastolic: f64,
        profile: Option<&PatientProfile>,
    ) -> bool {
        let component_ok = |key: &str, value: f64| {
            registry
                .get(key)
                .map_or(true, |evaluator| evaluator.is_within_range(value, profile))
        };
        component_ok(&self.systolic, systolic) && component_ok(&self.diastolic, diastolic)
    }

    pub fn format_value(&self, systolic: f64, diastolic: f64) -> String {
        format!(
            "{}/{}",
            crate::reading::format_value(systolic),
            crate::reading::format_value(diastolic)
        )
    }
}
