use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::evaluator::StandardVital;

/// Measured values for one observation instant, keyed by vital name.
///
/// Keys keep their first insertion position; setting an existing name
/// replaces the value in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VitalReading {
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    values: IndexMap<String, f64>,
}

impl VitalReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reading pre-populated with the five common vital names.
    pub fn standard(
        temperature: f64,
        pulse_rate: f64,
        oxygen_saturation: f64,
        systolic: f64,
        diastolic: f64,
    ) -> Self {
        Self::new()
            .with_value(StandardVital::Temperature.name(), temperature)
            .with_value(StandardVital::PulseRate.name(), pulse_rate)
            .with_value(StandardVital::OxygenSaturation.name(), oxygen_saturation)
            .with_value(StandardVital::SystolicBloodPressure.name(), systolic)
            .with_value(StandardVital::DiastolicBloodPressure.name(), diastolic)
    }

    pub fn with_value(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when both systolic and diastolic values are present.
    pub fn has_blood_pressure(&self) -> bool {
        self.contains(StandardVital::SystolicBloodPressure.name())
            && self.contains(StandardVital::DiastolicBloodPressure.name())
    }
}

/// Renders a measured value the way alerts display it.
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
