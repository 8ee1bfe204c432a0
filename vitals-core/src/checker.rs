//! Orchestrates evaluation of a reading and alerting.

use serde::{Deserialize, Serialize};

use crate::alert::Alerter;
use crate::catalog::RangeCatalog;
use crate::error::VitalsError;
use crate::evaluator::VitalSign;
use crate::profile::PatientProfile;
use crate::range::NormalRange;
use crate::reading::{format_value, VitalReading};
use crate::registry::VitalsRegistry;

/// Verdict for one vital, or for the blood-pressure pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalAssessment {
    pub vital: String,
    pub value: String,
    pub unit: String,
    pub within_range: bool,
    /// Range applied, when the evaluator exposes one.
    pub range: Option<NormalRange>,
}

/// Checks readings against a registry of evaluators and reports violations.
pub struct VitalsChecker {
    registry: VitalsRegistry,
    alerter: Box<dyn Alerter>,
}

impl VitalsChecker {
    /// Checker with the standard registry.
    pub fn new<A>(alerter: A) -> Self
    where
        A: Alerter + 'static,
    {
        Self {
            registry: VitalsRegistry::standard(),
            alerter: Box::new(alerter),
        }
    }

    pub fn builder() -> VitalsCheckerBuilder {
        VitalsCheckerBuilder::default()
    }

    pub fn registry(&self) -> &VitalsRegistry {
        &self.registry
    }

    /// Adds or replaces the evaluator registered under the evaluator's name.
    pub fn register_vital_sign<V>(&mut self, evaluator: V)
    where
        V: VitalSign + 'static,
    {
        self.registry.register(evaluator);
    }

    /// Registers every catalog entry. Nothing is registered if any entry is invalid.
    pub fn register_catalog(&mut self, catalog: &RangeCatalog) -> Result<(), VitalsError> {
        for evaluator in catalog.evaluators()? {
            self.registry.register(evaluator);
        }
        Ok(())
    }

    /// Evaluates every present, registered vital without alerting.
    ///
    /// When both blood-pressure components are present they yield one
    /// combined verdict at the position of the first component.
    pub fn assess(
        &self,
        reading: &VitalReading,
        profile: Option<&PatientProfile>,
    ) -> Vec<VitalAssessment> {
        let pair = self
            .registry
            .blood_pressure()
            .filter(|bp| reading.contains(&bp.systolic) && reading.contains(&bp.diastolic));
        let mut pair_assessed = false;
        let mut assessments = Vec::with_capacity(reading.len());

        for (name, value) in reading.iter() {
            if let Some(bp) = pair {
                if name == bp.systolic || name == bp.diastolic {
                    if pair_assessed {
                        continue;
                    }
                    pair_assessed = true;
                    let systolic = reading.get(&bp.systolic).unwrap_or(value);
                    let diastolic = reading.get(&bp.diastolic).unwrap_or(value);
                    assessments.push(VitalAssessment {
                        vital: bp.name.clone(),
                        value: bp.format_value(systolic, diastolic),
                        unit: bp.unit.clone(),
                        within_range: bp.is_within_range(
                            &self.registry,
                            systolic,
                            diastolic,
                            profile,
                        ),
                        range: None,
                    });
                    continue;
                }
            }

            let Some(evaluator) = self.registry.get(name) else {
                tracing::trace!(vital = name, "No evaluator registered, skipping");
                continue;
            };

            assessments.push(VitalAssessment {
                vital: name.to_string(),
                value: format_value(value),
                unit: evaluator.unit().to_string(),
                within_range: evaluator.is_within_range(value, profile),
                range: evaluator.normal_range(profile),
            });
        }

        assessments
    }

    /// Alerts once per out-of-range vital and returns the number of alerts.
    ///
    /// An alerter error stops the check and is returned to the caller.
    pub fn check_vitals(
        &self,
        reading: &VitalReading,
        profile: Option<&PatientProfile>,
    ) -> Result<usize, VitalsError> {
        let mut raised = 0;
        for assessment in self.assess(reading, profile) {
            if assessment.within_range {
                continue;
            }
            tracing::info!(
                vital = %assessment.vital,
                value = %assessment.value,
                unit = %assessment.unit,
                "Vital out of range"
            );
            self.alerter
                .alert(&assessment.vital, &assessment.value, &assessment.unit)
                .map_err(VitalsError::Alerter)?;
            raised += 1;
        }
        Ok(raised)
    }

    /// True when every present, registered vital is in range.
    pub fn are_all_vitals_within_range(
        &self,
        reading: &VitalReading,
        profile: Option<&PatientProfile>,
    ) -> bool {
        self.assess(reading, profile)
            .iter()
            .all(|assessment| assessment.within_range)
    }
}

/// Builder that rejects a checker without an alerter.
#[derive(Default)]
pub struct VitalsCheckerBuilder {
    alerter: Option<Box<dyn Alerter>>,
    registry: Option<VitalsRegistry>,
}

impl VitalsCheckerBuilder {
    pub fn alerter<A>(mut self, alerter: A) -> Self
    where
        A: Alerter + 'static,
    {
        self.alerter = Some(Box::new(alerter));
        self
    }

    /// Replaces the standard registry.
    pub fn registry(mut self, registry: VitalsRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<VitalsChecker, VitalsError> {
        let alerter = self.alerter.ok_or(VitalsError::MissingAlerter)?;
        Ok(VitalsChecker {
            registry: self.registry.unwrap_or_default(),
            alerter,
        })
    }
}
