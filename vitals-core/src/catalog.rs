//! JSON range catalogs for registering evaluators without code changes.
//!
//! ```json
//! {
//!   "vitals": [
//!     {
//!       "name": "Respiratory Rate",
//!       "unit": "breaths/min",
//!       "child": { "min": 20, "max": 30 },
//!       "adult": { "min": 12, "max": 20 },
//!       "elderly": { "min": 12, "max": 28 },
//!       "conditions": [{ "condition": "COPD", "min": 10, "max": 24 }]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::VitalsError;
use crate::evaluator::{StandardVital, VitalSignEvaluator};
use crate::range::{AgeRanges, ConditionOverride, NormalRange, RangePolicy};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RangeCatalog {
    #[serde(default)]
    pub vitals: Vec<RangeDefinition>,
}

/// One vital kind. Missing `child`/`elderly` ranges fall back to `adult`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangeDefinition {
    pub name: String,
    pub unit: String,
    pub adult: NormalRange,
    #[serde(default)]
    pub child: Option<NormalRange>,
    #[serde(default)]
    pub elderly: Option<NormalRange>,
    #[serde(default)]
    pub conditions: Vec<ConditionRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionRange {
    pub condition: String,
    pub min: f64,
    pub max: f64,
}

impl RangeCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, VitalsError> {
        serde_json::from_str(json).map_err(|err| VitalsError::Parse(err.to_string()))
    }

    /// The built-in range table, respiratory rate included.
    pub fn standard() -> Self {
        Self {
            vitals: StandardVital::ALL
                .into_iter()
                .map(|kind| RangeDefinition::from(&kind.evaluator()))
                .collect(),
        }
    }

    /// Validates every entry before building any evaluator.
    pub fn evaluators(&self) -> Result<Vec<VitalSignEvaluator>, VitalsError> {
        self.vitals
            .iter()
            .map(RangeDefinition::to_evaluator)
            .collect()
    }
}

impl RangeDefinition {
    pub fn to_evaluator(&self) -> Result<VitalSignEvaluator, VitalsError> {
        let age_ranges = AgeRanges::new(
            self.child.unwrap_or(self.adult),
            self.adult,
            self.elderly.unwrap_or(self.adult),
        );
        let overrides = self
            .conditions
            .iter()
            .map(|entry| {
                ConditionOverride::new(&entry.condition, NormalRange::new(entry.min, entry.max))
            })
            .collect();
        let policy = RangePolicy {
            age_ranges,
            overrides,
        };

        if let Some(bad) = policy.ranges().find(|range| !range.is_valid()) {
            return Err(VitalsError::InvalidRange {
                vital: self.name.clone(),
                min: bad.min,
                max: bad.max,
            });
        }

        Ok(VitalSignEvaluator::new(&self.name, &self.unit, policy))
    }
}

impl From<&VitalSignEvaluator> for RangeDefinition {
    fn from(evaluator: &VitalSignEvaluator) -> Self {
        let ages = evaluator.policy.age_ranges;
        Self {
            name: evaluator.name.clone(),
            unit: evaluator.unit.clone(),
            adult: ages.adult,
            child: Some(ages.child),
            elderly: Some(ages.elderly),
            conditions: evaluator
                .policy
                .overrides
                .iter()
                .map(|entry| ConditionRange {
                    condition: entry.condition.clone(),
                    min: entry.range.min,
                    max: entry.range.max,
                })
                .collect(),
        }
    }
}
