//! Normal ranges and the policy that picks one for a patient.

use serde::{Deserialize, Serialize};

use crate::profile::AgeBracket;

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NormalRange {
    pub min: f64,
    pub max: f64,
}

impl NormalRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Both bounds are inclusive. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl From<(f64, f64)> for NormalRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// One range per age bracket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AgeRanges {
    pub child: NormalRange,
    pub adult: NormalRange,
    pub elderly: NormalRange,
}

impl AgeRanges {
    pub const fn new(child: NormalRange, adult: NormalRange, elderly: NormalRange) -> Self {
        Self {
            child,
            adult,
            elderly,
        }
    }

    /// Same range regardless of age.
    pub const fn uniform(range: NormalRange) -> Self {
        Self::new(range, range, range)
    }

    pub fn for_bracket(&self, bracket: AgeBracket) -> NormalRange {
        match bracket {
            AgeBracket::Child => self.child,
            AgeBracket::Adult => self.adult,
            AgeBracket::Elderly => self.elderly,
        }
    }

    pub fn for_age(&self, age: Option<u32>) -> NormalRange {
        self.for_bracket(AgeBracket::classify(age))
    }
}

/// Range that replaces the age-based one when a patient carries the condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionOverride {
    pub condition: String,
    pub range: NormalRange,
}

impl ConditionOverride {
    pub fn new(condition: impl Into<String>, range: NormalRange) -> Self {
        Self {
            condition: condition.into(),
            range,
        }
    }

    /// A tag matches when it contains the condition name as whole words,
    /// ignoring case: `"Severe COPD"` matches `COPD`, `"COPDX"` does not.
    pub fn matches(&self, tag: &str) -> bool {
        let needle = tokenize(&self.condition);
        if needle.is_empty() {
            return false;
        }
        tokenize(tag)
            .windows(needle.len())
            .any(|window| window == needle.as_slice())
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}

/// Range-resolution strategy: condition overrides first, age table otherwise.
///
/// An age-only policy has no overrides; a condition-only policy uses a
/// uniform age table as its default range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangePolicy {
    pub age_ranges: AgeRanges,
    #[serde(default)]
    pub overrides: Vec<ConditionOverride>,
}

impl RangePolicy {
    pub fn age_based(age_ranges: AgeRanges) -> Self {
        Self {
            age_ranges,
            overrides: Vec::new(),
        }
    }

    pub fn condition_based(default: NormalRange, overrides: Vec<ConditionOverride>) -> Self {
        Self {
            age_ranges: AgeRanges::uniform(default),
            overrides,
        }
    }

    pub fn with_override(mut self, condition: impl Into<String>, range: NormalRange) -> Self {
        self.overrides.push(ConditionOverride::new(condition, range));
        self
    }

    /// Scans `conditions` in order and returns the first registered override,
    /// falling back to the age bracket range.
    pub fn resolve(&self, age: Option<u32>, conditions: &[String]) -> NormalRange {
        conditions
            .iter()
            .find_map(|tag| {
                self.overrides
                    .iter()
                    .find(|entry| entry.matches(tag))
                    .map(|entry| entry.range)
            })
            .unwrap_or_else(|| self.age_ranges.for_age(age))
    }

    /// Every range the policy can return.
    pub fn ranges(&self) -> impl Iterator<Item = NormalRange> + '_ {
        [
            self.age_ranges.child,
            self.age_ranges.adult,
            self.age_ranges.elderly,
        ]
        .into_iter()
        .chain(self.overrides.iter().map(|entry| entry.range))
    }
}
