use serde::{Deserialize, Serialize};

/// Age below which a patient uses child ranges.
pub const CHILD_AGE_THRESHOLD: u32 = 12;
/// Age from which a patient uses elderly ranges.
pub const ELDERLY_AGE_THRESHOLD: u32 = 65;

/// Age classification used to pick a normal range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    Child,
    Adult,
    Elderly,
}

impl AgeBracket {
    /// Classifies an age in years. Unknown age is treated as adult.
    pub fn classify(age: Option<u32>) -> Self {
        match age {
            Some(years) if years < CHILD_AGE_THRESHOLD => Self::Child,
            Some(years) if years >= ELDERLY_AGE_THRESHOLD => Self::Elderly,
            _ => Self::Adult,
        }
    }
}

/// Demographic and medical information used to personalise ranges.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientProfile {
    /// Age in years.
    #[serde(default)]
    pub age: Option<u32>,
    /// Condition tags in the order they were recorded.
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Display name, never used in range logic.
    #[serde(default)]
    pub name: Option<String>,
}

impl PatientProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Appends conditions from free text such as `"COPD, Hypertension"`.
    pub fn with_conditions_text(mut self, text: &str) -> Self {
        self.conditions.extend(
            text.split(|c: char| c == ',' || c == ';')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string),
        );
        self
    }

    pub fn age_bracket(&self) -> AgeBracket {
        AgeBracket::classify(self.age)
    }
}
