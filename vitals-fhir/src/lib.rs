//! FHIR JSON bundle to `PatientProfile` + `VitalReading` extraction.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vitals_core::{PatientProfile, StandardVital, VitalReading, VitalsError};

/// Producer-side policy applied while building a reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FhirExtractConfig {
    /// Skip observations whose value is zero or negative.
    #[serde(default)]
    pub drop_non_positive: bool,
    /// Maps diagnoses onto the condition tags range overrides use.
    #[serde(default = "default_condition_aliases")]
    pub condition_aliases: Vec<ConditionAlias>,
}

impl Default for FhirExtractConfig {
    fn default() -> Self {
        Self {
            drop_non_positive: false,
            condition_aliases: default_condition_aliases(),
        }
    }
}

/// A diagnosis is tagged when its text contains `pattern` or one of its codings equals it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditionAlias {
    pub pattern: String,
    pub tag: String,
}

fn default_condition_aliases() -> Vec<ConditionAlias> {
    [
        ("chronic obstructive", "COPD"),
        ("13645005", "COPD"),
        ("copd", "COPD"),
    ]
    .into_iter()
    .map(|(pattern, tag)| ConditionAlias {
        pattern: pattern.to_string(),
        tag: tag.to_string(),
    })
    .collect()
}

/// What a bundle says about one patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientVitals {
    pub profile: PatientProfile,
    pub reading: VitalReading,
}

/// Extract vitals from a JSON string.
pub fn extract_vitals_str(
    bundle_json: &str,
    config: &FhirExtractConfig,
) -> Result<PatientVitals, VitalsError> {
    let value: Value =
        serde_json::from_str(bundle_json).map_err(|err| VitalsError::Parse(err.to_string()))?;
    extract_vitals_value(&value, config)
}

/// Extract vitals from a `serde_json::Value`.
pub fn extract_vitals_value(
    bundle: &Value,
    config: &FhirExtractConfig,
) -> Result<PatientVitals, VitalsError> {
    let bundle_type = bundle
        .get("resourceType")
        .and_then(Value::as_str)
        .ok_or(VitalsError::MissingData)?;

    if bundle_type != "Bundle" {
        return Err(VitalsError::Parse(format!(
            "Expected resourceType Bundle, received {bundle_type}"
        )));
    }

    let entries = bundle
        .get("entry")
        .and_then(Value::as_array)
        .ok_or(VitalsError::MissingData)?;

    let resources: Vec<&Value> = entries
        .iter()
        .filter_map(|entry| entry.get("resource"))
        .collect();
    let anchor = resources
        .iter()
        .filter(|resource| resource_type(resource) == "Observation")
        .filter_map(|resource| extract_observation_timestamp(resource))
        .max();

    let mut aggregate = Aggregate::default();
    for resource in resources {
        match resource_type(resource) {
            "Patient" => aggregate.handle_patient(resource, anchor),
            "Condition" => aggregate.handle_condition(resource, config),
            "Observation" => aggregate.handle_observation(resource, config),
            other => tracing::debug!(resource_type = other, "Skipping resource"),
        }
    }

    Ok(aggregate.finalize())
}

#[derive(Default)]
struct Aggregate {
    profile: PatientProfile,
    reading: VitalReading,
    observed_at: HashMap<String, Option<DateTime<Utc>>>,
    recorded_at: Option<DateTime<Utc>>,
}

impl Aggregate {
    fn handle_patient(&mut self, resource: &Value, anchor: Option<DateTime<Utc>>) {
        if let Some(name) = extract_patient_name(resource) {
            self.profile.name = Some(name);
        }
        let as_of = anchor.unwrap_or_else(Utc::now).date_naive();
        if let Some(age) = extract_patient_age(resource, as_of) {
            self.profile.age = Some(age);
        }
    }

    fn handle_condition(&mut self, resource: &Value, config: &FhirExtractConfig) {
        if let Some(status) = extract_status_code(resource.get("clinicalStatus")) {
            let status = status.to_lowercase();
            if status == "resolved" || status == "inactive" || status == "remission" {
                return;
            }
        }

        let Some(code) = resource.get("code") else {
            return;
        };
        let Some(tag) = condition_tag(code, config) else {
            return;
        };

        if !self.profile.conditions.contains(&tag) {
            self.profile.conditions.push(tag);
        }
    }

    fn handle_observation(&mut self, resource: &Value, config: &FhirExtractConfig) {
        if matches!(
            resource.get("status").and_then(Value::as_str),
            Some("entered-in-error" | "cancelled")
        ) {
            return;
        }

        let recorded_at = extract_observation_timestamp(resource);

        if let Some(components) = resource.get("component").and_then(Value::as_array) {
            let mut found = false;
            for component in components {
                let Some(kind) = component.get("code").and_then(infer_vital_kind) else {
                    continue;
                };
                if let Some(value) = parse_value_quantity(component) {
                    found = true;
                    self.record(kind.name(), value, recorded_at, config);
                }
            }
            if found {
                return;
            }
        }

        let Some(value) = parse_value_quantity(resource) else {
            return;
        };

        let code = resource.get("code");
        let name = match code.and_then(infer_vital_kind) {
            Some(kind) => kind.name().to_string(),
            None if observation_category_matches(resource, "vital") => {
                match code.and_then(extract_codeable_text) {
                    Some(text) => text,
                    None => return,
                }
            }
            None => {
                tracing::debug!("Skipping non-vital observation");
                return;
            }
        };

        self.record(&name, value, recorded_at, config);
    }

    fn record(
        &mut self,
        name: &str,
        value: f64,
        recorded_at: Option<DateTime<Utc>>,
        config: &FhirExtractConfig,
    ) {
        if config.drop_non_positive && value <= 0.0 {
            tracing::debug!(vital = name, value, "Dropping non-positive value");
            return;
        }

        if let Some(existing) = self.observed_at.get(name) {
            if !is_more_recent(recorded_at, *existing) {
                return;
            }
        }

        self.observed_at.insert(name.to_string(), recorded_at);
        self.reading.set(name, value);
        if is_more_recent(recorded_at, self.recorded_at) {
            self.recorded_at = recorded_at;
        }
    }

    fn finalize(mut self) -> PatientVitals {
        self.reading.recorded_at = self.recorded_at;
        PatientVitals {
            profile: self.profile,
            reading: self.reading,
        }
    }
}

fn resource_type(resource: &Value) -> &str {
    resource
        .get("resourceType")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn condition_tag(code: &Value, config: &FhirExtractConfig) -> Option<String> {
    let text = extract_codeable_text(code)?;
    let lower = text.to_lowercase();
    let codes: Vec<&str> = code
        .get("coding")
        .and_then(Value::as_array)
        .map(|codings| {
            codings
                .iter()
                .filter_map(|coding| coding.get("code").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    let alias = config.condition_aliases.iter().find(|alias| {
        let pattern = alias.pattern.to_lowercase();
        lower.contains(&pattern) || codes.iter().any(|code| code.eq_ignore_ascii_case(&pattern))
    });

    Some(alias.map_or(text, |alias| alias.tag.clone()))
}

fn extract_patient_name(resource: &Value) -> Option<String> {
    let names = resource.get("name")?.as_array()?;
    let name = names.first()?;
    let given = name
        .get("given")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(Value::as_str)
        .unwrap_or("");
    let family = name.get("family").and_then(Value::as_str).unwrap_or("");
    let full = format!("{given} {family}").trim().to_string();
    if full.is_empty() {
        None
    } else {
        Some(full)
    }
}

fn extract_patient_age(resource: &Value, as_of: NaiveDate) -> Option<u32> {
    let birth_date = resource
        .get("birthDate")
        .and_then(Value::as_str)
        .and_then(parse_date)?;
    let mut age = as_of.year() - birth_date.year();

    if (as_of.month(), as_of.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }

    u32::try_from(age).ok()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn extract_codeable_text(value: &Value) -> Option<String> {
    if let Some(text) = value.get("text").and_then(Value::as_str) {
        if !text.trim().is_empty() {
            return Some(text.trim().to_string());
        }
    }

    if let Some(codings) = value.get("coding").and_then(Value::as_array) {
        for coding in codings {
            if let Some(display) = coding.get("display").and_then(Value::as_str) {
                if !display.trim().is_empty() {
                    return Some(display.trim().to_string());
                }
            }
            if let Some(code) = coding.get("code").and_then(Value::as_str) {
                if !code.trim().is_empty() {
                    return Some(code.trim().to_string());
                }
            }
        }
    }

    None
}

fn extract_status_code(value: Option<&Value>) -> Option<String> {
    let value = value?;
    let coded = value
        .get("coding")
        .and_then(Value::as_array)
        .and_then(|codings| codings.first())
        .and_then(|coding| coding.get("code"))
        .and_then(Value::as_str);
    if let Some(code) = coded {
        return Some(code.to_string());
    }
    if let Some(text) = extract_codeable_text(value) {
        return Some(text);
    }
    value.as_str().map(|s| s.to_string())
}

fn extract_datetime(resource: &Value, fields: &[&str]) -> Option<DateTime<Utc>> {
    for field in fields {
        let Some(value) = resource.get(*field) else {
            continue;
        };

        if let Some(text) = value.as_str() {
            if let Some(dt) = parse_datetime(text) {
                return Some(dt);
            }
        }

        if let Some(obj) = value.as_object() {
            if let Some(end) = obj.get("end").and_then(Value::as_str) {
                if let Some(dt) = parse_datetime(end) {
                    return Some(dt);
                }
            }
            if let Some(start) = obj.get("start").and_then(Value::as_str) {
                if let Some(dt) = parse_datetime(start) {
                    return Some(dt);
                }
            }
        }
    }
    None
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn extract_observation_timestamp(resource: &Value) -> Option<DateTime<Utc>> {
    extract_datetime(
        resource,
        &[
            "effectiveDateTime",
            "effectiveInstant",
            "effectivePeriod",
            "issued",
        ],
    )
}

fn parse_value_quantity(resource: &Value) -> Option<f64> {
    resource
        .get("valueQuantity")?
        .get("value")
        .and_then(Value::as_f64)
}

/// LOINC codes of the standard vital signs.
const LOINC_VITALS: [(&str, StandardVital); 8] = [
    ("8310-5", StandardVital::Temperature),
    ("8867-4", StandardVital::PulseRate),
    ("59408-5", StandardVital::OxygenSaturation),
    ("2708-6", StandardVital::OxygenSaturation),
    ("8480-6", StandardVital::SystolicBloodPressure),
    ("8462-4", StandardVital::DiastolicBloodPressure),
    ("9279-1", StandardVital::RespiratoryRate),
    ("8889-8", StandardVital::PulseRate),
];

fn infer_vital_kind(code: &Value) -> Option<StandardVital> {
    if let Some(codings) = code.get("coding").and_then(Value::as_array) {
        for coding in codings {
            let Some(value) = coding.get("code").and_then(Value::as_str) else {
                continue;
            };
            if let Some((_, kind)) = LOINC_VITALS.iter().find(|(loinc, _)| *loinc == value) {
                return Some(*kind);
            }
        }
    }

    let lower = extract_codeable_text(code)?.to_lowercase();
    if lower.contains("systolic") {
        Some(StandardVital::SystolicBloodPressure)
    } else if lower.contains("diastolic") {
        Some(StandardVital::DiastolicBloodPressure)
    } else if lower.contains("heart rate") || lower.contains("pulse") {
        Some(StandardVital::PulseRate)
    } else if lower.contains("spo2") || lower.contains("oxygen saturation") {
        Some(StandardVital::OxygenSaturation)
    } else if lower.contains("respiratory rate") {
        Some(StandardVital::RespiratoryRate)
    } else if lower.contains("temperature") {
        Some(StandardVital::Temperature)
    } else {
        None
    }
}

fn observation_category_matches(resource: &Value, keyword: &str) -> bool {
    let Some(categories) = resource.get("category").and_then(Value::as_array) else {
        return false;
    };

    let needle = keyword.to_lowercase();

    categories.iter().any(|entry| {
        if let Some(text) = entry.get("text").and_then(Value::as_str) {
            if text.to_lowercase().contains(&needle) {
                return true;
            }
        }

        if let Some(codings) = entry.get("coding").and_then(Value::as_array) {
            for coding in codings {
                for field in ["display", "code"] {
                    if let Some(code_text) = coding.get(field).and_then(Value::as_str) {
                        if code_text.to_lowercase().contains(&needle) {
                            return true;
                        }
                    }
                }
            }
        }

        false
    })
}

fn is_more_recent(candidate: Option<DateTime<Utc>>, current: Option<DateTime<Utc>>) -> bool {
    match (candidate, current) {
        (Some(a), Some(b)) => a > b,
        (Some(_), None) => true,
        _ => false,
    }
}
