use serde_json::json;
use vitals_core::{RecordingAlerter, VitalsChecker, VitalsError};
use vitals_fhir::{extract_vitals_value, ConditionAlias, FhirExtractConfig};

fn observation(code: &str, value: f64, at: &str) -> serde_json::Value {
    json!({
        "resource": {
            "resourceType": "Observation",
            "status": "final",
            "code": { "coding": [{ "system": "http://loinc.org", "code": code }] },
            "effectiveDateTime": at,
            "valueQuantity": { "value": value }
        }
    })
}

fn bundle(entries: Vec<serde_json::Value>) -> serde_json::Value {
    json!({ "resourceType": "Bundle", "entry": entries })
}

#[test]
fn non_positive_values_are_kept_unless_configured() {
    let input = bundle(vec![
        observation("8867-4", 0.0, "2024-05-10T10:00:00Z"),
        observation("9279-1", 18.0, "2024-05-10T10:00:00Z"),
    ]);

    let kept = extract_vitals_value(&input, &FhirExtractConfig::default()).unwrap();
    assert_eq!(kept.reading.get("Pulse Rate"), Some(0.0));

    let config = FhirExtractConfig {
        drop_non_positive: true,
        ..FhirExtractConfig::default()
    };
    let dropped = extract_vitals_value(&input, &config).unwrap();
    assert_eq!(dropped.reading.get("Pulse Rate"), None);
    assert_eq!(dropped.reading.get("Respiratory Rate"), Some(18.0));
}

#[test]
fn older_observation_does_not_replace_newer() {
    let input = bundle(vec![
        observation("8310-5", 101.0, "2024-05-10T10:00:00Z"),
        observation("8310-5", 98.0, "2024-05-10T06:00:00Z"),
    ]);

    let vitals = extract_vitals_value(&input, &FhirExtractConfig::default()).unwrap();

    assert_eq!(vitals.reading.get("Temperature"), Some(101.0));
    assert_eq!(vitals.reading.len(), 1);
}

#[test]
fn custom_aliases_tag_conditions() {
    let input = bundle(vec![json!({
        "resource": {
            "resourceType": "Condition",
            "code": { "coding": [{ "code": "E11", "display": "Type 2 diabetes mellitus" }] }
        }
    })]);
    let config = FhirExtractConfig {
        condition_aliases: vec![ConditionAlias {
            pattern: "e11".to_string(),
            tag: "Diabetes".to_string(),
        }],
        ..FhirExtractConfig::default()
    };

    let vitals = extract_vitals_value(&input, &config).unwrap();

    assert_eq!(vitals.profile.conditions, vec!["Diabetes"]);
    assert_eq!(vitals.profile.age, None);
}

#[test]
fn rejects_non_bundle_and_missing_entries() {
    let patient = json!({ "resourceType": "Patient" });
    let empty = json!({ "resourceType": "Bundle" });

    assert!(matches!(
        extract_vitals_value(&patient, &FhirExtractConfig::default()),
        Err(VitalsError::Parse(_))
    ));
    assert!(matches!(
        extract_vitals_value(&empty, &FhirExtractConfig::default()),
        Err(VitalsError::MissingData)
    ));
}

#[test]
fn extracted_copd_profile_relaxes_oxygen_floor() {
    let input = bundle(vec![
        json!({
            "resource": {
                "resourceType": "Condition",
                "code": { "text": "COPD exacerbation" }
            }
        }),
        observation("59408-5", 87.0, "2024-05-10T10:00:00Z"),
    ]);
    let vitals = extract_vitals_value(&input, &FhirExtractConfig::default()).unwrap();
    let checker = VitalsChecker::new(RecordingAlerter::new());

    assert!(checker.are_all_vitals_within_range(&vitals.reading, Some(&vitals.profile)));
    assert!(!checker.are_all_vitals_within_range(&vitals.reading, None));
}
