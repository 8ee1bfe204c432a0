use std::fs;
use std::rc::Rc;

use vitals_core::{
    NormalRange, PatientProfile, RangeCatalog, RecordingAlerter, StandardVital, VitalReading,
    VitalsChecker, VitalsError,
};

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    fs::read_to_string(path).expect("fixture should be readable")
}

#[test]
fn catalog_entries_register_new_vitals() {
    let catalog = RangeCatalog::from_json_str(&fixture("custom_ranges.json")).unwrap();
    let alerter = Rc::new(RecordingAlerter::new());
    let mut checker = VitalsChecker::new(Rc::clone(&alerter));

    checker.register_catalog(&catalog).unwrap();

    let reading = VitalReading::new()
        .with_value("Blood Glucose", 160.0)
        .with_value("Respiratory Rate", 22.0);
    let diabetic_copd = PatientProfile::new()
        .with_age(50)
        .with_condition("Diabetes")
        .with_condition("COPD");

    assert!(checker.are_all_vitals_within_range(&reading, Some(&diabetic_copd)));
    assert_eq!(checker.check_vitals(&reading, None).unwrap(), 2);
    assert_eq!(alerter.records()[0].unit, "mg/dL");
}

#[test]
fn missing_age_ranges_fall_back_to_adult() {
    let catalog = RangeCatalog::from_json_str(&fixture("custom_ranges.json")).unwrap();
    let glucose = catalog.vitals[1].to_evaluator().unwrap();

    assert_eq!(
        glucose.resolve(Some(&PatientProfile::new().with_age(5))),
        NormalRange::new(70.0, 140.0)
    );
}

#[test]
fn inverted_range_rejects_whole_catalog() {
    let catalog = RangeCatalog::from_json_str(&fixture("inverted_range.json")).unwrap();
    let mut checker = VitalsChecker::new(RecordingAlerter::new());

    let err = checker.register_catalog(&catalog).unwrap_err();

    match err {
        VitalsError::InvalidRange { vital, min, max } => {
            assert_eq!(vital, "Blood Glucose");
            assert_eq!((min, max), (140.0, 70.0));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!checker.registry().contains("Capillary Refill"));
}

#[test]
fn malformed_catalog_is_a_parse_error() {
    let err = RangeCatalog::from_json_str("{\"vitals\": [{\"name\": 1}]}").unwrap_err();
    assert!(matches!(err, VitalsError::Parse(_)));
}

#[test]
fn standard_catalog_matches_builtin_evaluators() {
    let catalog = RangeCatalog::standard();
    let evaluators = catalog.evaluators().unwrap();

    assert_eq!(evaluators.len(), StandardVital::ALL.len());
    for (kind, evaluator) in StandardVital::ALL.into_iter().zip(evaluators) {
        assert_eq!(evaluator, kind.evaluator());
    }
}
