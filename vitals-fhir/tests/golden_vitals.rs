use std::fs;

use vitals_fhir::{extract_vitals_str, FhirExtractConfig, PatientVitals};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn admission_bundle_matches_golden() {
    let bundle = fs::read_to_string(fixture_path("copd_admission_bundle.json"))
        .expect("sample bundle should be readable");

    let actual = extract_vitals_str(&bundle, &FhirExtractConfig::default())
        .expect("bundle should convert");

    let expected = fs::read_to_string(fixture_path("copd_admission_vitals.json"))
        .expect("golden file should be readable");
    let expected: PatientVitals = serde_json::from_str(&expected).expect("golden should be valid");

    assert_eq!(actual, expected);
    assert_eq!(
        actual.reading.names().collect::<Vec<_>>(),
        expected.reading.names().collect::<Vec<_>>()
    );
}
