//! Framework-neutral WASM <-> JavaScript bridge.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use vitals_core::{
    AlertRecord, PatientProfile, RangeCatalog, RecordingAlerter, VitalAssessment, VitalReading,
    VitalsChecker, VitalsError,
};
use vitals_fhir::FhirExtractConfig;
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsExtractConfig {
    #[serde(default)]
    drop_non_positive: Option<bool>,
    /// Extra range catalog registered before checking.
    #[serde(default)]
    ranges: Option<RangeCatalog>,
}

impl From<&JsExtractConfig> for FhirExtractConfig {
    fn from(cfg: &JsExtractConfig) -> Self {
        let mut base = FhirExtractConfig::default();
        if let Some(drop) = cfg.drop_non_positive {
            base.drop_non_positive = drop;
        }
        base
    }
}

#[derive(Serialize)]
struct CheckReport {
    alerts: Vec<AlertRecord>,
    all_within_range: bool,
    assessments: Vec<VitalAssessment>,
    profile: Option<PatientProfile>,
}

/// Checks a reading (`{ values: {...} }`) against an optional profile.
#[wasm_bindgen]
pub fn check_vitals(reading: JsValue, profile: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let reading = from_value::<VitalReading>(reading)
        .map_err(|err| JsValue::from_str(&format!("Could not read vitals: {err}")))?;
    let profile = profile
        .map(from_value::<PatientProfile>)
        .transpose()
        .map_err(|err| JsValue::from_str(&format!("Could not read profile: {err}")))?;

    let report = run_check(&reading, profile, None).map_err(format_vitals_error)?;
    to_value(&report)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize report: {err}")))
}

/// Extracts vitals from a FHIR bundle and checks them.
#[wasm_bindgen]
pub fn check_bundle(input_bundle: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let bundle_value = from_value::<serde_json::Value>(input_bundle)
        .map_err(|err| JsValue::from_str(&format!("Could not read JSON bundle: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => Some(
            from_value::<JsExtractConfig>(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?,
        ),
        None => None,
    };
    let extract_config = cfg
        .as_ref()
        .map(FhirExtractConfig::from)
        .unwrap_or_default();

    let vitals = vitals_fhir::extract_vitals_value(&bundle_value, &extract_config)
        .map_err(format_vitals_error)?;
    let ranges = cfg.as_ref().and_then(|cfg| cfg.ranges.as_ref());

    let report =
        run_check(&vitals.reading, Some(vitals.profile), ranges).map_err(format_vitals_error)?;
    to_value(&report)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize report: {err}")))
}

fn run_check(
    reading: &VitalReading,
    profile: Option<PatientProfile>,
    ranges: Option<&RangeCatalog>,
) -> Result<CheckReport, VitalsError> {
    let alerter = Rc::new(RecordingAlerter::new());
    let mut checker = VitalsChecker::new(Rc::clone(&alerter));
    if let Some(catalog) = ranges {
        checker.register_catalog(catalog)?;
    }

    checker.check_vitals(reading, profile.as_ref())?;
    let assessments = checker.assess(reading, profile.as_ref());

    Ok(CheckReport {
        alerts: alerter.records(),
        all_within_range: assessments.iter().all(|assessment| assessment.within_range),
        assessments,
        profile,
    })
}

fn format_vitals_error(err: VitalsError) -> JsValue {
    JsValue::from_str(&format!("Vitals error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_collects_alerts_and_verdicts() {
        let reading = VitalReading::standard(104.0, 72.0, 95.0, 120.0, 80.0);

        let report = run_check(&reading, None, None).unwrap();

        assert!(!report.all_within_range);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].vital, "Temperature");
        assert_eq!(report.assessments.len(), 4);
    }

    #[test]
    fn catalog_ranges_apply_before_checking() {
        let catalog = RangeCatalog::standard();
        let reading = VitalReading::new().with_value("Respiratory Rate", 25.0);

        let report = run_check(&reading, None, Some(&catalog)).unwrap();

        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].unit, "breaths/min");
    }
}
