use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitals_core::{
    AlertError, Alerter, PatientProfile, RangeCatalog, StandardVital, VitalReading, VitalsChecker,
};
use vitals_fhir::{extract_vitals_str, FhirExtractConfig};

#[derive(Parser, Debug)]
#[command(
    name = "vitals-cli",
    about = "Check patient vital signs against age- and condition-adjusted ranges."
)]
struct Args {
    /// FHIR JSON bundle to check. Runs the built-in scenarios when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON range catalog registered on top of the standard evaluators.
    #[arg(short, long)]
    ranges: Option<PathBuf>,

    /// Overrides the patient age from the bundle.
    #[arg(long, requires = "input")]
    age: Option<u32>,

    /// Adds a condition tag to the bundle patient (repeatable).
    #[arg(long = "condition", requires = "input")]
    conditions: Vec<String>,

    /// Ignore zero or negative observations in the bundle.
    #[arg(long, requires = "input")]
    drop_non_positive: bool,

    /// Print per-vital assessments as JSON.
    #[arg(long)]
    json: bool,
}

/// Writes alerts to stdout.
struct ConsoleAlerter;

impl Alerter for ConsoleAlerter {
    fn alert(&self, vital_name: &str, value: &str, unit: &str) -> Result<(), AlertError> {
        println!("ALERT: {vital_name} is {value} {unit}");
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut checker = VitalsChecker::new(ConsoleAlerter);
    if let Some(path) = &args.ranges {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read range catalog {path:?}"))?;
        let catalog = RangeCatalog::from_json_str(&data)?;
        checker.register_catalog(&catalog)?;
        tracing::info!(count = catalog.vitals.len(), "Registered range catalog");
    }

    match &args.input {
        Some(path) => check_bundle(&checker, path, &args),
        None => run_scenarios(&mut checker),
    }
}

fn check_bundle(checker: &VitalsChecker, path: &Path, args: &Args) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read file {path:?}"))?;

    let config = FhirExtractConfig {
        drop_non_positive: args.drop_non_positive,
        ..FhirExtractConfig::default()
    };
    let vitals = extract_vitals_str(&data, &config)?;

    let mut profile = vitals.profile;
    if let Some(age) = args.age {
        profile.age = Some(age);
    }
    profile.conditions.extend(args.conditions.iter().cloned());

    if args.json {
        let assessments = checker.assess(&vitals.reading, Some(&profile));
        println!("{}", serde_json::to_string_pretty(&assessments)?);
        return Ok(());
    }

    println!(
        "Patient: {} (age: {})\nVitals: {}",
        profile.name.as_deref().unwrap_or("unknown"),
        profile
            .age
            .map_or_else(|| "unknown".to_string(), |age| age.to_string()),
        vitals.reading.len()
    );
    let alerts = checker.check_vitals(&vitals.reading, Some(&profile))?;
    report_status(alerts, checker.are_all_vitals_within_range(&vitals.reading, Some(&profile)));

    Ok(())
}

fn run_scenarios(checker: &mut VitalsChecker) -> anyhow::Result<()> {
    println!("Testing normal vitals...");
    let normal = VitalReading::standard(98.6, 72.0, 95.0, 120.0, 80.0);
    let alerts = checker.check_vitals(&normal, None)?;
    report_status(alerts, checker.are_all_vitals_within_range(&normal, None));

    println!("Testing abnormal vitals...");
    let abnormal = VitalReading::standard(104.0, 110.0, 85.0, 160.0, 100.0);
    let alerts = checker.check_vitals(&abnormal, None)?;
    report_status(alerts, checker.are_all_vitals_within_range(&abnormal, None));

    println!("Testing with patient profile...");
    let elderly = PatientProfile::new()
        .with_age(70)
        .with_name("John Smith")
        .with_conditions_text("Hypertension");
    let elderly_vitals = VitalReading::standard(94.5, 75.0, 92.0, 145.0, 92.0);
    println!(
        "Checking vitals for {} (age: {})",
        elderly.name.as_deref().unwrap_or("unknown"),
        elderly.age.unwrap_or_default()
    );
    let alerts = checker.check_vitals(&elderly_vitals, Some(&elderly))?;
    report_status(
        alerts,
        checker.are_all_vitals_within_range(&elderly_vitals, Some(&elderly)),
    );

    println!("Testing respiratory rate extension...");
    checker.register_vital_sign(StandardVital::RespiratoryRate.evaluator());
    let respiratory = VitalReading::new()
        .with_value(StandardVital::RespiratoryRate.name(), 25.0)
        .with_value(StandardVital::Temperature.name(), 98.6);
    for age in [70, 30] {
        let profile = PatientProfile::new().with_age(age);
        println!("Age {age}:");
        let alerts = checker.check_vitals(&respiratory, Some(&profile))?;
        report_status(
            alerts,
            checker.are_all_vitals_within_range(&respiratory, Some(&profile)),
        );
    }

    Ok(())
}

fn report_status(alerts: usize, all_within_range: bool) {
    if all_within_range {
        println!("All vitals are within normal range");
    } else {
        println!("{alerts} vital(s) out of range");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_overrides_require_a_bundle() {
        for flags in [
            vec!["vitals-cli", "--age", "70"],
            vec!["vitals-cli", "--condition", "COPD"],
            vec!["vitals-cli", "--drop-non-positive"],
        ] {
            let err = Args::try_parse_from(flags).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn patient_overrides_apply_with_a_bundle() {
        let args = Args::try_parse_from([
            "vitals-cli",
            "--input",
            "bundle.json",
            "--age",
            "70",
            "--condition",
            "COPD",
            "--condition",
            "Hypertension",
        ])
        .unwrap();

        assert_eq!(args.age, Some(70));
        assert_eq!(args.conditions, vec!["COPD", "Hypertension"]);
    }

    #[test]
    fn scenarios_run_without_arguments() {
        let args = Args::try_parse_from(["vitals-cli"]).unwrap();
        assert!(args.input.is_none());
    }
}
