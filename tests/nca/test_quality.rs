//! Tests for warnings, options and batch estimation

use approx::assert_relative_eq;
use pkdb_nca::data::{DoseInfo, TimeSeries};
use pkdb_nca::nca::{EstimationOptions, Estimator, Warning};
use pkdb_nca::UnitRegistry;

fn run(times: &[f64], concs: &[f64], options: EstimationOptions) -> pkdb_nca::PKParameterSet {
    let series = TimeSeries::from_values(times, concs, "h", "mg/L").unwrap();
    let dose = DoseInfo::new("test", 100.0, "mg");
    Estimator::new(UnitRegistry::default(), options)
        .estimate(&series, &dose)
        .unwrap()
}

#[test]
fn test_poor_fit_is_kept_with_warning() {
    let pk = run(
        &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        &[0.0, 10.0, 2.0, 6.0, 1.5, 4.0, 1.0],
        EstimationOptions::default(),
    );

    let reg = pk.regression.as_ref().unwrap();
    assert_eq!(reg.n_points, 4);
    assert_relative_eq!(pk.k_el.value().unwrap(), 0.439_444_915_467_243_9, epsilon = 1e-9);

    let poor = pk
        .warnings
        .iter()
        .find(|w| matches!(w, Warning::PoorFit { .. }))
        .expect("poor fit warning");
    if let Warning::PoorFit {
        r_squared,
        threshold,
    } = poor
    {
        assert_relative_eq!(*r_squared, 0.462_828_436_690_896_6, epsilon = 1e-9);
        assert_relative_eq!(*threshold, 0.9);
    }
    assert!(pk.clearance.is_present());
}

#[test]
fn test_r_squared_gate_reports_its_own_reason() {
    let pk = run(
        &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        &[0.0, 10.0, 2.0, 6.0, 1.5, 4.0, 1.0],
        EstimationOptions::default().with_min_r_squared(0.9),
    );

    assert!(!pk.k_el.is_present());
    assert!(!pk.warnings.contains(&Warning::NoDecayingWindow));
    assert!(pk
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::BelowMinRSquared { .. })));
}

#[test]
fn test_high_extrapolation_warning() {
    let times = [0.0, 1.0, 2.0, 3.0, 4.0];
    let concs = [0.0, 10.0, 9.5, 9.0, 8.6];

    let pk = run(&times, &concs, EstimationOptions::default());
    let pct = pk.auc_pct_extrap.value().unwrap();
    assert_relative_eq!(pct, 84.047_695_058_589_58, epsilon = 1e-6);
    assert!(pk
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::HighExtrapolation { .. })));
    // Still reported
    assert!(pk.auc_inf.is_present());

    let relaxed = run(
        &times,
        &concs,
        EstimationOptions::default().with_max_auc_extrap_pct(90.0),
    );
    assert!(!relaxed
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::HighExtrapolation { .. })));
}

#[test]
fn test_rising_tail_has_no_elimination() {
    let pk = run(
        &[0.0, 1.0, 2.0, 3.0],
        &[10.0, 1.0, 2.0, 3.0],
        EstimationOptions::default(),
    );

    assert!(pk.auc_last.is_present());
    assert!(!pk.k_el.is_present());
    assert!(!pk.auc_inf.is_present());
    assert!(!pk.clearance.is_present());
    assert!(pk.warnings.contains(&Warning::NoDecayingWindow));
}

#[test]
fn test_include_peak_option() {
    let times = [0.0, 1.0, 2.0, 4.0];
    let concs = [0.0, 8.0, 4.0, 1.0];

    let default = run(&times, &concs, EstimationOptions::default());
    assert!(!default.k_el.is_present());

    let with_peak = run(
        &times,
        &concs,
        EstimationOptions::default().with_include_peak(true),
    );
    assert!(with_peak.k_el.value().unwrap() > 0.0);
    assert_eq!(with_peak.regression.unwrap().first_index, 1);
}

#[test]
fn test_options_from_json() {
    let options = EstimationOptions::from_json(
        r#"{"regression": {"include_peak": true, "min_points": 4}, "max_auc_extrap_pct": 10.0}"#,
    )
    .unwrap();

    assert!(options.regression.include_peak);
    assert_eq!(options.regression.min_points, 4);
    assert_relative_eq!(options.regression.warn_r_squared, 0.9);
    assert_relative_eq!(options.max_auc_extrap_pct, 10.0);

    assert!(EstimationOptions::from_json("{\"max_auc_extrap_pct\": \"high\"}").is_err());
}

#[test]
fn test_batch_keeps_input_order() {
    let series =
        TimeSeries::from_values(&[0.0, 1.0, 2.0, 4.0, 8.0], &[0.0, 8.0, 6.0, 3.0, 0.8], "h", "mg/L")
            .unwrap();
    let jobs: Vec<(TimeSeries, DoseInfo)> = (1..=20)
        .map(|i| {
            (
                series.clone(),
                DoseInfo::new(format!("subject-{}", i), 10.0 * i as f64, "mg"),
            )
        })
        .collect();

    let estimator = Estimator::default();
    let results = estimator.estimate_batch(&jobs);
    assert_eq!(results.len(), jobs.len());

    let first_cl = results[0].as_ref().unwrap().clearance.value().unwrap();
    for (i, result) in results.iter().enumerate() {
        let pk = result.as_ref().unwrap();
        assert_eq!(pk.substance, format!("subject-{}", i + 1));
        assert_relative_eq!(
            pk.clearance.value().unwrap(),
            first_cl * (i + 1) as f64,
            max_relative = 1e-12
        );
        // Same result as a sequential call
        let sequential = estimator.estimate(&jobs[i].0, &jobs[i].1).unwrap();
        assert_eq!(*pk, sequential);
    }
}

#[test]
fn test_batch_reports_unit_errors_per_job() {
    let good = TimeSeries::from_values(&[0.0, 1.0], &[0.0, 1.0], "h", "mg/L").unwrap();
    let bad = TimeSeries::from_values(&[0.0, 1.0], &[0.0, 1.0], "h", "kg").unwrap();
    let dose = DoseInfo::new("x", 1.0, "mg");

    let results = Estimator::default().estimate_batch(&[(good, dose.clone()), (bad, dose)]);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}
