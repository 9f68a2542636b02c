//! Tests for the full parameter set produced by the estimator
//!
//! Reference values are computed by hand from the trapezoid rule and an
//! explicit least-squares fit of ln(C) on t.

use approx::assert_relative_eq;
use pkdb_nca::data::{DoseInfo, TimeSeries};
use pkdb_nca::nca::{estimate, Estimator, PKParameterSet, Warning};

const TIMES: [f64; 5] = [0.0, 1.0, 2.0, 4.0, 8.0];
const CONCS: [f64; 5] = [0.0, 8.0, 6.0, 3.0, 0.8];

fn reference_case() -> PKParameterSet {
    let concs: Vec<Option<f64>> = CONCS.iter().map(|&c| Some(c)).collect();
    estimate(&TIMES, &concs, 100.0, "mg", 70.0, "kg", "h", "mg/L", "caffeine")
        .expect("estimation should succeed")
}

/// Ordinary least squares of ln(c) on t, returns (slope, intercept)
fn hand_fit(t: &[f64], c: &[f64]) -> (f64, f64) {
    let n = t.len() as f64;
    let y: Vec<f64> = c.iter().map(|c| c.ln()).collect();
    let mx = t.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let sxy: f64 = t.iter().zip(&y).map(|(x, y)| (x - mx) * (y - my)).sum();
    let sxx: f64 = t.iter().map(|x| (x - mx) * (x - mx)).sum();
    let slope = sxy / sxx;
    (slope, my - slope * mx)
}

#[test]
fn test_reference_exposure() {
    let pk = reference_case();

    assert_eq!(pk.cmax.value(), Some(8.0));
    assert_eq!(pk.cmax.unit(), "mg/L");
    assert_eq!(pk.tmax.value(), Some(1.0));
    assert_eq!(pk.tmax.unit(), "h");

    // 0-1: 4, 1-2: 7, 2-4: 9, 4-8: 7.6
    assert_relative_eq!(pk.auc_last.value().unwrap(), 27.6, epsilon = 1e-12);
    assert_eq!(pk.auc_last.unit(), "mg*h/L");
}

#[test]
fn test_reference_terminal_phase() {
    let pk = reference_case();
    let (slope, intercept) = hand_fit(&[2.0, 4.0, 8.0], &[6.0, 3.0, 0.8]);

    let reg = pk.regression.as_ref().expect("terminal fit expected");
    assert_eq!(reg.window(), 2..=4);
    assert_eq!(reg.n_points, 3);
    assert_relative_eq!(reg.intercept, intercept, epsilon = 1e-12);

    let k_el = pk.k_el.value().unwrap();
    assert!(k_el > 0.0);
    assert_relative_eq!(k_el, -slope, epsilon = 1e-12);
    assert_relative_eq!(k_el, 0.335_048_854_362_549_3, epsilon = 1e-12);
    assert_relative_eq!(
        pk.half_life.value().unwrap(),
        std::f64::consts::LN_2 / k_el,
        epsilon = 1e-12
    );
    assert_relative_eq!(pk.half_life.value().unwrap(), 2.068_794_360_985_653, epsilon = 1e-9);
    assert_eq!(pk.k_el.unit(), "1/h");
}

#[test]
fn test_reference_clearance_and_volume() {
    let pk = reference_case();
    let k_el = pk.k_el.value().unwrap();

    let auc_inf = pk.auc_inf.value().unwrap();
    assert_relative_eq!(auc_inf, 27.6 + 0.8 / k_el, epsilon = 1e-12);
    assert_relative_eq!(auc_inf, 29.987_711_492_170_444, epsilon = 1e-9);
    assert!(auc_inf > pk.auc_last.value().unwrap());

    let cl = pk.clearance.value().unwrap();
    assert_relative_eq!(cl, 100.0 / auc_inf, epsilon = 1e-12);
    assert_relative_eq!(cl, 3.334_699_282_608_118, epsilon = 1e-9);
    assert_eq!(pk.clearance.unit(), "L/h");

    let vd = pk.vd.value().unwrap();
    assert_relative_eq!(vd, cl / k_el, epsilon = 1e-12);
    assert_relative_eq!(vd, 9.952_874_750_019_92, epsilon = 1e-9);
    assert_eq!(pk.vd.unit(), "L");
}

#[test]
fn test_reference_bodyweight_normalized() {
    let pk = reference_case();
    let bw = pk.per_bodyweight.as_ref().expect("bodyweight given");

    assert_eq!(bw.bodyweight.value(), Some(70.0));
    assert_relative_eq!(bw.dose.value().unwrap(), 100.0 / 70.0, epsilon = 1e-12);
    assert_relative_eq!(
        bw.clearance.value().unwrap(),
        pk.clearance.value().unwrap() / 70.0,
        epsilon = 1e-12
    );
    assert_eq!(bw.vd.unit(), "L/kg");
}

#[test]
fn test_single_point_after_peak() {
    let pk = estimate(
        &[0.0, 1.0, 2.0],
        &[Some(0.0), Some(8.0), Some(6.0)],
        100.0,
        "mg",
        70.0,
        "kg",
        "h",
        "mg/L",
        "caffeine",
    )
    .unwrap();

    assert_eq!(pk.cmax.value(), Some(8.0));
    assert_eq!(pk.tmax.value(), Some(1.0));
    assert_relative_eq!(pk.auc_last.value().unwrap(), 11.0, epsilon = 1e-12);

    assert!(pk.regression.is_none());
    assert!(!pk.k_el.is_present());
    assert!(!pk.half_life.is_present());
    assert!(!pk.auc_inf.is_present());
    assert!(!pk.clearance.is_present());
    assert!(!pk.vd.is_present());
    // Absent keeps its unit
    assert_eq!(pk.vd.unit(), "L");

    assert!(pk.warnings.contains(&Warning::TooFewTerminalPoints {
        available: 1,
        required: 3
    }));
}

#[test]
fn test_units_are_normalized() {
    // Same curve in minutes and ng/mL, dose in g, bodyweight in g
    let times: Vec<f64> = TIMES.iter().map(|t| t * 60.0).collect();
    let concs: Vec<f64> = CONCS.iter().map(|c| c * 1000.0).collect();
    let series = TimeSeries::from_values(&times, &concs, "min", "ng/mL").unwrap();
    let dose = DoseInfo::new("caffeine", 0.1, "g").with_bodyweight(70_000.0, "g");

    let pk = Estimator::default().estimate(&series, &dose).unwrap();
    let reference = reference_case();

    for ((name, a), (_, b)) in pk.named().into_iter().zip(reference.named()) {
        match (a.value(), b.value()) {
            (Some(a), Some(b)) => assert_relative_eq!(a, b, max_relative = 1e-9),
            (None, None) => {}
            _ => panic!("presence of {} differs", name),
        }
    }
    let bw = pk.per_bodyweight.unwrap();
    assert_relative_eq!(bw.bodyweight.value().unwrap(), 70.0, max_relative = 1e-12);
}

#[test]
fn test_half_max_point() {
    let pk = estimate(
        &[0.0, 0.5, 1.0, 2.0, 4.0, 8.0, 12.0],
        &[
            Some(0.0),
            Some(4.0),
            Some(7.0),
            Some(10.0),
            Some(6.0),
            Some(2.5),
            Some(1.0),
        ],
        50.0,
        "mg",
        f64::NAN,
        "kg",
        "h",
        "mg/L",
        "midazolam",
    )
    .unwrap();

    assert_eq!(pk.tmax_half.value(), Some(0.5));
    assert_eq!(pk.cmax_half.value(), Some(4.0));
    assert!(pk.per_bodyweight.is_none());
}

#[test]
fn test_to_params_lists_present_only() {
    let pk = estimate(
        &[0.0, 1.0, 2.0],
        &[Some(0.0), Some(8.0), Some(6.0)],
        100.0,
        "mg",
        f64::NAN,
        "kg",
        "h",
        "mg/L",
        "caffeine",
    )
    .unwrap();
    let params = pk.to_params();

    assert_eq!(params.get("cmax"), Some(&8.0));
    assert!(params.contains_key("auc_last"));
    assert!(!params.contains_key("k_el"));
    assert!(!params.contains_key("clearance"));
}

#[test]
fn test_repeated_estimation_is_bit_identical() {
    let first = reference_case();
    let second = reference_case();
    for ((name, a), (_, b)) in first.named().into_iter().zip(second.named()) {
        assert_eq!(
            a.value().map(f64::to_bits),
            b.value().map(f64::to_bits),
            "{} differs",
            name
        );
    }
    assert_eq!(first, second);
}

#[test]
fn test_json_round_trip() {
    let pk = reference_case();
    let json = pk.to_json().unwrap();
    let restored: PKParameterSet = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.substance, pk.substance);
    assert_eq!(restored.cmax, pk.cmax);
    assert_eq!(restored.warnings, pk.warnings);
    assert_relative_eq!(
        restored.vd.value().unwrap(),
        pk.vd.value().unwrap(),
        max_relative = 1e-14
    );
    assert!(json.contains("\"present\": true"));
}

#[test]
fn test_json_presence_follows_value() {
    let mut json: serde_json::Value =
        serde_json::from_str(&reference_case().to_json().unwrap()).unwrap();
    json["k_el"]["value"] = serde_json::Value::Null;
    let restored: PKParameterSet = serde_json::from_value(json).unwrap();
    assert!(!restored.k_el.is_present());
    assert_eq!(restored.k_el.unit(), "1/h");
}

#[test]
fn test_report_lists_parameters() {
    let report = reference_case().to_string();
    assert!(report.contains("caffeine"));
    assert!(report.contains("clearance"));
    assert!(report.contains("[L/h]"));
    assert!(report.contains("vd/bw"));
}
