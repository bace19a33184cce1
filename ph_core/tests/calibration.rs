use ph_core::{CalibrationModel, CalibrationPoint};
use rstest::rstest;

fn pts(p: [(f32, f32); 3]) -> [CalibrationPoint; 3] {
    p.map(|(v, ph)| CalibrationPoint::new(v, ph))
}

#[rstest]
#[case([(4.0, 5.0), (3.0, 6.5), (2.0, 8.0)], -1.5, 11.0)]
#[case([(1.0, 10.0), (2.0, 7.0), (3.0, 4.0)], -3.0, 13.0)]
#[case([(0.5, 1.0), (1.5, 3.0), (2.5, 5.0)], 2.0, 0.0)]
fn collinear_points_fit_exactly(
    #[case] points: [(f32, f32); 3],
    #[case] slope: f32,
    #[case] intercept: f32,
) {
    let points = pts(points);
    let m = CalibrationModel::fit(&points);
    assert!(!m.is_degenerate());
    assert!((m.slope() - slope).abs() < 1e-5, "slope {}", m.slope());
    assert!(
        (m.intercept() - intercept).abs() < 1e-5,
        "intercept {}",
        m.intercept()
    );
    for p in points {
        assert!((m.apply(p.voltage) - p.ph).abs() < 1e-4);
    }
}

#[test]
fn equal_voltages_fall_back_to_neutral() {
    let m = CalibrationModel::fit(&pts([(2.5, 4.0), (2.5, 7.0), (2.5, 10.0)]));
    assert!(m.is_degenerate());
    assert_eq!(m.slope(), 0.0);
    assert_eq!(m.intercept(), 7.0);
    assert_eq!(m.apply(0.0), 7.0);
    assert_eq!(m.apply(4.9), 7.0);
}

#[test]
fn nearly_equal_voltages_also_fall_back() {
    // n·Σx² − (Σx)² is far below 1e-6 here
    let m = CalibrationModel::fit(&pts([(2.5, 4.0), (2.5001, 7.0), (2.5, 10.0)]));
    assert!(m.is_degenerate());
    assert_eq!(m.intercept(), 7.0);
}

#[test]
fn acidic_high_voltage_polarity_is_kept() {
    let m = CalibrationModel::fit(&CalibrationPoint::FACTORY);
    assert!(m.slope() < 0.0);
    // higher voltage reads more acidic
    assert!(m.apply(3.6) < m.apply(1.5));
}

#[test]
fn output_is_clamped_to_ph_range() {
    let m = CalibrationModel::from_parts(-1.5, 11.0);
    assert_eq!(m.apply(8.0), 0.0);
    assert_eq!(m.apply(-3.0), 14.0);
    assert!((m.apply(3.2) - 6.2).abs() < 1e-5);
}
