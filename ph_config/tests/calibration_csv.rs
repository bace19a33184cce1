use std::fs::File;
use std::io::Write;

use ph_config::{CalibrationRow, load_calibration_csv};
use rstest::rstest;
use tempfile::tempdir;

fn write_csv(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("cal.csv");
    let mut f = File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

#[rstest]
fn loads_three_points_in_order() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "voltage,ph\n3.600,4.0\n3.006,7.0\n1.466,10.0\n");
    let rows = load_calibration_csv(&path).unwrap();
    assert_eq!(
        rows,
        vec![
            CalibrationRow {
                voltage: 3.6,
                ph: 4.0
            },
            CalibrationRow {
                voltage: 3.006,
                ph: 7.0
            },
            CalibrationRow {
                voltage: 1.466,
                ph: 10.0
            },
        ]
    );
}

#[rstest]
fn tolerates_padding_around_fields() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "voltage, ph\n 3.6 , 4\n3.0,7\n1.5,10\n");
    let rows = load_calibration_csv(&path).unwrap();
    assert_eq!(rows.len(), 3);
}

#[rstest]
fn rejects_wrong_headers() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "raw,grams\n3.6,4\n3.0,7\n1.5,10\n");
    let err = load_calibration_csv(&path).unwrap_err();
    assert!(
        err.to_string()
            .contains("calibration CSV must have headers 'voltage,ph'")
    );
}

#[rstest]
#[case("voltage,ph\n3.6,4\n3.0,7\n")]
#[case("voltage,ph\n3.6,4\n3.0,7\n1.5,10\n1.0,12\n")]
fn rejects_wrong_row_count(#[case] body: &str) {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, body);
    let err = load_calibration_csv(&path).unwrap_err();
    assert!(err.to_string().contains("exactly 3 points"));
}

#[rstest]
fn reports_bad_row_number() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "voltage,ph\n3.6,4\nabc,7\n1.5,10\n");
    let err = load_calibration_csv(&path).unwrap_err();
    assert!(err.to_string().contains("invalid CSV row 3"), "{err}");
}

#[rstest]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_calibration_csv(&dir.path().join("nope.csv")).unwrap_err();
    assert!(err.to_string().contains("open calibration CSV"));
}
