#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and calibration parsing for the pH controller.
//!
//! - `Config` and its sections are deserialized from TOML and validated once
//!   at startup. Every section has defaults matching the stock probe and
//!   pumps, so an empty file is a valid config.
//! - The calibration CSV loader enforces headers and exactly three rows.
use serde::Deserialize;

/// Number of calibration buffers the controller is fitted from.
pub const CALIBRATION_POINTS: usize = 3;

/// One calibration buffer measurement.
///
/// CSV headers:
/// voltage,ph
///
/// Example:
/// voltage,ph
/// 3.600,4.0
/// 3.006,7.0
/// 1.466,10.0
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CalibrationRow {
    pub voltage: f32,
    pub ph: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Moving average window (samples)
    pub ma_size: usize,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self { ma_size: 10 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AdcCfg {
    /// Largest raw count (1023 for a 10-bit converter)
    pub max_raw: u16,
    /// Full-scale reference voltage
    pub vref: f32,
    /// Converter input the probe is wired to
    pub channel: u8,
}

impl Default for AdcCfg {
    fn default() -> Self {
        Self {
            max_raw: 1023,
            vref: 5.0,
            channel: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Exactly three `{ voltage, ph }` points
    pub points: Vec<CalibrationRow>,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            points: vec![
                CalibrationRow {
                    voltage: 3.60,
                    ph: 4.0,
                },
                CalibrationRow {
                    voltage: 3.006,
                    ph: 7.0,
                },
                CalibrationRow {
                    voltage: 1.466,
                    ph: 10.0,
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HysteresisCfg {
    pub low_threshold: f32,
    pub low_exit: f32,
    pub high_threshold: f32,
    pub high_exit: f32,
}

impl Default for HysteresisCfg {
    fn default() -> Self {
        Self {
            low_threshold: 6.45,
            low_exit: 6.7,
            high_threshold: 7.55,
            high_exit: 7.3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DosingCfg {
    /// Pump run time per correction (ms)
    pub burst_ms: u64,
    /// Minimum time between burst starts (ms)
    pub min_gap_ms: u64,
}

impl Default for DosingCfg {
    fn default() -> Self {
        Self {
            burst_ms: 1200,
            min_gap_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoopCfg {
    /// Delay between control cycles (ms)
    pub cadence_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self { cadence_ms: 800 }
    }
}

/// BCM pin numbers for the two H-bridge pairs.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    pub base_in1: u8,
    pub base_in2: u8,
    pub acid_in3: u8,
    pub acid_in4: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            base_in1: 17,
            base_in2: 27,
            acid_in3: 22,
            acid_in4: 23,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub filter: FilterCfg,
    pub adc: AdcCfg,
    pub calibration: CalibrationCfg,
    pub hysteresis: HysteresisCfg,
    pub dosing: DosingCfg,
    #[serde(rename = "loop")]
    pub cadence: LoopCfg,
    pub pins: Pins,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Load exactly three calibration points from a CSV with headers `voltage,ph`.
pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<Vec<CalibrationRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["voltage", "ph"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'voltage,ph', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    validate_points(&rows)?;
    Ok(rows)
}

fn validate_points(points: &[CalibrationRow]) -> eyre::Result<()> {
    if points.len() != CALIBRATION_POINTS {
        eyre::bail!(
            "calibration requires exactly {} points, got {}",
            CALIBRATION_POINTS,
            points.len()
        );
    }
    for (i, p) in points.iter().enumerate() {
        if !p.voltage.is_finite() || !p.ph.is_finite() {
            eyre::bail!("calibration point {} must be finite", i + 1);
        }
        if !(0.0..=14.0).contains(&p.ph) {
            eyre::bail!("calibration point {} pH must be in [0, 14]", i + 1);
        }
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Filter
        if self.filter.ma_size == 0 {
            eyre::bail!("filter.ma_size must be >= 1");
        }

        // ADC
        if self.adc.max_raw == 0 {
            eyre::bail!("adc.max_raw must be >= 1");
        }
        if !(self.adc.vref.is_finite() && self.adc.vref > 0.0) {
            eyre::bail!("adc.vref must be > 0");
        }
        if self.adc.channel > 7 {
            eyre::bail!("adc.channel must be in [0, 7]");
        }

        // Calibration
        validate_points(&self.calibration.points)?;

        // Hysteresis
        let h = &self.hysteresis;
        for (name, v) in [
            ("low_threshold", h.low_threshold),
            ("low_exit", h.low_exit),
            ("high_threshold", h.high_threshold),
            ("high_exit", h.high_exit),
        ] {
            if !(v.is_finite() && (0.0..=14.0).contains(&v)) {
                eyre::bail!("hysteresis.{name} must be in [0, 14]");
            }
        }
        if h.low_threshold >= h.low_exit {
            eyre::bail!("hysteresis.low_threshold must be < hysteresis.low_exit");
        }
        if h.high_exit >= h.high_threshold {
            eyre::bail!("hysteresis.high_exit must be < hysteresis.high_threshold");
        }
        if h.low_exit > h.high_exit {
            eyre::bail!("hysteresis.low_exit must be <= hysteresis.high_exit");
        }

        // Dosing
        if self.dosing.burst_ms == 0 {
            eyre::bail!("dosing.burst_ms must be >= 1");
        }
        if self.dosing.burst_ms > 60 * 1000 {
            eyre::bail!("dosing.burst_ms is unreasonably large (>60s)");
        }

        // Loop
        if self.cadence.cadence_ms == 0 {
            eyre::bail!("loop.cadence_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
