//! Voltage→pH calibration from three reference points.
//!
//! The model is an ordinary least-squares line fitted once at startup:
//! pH = slope * voltage + intercept, clamped to [0, 14].
//!
//! Polarity is sensor specific. The default probe reads a higher voltage in
//! acid, so a negative slope is the normal case and must not be "corrected".

use std::fmt;

/// Below this |n·Σx² − (Σx)²| the voltages are considered indistinguishable.
pub const DEGENERATE_EPSILON: f64 = 1e-6;
/// Model used when the fit is degenerate: a constant neutral reading.
pub const NEUTRAL_PH: f32 = 7.0;
pub const PH_MIN: f32 = 0.0;
pub const PH_MAX: f32 = 14.0;

/// One reference measurement: probe voltage in a buffer of known pH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    pub voltage: f32,
    pub ph: f32,
}

impl CalibrationPoint {
    /// Buffer measurements for the stock probe (pH 4, 7, 10).
    pub const FACTORY: [CalibrationPoint; 3] = [
        CalibrationPoint {
            voltage: 3.60,
            ph: 4.0,
        },
        CalibrationPoint {
            voltage: 3.006,
            ph: 7.0,
        },
        CalibrationPoint {
            voltage: 1.466,
            ph: 10.0,
        },
    ];

    pub const fn new(voltage: f32, ph: f32) -> Self {
        Self { voltage, ph }
    }
}

/// Linear voltage→pH mapping. Immutable once fitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationModel {
    slope: f32,
    intercept: f32,
    degenerate: bool,
}

impl CalibrationModel {
    /// Least-squares fit of pH on voltage over exactly three points.
    ///
    /// Sums are accumulated in f64. When all voltages are equal (or
    /// numerically indistinguishable) the neutral constant model is returned.
    pub fn fit(points: &[CalibrationPoint; 3]) -> Self {
        let n = points.len() as f64;
        let (mut sx, mut sy, mut sxy, mut sxx) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        for p in points {
            let x = f64::from(p.voltage);
            let y = f64::from(p.ph);
            sx += x;
            sy += y;
            sxy += x * y;
            sxx += x * x;
        }

        let denom = n * sxx - sx * sx;
        if !denom.is_finite() || denom.abs() < DEGENERATE_EPSILON {
            tracing::warn!(denom, "calibration voltages are degenerate; using neutral model");
            return Self {
                slope: 0.0,
                intercept: NEUTRAL_PH,
                degenerate: true,
            };
        }

        let slope = (n * sxy - sx * sy) / denom;
        let intercept = (sy - slope * sx) / n;
        Self {
            slope: slope as f32,
            intercept: intercept as f32,
            degenerate: false,
        }
    }

    /// Build a model from known coefficients (diagnostics and tests).
    pub const fn from_parts(slope: f32, intercept: f32) -> Self {
        Self {
            slope,
            intercept,
            degenerate: false,
        }
    }

    /// Map a filtered voltage to pH, clamped to [0, 14].
    #[inline]
    pub fn apply(&self, voltage: f32) -> f32 {
        let ph = self.slope * voltage + self.intercept;
        if ph.is_nan() {
            return PH_MIN;
        }
        ph.clamp(PH_MIN, PH_MAX)
    }

    pub fn slope(&self) -> f32 {
        self.slope
    }

    pub fn intercept(&self) -> f32 {
        self.intercept
    }

    /// True when `fit` fell back to the neutral model.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

/// Startup diagnostic: the reference points and the fitted coefficients.
#[derive(Debug, Clone)]
pub struct CalibrationReport {
    pub points: [CalibrationPoint; 3],
    pub model: CalibrationModel,
}

impl CalibrationReport {
    pub fn new(points: [CalibrationPoint; 3], model: CalibrationModel) -> Self {
        Self { points, model }
    }

    /// Emit the report as a structured tracing event.
    pub fn log(&self) {
        let [p1, p2, p3] = self.points;
        tracing::info!(
            v1 = p1.voltage,
            ph1 = p1.ph,
            v2 = p2.voltage,
            ph2 = p2.ph,
            v3 = p3.voltage,
            ph3 = p3.ph,
            slope = self.model.slope(),
            intercept = self.model.intercept(),
            degenerate = self.model.is_degenerate(),
            "calibration computed"
        );
    }
}

impl fmt::Display for CalibrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== pH Calibration (computed) ===")?;
        let pts: Vec<String> = self
            .points
            .iter()
            .map(|p| format!("pH{}@{:.3} V", p.ph, p.voltage))
            .collect();
        writeln!(f, "cal points: {}", pts.join(" , "))?;
        writeln!(f, "slope = {:.6}", self.model.slope())?;
        writeln!(f, "intercept = {:.6}", self.model.intercept())?;
        if self.model.is_degenerate() {
            writeln!(f, "WARNING: degenerate calibration, reporting constant pH 7")?;
        }
        writeln!(f, "Use these to verify: pH = slope * voltage + intercept")?;
        write!(f, "====================================")
    }
}
