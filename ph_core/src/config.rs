//! Configuration types for the control loop.
//!
//! These are the runtime structs consumed by the core. They are separate from
//! the TOML-deserialized config in `ph_config`; see `conversions` for the bridge.

use crate::calibration::CalibrationPoint;
use crate::error::BuildError;

/// Signal conditioning.
#[derive(Debug, Clone)]
pub struct FilterCfg {
    /// Moving average window size in samples.
    pub ma_size: usize,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self { ma_size: 10 }
    }
}

/// Analog front end: raw counts to volts.
#[derive(Debug, Clone)]
pub struct AdcCfg {
    /// Largest raw value the converter reports (1023 for 10-bit).
    pub max_raw: u16,
    /// Full-scale reference voltage.
    pub vref: f32,
}

impl Default for AdcCfg {
    fn default() -> Self {
        Self {
            max_raw: 1023,
            vref: 5.0,
        }
    }
}

/// Enter/exit thresholds for the two actuators, in pH units.
#[derive(Debug, Clone)]
pub struct HysteresisCfg {
    /// At or below this, the base pump may start.
    pub low_threshold: f32,
    /// At or above this, an active base state is released.
    pub low_exit: f32,
    /// At or above this, the acid pump may start.
    pub high_threshold: f32,
    /// At or below this, an active acid state is released.
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

/// Burst timing.
#[derive(Debug, Clone)]
pub struct DosingCfg {
    /// How long a pump runs per correction.
    pub burst_ms: u64,
    /// A new burst needs strictly more than this since the previous one.
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

/// Sampling cadence.
#[derive(Debug, Clone)]
pub struct LoopCfg {
    /// Delay between cycles.
    pub cadence_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self { cadence_ms: 800 }
    }
}

/// Everything the control loop needs, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct ControllerCfg {
    pub filter: FilterCfg,
    pub adc: AdcCfg,
    pub calibration: [CalibrationPoint; 3],
    pub hysteresis: HysteresisCfg,
    pub dosing: DosingCfg,
    pub cadence: LoopCfg,
}

impl Default for ControllerCfg {
    fn default() -> Self {
        Self {
            filter: FilterCfg::default(),
            adc: AdcCfg::default(),
            calibration: CalibrationPoint::FACTORY,
            hysteresis: HysteresisCfg::default(),
            dosing: DosingCfg::default(),
            cadence: LoopCfg::default(),
        }
    }
}

impl ControllerCfg {
    /// Structural checks the core relies on. Field-level ranges with
    /// user-facing messages live in `ph_config::Config::validate`.
    pub fn check(&self) -> Result<(), BuildError> {
        if self.filter.ma_size == 0 {
            return Err(BuildError::InvalidConfig("filter.ma_size must be >= 1"));
        }
        if self.adc.max_raw == 0 {
            return Err(BuildError::InvalidConfig("adc.max_raw must be >= 1"));
        }
        if !(self.adc.vref.is_finite() && self.adc.vref > 0.0) {
            return Err(BuildError::InvalidConfig("adc.vref must be > 0"));
        }
        if self.dosing.burst_ms == 0 {
            return Err(BuildError::InvalidConfig("dosing.burst_ms must be >= 1"));
        }
        let h = &self.hysteresis;
        if !(h.low_threshold < h.low_exit
            && h.low_exit <= h.high_exit
            && h.high_exit < h.high_threshold)
        {
            return Err(BuildError::InvalidConfig(
                "hysteresis must satisfy low_threshold < low_exit <= high_exit < high_threshold",
            ));
        }
        if self
            .calibration
            .iter()
            .any(|p| !(p.voltage.is_finite() && p.ph.is_finite()))
        {
            return Err(BuildError::InvalidConfig(
                "calibration points must be finite",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_check() {
        ControllerCfg::default().check().expect("defaults are valid");
    }

    #[test]
    fn inverted_hysteresis_is_rejected() {
        let mut cfg = ControllerCfg::default();
        cfg.hysteresis.low_exit = 6.4;
        assert!(matches!(cfg.check(), Err(BuildError::InvalidConfig(_))));
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut cfg = ControllerCfg::default();
        cfg.filter.ma_size = 0;
        assert!(cfg.check().is_err());
    }
}
