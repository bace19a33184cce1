//! Bridges from `ph_config` (TOML schema) to the core runtime config.

use crate::calibration::CalibrationPoint;
use crate::config::{AdcCfg, ControllerCfg, DosingCfg, FilterCfg, HysteresisCfg, LoopCfg};
use crate::error::BuildError;

// ── Sections ─────────────────────────────────────────────────────────────────

impl From<&ph_config::FilterCfg> for FilterCfg {
    fn from(c: &ph_config::FilterCfg) -> Self {
        Self { ma_size: c.ma_size }
    }
}

impl From<&ph_config::AdcCfg> for AdcCfg {
    fn from(c: &ph_config::AdcCfg) -> Self {
        Self {
            max_raw: c.max_raw,
            vref: c.vref,
        }
    }
}

impl From<&ph_config::HysteresisCfg> for HysteresisCfg {
    fn from(c: &ph_config::HysteresisCfg) -> Self {
        Self {
            low_threshold: c.low_threshold,
            low_exit: c.low_exit,
            high_threshold: c.high_threshold,
            high_exit: c.high_exit,
        }
    }
}

impl From<&ph_config::DosingCfg> for DosingCfg {
    fn from(c: &ph_config::DosingCfg) -> Self {
        Self {
            burst_ms: c.burst_ms,
            min_gap_ms: c.min_gap_ms,
        }
    }
}

impl From<&ph_config::LoopCfg> for LoopCfg {
    fn from(c: &ph_config::LoopCfg) -> Self {
        Self {
            cadence_ms: c.cadence_ms,
        }
    }
}

impl From<ph_config::CalibrationRow> for CalibrationPoint {
    fn from(r: ph_config::CalibrationRow) -> Self {
        CalibrationPoint::new(r.voltage, r.ph)
    }
}

// ── Whole config ─────────────────────────────────────────────────────────────

impl TryFrom<&ph_config::Config> for ControllerCfg {
    type Error = BuildError;

    fn try_from(c: &ph_config::Config) -> Result<Self, Self::Error> {
        let calibration = match c.calibration.points.as_slice() {
            [a, b, d] => [(*a).into(), (*b).into(), (*d).into()],
            _ => {
                return Err(BuildError::InvalidConfig(
                    "calibration requires exactly 3 points",
                ));
            }
        };
        Ok(Self {
            filter: (&c.filter).into(),
            adc: (&c.adc).into(),
            calibration,
            hysteresis: (&c.hysteresis).into(),
            dosing: (&c.dosing).into(),
            cadence: (&c.cadence).into(),
        })
    }
}
