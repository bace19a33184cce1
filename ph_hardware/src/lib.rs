//! Probe and pump implementations.
//!
//! - `SimulatedVessel` hands out a probe and pumps sharing one simulated
//!   solution, so dosing visibly moves the reading.
//! - With the `hardware` feature: an MCP3008 10-bit SPI ADC for the probe and
//!   two H-bridge pin pairs for the pumps (Raspberry Pi, via `rppal`).
pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hbridge;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod mcp3008;

use ph_traits::{Probe, Pumps};
use std::cell::Cell;
use std::rc::Rc;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use hbridge::HBridgePumps;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use mcp3008::Mcp3008;

/// Tuning for the simulated solution.
#[derive(Debug, Clone, Copy)]
pub struct SimParams {
    /// Probe voltage at start.
    pub start_voltage: f32,
    /// Voltage added every read (positive drifts acidic on the stock probe).
    pub drift_v: f32,
    /// Standard deviation of per-read noise, volts.
    pub noise_v: f32,
    /// Voltage change per burst; base lowers the voltage, acid raises it.
    pub dose_step_v: f32,
    /// Converter resolution and reference.
    pub max_raw: u16,
    pub vref: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            start_voltage: 3.0,
            drift_v: 0.002,
            noise_v: 0.01,
            dose_step_v: 0.15,
            max_raw: 1023,
            vref: 5.0,
        }
    }
}

/// Shared solution state for a simulated probe/pumps pair.
pub struct SimulatedVessel {
    voltage: Rc<Cell<f32>>,
    params: SimParams,
}

impl SimulatedVessel {
    pub fn new(params: SimParams) -> Self {
        Self {
            voltage: Rc::new(Cell::new(params.start_voltage)),
            params,
        }
    }

    pub fn probe(&self) -> SimulatedProbe {
        SimulatedProbe {
            source: Source::Vessel(self.voltage.clone()),
            params: self.params,
        }
    }

    pub fn pumps(&self) -> SimulatedPumps {
        SimulatedPumps {
            voltage: Some(self.voltage.clone()),
            step: self.params.dose_step_v,
            base_on: false,
            acid_on: false,
        }
    }

    /// Current noiseless probe voltage.
    pub fn voltage(&self) -> f32 {
        self.voltage.get()
    }
}

enum Source {
    Vessel(Rc<Cell<f32>>),
    Fixed(u16),
}

/// Simulated pH probe.
pub struct SimulatedProbe {
    source: Source,
    params: SimParams,
}

impl SimulatedProbe {
    /// A probe that always returns `raw`.
    pub fn fixed(raw: u16) -> Self {
        Self {
            source: Source::Fixed(raw),
            params: SimParams::default(),
        }
    }
}

#[cfg(feature = "sim")]
fn noise(sigma: f32) -> f32 {
    if sigma <= 0.0 {
        return 0.0;
    }
    // Irwin-Hall approximation of N(0,1)
    let mut sum = 0.0f32;
    for _ in 0..12 {
        sum += fastrand::f32();
    }
    (sum - 6.0) * sigma
}

#[cfg(not(feature = "sim"))]
fn noise(_sigma: f32) -> f32 {
    0.0
}

impl Probe for SimulatedProbe {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let v = match &self.source {
            Source::Fixed(raw) => return Ok(*raw),
            Source::Vessel(cell) => {
                let v = (cell.get() + self.params.drift_v).clamp(0.0, self.params.vref);
                cell.set(v);
                v + noise(self.params.noise_v)
            }
        };
        let max = self.params.max_raw.max(1);
        let raw = (v / self.params.vref * f32::from(max))
            .round()
            .clamp(0.0, f32::from(max)) as u16;
        tracing::trace!(raw, voltage = v, "simulated probe read");
        Ok(raw)
    }
}

/// Simulated pumps. When attached to a vessel, each switch-on shifts the
/// solution by one dose step.
#[derive(Default)]
pub struct SimulatedPumps {
    voltage: Option<Rc<Cell<f32>>>,
    step: f32,
    base_on: bool,
    acid_on: bool,
}

impl SimulatedPumps {
    /// Pumps not attached to any solution.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_base_on(&self) -> bool {
        self.base_on
    }

    pub fn is_acid_on(&self) -> bool {
        self.acid_on
    }

    fn shift(&self, dv: f32) {
        if let Some(cell) = &self.voltage {
            cell.set((cell.get() + dv).max(0.0));
        }
    }
}

impl Pumps for SimulatedPumps {
    fn set_base(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if on && !self.base_on {
            self.acid_on = false;
            self.shift(-self.step);
            tracing::info!("base pump on (simulated)");
        }
        self.base_on = on;
        Ok(())
    }

    fn set_acid(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if on && !self.acid_on {
            self.base_on = false;
            self.shift(self.step);
            tracing::info!("acid pump on (simulated)");
        }
        self.acid_on = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> SimParams {
        SimParams {
            drift_v: 0.0,
            noise_v: 0.0,
            ..SimParams::default()
        }
    }

    #[test]
    fn fixed_probe_repeats() {
        let mut p = SimulatedProbe::fixed(640);
        assert_eq!(p.read_raw().unwrap(), 640);
        assert_eq!(p.read_raw().unwrap(), 640);
    }

    #[test]
    fn quiet_vessel_reads_start_voltage() {
        let vessel = SimulatedVessel::new(quiet());
        let mut probe = vessel.probe();
        // 3.0 V on a 5 V / 1023 converter
        assert_eq!(probe.read_raw().unwrap(), 614);
    }

    #[test]
    fn base_lowers_and_acid_raises_voltage() {
        let vessel = SimulatedVessel::new(quiet());
        let mut pumps = vessel.pumps();
        pumps.set_base(true).unwrap();
        pumps.set_base(false).unwrap();
        assert!((vessel.voltage() - 2.85).abs() < 1e-5);
        pumps.set_acid(true).unwrap();
        assert!(pumps.is_acid_on());
        assert!(!pumps.is_base_on());
        pumps.stop_all().unwrap();
        assert!((vessel.voltage() - 3.0).abs() < 1e-5);
        assert!(!pumps.is_acid_on());
    }

    #[test]
    fn drift_accumulates_per_read() {
        let vessel = SimulatedVessel::new(SimParams {
            drift_v: 0.5,
            noise_v: 0.0,
            ..SimParams::default()
        });
        let mut probe = vessel.probe();
        probe.read_raw().unwrap();
        probe.read_raw().unwrap();
        assert!((vessel.voltage() - 4.0).abs() < 1e-5);
    }
}
