//! Per-cycle orchestration: sample, filter, calibrate, decide, dose, report.
//!
//! The burst is a blocking sleep on the injected clock. While a pump runs no
//! sample is taken, so after a dose the effective sampling interval is
//! `cadence_ms + burst_ms`; the hysteresis thresholds assume this cadence.
//! A started burst always runs to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::WrapErr;
use ph_traits::clock::{Clock, MonotonicClock};
use ph_traits::{Probe, Pumps};

use crate::calibration::{CalibrationModel, CalibrationPoint, CalibrationReport};
use crate::config::{AdcCfg, ControllerCfg};
use crate::controller::{DoseController, DoseState, PumpCommand};
use crate::error::{BuildError, PhError, Result};
use crate::filter::MovingAverage;
use crate::telemetry::{Reading, TelemetrySink};
use crate::util::raw_to_voltage;

/// What one cycle observed and decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub raw: u16,
    /// Filtered voltage.
    pub voltage: f32,
    /// Clamped pH computed from the filtered voltage.
    pub ph: f32,
    pub command: PumpCommand,
    /// Loop time at which the decision was taken.
    pub at_ms: u64,
}

pub struct ControlLoop {
    probe: Box<dyn Probe>,
    pumps: Box<dyn Pumps>,
    sink: Box<dyn TelemetrySink>,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,

    adc: AdcCfg,
    cadence_ms: u64,
    points: [CalibrationPoint; 3],
    model: CalibrationModel,
    controller: DoseController,

    filter: MovingAverage,
    state: DoseState,
    cycles: u64,
}

impl core::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("model", &self.model)
            .field("state", &self.state)
            .field("filled", &self.filter.len())
            .field("cycles", &self.cycles)
            .finish()
    }
}

fn hw_err(e: Box<dyn std::error::Error + Send + Sync>) -> PhError {
    PhError::Hardware(e.to_string())
}

impl ControlLoop {
    pub fn builder() -> ControlLoopBuilder {
        ControlLoopBuilder::default()
    }

    /// The fitted model together with the points it came from.
    pub fn calibration_report(&self) -> CalibrationReport {
        CalibrationReport::new(self.points, self.model)
    }

    pub fn model(&self) -> &CalibrationModel {
        &self.model
    }

    pub fn state(&self) -> &DoseState {
        &self.state
    }

    pub fn filter(&self) -> &MovingAverage {
        &self.filter
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Milliseconds since the loop was built.
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    /// Drive both pumps off.
    pub fn stop_pumps(&mut self) -> Result<()> {
        self.pumps
            .stop_all()
            .map_err(hw_err)
            .wrap_err("stop pumps")
    }

    /// One cycle without the cadence delay. Blocks for `burst_ms` when a
    /// dose fires.
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        let raw = self
            .probe
            .read_raw()
            .map_err(hw_err)
            .wrap_err("read probe")?;
        let voltage = self.filter.push(raw_to_voltage(raw, &self.adc));
        let ph = self.model.apply(voltage);
        let at_ms = self.now_ms();

        let command = self.controller.step(&mut self.state, ph, at_ms);
        if command.fires() {
            self.burst(command)?;
        }

        let reading = Reading::new(ph, voltage, command);
        self.sink
            .emit(&reading)
            .map_err(|e| PhError::Io(e.to_string()))
            .wrap_err("emit telemetry")?;
        tracing::debug!(
            raw,
            voltage,
            ph,
            pump = command.as_str(),
            action = reading.action.as_str(),
            "cycle"
        );

        self.cycles = self.cycles.saturating_add(1);
        Ok(CycleReport {
            raw,
            voltage,
            ph,
            command,
            at_ms,
        })
    }

    /// Run cycles until `max_cycles` is reached (if given) or `shutdown` is set,
    /// sleeping `cadence_ms` between cycles. Returns the number of cycles run.
    ///
    /// Pumps are stopped before the first cycle and on every exit path.
    pub fn run(&mut self, max_cycles: Option<u64>, shutdown: &AtomicBool) -> Result<u64> {
        self.stop_pumps()?;
        let cadence = Duration::from_millis(self.cadence_ms);
        let mut done = 0u64;
        let outcome = loop {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!(cycles = done, "shutdown requested");
                break Ok(done);
            }
            if max_cycles.is_some_and(|n| done >= n) {
                break Ok(done);
            }
            if let Err(e) = self.run_cycle() {
                break Err(e);
            }
            done += 1;
            if max_cycles.is_some_and(|n| done >= n) {
                break Ok(done);
            }
            self.clock.sleep(cadence);
        };

        if let Err(e) = self.pumps.stop_all() {
            tracing::warn!(error = %e, "failed to stop pumps on exit");
        }
        outcome
    }

    fn burst(&mut self, command: PumpCommand) -> Result<()> {
        let burst = Duration::from_millis(self.controller.dosing().burst_ms);
        let started = match command {
            PumpCommand::Base => self
                .pumps
                .set_acid(false)
                .and_then(|()| self.pumps.set_base(true)),
            PumpCommand::Acid => self
                .pumps
                .set_base(false)
                .and_then(|()| self.pumps.set_acid(true)),
            PumpCommand::None => return Ok(()),
        };
        if let Err(e) = started {
            if let Err(stop) = self.pumps.stop_all() {
                tracing::warn!(error = %stop, "failed to stop pumps after start error");
            }
            return Err(eyre::Report::new(hw_err(e))
                .wrap_err(format!("start {} pump", command.as_str())));
        }

        self.clock.sleep(burst);
        self.stop_pumps()
    }
}

/// Builder for `ControlLoop`. Probe, pumps and sink are required.
#[derive(Default)]
pub struct ControlLoopBuilder {
    probe: Option<Box<dyn Probe>>,
    pumps: Option<Box<dyn Pumps>>,
    sink: Option<Box<dyn TelemetrySink>>,
    config: Option<ControllerCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl ControlLoopBuilder {
    pub fn with_probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    pub fn with_pumps(mut self, pumps: impl Pumps + 'static) -> Self {
        self.pumps = Some(Box::new(pumps));
        self
    }

    pub fn with_sink(mut self, sink: impl TelemetrySink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn with_config(mut self, config: ControllerCfg) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject a clock (tests use a manual one). Defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Validate and assemble. The calibration model is fitted here, once.
    pub fn build(self) -> std::result::Result<ControlLoop, BuildError> {
        let probe = self.probe.ok_or(BuildError::MissingProbe)?;
        let pumps = self.pumps.ok_or(BuildError::MissingPumps)?;
        let sink = self.sink.ok_or(BuildError::MissingSink)?;
        let cfg = self.config.unwrap_or_default();
        cfg.check()?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let epoch = clock.now();
        let model = CalibrationModel::fit(&cfg.calibration);

        Ok(ControlLoop {
            probe,
            pumps,
            sink,
            clock,
            epoch,
            adc: cfg.adc,
            cadence_ms: cfg.cadence.cadence_ms,
            points: cfg.calibration,
            model,
            controller: DoseController::new(cfg.hysteresis, cfg.dosing),
            filter: MovingAverage::new(cfg.filter.ma_size),
            state: DoseState::default(),
            cycles: 0,
        })
    }
}
