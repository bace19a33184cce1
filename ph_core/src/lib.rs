#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core pH regulation logic (hardware-agnostic).
//!
//! All hardware interactions go through `ph_traits::Probe` and
//! `ph_traits::Pumps`; time goes through `ph_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Filtering**: moving average over raw probe voltages (`filter` module)
//! - **Calibration**: three-point least-squares voltage→pH model (`calibration` module)
//! - **Control**: dual-setpoint hysteresis with one-shot burst dosing (`controller` module)
//! - **Telemetry**: one JSON line per cycle (`telemetry` module)
//! - **Orchestration**: `ControlLoop` sequences the above once per cycle
//!
//! State (filter buffer, dose flags, last dose time) is owned by the loop and
//! threaded through each call; there are no globals.

pub mod calibration;
pub mod config;
pub mod control_loop;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod filter;
pub mod mocks;
pub mod telemetry;
pub mod util;

pub use calibration::{CalibrationModel, CalibrationPoint, CalibrationReport};
pub use config::{AdcCfg, ControllerCfg, DosingCfg, FilterCfg, HysteresisCfg, LoopCfg};
pub use control_loop::{ControlLoop, ControlLoopBuilder, CycleReport};
pub use controller::{DoseController, DoseState, PumpAction, PumpCommand};
pub use error::{BuildError, PhError, Result};
pub use filter::MovingAverage;
pub use telemetry::{JsonLineSink, MemorySink, Reading, TelemetrySink};
