//! Dual-setpoint hysteresis with one-shot burst dosing.
//!
//! Base and acid are tracked as independent flags rather than one enum so the
//! tie-break between them stays explicit: both may be raised within a cycle,
//! then `arbitrate` keeps exactly one.
//!
//! A raised flag fires a single burst and is cleared in the same cycle. The
//! next correction is decided from a fresh reading and is gated again by the
//! minimum gap.

use crate::config::{DosingCfg, HysteresisCfg};

/// Correction band center for the base pump.
pub const BASE_TARGET_PH: f32 = 6.5;
/// Correction band center for the acid pump.
pub const ACID_TARGET_PH: f32 = 7.5;

/// Which actuator fires this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpCommand {
    None,
    Base,
    Acid,
}

/// Telemetry action tag paired with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpAction {
    On,
    Off,
}

impl PumpCommand {
    /// Name used on the telemetry wire.
    pub fn as_str(self) -> &'static str {
        match self {
            PumpCommand::None => "none",
            PumpCommand::Base => "basic",
            PumpCommand::Acid => "acidic",
        }
    }

    pub fn action(self) -> PumpAction {
        match self {
            PumpCommand::None => PumpAction::Off,
            PumpCommand::Base | PumpCommand::Acid => PumpAction::On,
        }
    }

    pub fn fires(self) -> bool {
        !matches!(self, PumpCommand::None)
    }
}

impl PumpAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PumpAction::On => "on",
            PumpAction::Off => "off",
        }
    }
}

/// Mutable controller state, owned by the caller and passed into every step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoseState {
    pub base_active: bool,
    pub acid_active: bool,
    /// Milliseconds since loop start at which the last burst began.
    pub last_dose_ms: u64,
}

/// Decision logic. Holds only configuration; see `DoseState` for the state.
#[derive(Debug, Clone)]
pub struct DoseController {
    hysteresis: HysteresisCfg,
    dosing: DosingCfg,
}

impl DoseController {
    pub fn new(hysteresis: HysteresisCfg, dosing: DosingCfg) -> Self {
        Self { hysteresis, dosing }
    }

    pub fn hysteresis(&self) -> &HysteresisCfg {
        &self.hysteresis
    }

    pub fn dosing(&self) -> &DosingCfg {
        &self.dosing
    }

    /// A new burst may start only once strictly more than `min_gap_ms` has
    /// passed since the previous one.
    #[inline]
    pub fn allowed_to_run(&self, state: &DoseState, now_ms: u64) -> bool {
        now_ms.saturating_sub(state.last_dose_ms) > self.dosing.min_gap_ms
    }

    /// Apply enter/exit thresholds to both flags, then arbitrate.
    ///
    /// Entering requires `allowed`; leaving an active state never does.
    pub fn transition(&self, state: &mut DoseState, ph: f32, allowed: bool) {
        let h = &self.hysteresis;

        if state.base_active {
            if ph >= h.low_exit {
                state.base_active = false;
            }
        } else if ph <= h.low_threshold && allowed {
            state.base_active = true;
        }

        if state.acid_active {
            if ph <= h.high_exit {
                state.acid_active = false;
            }
        } else if ph >= h.high_threshold && allowed {
            state.acid_active = true;
        }

        Self::arbitrate(state, ph);
    }

    /// When both flags are raised keep the actuator further from its own
    /// band center. Ties go to base.
    pub fn arbitrate(state: &mut DoseState, ph: f32) {
        if !(state.base_active && state.acid_active) {
            return;
        }
        let dev_base = (ph - BASE_TARGET_PH).abs();
        let dev_acid = (ph - ACID_TARGET_PH).abs();
        if dev_base >= dev_acid {
            state.acid_active = false;
        } else {
            state.base_active = false;
        }
        tracing::debug!(ph, dev_base, dev_acid, "pump conflict arbitrated");
    }

    /// One full decision for the filtered `ph` at `now_ms`.
    ///
    /// A returned `Base`/`Acid` means the caller must run that pump for
    /// `burst_ms`. The flag is already cleared and `last_dose_ms` recorded.
    pub fn step(&self, state: &mut DoseState, ph: f32, now_ms: u64) -> PumpCommand {
        let allowed = self.allowed_to_run(state, now_ms);
        self.transition(state, ph, allowed);

        let cmd = if state.base_active {
            state.base_active = false;
            PumpCommand::Base
        } else if state.acid_active {
            state.acid_active = false;
            PumpCommand::Acid
        } else {
            PumpCommand::None
        };

        if cmd.fires() {
            state.last_dose_ms = now_ms;
            tracing::info!(ph, pump = cmd.as_str(), burst_ms = self.dosing.burst_ms, "dose");
        }
        cmd
    }
}

impl Default for DoseController {
    fn default() -> Self {
        Self::new(HysteresisCfg::default(), DosingCfg::default())
    }
}
