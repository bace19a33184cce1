//! Two pumps on an L298N-style dual H-bridge.
//!
//! Each pump uses one input pair; forward is (HIGH, LOW), stopped is
//! (LOW, LOW). Switching one pump on always drives the other pair low.

use rppal::gpio::{Gpio, OutputPin};

use crate::error::{HwError, Result};

pub struct HBridgePumps {
    base_in1: OutputPin,
    base_in2: OutputPin,
    acid_in3: OutputPin,
    acid_in4: OutputPin,
}

impl HBridgePumps {
    /// Claim the four BCM pins and leave both pumps stopped.
    pub fn new(base_in1: u8, base_in2: u8, acid_in3: u8, acid_in4: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let out = |pin: u8| -> Result<OutputPin> {
            gpio.get(pin)
                .map(|p| p.into_output_low())
                .map_err(|e| HwError::Gpio(format!("open pin {pin}: {e}")))
        };
        let pumps = Self {
            base_in1: out(base_in1)?,
            base_in2: out(base_in2)?,
            acid_in3: out(acid_in3)?,
            acid_in4: out(acid_in4)?,
        };
        tracing::info!(base_in1, base_in2, acid_in3, acid_in4, "h-bridge pumps ready");
        Ok(pumps)
    }

    fn drive(&mut self, base: bool, acid: bool) {
        self.base_in1.write(base.into());
        self.base_in2.set_low();
        self.acid_in3.write(acid.into());
        self.acid_in4.set_low();
    }
}

impl ph_traits::Pumps for HBridgePumps {
    fn set_base(&mut self, on: bool) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let acid = !on && self.acid_in3.is_set_high();
        self.drive(on, acid);
        tracing::debug!(on, "base pump");
        Ok(())
    }

    fn set_acid(&mut self, on: bool) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let base = !on && self.base_in1.is_set_high();
        self.drive(base, on);
        tracing::debug!(on, "acid pump");
        Ok(())
    }

    fn stop_all(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.drive(false, false);
        Ok(())
    }
}

impl Drop for HBridgePumps {
    fn drop(&mut self) {
        self.drive(false, false);
    }
}
