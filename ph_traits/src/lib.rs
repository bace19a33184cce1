//! Hardware seams for the pH controller.
//!
//! The core never touches an ADC or a GPIO line directly; it talks to a
//! `Probe` for raw samples and to `Pumps` for the two dosing actuators.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Analog input delivering raw ADC counts from the pH probe.
pub trait Probe {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;
}

/// The base and acid dosing actuators.
///
/// Callers treat the two channels as mutually exclusive: switching one on
/// implies the other is off.
pub trait Pumps {
    fn set_base(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn set_acid(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Drive both actuators off.
    fn stop_all(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.set_base(false)?;
        self.set_acid(false)
    }
}

impl<P: Probe + ?Sized> Probe for Box<P> {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_raw()
    }
}

impl<P: Pumps + ?Sized> Pumps for Box<P> {
    fn set_base(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_base(on)
    }
    fn set_acid(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_acid(on)
    }
    fn stop_all(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).stop_all()
    }
}
