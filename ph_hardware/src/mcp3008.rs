//! MCP3008 8-channel 10-bit ADC over SPI.
//!
//! Single-ended read: send `[0x01, (0x08 | ch) << 4, 0x00]`, the result is the
//! low 2 bits of byte 1 followed by byte 2.

use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::error::{HwError, Result};

/// 1 MHz keeps the MCP3008 well inside its 2.7 V timing limits.
const SPI_CLOCK_HZ: u32 = 1_000_000;
const MAX_CHANNEL: u8 = 7;

pub struct Mcp3008 {
    spi: Spi,
    channel: u8,
}

impl Mcp3008 {
    /// Open SPI0/CE0 and bind to `channel` (0-7).
    pub fn new(channel: u8) -> Result<Self> {
        if channel > MAX_CHANNEL {
            return Err(HwError::Channel(channel));
        }
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        tracing::info!(channel, clock_hz = SPI_CLOCK_HZ, "mcp3008 initialised");
        Ok(Self { spi, channel })
    }

    pub fn read_channel(&mut self) -> Result<u16> {
        let tx = [0x01, (0x08 | self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        tracing::trace!(raw, "mcp3008 sample");
        Ok(raw)
    }
}

impl ph_traits::Probe for Mcp3008 {
    fn read_raw(&mut self) -> std::result::Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        self.read_channel().map_err(|e| {
            tracing::error!("probe read error: {}", e);
            Box::new(e) as Box<dyn std::error::Error + Send + Sync>
        })
    }
}
