//! Per-cycle telemetry records and sinks.
//!
//! The wire format is one JSON object per line with a fixed field order and
//! fixed precision (pH: 2 decimals, voltage: 3 decimals), e.g.
//! `{"pH":6.20,"voltage":3.200,"pump":"basic","action":"on"}`.

use std::io::Write;

use crate::controller::{PumpAction, PumpCommand};

/// One control cycle as reported to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub ph: f32,
    pub voltage: f32,
    pub pump: PumpCommand,
    pub action: PumpAction,
}

impl Reading {
    pub fn new(ph: f32, voltage: f32, pump: PumpCommand) -> Self {
        Self {
            ph,
            voltage,
            pump,
            action: pump.action(),
        }
    }

    /// Render the record without a trailing newline.
    pub fn to_json_line(&self) -> String {
        format!(
            "{{\"pH\":{:.2},\"voltage\":{:.3},\"pump\":\"{}\",\"action\":\"{}\"}}",
            self.ph,
            self.voltage,
            self.pump.as_str(),
            self.action.as_str()
        )
    }
}

/// Destination for per-cycle readings.
pub trait TelemetrySink {
    fn emit(&mut self, reading: &Reading) -> std::io::Result<()>;
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Box<T> {
    fn emit(&mut self, reading: &Reading) -> std::io::Result<()> {
        (**self).emit(reading)
    }
}

/// Writes one JSON line per reading and flushes, so consumers see each
/// cycle as it happens.
pub struct JsonLineSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonLineSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TelemetrySink for JsonLineSink<W> {
    fn emit(&mut self, reading: &Reading) -> std::io::Result<()> {
        writeln!(self.out, "{}", reading.to_json_line())?;
        self.out.flush()
    }
}

/// Keeps readings in memory; shared handle so tests can inspect after the
/// loop has taken ownership.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    readings: std::rc::Rc<std::cell::RefCell<Vec<Reading>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readings(&self) -> Vec<Reading> {
        self.readings.borrow().clone()
    }
}

impl TelemetrySink for MemorySink {
    fn emit(&mut self, reading: &Reading) -> std::io::Result<()> {
        self.readings.borrow_mut().push(*reading);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_reading_format() {
        let r = Reading::new(7.0, 3.006, PumpCommand::None);
        assert_eq!(
            r.to_json_line(),
            r#"{"pH":7.00,"voltage":3.006,"pump":"none","action":"off"}"#
        );
    }

    #[test]
    fn json_line_sink_terminates_lines() {
        let mut sink = JsonLineSink::new(Vec::new());
        sink.emit(&Reading::new(7.8, 2.5, PumpCommand::Acid)).unwrap();
        sink.emit(&Reading::new(7.1, 2.6, PumpCommand::None)).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"pH":7.80,"voltage":2.500,"pump":"acidic","action":"on"}"#
        );
    }

    #[test]
    fn memory_sink_shares_storage_between_clones() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.emit(&Reading::new(6.0, 3.3, PumpCommand::Base)).unwrap();
        assert_eq!(sink.readings().len(), 1);
    }
}
