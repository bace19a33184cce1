//! Test and helper mocks for ph_core.

use std::cell::RefCell;
use std::rc::Rc;

/// A probe that replays a fixed sequence of raw counts, then repeats the last.
pub struct SeqProbe {
    seq: Vec<u16>,
    idx: usize,
}

impl SeqProbe {
    pub fn new(seq: impl Into<Vec<u16>>) -> Self {
        Self {
            seq: seq.into(),
            idx: 0,
        }
    }
}

impl ph_traits::Probe for SeqProbe {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let v = if self.idx < self.seq.len() {
            let x = self.seq[self.idx];
            self.idx += 1;
            x
        } else {
            self.seq.last().copied().unwrap_or(0)
        };
        Ok(v)
    }
}

/// A probe that always errors; the loop propagates hardware errors as-is.
pub struct FailingProbe;

impl ph_traits::Probe for FailingProbe {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("probe read failed")))
    }
}

/// One call observed by `SpyPumps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEvent {
    Base(bool),
    Acid(bool),
}

/// Records every actuator call; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct SpyPumps {
    events: Rc<RefCell<Vec<PumpEvent>>>,
}

impl SpyPumps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PumpEvent> {
        self.events.borrow().clone()
    }

    /// Number of times a pump was switched on.
    pub fn bursts(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, PumpEvent::Base(true) | PumpEvent::Acid(true)))
            .count()
    }
}

impl ph_traits::Pumps for SpyPumps {
    fn set_base(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.events.borrow_mut().push(PumpEvent::Base(on));
        Ok(())
    }
    fn set_acid(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.events.borrow_mut().push(PumpEvent::Acid(on));
        Ok(())
    }
}
