//! An in-memory stand-in for the control register, for exercising the cable without hardware.
use super::{Control, Register};

/// How RTCK responds to TCK.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ack {
    /// RTCK always reads back the current TCK level.
    Follow,
    /// RTCK catches up with TCK only after this many further reads.
    After(usize),
    /// RTCK never moves.
    Never,
}

#[derive(Debug)]
pub struct SimRegister {
    value: u32,
    ack: Ack,
    pending: usize,
    loopback: bool,
    reads: usize,
    read_budget: Option<usize>,
    writes: Vec<u32>,
}

impl SimRegister {
    pub fn new(ack: Ack) -> Self {
        Self::with_value(0, ack)
    }

    /// Start from `value`, e.g. to seed bits owned by other logic.
    pub fn with_value(value: u32, ack: Ack) -> Self {
        Self {
            value,
            ack,
            pending: 0,
            loopback: false,
            reads: 0,
            read_budget: None,
            writes: Vec::new(),
        }
    }

    /// Latch TDI into TDO on every rising edge of TCK, as a target in BYPASS would.
    pub fn loopback(mut self) -> Self {
        self.loopback = true;
        self
    }

    /// Panic on the read after `reads`, so a wait that never ends fails the test instead of
    /// hanging it.
    pub fn read_budget(mut self, reads: usize) -> Self {
        self.read_budget = Some(reads);
        self
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn control(&self) -> Control {
        Control::from_bits_retain(self.value)
    }

    /// Every value written so far, oldest first.
    pub fn writes(&self) -> &[u32] {
        &self.writes
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Drive an input bit (TDO, RTCK or anything outside the named fields) as the hardware would.
    pub fn force(&mut self, bits: Control, high: bool) {
        let mut reg = self.control();
        reg.set(bits, high);
        self.value = reg.bits();
    }

    fn track_clock(&mut self) {
        let tck = self.control().contains(Control::TCK);
        self.force(Control::RTCK, tck);
    }
}

impl Register for SimRegister {
    fn read32(&mut self) -> u32 {
        if let Some(budget) = self.read_budget {
            assert!(self.reads < budget, "RTCK never acknowledged TCK");
        }
        self.reads += 1;

        match self.ack {
            Ack::Follow => self.track_clock(),
            Ack::After(_) if self.pending > 0 => self.pending -= 1,
            Ack::After(_) => self.track_clock(),
            Ack::Never => (),
        }
        self.value
    }

    fn write32(&mut self, value: u32) {
        let old = self.control();
        let new = Control::from_bits_retain(value);

        // TDO and RTCK are driven by the hardware, not by software
        let inputs = Control::TDO | Control::RTCK;
        let mut reg = (new - inputs) | (old & inputs);

        if let Ack::After(n) = self.ack {
            if old.contains(Control::TCK) != new.contains(Control::TCK) {
                self.pending = n;
            }
        }
        if self.loopback && !old.contains(Control::TCK) && new.contains(Control::TCK) {
            reg.set(Control::TDO, new.contains(Control::TDI));
        }

        self.value = reg.bits();
        self.writes.push(value);
    }
}
