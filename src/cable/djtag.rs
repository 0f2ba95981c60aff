//! Implement the `Cable` trait for the SC8810 DSP JTAG port, bit-banged through the
//! `REG_AHB_DSP_JTAG_CTRL` register.
//!
//! Every TCK change is followed by a busy wait on RTCK.  There is no timeout: if the hardware
//! never reflects the clock, `write` never returns.
use embedded_hal::digital::PinState;

use crate::cable::Cable;
use crate::register::{Control, Register};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Lines {
    tck: PinState,
    tms: PinState,
    tdi: PinState,
}

pub struct Djtag<R> {
    reg: R,
    // Levels last driven onto the port, `None` until the first write
    last: Option<Lines>,
}

impl<R: Register> Djtag<R> {
    pub fn new(reg: R) -> Self {
        Self { reg, last: None }
    }

    /// Hand the JTAG lines to software (`true`) or give them back.  Safe to repeat.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.reg.modify(Control::ENABLE, PinState::from(enabled));
    }

    /// Drive the port.  Only lines that differ from the previous call are written, except on the
    /// first call, when all three are.  TCK always goes last.
    pub fn set(&mut self, tck: PinState, tms: PinState, tdi: PinState) {
        let next = Lines { tck, tms, tdi };
        let last = self.last;
        let changed = |line: fn(&Lines) -> PinState| last.map_or(true, |l| line(&l) != line(&next));

        if changed(|l| l.tdi) {
            log::trace!("tdi {:?}", tdi);
            self.reg.modify(Control::TDI, tdi);
        }
        if changed(|l| l.tms) {
            log::trace!("tms {:?}", tms);
            self.reg.modify(Control::TMS, tms);
        }
        if changed(|l| l.tck) {
            log::trace!("tck {:?}", tck);
            self.set_tck(tck);
        }

        self.last = Some(next);
    }

    /// Sample TDO.
    pub fn get(&mut self) -> PinState {
        self.reg.level(Control::TDO)
    }

    fn set_tck(&mut self, tck: PinState) {
        self.reg.modify(Control::TCK, tck);
        while self.reg.level(Control::RTCK) != tck {
            core::hint::spin_loop();
        }
    }

    pub fn register(&self) -> &R {
        &self.reg
    }

    pub fn into_inner(self) -> R {
        self.reg
    }
}

impl<R: Register> Cable for Djtag<R> {
    fn write(&mut self, tck: PinState, tms: PinState, tdi: PinState) {
        self.set(tck, tms, tdi)
    }

    fn read(&mut self) -> PinState {
        self.get()
    }

    fn blink(&mut self, on: bool) {
        log::trace!("blink {} ignored, no LED", on);
    }

    fn reset(&mut self, trst: bool, srst: bool) {
        log::trace!("reset trst={} srst={} ignored, no reset lines", trst, srst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::sim::{Ack, SimRegister};
    use embedded_hal::digital::PinState::{High, Low};

    fn changes(writes: &[u32]) -> Vec<Control> {
        let mut prev = 0;
        writes
            .iter()
            .map(|&w| {
                let diff = Control::from_bits_retain(prev ^ w);
                prev = w;
                diff
            })
            .collect()
    }

    #[test]
    fn first_write_drives_every_line() {
        let mut djtag = Djtag::new(SimRegister::new(Ack::Follow));
        djtag.set(Low, Low, Low);

        // all three written even though the register already holds zeros
        assert_eq!(djtag.register().writes().len(), 3);
    }

    #[test]
    fn clock_written_after_data_and_mode() {
        let mut djtag = Djtag::new(SimRegister::new(Ack::Follow));
        djtag.set(High, High, High);

        assert_eq!(
            changes(djtag.register().writes()),
            vec![Control::TDI, Control::TMS, Control::TCK]
        );
    }

    #[test]
    fn unchanged_lines_not_rewritten() {
        let mut djtag = Djtag::new(SimRegister::new(Ack::Follow));
        djtag.set(Low, High, Low);
        let before = djtag.register().writes().len();

        djtag.set(High, High, Low);
        let writes = &djtag.register().writes()[before..];
        assert_eq!(writes.len(), 1);
        assert_eq!(djtag.register().control(), Control::TMS | Control::TCK | Control::RTCK);

        djtag.set(High, High, Low);
        assert_eq!(djtag.register().writes().len(), before + 1);
    }

    #[test]
    fn clock_toggles_even_when_data_is_steady() {
        let mut djtag = Djtag::new(SimRegister::new(Ack::Follow));
        djtag.set(Low, Low, High);
        let before = djtag.register().writes().len();

        djtag.set(High, Low, High);
        djtag.set(Low, Low, High);
        let writes: Vec<Control> = djtag.register().writes()[before..]
            .iter()
            .map(|&w| Control::from_bits_retain(w))
            .collect();
        assert_eq!(writes.len(), 2);
        assert!(writes[0].contains(Control::TCK | Control::TDI));
        assert!(!writes[1].contains(Control::TCK));
        assert!(writes[1].contains(Control::TDI));
    }

    #[test]
    fn raising_clock_waits_for_rtck() {
        let mut djtag = Djtag::new(SimRegister::new(Ack::After(5)));
        djtag.set(Low, Low, Low);
        let reads = djtag.register().reads();

        djtag.set(High, Low, Low);
        let reg = djtag.register();
        assert!(reg.control().contains(Control::RTCK));
        // one read for the modify, five stale polls, then the one that sees RTCK
        assert_eq!(reg.reads() - reads, 7);
    }

    #[test]
    fn lowering_clock_waits_for_rtck() {
        let mut djtag = Djtag::new(SimRegister::new(Ack::After(3)));
        djtag.set(High, Low, Low);
        let reads = djtag.register().reads();

        djtag.set(Low, Low, Low);
        let reg = djtag.register();
        assert!(!reg.control().contains(Control::RTCK));
        assert_eq!(reg.reads() - reads, 5);
    }

    #[test]
    #[should_panic(expected = "RTCK never acknowledged TCK")]
    fn missing_rtck_blocks() {
        let reg = SimRegister::new(Ack::Never).read_budget(1000);
        let mut djtag = Djtag::new(reg);
        djtag.set(High, Low, Low);
    }

    #[test]
    fn read_has_no_side_effects() {
        let mut reg = SimRegister::new(Ack::Follow);
        reg.force(Control::TDO, true);
        let mut djtag = Djtag::new(reg);
        djtag.set(Low, High, Low);
        let value = djtag.register().value();
        let writes = djtag.register().writes().len();

        assert_eq!(djtag.get(), High);
        assert_eq!(djtag.get(), High);
        assert_eq!(djtag.register().value(), value);
        assert_eq!(djtag.register().writes().len(), writes);

        // and the driver still remembers what it drove
        djtag.set(Low, High, Low);
        assert_eq!(djtag.register().writes().len(), writes);
    }

    #[test]
    fn enable_is_idempotent_and_preserves_lines() {
        let mut djtag = Djtag::new(SimRegister::with_value(0x8000_0000, Ack::Follow));
        djtag.set(Low, High, High);

        djtag.set_enabled(true);
        djtag.set_enabled(true);
        assert_eq!(
            djtag.register().value(),
            0x8000_0000 | (Control::ENABLE | Control::TMS | Control::TDI).bits()
        );

        djtag.set_enabled(false);
        assert_eq!(
            djtag.register().value(),
            0x8000_0000 | (Control::TMS | Control::TDI).bits()
        );
    }

    #[test]
    fn borrowed_register_keeps_state_with_owner() {
        let mut reg = SimRegister::new(Ack::Follow).loopback();
        {
            let mut djtag = Djtag::new(&mut reg);
            djtag.set(High, Low, High);
            assert_eq!(djtag.get(), High);
        }
        assert_eq!(reg.writes().len(), 3);
        assert!(reg.control().contains(Control::TCK | Control::TDI | Control::TDO));
    }
}
