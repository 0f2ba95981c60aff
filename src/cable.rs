//! Hardware adapters that can be driven by the remote_bitbang protocol live here.  Adapters
//! implement the `Cable` trait.
pub mod djtag;

use embedded_hal::digital::PinState;

pub trait Cable {
    /// Drive TCK, TMS and TDI to the given levels.  TMS and TDI must be settled before TCK
    /// changes, so that an edge samples the new values.
    fn write(&mut self, tck: PinState, tms: PinState, tdi: PinState);

    /// Sample the TDO line.  Must not disturb any output.
    fn read(&mut self) -> PinState;

    /// Switch the activity LED.  Adapters without one ignore it.
    fn blink(&mut self, _on: bool) {}

    /// Drive the TRST and SRST reset lines (`true` asserts).  Adapters without reset lines
    /// ignore it.
    fn reset(&mut self, _trst: bool, _srst: bool) {}
}

impl<C: Cable + ?Sized> Cable for &mut C {
    fn write(&mut self, tck: PinState, tms: PinState, tdi: PinState) {
        (**self).write(tck, tms, tdi)
    }

    fn read(&mut self) -> PinState {
        (**self).read()
    }

    fn blink(&mut self, on: bool) {
        (**self).blink(on)
    }

    fn reset(&mut self, trst: bool, srst: bool) {
        (**self).reset(trst, srst)
    }
}
