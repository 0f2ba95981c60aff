//! Access to the DSP JTAG control register.  Anything that can read and write a full 32-bit word
//! implements `Register`; the cable only ever talks to the hardware through it.
#[cfg(feature = "devmem")]
pub mod devmem;
pub mod sim;

use bitflags::bitflags;
use embedded_hal::digital::PinState;

/// Physical address of `REG_AHB_DSP_JTAG_CTRL` on the SC8810.
pub const REG_AHB_DSP_JTAG_CTRL: u64 = 0x2090_0280;

bitflags! {
    /// Fields of the control register.  Bits not named here belong to other logic and are
    /// carried through unchanged on every write.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Control: u32 {
        /// Hands the DSP JTAG lines over to software.
        const ENABLE = 1 << 8;
        const TDI = 1 << 4;
        const TCK = 1 << 3;
        const TMS = 1 << 2;
        /// Input, sampled from the target.
        const TDO = 1 << 1;
        /// Input, follows the physical clock line once it has settled.
        const RTCK = 1 << 0;
    }
}

pub trait Register {
    /// Read the whole register.
    fn read32(&mut self) -> u32;
    /// Write the whole register.
    fn write32(&mut self, value: u32);

    /// Read the live value, drive `bits` to `state`, and write it back.  Everything else is
    /// written back exactly as it was read.
    fn modify(&mut self, bits: Control, state: PinState) {
        let mut reg = Control::from_bits_retain(self.read32());
        reg.set(bits, state == PinState::High);
        self.write32(reg.bits());
    }

    /// Current level of a single input or output bit.
    fn level(&mut self, bit: Control) -> PinState {
        let reg = Control::from_bits_retain(self.read32());
        PinState::from(reg.contains(bit))
    }
}

impl<R: Register + ?Sized> Register for &mut R {
    fn read32(&mut self) -> u32 {
        (**self).read32()
    }

    fn write32(&mut self, value: u32) {
        (**self).write32(value)
    }
}
