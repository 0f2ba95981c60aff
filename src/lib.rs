//! This crate turns the DSP JTAG port of the Spreadtrum SC8810 into an OpenOCD
//! `remote_bitbang` adapter.  The SoC exposes the port through a single control register,
//! `REG_AHB_DSP_JTAG_CTRL`: once the software override is enabled, TCK, TMS and TDI follow
//! bits in the register, TDO can be sampled from it, and RTCK reports when the clock line has
//! actually reached the level that was written.
//!
//! At the lowest level, the `Register` trait is anything that can read and write that 32-bit
//! word.  `DevMem` maps the real register out of `/dev/mem`; `SimRegister` is an in-memory model
//! for tests.
//!
//! On top of that, the `Djtag` cable drives the three output lines, writing only the lines that
//! changed, always committing TMS and TDI before TCK, and waiting for RTCK after every clock
//! edge.  It implements the `Cable` trait, which is all the protocol layer needs.
//!
//! `protocol::serve` reads single-byte remote_bitbang commands from any `Read`, applies them to
//! a `Cable`, and answers `R` on any `Write`.
//!
//! # Example
//! ```
//! use djtag_bitbang::cable::djtag::Djtag;
//! use djtag_bitbang::protocol::{self, Ending};
//! use djtag_bitbang::register::sim::{Ack, SimRegister};
//!
//! let reg = SimRegister::new(Ack::Follow).loopback();
//! let mut djtag = Djtag::new(reg);
//! djtag.set_enabled(true);
//!
//! let mut reply = Vec::new();
//! let summary = protocol::serve(&mut djtag, &b"7R0Q"[..], &mut reply).unwrap();
//! djtag.set_enabled(false);
//!
//! assert_eq!(reply, b"1");
//! assert_eq!(summary.ending, Ending::Quit);
//! ```

pub mod cable;
mod error;
pub mod protocol;
pub mod register;

pub use error::{Error, Result};
