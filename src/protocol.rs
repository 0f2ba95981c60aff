//! The OpenOCD remote_bitbang protocol.  Each command is a single byte with no framing; the only
//! reply is a single `'0'` or `'1'` in answer to `R`.  Commands are handled one at a time, in
//! order, and a command is finished before the next byte is read.
use std::io::{ErrorKind, Read, Write};

use embedded_hal::digital::PinState;

use crate::cable::Cable;
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Blink(bool),
    Reset { trst: bool, srst: bool },
    Write { tck: PinState, tms: PinState, tdi: PinState },
    Read,
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(c: u8) -> Result<Self> {
        let command = match c {
            b'Q' => Command::Quit,
            b'B' => Command::Blink(true),
            b'b' => Command::Blink(false),
            b'r'..=b'u' => {
                let d = c - b'r';
                Command::Reset {
                    trst: d & 2 != 0,
                    srst: d & 1 != 0,
                }
            }
            b'0'..=b'7' => {
                let d = c - b'0';
                Command::Write {
                    tck: PinState::from(d & 4 != 0),
                    tms: PinState::from(d & 2 != 0),
                    tdi: PinState::from(d & 1 != 0),
                }
            }
            b'R' => Command::Read,
            _ => return Err(Error::UnknownCommand(char::from(c))),
        };
        Ok(command)
    }
}

/// Why a session stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ending {
    EndOfStream,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Commands carried out, not counting the final `Q`.
    pub commands: usize,
    /// Bytes that were not commands.
    pub unknown: usize,
    pub ending: Ending,
}

fn next_byte(input: &mut impl Read) -> Result<Option<u8>> {
    let mut buf = [0; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Run one session: read commands from `input` and apply them to `cable` until `Q` or end of
/// stream, answering `R` on `output`.  Bytes that aren't commands are logged and skipped.
pub fn serve<C, I, O>(mut cable: C, mut input: I, mut output: O) -> Result<Summary>
    where C: Cable,
          I: Read,
          O: Write,
{
    let mut commands = 0;
    let mut unknown = 0;

    let ending = loop {
        let Some(c) = next_byte(&mut input)? else {
            break Ending::EndOfStream;
        };

        let command = match Command::try_from(c) {
            Ok(command) => command,
            Err(e) => {
                log::error!("{}", e);
                unknown += 1;
                continue;
            }
        };

        match command {
            Command::Quit => break Ending::Quit,
            Command::Blink(on) => cable.blink(on),
            Command::Reset { trst, srst } => cable.reset(trst, srst),
            Command::Write { tck, tms, tdi } => cable.write(tck, tms, tdi),
            Command::Read => {
                let reply = match cable.read() {
                    PinState::High => b'1',
                    PinState::Low => b'0',
                };
                output.write_all(&[reply])?;
                output.flush()?;
            }
        }
        commands += 1;
    };

    log::debug!("session ended ({:?}) after {} commands", ending, commands);
    Ok(Summary { commands, unknown, ending })
}
