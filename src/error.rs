use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open '{}'", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "devmem")]
    #[error("mmap of register {addr:#010x} failed")]
    Map {
        addr: u64,
        #[source]
        source: nix::Error,
    },

    #[error("cannot determine the system page size")]
    PageSize,

    #[error("register address {0:#010x} is not 32-bit aligned")]
    Unaligned(u64),

    #[error("register address {0:#010x} is out of range for the memory device")]
    OutOfRange(u64),

    #[error("unknown command {0:?} received")]
    UnknownCommand(char),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
