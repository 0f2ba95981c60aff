//! The real control register, reached through a shared mapping of physical memory.
use std::ffi::c_void;
use std::fs::{File, OpenOptions};
use std::num::NonZeroUsize;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use nix::unistd::{sysconf, SysconfVar};

use super::Register;
use crate::{Error, Result};

const REG_LEN: usize = core::mem::size_of::<u32>();

pub struct DevMem {
    base: *mut c_void,
    len: usize,
    reg: *mut u32,
    // Held for the lifetime of the mapping and closed after it
    _file: File,
}

impl DevMem {
    /// Map the 32-bit register at physical address `addr` through the memory device at `path`
    /// (normally `/dev/mem`).
    pub fn map(path: impl AsRef<Path>, addr: u64) -> Result<Self> {
        let path = path.as_ref();
        if addr % REG_LEN as u64 != 0 {
            return Err(Error::Unaligned(addr));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(nix::libc::O_SYNC)
            .open(path)
            .map_err(|source| Error::Open { path: path.to_owned(), source })?;
        log::info!("{} opened", path.display());

        let page_size = match sysconf(SysconfVar::PAGE_SIZE) {
            Ok(Some(size)) if size > 0 => size as u64,
            _ => return Err(Error::PageSize),
        };

        // mmap offsets must be page aligned
        let offset = addr & !(page_size - 1);
        let skew = (addr - offset) as usize;
        let len = REG_LEN + skew;
        // never zero, the register itself is four bytes
        let length = NonZeroUsize::new(len).unwrap_or(NonZeroUsize::MIN);
        let file_offset = nix::libc::off_t::try_from(offset).map_err(|_| Error::OutOfRange(addr))?;

        // Safety: a fresh shared mapping of the device; nothing else in this process aliases it.
        let base = unsafe {
            mmap(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                file.as_raw_fd(),
                file_offset,
            )
        }
        .map_err(|source| Error::Map { addr, source })?;

        // Safety: `skew + REG_LEN == len`, so the register lies inside the mapping.
        let reg = unsafe { base.cast::<u8>().add(skew) }.cast::<u32>();
        log::info!("register {:#010x} mapped at {:p}", addr, reg);

        Ok(Self {
            base,
            len,
            reg,
            _file: file,
        })
    }
}

impl Register for DevMem {
    fn read32(&mut self) -> u32 {
        // Safety: `reg` is aligned and mapped until drop.
        unsafe { self.reg.read_volatile() }
    }

    fn write32(&mut self, value: u32) {
        // Safety: `reg` is aligned and mapped until drop.
        unsafe { self.reg.write_volatile(value) }
    }
}

impl Drop for DevMem {
    fn drop(&mut self) {
        // Safety: `base`/`len` are exactly what mmap returned and nothing borrows them past here.
        if let Err(e) = unsafe { munmap(self.base, self.len) } {
            log::warn!("munmap of {:p} failed: {}", self.base, e);
        }
    }
}
