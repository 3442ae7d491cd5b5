//! Memory-mapped GPIO register window
//!
//! Opens the memory device with `O_SYNC`, maps one page of the GPIO bank
//! with `MAP_SHARED`, and exposes it as volatile 32-bit cells. Only one
//! window may be mapped per process.

use std::fs::OpenOptions;
use std::io;
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use super::RegisterBank;
use crate::chip::WINDOW_LEN;
use crate::config::Config;
use crate::error::{Error, Result};

/// Set while a window is mapped anywhere in the process
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Whether this process currently holds the register mapping
pub fn is_open() -> bool {
    ACTIVE.load(Ordering::Acquire)
}

/// Ownership of the process-wide mapping slot; released on drop
#[derive(Debug)]
struct ActiveMarker(());

impl ActiveMarker {
    fn acquire() -> Result<Self> {
        ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ActiveMarker(()))
            .map_err(|_| Error::AlreadyOpen)
    }
}

impl Drop for ActiveMarker {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
    }
}

/// The live GPIO register window
#[derive(Debug)]
pub struct MappedWindow {
    cells: NonNull<u32>,
    len: usize,
    mapped: bool,
    _marker: ActiveMarker,
}

// The window is device memory accessed only through volatile loads and
// stores; read-modify-write sequences are serialized by the manager.
unsafe impl Send for MappedWindow {}
unsafe impl Sync for MappedWindow {}

impl MappedWindow {
    /// Map the GPIO register window described by `config`
    pub fn open(config: &Config) -> Result<Self> {
        let marker = ActiveMarker::acquire()?;

        let path = config.device_path();
        let offset = config.map_offset();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|source| Error::DeviceOpen {
                path: path.to_path_buf(),
                source,
            })?;

        let file_offset = libc::off_t::try_from(offset).map_err(|_| Error::Map {
            offset,
            source: io::Error::from(io::ErrorKind::InvalidInput),
        })?;

        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                WINDOW_LEN,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                file_offset,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(Error::Map {
                offset,
                source: io::Error::last_os_error(),
            });
        }

        // The descriptor is not needed once the mapping exists
        drop(file);

        match unsafe { Self::from_raw(base.cast::<u8>(), WINDOW_LEN, marker) } {
            Ok(window) => {
                debug!(
                    "mapped {} bytes of {} at offset {:#x} ({})",
                    WINDOW_LEN,
                    path.display(),
                    offset,
                    config.chip
                );
                Ok(window)
            }
            Err(e) => {
                unsafe { libc::munmap(base, WINDOW_LEN) };
                Err(e)
            }
        }
    }

    /// View a mapped byte region as 32-bit cells
    ///
    /// This is the only place the byte mapping is reinterpreted.
    ///
    /// # Safety
    /// `base` must point to `len` bytes mapped with read/write access that
    /// stay mapped until this window is unmapped.
    unsafe fn from_raw(base: *mut u8, len: usize, marker: ActiveMarker) -> Result<Self> {
        if len == 0 || len % mem::size_of::<u32>() != 0 {
            return Err(Error::BadWindow { len });
        }
        if (base as usize) % mem::align_of::<u32>() != 0 {
            return Err(Error::BadWindow { len });
        }
        let cells = NonNull::new(base.cast::<u32>()).ok_or(Error::BadWindow { len })?;

        Ok(Self {
            cells,
            len: len / mem::size_of::<u32>(),
            mapped: true,
            _marker: marker,
        })
    }

    /// Unmap the window
    ///
    /// The process-wide slot is released whether or not `munmap` succeeds.
    pub fn close(mut self) -> Result<()> {
        self.unmap()
    }

    fn unmap(&mut self) -> Result<()> {
        if !self.mapped {
            return Ok(());
        }
        self.mapped = false;

        let bytes = self.len * mem::size_of::<u32>();
        let rc = unsafe { libc::munmap(self.cells.as_ptr().cast(), bytes) };
        if rc != 0 {
            return Err(Error::Unmap {
                source: io::Error::last_os_error(),
            });
        }
        debug!("unmapped GPIO register window");
        Ok(())
    }

    fn cell(&self, index: usize) -> *mut u32 {
        assert!(
            index < self.len,
            "register index {} outside window of {} cells",
            index,
            self.len
        );
        unsafe { self.cells.as_ptr().add(index) }
    }
}

impl RegisterBank for MappedWindow {
    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, index: usize) -> u32 {
        unsafe { ptr::read_volatile(self.cell(index)) }
    }

    fn write(&self, index: usize, value: u32) {
        unsafe { ptr::write_volatile(self.cell(index), value) }
    }
}

impl Drop for MappedWindow {
    fn drop(&mut self) {
        if self.mapped {
            warn!("GPIO register window dropped without close");
            if let Err(e) = self.unmap() {
                warn!("{}", e);
            }
        }
    }
}
