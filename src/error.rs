//! Error types for the GPIO driver
//!
//! Every recoverable failure is returned to the immediate caller. Register
//! operations on a constructed [`Pin`](crate::Pin) have no error path.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the mapper, the manager and their collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// A register window is already mapped by this process
    #[error("BCM2835 GPIO registers are already mapped by this process")]
    AlreadyOpen,

    /// The memory device could not be opened (usually a permission problem)
    #[error("failed to open {}: {source}", .path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `mmap` rejected the register window
    #[error("failed to map GPIO register window at offset {offset:#x}: {source}")]
    Map {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// `munmap` failed while closing the window
    #[error("failed to unmap GPIO register window: {source}")]
    Unmap {
        #[source]
        source: io::Error,
    },

    /// The mapped region cannot be viewed as 32-bit cells
    #[error("register window of {len} bytes is not a non-empty, aligned run of 32-bit cells")]
    BadWindow { len: usize },

    /// Pin number outside the chip's GPIO range
    #[error("GPIO {pin} does not exist (highest GPIO is {max})")]
    InvalidPin { pin: u8, max: u8 },

    /// Chip name not present in the chip table
    #[error("unknown chip: {0}")]
    UnknownChip(String),

    /// Configuration file could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file is not valid TOML for [`Config`](crate::Config)
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A sysfs GPIO attribute could not be read or written
    #[error("sysfs access to {} failed: {source}", .path.display())]
    Sysfs {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the underlying OS error is a permission denial
    ///
    /// Opening `/dev/mem` without root is the dominant real-world failure.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::DeviceOpen { source, .. } | Error::Map { source, .. } => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}
