//! Driver configuration
//!
//! Loaded from TOML, e.g.:
//!
//! ```toml
//! chip = "bcm2837"
//! access = "gpiomem"
//! settle_micros = 1
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::chip::Chip;
use crate::error::{Error, Result};

/// Default pull-control settling interval
pub const DEFAULT_SETTLE_MICROS: u64 = 1;

/// Which memory device exposes the register window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// `/dev/mem`, mapped at the chip's GPIO physical address (needs root)
    #[default]
    Mem,
    /// `/dev/gpiomem`, a GPIO-only window starting at offset 0
    Gpiomem,
}

impl Access {
    /// Default device node for this access mode
    pub fn default_device(self) -> &'static Path {
        match self {
            Access::Mem => Path::new("/dev/mem"),
            Access::Gpiomem => Path::new("/dev/gpiomem"),
        }
    }
}

/// Configuration for opening a [`Manager`](crate::Manager)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Chip variant (selects the GPIO physical address)
    pub chip: Chip,
    /// Memory device flavour
    pub access: Access,
    /// Device node override
    pub device: Option<PathBuf>,
    /// Pull-control settling interval in microseconds
    pub settle_micros: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chip: Chip::default(),
            access: Access::default(),
            device: None,
            settle_micros: DEFAULT_SETTLE_MICROS,
        }
    }
}

impl Config {
    /// Create a configuration for the given chip with default settings
    pub fn new(chip: Chip) -> Self {
        Self {
            chip,
            ..Default::default()
        }
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse TOML configuration content
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Set the chip variant
    pub fn with_chip(mut self, chip: Chip) -> Self {
        self.chip = chip;
        self
    }

    /// Set the access mode
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Override the device node path
    pub fn with_device(mut self, device: impl Into<PathBuf>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Set the pull-control settling interval
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle_micros = settle.as_micros() as u64;
        self
    }

    /// Device node that will be opened
    pub fn device_path(&self) -> &Path {
        self.device
            .as_deref()
            .unwrap_or_else(|| self.access.default_device())
    }

    /// Offset into the device at which the register window starts
    pub fn map_offset(&self) -> u64 {
        match self.access {
            Access::Mem => self.chip.gpio_base(),
            Access::Gpiomem => 0,
        }
    }

    /// Pull-control settling interval
    pub fn settle(&self) -> Duration {
        Duration::from_micros(self.settle_micros)
    }
}
