//! BCM2835-family chip constants
//!
//! The BCM2835, BCM2836 and BCM2837 share one GPIO register layout and
//! differ only in where the peripheral block sits in the ARM physical
//! address space.
//!
//! | Chip    | Boards           | Peripheral base | GPIO base   |
//! |---------|------------------|-----------------|-------------|
//! | BCM2835 | Pi 1, Zero       | 0x2000_0000     | 0x2020_0000 |
//! | BCM2836 | Pi 2             | 0x3F00_0000     | 0x3F20_0000 |
//! | BCM2837 | Pi 3, Zero 2     | 0x3F00_0000     | 0x3F20_0000 |

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Offset of the GPIO bank inside the peripheral block
pub const GPIO_OFFSET: u64 = 0x20_0000;

/// Size of the mapped register window (one page)
pub const WINDOW_LEN: usize = 4096;

/// Number of GPIOs exposed by every chip in the family
pub const GPIO_COUNT: u8 = 54;

/// GPIO register cell indices (byte offset / 4)
pub mod regs {
    /// Function Select 0 (pins 0-9); GPFSEL1..5 follow
    pub const GPFSEL0: usize = 0x00 / 4;
    /// Pin Output Set 0; GPSET1 follows
    pub const GPSET0: usize = 0x1C / 4;
    /// Pin Output Clear 0; GPCLR1 follows
    pub const GPCLR0: usize = 0x28 / 4;
    /// Pin Level 0; GPLEV1 follows
    pub const GPLEV0: usize = 0x34 / 4;
    /// Pull-up/down enable, shared by all pins
    pub const GPPUD: usize = 0x94 / 4;
    /// Pull-up/down Clock 0; GPPUDCLK1 follows
    pub const GPPUDCLK0: usize = 0x98 / 4;
}

/// Function select field values
pub mod fsel {
    pub const INPUT: u32 = 0b000;
    pub const OUTPUT: u32 = 0b001;
    pub const ALT0: u32 = 0b100;
    pub const ALT1: u32 = 0b101;
    pub const ALT2: u32 = 0b110;
    pub const ALT3: u32 = 0b111;
    pub const ALT4: u32 = 0b011;
    pub const ALT5: u32 = 0b010;
    /// Width mask of one pin's field
    pub const MASK: u32 = 0b111;
}

/// Supported chip variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Chip {
    #[default]
    Bcm2835,
    Bcm2836,
    Bcm2837,
}

impl Chip {
    /// All variants, in table order
    pub const ALL: [Chip; 3] = [Chip::Bcm2835, Chip::Bcm2836, Chip::Bcm2837];

    /// Canonical lower-case name
    pub fn name(self) -> &'static str {
        match self {
            Chip::Bcm2835 => "bcm2835",
            Chip::Bcm2836 => "bcm2836",
            Chip::Bcm2837 => "bcm2837",
        }
    }

    /// Boards built on this chip
    pub fn boards(self) -> &'static str {
        match self {
            Chip::Bcm2835 => "Raspberry Pi 1, Zero",
            Chip::Bcm2836 => "Raspberry Pi 2",
            Chip::Bcm2837 => "Raspberry Pi 3, Zero 2",
        }
    }

    /// Physical base address of the peripheral block
    pub fn peripheral_base(self) -> u64 {
        match self {
            Chip::Bcm2835 => 0x2000_0000,
            Chip::Bcm2836 | Chip::Bcm2837 => 0x3F00_0000,
        }
    }

    /// Physical address of the GPIO register bank
    pub fn gpio_base(self) -> u64 {
        self.peripheral_base() + GPIO_OFFSET
    }

    /// Highest valid GPIO number
    pub fn max_pin(self) -> u8 {
        GPIO_COUNT - 1
    }

    /// Check a pin number against this chip's range
    pub fn check_pin(self, pin: u8) -> Result<()> {
        if pin > self.max_pin() {
            return Err(Error::InvalidPin {
                pin,
                max: self.max_pin(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry of chip names and board aliases
static CHIPS: Lazy<HashMap<&'static str, Chip>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("bcm2835", Chip::Bcm2835);
    m.insert("pi1", Chip::Bcm2835);
    m.insert("zero", Chip::Bcm2835);
    m.insert("bcm2836", Chip::Bcm2836);
    m.insert("pi2", Chip::Bcm2836);
    m.insert("bcm2837", Chip::Bcm2837);
    m.insert("pi3", Chip::Bcm2837);
    m.insert("zero2", Chip::Bcm2837);
    m
});

/// Look up a chip by name or board alias (case-insensitive)
pub fn lookup(name: &str) -> Option<Chip> {
    CHIPS.get(name.trim().to_lowercase().as_str()).copied()
}

impl FromStr for Chip {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        lookup(s).ok_or_else(|| Error::UnknownChip(s.to_string()))
    }
}

impl TryFrom<String> for Chip {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}
