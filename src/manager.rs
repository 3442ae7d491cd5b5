//! GPIO manager
//!
//! The [`Manager`] owns the register window. Pins borrow it, so none can
//! outlive [`Manager::close`].

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::bank::{MappedWindow, RegisterBank};
use crate::chip::{regs, Chip};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pin::Pin;

/// Access point for the BCM2835 GPIO registers
pub struct Manager<B: RegisterBank = MappedWindow> {
    bank: B,
    chip: Chip,
    settle: Duration,
    /// Held across function-select read-modify-writes and pull sequences
    registers: Mutex<()>,
}

impl Manager<MappedWindow> {
    /// Map the registers of a BCM2835 through `/dev/mem`
    pub fn open() -> Result<Self> {
        Self::open_with(&Config::default())
    }

    /// Map the registers described by `config`
    ///
    /// Fails with [`Error::AlreadyOpen`] while another manager is open.
    pub fn open_with(config: &Config) -> Result<Self> {
        let bank = MappedWindow::open(config)?;
        Self::with_bank(bank, config)
    }

    /// Unmap the registers
    ///
    /// A new manager can be opened afterwards even if unmapping fails.
    pub fn close(self) -> Result<()> {
        self.bank.close()
    }
}

impl<B: RegisterBank> Manager<B> {
    /// Wrap an existing register bank
    pub fn with_bank(bank: B, config: &Config) -> Result<Self> {
        // The pull clock bank is the highest register touched
        if bank.len() < regs::GPPUDCLK0 + 2 {
            return Err(Error::BadWindow {
                len: bank.len() * 4,
            });
        }
        Ok(Self {
            bank,
            chip: config.chip,
            settle: config.settle(),
            registers: Mutex::new(()),
        })
    }

    /// Pin handle for a GPIO number
    pub fn pin(&self, number: u8) -> Result<Pin<'_, B>> {
        self.chip.check_pin(number)?;
        Ok(Pin::new(number, self))
    }

    /// Handles for every GPIO on the chip
    pub fn pins(&self) -> impl Iterator<Item = Pin<'_, B>> {
        (0..=self.chip.max_pin()).map(move |n| Pin::new(n, self))
    }

    /// Chip variant the registers belong to
    pub fn chip(&self) -> Chip {
        self.chip
    }

    /// Pull-control settling interval
    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Underlying register bank
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Give back the register bank without unmapping it
    pub fn into_bank(self) -> B {
        self.bank
    }

    pub(crate) fn lock_registers(&self) -> MutexGuard<'_, ()> {
        self.registers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: RegisterBank> fmt::Debug for Manager<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("chip", &self.chip)
            .field("cells", &self.bank.len())
            .field("settle", &self.settle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::SimulatedWindow;

    #[test]
    fn test_pin_range_checked() {
        let manager = Manager::with_bank(SimulatedWindow::new(), &Config::default()).unwrap();
        assert_eq!(manager.pin(53).unwrap().number(), 53);
        assert!(matches!(
            manager.pin(54),
            Err(Error::InvalidPin { pin: 54, max: 53 })
        ));
        assert_eq!(manager.pins().count(), 54);
    }

    #[test]
    fn test_rejects_short_bank() {
        let bank = SimulatedWindow::with_len(64).unwrap();
        assert!(matches!(
            Manager::with_bank(bank, &Config::default()),
            Err(Error::BadWindow { len: 64 })
        ));
    }

    #[test]
    fn test_config_carried() {
        let config = Config::new(Chip::Bcm2837).with_settle(Duration::from_micros(3));
        let manager = Manager::with_bank(SimulatedWindow::new(), &config).unwrap();
        assert_eq!(manager.chip(), Chip::Bcm2837);
        assert_eq!(manager.settle(), Duration::from_micros(3));
    }
}
