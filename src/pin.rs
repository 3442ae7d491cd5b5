//! GPIO pin register protocol
//!
//! | Operation       | Register        | Cell            | Bits               |
//! |-----------------|-----------------|-----------------|--------------------|
//! | direction       | GPFSEL0-5       | `pin / 10`      | `(pin % 10) * 3`.. |
//! | drive high      | GPSET0-1        | `7 + pin / 32`  | `pin % 32`         |
//! | drive low       | GPCLR0-1        | `10 + pin / 32` | `pin % 32`         |
//! | read level      | GPLEV0-1        | `13 + pin / 32` | `pin % 32`         |
//! | pull value      | GPPUD           | `37`            | `1:0`, all pins    |
//! | pull clock      | GPPUDCLK0-1     | `38 + pin / 32` | `pin % 32`         |

use std::fmt;
use std::str::FromStr;
use std::thread;

use log::trace;

use crate::bank::{MappedWindow, RegisterBank};
use crate::capability::{DigitalPin, Direction, Level, Puller};
use crate::chip::{fsel, regs};
use crate::error::Error;
use crate::manager::Manager;
use crate::sysfs::SysfsNode;

/// Pull value field of GPPUD
const PUD_MASK: u32 = 0b11;

/// Pull resistor setting, as written to GPPUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    Off = 0,
    Down = 1,
    Up = 2,
}

impl FromStr for Pull {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Pull::Up),
            "down" => Ok(Pull::Down),
            "off" | "none" => Ok(Pull::Off),
            other => Err(format!("unknown pull setting: {}", other)),
        }
    }
}

/// Decoded function-select field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Input,
    Output,
    Alt0,
    Alt1,
    Alt2,
    Alt3,
    Alt4,
    Alt5,
}

impl Function {
    fn from_bits(bits: u32) -> Self {
        match bits & fsel::MASK {
            fsel::INPUT => Function::Input,
            fsel::OUTPUT => Function::Output,
            fsel::ALT0 => Function::Alt0,
            fsel::ALT1 => Function::Alt1,
            fsel::ALT2 => Function::Alt2,
            fsel::ALT3 => Function::Alt3,
            fsel::ALT4 => Function::Alt4,
            _ => Function::Alt5,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Function::Input => "input",
            Function::Output => "output",
            Function::Alt0 => "alt0",
            Function::Alt1 => "alt1",
            Function::Alt2 => "alt2",
            Function::Alt3 => "alt3",
            Function::Alt4 => "alt4",
            Function::Alt5 => "alt5",
        };
        f.write_str(name)
    }
}

/// A GPIO pin of an open [`Manager`]
///
/// Carries no state beyond its number; two handles with the same number
/// drive the same wire.
pub struct Pin<'a, B: RegisterBank = MappedWindow> {
    number: u8,
    manager: &'a Manager<B>,
}

impl<'a, B: RegisterBank> Pin<'a, B> {
    pub(crate) fn new(number: u8, manager: &'a Manager<B>) -> Self {
        Self { number, manager }
    }

    /// GPIO number this handle controls
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Sysfs handle for the same GPIO, for edge waiting
    pub fn sysfs_node(&self) -> SysfsNode {
        SysfsNode::new(self.number)
    }

    fn regs(&self) -> &B {
        self.manager.bank()
    }

    /// Bit of this pin in the one-bit-per-pin banks
    fn bit(&self) -> u32 {
        1 << (self.number % 32)
    }

    /// Offset of this pin's cell from the start of a one-bit-per-pin bank
    fn bank_offset(&self) -> usize {
        self.number as usize / 32
    }

    fn fsel_cell(&self) -> (usize, u32) {
        let n = self.number as usize;
        (regs::GPFSEL0 + n / 10, (n as u32 % 10) * 3)
    }

    /// Configure the pin as input or output
    ///
    /// Only this pin's three function-select bits change.
    pub fn set_direction(&self, direction: Direction) {
        let (cell, shift) = self.fsel_cell();
        let value = match direction {
            Direction::In => fsel::INPUT,
            Direction::Out => fsel::OUTPUT,
        };

        let _guard = self.manager.lock_registers();
        let current = self.regs().read(cell);
        self.regs()
            .write(cell, (current & !(fsel::MASK << shift)) | (value << shift));
    }

    /// Current function-select setting
    pub fn function(&self) -> Function {
        let (cell, shift) = self.fsel_cell();
        Function::from_bits(self.regs().read(cell) >> shift)
    }

    /// Drive the pin high or low
    pub fn set_value(&self, value: Level) {
        let base = match value {
            Level::High => regs::GPSET0,
            Level::Low => regs::GPCLR0,
        };
        self.regs().write(base + self.bank_offset(), self.bit());
    }

    /// Sample the pin level
    pub fn value(&self) -> Level {
        let level = self.regs().read(regs::GPLEV0 + self.bank_offset());
        Level::from(level & self.bit() != 0)
    }

    /// Enable the pull-up resistor
    pub fn pull_up(&self) {
        self.set_pull(Pull::Up);
    }

    /// Enable the pull-down resistor
    pub fn pull_down(&self) {
        self.set_pull(Pull::Down);
    }

    /// Disable the pull resistor
    pub fn stop_pulling(&self) {
        self.set_pull(Pull::Off);
    }

    /// Latch a pull setting onto this pin
    ///
    /// GPPUD is shared by every pin and only takes effect when clocked into
    /// a pin through GPPUDCLK, with a settling delay either side of the
    /// clock. Both registers are returned to zero afterwards.
    pub fn set_pull(&self, pull: Pull) {
        let clock = regs::GPPUDCLK0 + self.bank_offset();
        let settle = self.manager.settle();
        let bank = self.regs();

        let _guard = self.manager.lock_registers();
        trace!("GPIO {}: pull {:?}", self.number, pull);

        let pud = bank.read(regs::GPPUD);
        bank.write(regs::GPPUD, (pud & !PUD_MASK) | pull as u32);
        thread::sleep(settle);

        bank.write(clock, self.bit());
        thread::sleep(settle);

        let pud = bank.read(regs::GPPUD);
        bank.write(regs::GPPUD, pud & !PUD_MASK);
        bank.write(clock, 0);
    }
}

impl<B: RegisterBank> Clone for Pin<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: RegisterBank> Copy for Pin<'_, B> {}

impl<B: RegisterBank> fmt::Debug for Pin<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pin").field("number", &self.number).finish()
    }
}

impl<B: RegisterBank> DigitalPin for Pin<'_, B> {
    type Error = Error;

    fn set_direction(&self, direction: Direction) -> Result<(), Error> {
        Pin::set_direction(self, direction);
        Ok(())
    }

    fn set_value(&self, value: Level) -> Result<(), Error> {
        Pin::set_value(self, value);
        Ok(())
    }

    fn value(&self) -> Result<Level, Error> {
        Ok(Pin::value(self))
    }
}

impl<B: RegisterBank> Puller for Pin<'_, B> {
    type Error = Error;

    fn pull_up(&self) -> Result<(), Error> {
        Pin::pull_up(self);
        Ok(())
    }

    fn pull_down(&self) -> Result<(), Error> {
        Pin::pull_down(self);
        Ok(())
    }

    fn stop_pulling(&self) -> Result<(), Error> {
        Pin::stop_pulling(self);
        Ok(())
    }
}
