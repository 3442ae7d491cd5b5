//! BCM2835 GPIO
//!
//! Direct GPIO register access for the Broadcom BCM2835 family (Raspberry
//! Pi 1, Zero, 2 and 3) through a memory mapping of `/dev/mem` or
//! `/dev/gpiomem`.
//!
//! # Features
//!
//! - **Register window**: one exclusively owned mapping per process
//! - **Pin control**: direction, level, and the timed pull-up/down handshake
//! - **Simulation**: an in-memory register bank for tests and dry runs
//! - **Sysfs fallback**: edge waiting through `/sys/class/gpio`
//!
//! # Usage
//!
//! ```no_run
//! use bcm2835_gpio::{Direction, Level, Manager};
//!
//! # fn main() -> bcm2835_gpio::Result<()> {
//! let gpio = Manager::open()?;
//! let led = gpio.pin(17)?;
//! led.set_direction(Direction::Out);
//! led.set_value(Level::High);
//! gpio.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! Most systems only grant `/dev/mem` to root. Raspberry Pi OS exposes
//! `/dev/gpiomem` to the `gpio` group; select it with [`Access::Gpiomem`].

pub mod bank;
pub mod capability;
pub mod chip;
pub mod config;
pub mod error;
pub mod manager;
pub mod pin;
pub mod sysfs;

pub use bank::{MappedWindow, RegisterBank, SimulatedWindow};
pub use capability::{DigitalPin, Direction, Level, Puller};
pub use chip::Chip;
pub use config::{Access, Config};
pub use error::{Error, Result};
pub use manager::Manager;
pub use pin::{Function, Pin, Pull};
pub use sysfs::{Edge, SysfsNode};
