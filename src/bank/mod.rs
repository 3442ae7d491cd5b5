//! Register bank access
//!
//! This module provides:
//! - The [`RegisterBank`] trait: a window of 32-bit GPIO register cells
//! - [`MappedWindow`]: the live window mapped from `/dev/mem` or `/dev/gpiomem`
//! - [`SimulatedWindow`]: an in-memory window with a write journal

pub mod mapped;
pub mod simulated;

pub use mapped::MappedWindow;
pub use simulated::{RegisterWrite, SimulatedWindow};

/// A window of consecutive 32-bit register cells
///
/// Index 0 is the first register of the GPIO bank (GPFSEL0). Accesses take
/// `&self`: the cells are device memory, and callers that need atomic
/// read-modify-write sequences hold the manager's register lock.
pub trait RegisterBank: Send + Sync {
    /// Number of 32-bit cells in the window
    fn len(&self) -> usize;

    /// Load one cell
    fn read(&self, index: usize) -> u32;

    /// Store one cell
    fn write(&self, index: usize, value: u32);

    /// Whether the window has no cells
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
