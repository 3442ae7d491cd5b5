//! In-memory register window
//!
//! Stands in for the mapped window in tests and dry runs. Every store is
//! recorded in a journal, and stores to GPSET/GPCLR drive the GPLEV bits of
//! pins whose function select is Output, the way the pads do on hardware.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use super::RegisterBank;
use crate::chip::{fsel, regs, GPIO_COUNT, WINDOW_LEN};
use crate::error::{Error, Result};

/// One recorded store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub index: usize,
    pub value: u32,
}

/// Simulated GPIO register window
#[derive(Debug)]
pub struct SimulatedWindow {
    cells: Vec<AtomicU32>,
    journal: Mutex<Vec<RegisterWrite>>,
}

impl Default for SimulatedWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedWindow {
    /// A zeroed window of the real mapping's length
    pub fn new() -> Self {
        Self {
            cells: (0..WINDOW_LEN / 4).map(|_| AtomicU32::new(0)).collect(),
            journal: Mutex::new(Vec::new()),
        }
    }

    /// A zeroed window of `len` bytes
    pub fn with_len(len: usize) -> Result<Self> {
        if len == 0 || len % 4 != 0 {
            return Err(Error::BadWindow { len });
        }
        Ok(Self {
            cells: (0..len / 4).map(|_| AtomicU32::new(0)).collect(),
            journal: Mutex::new(Vec::new()),
        })
    }

    /// Current value of a cell, without touching the journal
    pub fn peek(&self, index: usize) -> u32 {
        self.cells[index].load(Ordering::SeqCst)
    }

    /// Set a cell directly, bypassing the journal and the pad model
    ///
    /// Useful for presenting an external input level in GPLEV.
    pub fn poke(&self, index: usize, value: u32) {
        self.cells[index].store(value, Ordering::SeqCst);
    }

    /// Copy of every cell
    pub fn snapshot(&self) -> Vec<u32> {
        self.cells.iter().map(|c| c.load(Ordering::SeqCst)).collect()
    }

    /// Stores recorded so far, oldest first
    pub fn journal(&self) -> Vec<RegisterWrite> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget recorded stores
    pub fn clear_journal(&self) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn is_output(&self, pin: usize) -> bool {
        let sel = self.peek(regs::GPFSEL0 + pin / 10);
        (sel >> ((pin % 10) * 3)) & fsel::MASK == fsel::OUTPUT
    }

    /// Apply a GPSET/GPCLR store to the level register
    fn drive_pads(&self, bank: usize, value: u32, high: bool) {
        let level = &self.cells[regs::GPLEV0 + bank];
        for bit in 0..32 {
            let pin = bank * 32 + bit;
            if value & (1 << bit) == 0 || pin >= GPIO_COUNT as usize || !self.is_output(pin) {
                continue;
            }
            if high {
                level.fetch_or(1 << bit, Ordering::SeqCst);
            } else {
                level.fetch_and(!(1 << bit), Ordering::SeqCst);
            }
        }
    }
}

impl RegisterBank for SimulatedWindow {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn read(&self, index: usize) -> u32 {
        self.peek(index)
    }

    fn write(&self, index: usize, value: u32) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RegisterWrite { index, value });
        self.cells[index].store(value, Ordering::SeqCst);

        match index {
            i if (regs::GPSET0..regs::GPSET0 + 2).contains(&i) => {
                self.drive_pads(i - regs::GPSET0, value, true)
            }
            i if (regs::GPCLR0..regs::GPCLR0 + 2).contains(&i) => {
                self.drive_pads(i - regs::GPCLR0, value, false)
            }
            _ => {}
        }
    }
}
