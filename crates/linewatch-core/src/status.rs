//! Thread-safe "object on line" flag

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Single boolean written by the frame loop and read by any number of pollers.
///
/// The lock only ever covers the read or write of the flag itself.
#[derive(Debug, Default)]
pub struct StatusRegister {
    flag: Mutex<bool>,
}

impl StatusRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: bool) {
        *self.lock() = value;
    }

    pub fn get(&self) -> bool {
        *self.lock()
    }

    // A bool cannot be left half-written, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.flag.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
