//! Busy Guard
//!
//! Non-blocking single-flight lock for the transmission session.
//! The start path acquires it with a try-lock and fails fast; only
//! natural completion or a stop request releases it. Releasing an
//! already released guard is a no-op.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Try-acquire / release flag
#[derive(Debug, Default)]
pub struct BusyGuard {
    held: AtomicBool,
}

impl BusyGuard {
    /// Create a released guard
    #[must_use]
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Take the guard without waiting
    ///
    /// # Errors
    /// `Error::Busy` if it is already held.
    pub fn try_acquire(&self) -> Result<()> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| Error::Busy)
    }

    /// Release the guard, whoever holds it
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    /// Check if a session holds the guard
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Fail with `Busy` while the guard is held
    ///
    /// # Errors
    /// `Error::Busy` if a session is active.
    pub fn ensure_released(&self) -> Result<()> {
        if self.is_held() {
            Err(Error::Busy)
        } else {
            Ok(())
        }
    }
}
