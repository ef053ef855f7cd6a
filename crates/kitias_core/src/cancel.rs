//! Per-operation cancellation signal.
//!
//! # Responsibility
//! - Let a caller abort an in-flight provider operation from another thread.
//! - Forward the signal to SQLite through a bound `InterruptHandle`.
//!
//! # Invariants
//! - Cancellation is sticky: once cancelled, a token stays cancelled.
//! - At most one interrupt handle is bound at a time; binding is released
//!   when the returned guard drops.

use rusqlite::InterruptHandle;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Marker error returned once a token has been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl Display for Cancelled {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("operation cancelled")
    }
}

impl Error for Cancelled {}

/// Cloneable, thread-safe cancellation token.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenState>,
}

#[derive(Default)]
struct TokenState {
    cancelled: AtomicBool,
    interrupt: Mutex<Option<InterruptHandle>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled and interrupts a bound SQLite statement.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        if let Ok(slot) = self.inner.interrupt.lock() {
            if let Some(handle) = slot.as_ref() {
                handle.interrupt();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` once `cancel` has been called.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Binds a connection interrupt handle until the guard drops.
    pub(crate) fn bind_interrupt(&self, handle: InterruptHandle) -> InterruptBinding {
        if let Ok(mut slot) = self.inner.interrupt.lock() {
            *slot = Some(handle);
        }
        InterruptBinding {
            token: self.clone(),
        }
    }
}

impl Debug for CancellationToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Releases the bound interrupt handle on drop.
pub(crate) struct InterruptBinding {
    token: CancellationToken,
}

impl Drop for InterruptBinding {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.token.inner.interrupt.lock() {
            *slot = None;
        }
    }
}
