use std::sync::{Condvar, Mutex};

use crate::error::MonitorError;

/// A signal-remembering condition variable.
///
/// Solves the classic lost-wakeup problem: a [`signal`](Monitor::signal)
/// delivered before any [`wait`](Monitor::wait) is not lost — the latch
/// stays set ("sticky") until an explicit [`reset`](Monitor::reset).
///
/// ```text
/// producer: signal() ----.
///                          \
/// consumer:          wait() -> returns immediately, even though it started
///                               waiting after the signal fired
/// ```
///
/// Unlike a plain `Condvar`, a thread that calls `wait` after the signal has
/// already fired still observes it: there is no window in which a wakeup
/// can be missed.
pub struct Monitor {
    signalled: Mutex<bool>,
    condvar: Condvar,
}

impl Monitor {
    /// Creates a new monitor, optionally pre-signalled.
    pub fn new(initially_signalled: bool) -> Self {
        Self {
            signalled: Mutex::new(initially_signalled),
            condvar: Condvar::new(),
        }
    }

    /// Sets the latch and wakes every waiter. Idempotent: signalling an
    /// already-signalled monitor has no additional effect.
    pub fn signal(&self) {
        let mut signalled = match self.signalled.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *signalled = true;
        self.condvar.notify_all();
    }

    /// Clears the latch. Does not wake anyone.
    pub fn reset(&self) {
        let mut signalled = match self.signalled.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *signalled = false;
    }

    /// Blocks the calling thread until the monitor is signalled.
    ///
    /// Returns immediately if the monitor was already signalled before this
    /// call. Re-checks the latch after every wakeup to absorb spurious
    /// wakeups. Does **not** clear the latch — only [`reset`](Self::reset)
    /// does that.
    pub fn wait(&self) -> Result<(), MonitorError> {
        let guard = self
            .signalled
            .lock()
            .map_err(|_| MonitorError::Primitive("monitor mutex poisoned".into()))?;
        let _guard = self
            .condvar
            .wait_while(guard, |signalled| !*signalled)
            .map_err(|_| MonitorError::Primitive("monitor mutex poisoned while waiting".into()))?;
        Ok(())
    }

    /// Non-blocking peek at the latch, without waiting.
    pub fn is_signalled(&self) -> bool {
        match self.signalled.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
