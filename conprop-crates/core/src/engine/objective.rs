use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use log::debug;

/// The best objective value found by any thread.
///
/// The value only ever decreases. Threads publish their solutions with
/// [`SharedObjective::improve`] and read the current incumbent with [`SharedObjective::best`]
/// before deciding what bound to enforce.
#[derive(Debug)]
pub struct SharedObjective {
    best: AtomicI64,
}

const NO_INCUMBENT: i64 = i64::MAX;

impl Default for SharedObjective {
    fn default() -> Self {
        SharedObjective {
            best: AtomicI64::new(NO_INCUMBENT),
        }
    }
}

impl SharedObjective {
    /// Publishes a solution with cost `value`. Returns whether it improved on the incumbent.
    pub fn improve(&self, value: i64) -> bool {
        let previous = self.best.fetch_min(value, Ordering::Release);
        let improved = value < previous;
        if improved {
            debug!("objective improved from {previous} to {value}");
        }
        improved
    }

    pub fn best(&self) -> Option<i64> {
        match self.best.load(Ordering::Acquire) {
            NO_INCUMBENT => None,
            value => Some(value),
        }
    }
}
