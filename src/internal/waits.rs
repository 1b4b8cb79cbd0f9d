//! Process-wide record of which thread is waiting on which, used to turn a cross-thread
//! singleton cycle into an error instead of a deadlock.

use std::thread::{self, ThreadId};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::internal::FastMap;

struct Edge {
    owner: ThreadId,
    slot: usize,
}

// waiter -> thread it waits on; every insertion is checked, so the graph stays acyclic
static WAITING_ON: Lazy<Mutex<FastMap<ThreadId, Edge>>> =
    Lazy::new(|| Mutex::new(FastMap::default()));

/// The current thread's wait on another thread, removed on drop.
pub(crate) struct WaitGuard {
    waiter: ThreadId,
}

impl WaitGuard {
    /// Records that the current thread is about to wait for `owner` to finish `slot`.
    ///
    /// Returns `None` when `owner` is, directly or transitively, waiting on the current
    /// thread; waiting would then never end.
    pub(crate) fn enter(owner: ThreadId, slot: usize) -> Option<Self> {
        let waiter = thread::current().id();
        let mut edges = WAITING_ON.lock();

        let mut next = Some(owner);
        while let Some(thread) = next {
            if thread == waiter {
                return None;
            }
            next = edges.get(&thread).map(|edge| edge.owner);
        }

        edges.insert(waiter, Edge { owner, slot });
        Some(Self { waiter })
    }
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        WAITING_ON.lock().remove(&self.waiter);
    }
}

/// Drops every wait on `slot`. Called by its owner once the outcome is settled, before
/// the waiters get to run again.
pub(crate) fn release(slot: usize) {
    WAITING_ON.lock().retain(|_, edge| edge.slot != slot);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_on_yourself_is_refused() {
        assert!(WaitGuard::enter(thread::current().id(), 1).is_none());
    }

    #[test]
    fn wait_back_along_the_chain_is_refused() {
        let here = thread::current().id();
        let other = thread::spawn(|| thread::current().id()).join().unwrap();

        // `other` waits on this thread until the slot is released
        WAITING_ON.lock().insert(other, Edge { owner: here, slot: 7 });
        assert!(WaitGuard::enter(other, 8).is_none());
        release(7);

        let guard = WaitGuard::enter(other, 8).unwrap();
        assert!(WAITING_ON.lock().get(&here).is_some_and(|edge| edge.owner == other));
        drop(guard);
        assert!(WAITING_ON.lock().get(&here).is_none());
    }
}
