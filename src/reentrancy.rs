//! Debug-only guard against reentrant calls into a table.
//!
//! Probing calls the user's `Eq` implementation. An `Eq` that reaches back
//! into the table it is being compared in would run while the probe is
//! mid-walk, so in debug builds the guard records which operation is
//! active and panics on nested entry, naming both operations. In release
//! builds it is a zero-sized no-op.
//!
//! Active operations are tracked per thread, keyed by a table id. Readers
//! on different threads never see each other's entries, so tables stay
//! `Sync` and concurrent lookups through `&self` are fine.

#[cfg(debug_assertions)]
use std::cell::RefCell;
#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

#[cfg(debug_assertions)]
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

#[cfg(debug_assertions)]
thread_local! {
    // (table id, operation) for every guard alive on this thread.
    static ACTIVE: RefCell<Vec<(u64, &'static str)>> = const { RefCell::new(Vec::new()) };
}

/// Per-table tracker. Guard an operation with
/// `let _g = self.reentrancy.enter("find");`.
#[derive(Debug)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    id: u64,
}

impl DebugReentrancy {
    pub fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Marks `operation` as running until the returned guard drops.
    ///
    /// Panics in debug builds if this thread is already inside a guarded
    /// operation on the same table.
    #[inline]
    pub fn enter(&self, operation: &'static str) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            let outer = ACTIVE.with(|active| {
                let mut active = active.borrow_mut();
                let outer = active
                    .iter()
                    .find(|(id, _)| *id == self.id)
                    .map(|(_, op)| *op);
                if outer.is_none() {
                    active.push((self.id, operation));
                }
                outer
            });
            if let Some(outer) = outer {
                panic!("reentrant call to `{operation}` while `{outer}` is probing the table");
            }
            return ReentrancyGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = operation;
            return ReentrancyGuard { _owner: PhantomData };
        }
    }

    /// Name of the operation this thread is running inside the table, if any.
    pub fn active(&self) -> Option<&'static str> {
        #[cfg(debug_assertions)]
        return ACTIVE.with(|active| {
            active
                .borrow()
                .iter()
                .find(|(id, _)| *id == self.id)
                .map(|(_, op)| *op)
        });
        #[cfg(not(debug_assertions))]
        return None;
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`DebugReentrancy::enter`].
pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(i) = active.iter().rposition(|(id, _)| *id == self.owner.id) {
                active.remove(i);
            }
        });
    }
}
