//! Test-and-set spin lock.
//!
//! The simplest mutual-exclusion primitive: one atomic flag, acquired by
//! swapping in `true` until the previous value was `false`. Waiters spin with
//! `crossbeam_utils::Backoff`, which escalates from `spin_loop` hints to
//! `thread::yield_now` so oversubscribed runs still make progress.
//!
//! There is no fairness and no poisoning. Critical sections guarded by this
//! lock must be short and must not panic while holding the guard.

use crossbeam_utils::Backoff;
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct TasLock<T> {
    locked: AtomicBool,
    value: UnsafeCell<T>,
}

// SAFETY: access to `value` is serialized by `locked`; the guard that hands
// out references exists only while the flag is held.
unsafe impl<T: Send> Sync for TasLock<T> {}

impl<T> TasLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    /// Spin until the lock is ours.
    pub fn lock(&self) -> TasGuard<'_, T> {
        let backoff = Backoff::new();
        while self.locked.swap(true, Ordering::Acquire) {
            backoff.snooze();
        }
        TasGuard { lock: self }
    }

    /// Single attempt; `None` if another thread holds the lock.
    pub fn try_lock(&self) -> Option<TasGuard<'_, T>> {
        if self.locked.swap(true, Ordering::Acquire) {
            None
        } else {
            Some(TasGuard { lock: self })
        }
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for TasLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TasLock")
            .field("locked", &self.locked.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Releases the lock on drop.
pub struct TasGuard<'a, T> {
    lock: &'a TasLock<T>,
}

impl<T> Deref for TasGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard proves exclusive ownership of the flag.
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for TasGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard proves exclusive ownership of the flag.
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for TasGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
