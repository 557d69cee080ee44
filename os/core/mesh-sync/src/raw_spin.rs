use core::hint::spin_loop;
use core::sync::atomic::{AtomicBool, Ordering};

/// Upper bound on pause hints issued between two acquisition attempts.
const MAX_BACKOFF: u32 = 64;

/// Spin lock without an associated value.
///
/// Contended waiters watch the flag with plain loads and back off
/// exponentially, so the cache line is only written when it looks free.
pub struct RawSpin {
    locked: AtomicBool,
}

impl Default for RawSpin {
    fn default() -> Self {
        Self::new()
    }
}

impl RawSpin {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn lock(&self) {
        let mut backoff = 1;
        while !self.try_lock() {
            while self.is_locked() {
                for _ in 0..backoff {
                    spin_loop();
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }

    #[inline]
    pub fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// # Safety
    /// The caller must hold the lock.
    #[inline]
    pub unsafe fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}
