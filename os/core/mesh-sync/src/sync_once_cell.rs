use core::cell::UnsafeCell;
use core::hint::spin_loop;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU8, Ordering};

#[repr(u8)]
#[derive(Copy, Clone)]
enum State {
    Empty = 0,
    Writing = 1,
    Ready = 2,
}

/// A cell written at most once, readable from any context afterwards.
///
/// Used for process-wide singletons such as the installed logger.
pub struct SyncOnceCell<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Exclusive right to write the cell. Dropping it without publishing
/// (an initializer panicked) returns the cell to `Empty`.
struct Claim<'a, T> {
    cell: &'a SyncOnceCell<T>,
}

impl<'a, T> Claim<'a, T> {
    fn publish(self, value: T) -> &'a T {
        let cell = self.cell;
        core::mem::forget(self);
        // Safety: holding the claim makes this the only writer, and no
        // reader looks at the slot before `Ready` is stored below.
        let stored = unsafe { (*cell.value.get()).write(value) };
        cell.state.store(State::Ready as u8, Ordering::Release);
        stored
    }
}

impl<T> Drop for Claim<'_, T> {
    fn drop(&mut self) {
        self.cell.state.store(State::Empty as u8, Ordering::Release);
    }
}

impl<T> Default for SyncOnceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncOnceCell<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(State::Empty as u8),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.load(Ordering::Acquire) == State::Ready as u8
    }

    #[inline]
    pub fn get(&self) -> Option<&T> {
        // Safety: `Ready` is stored only after the value was written.
        self.is_initialized()
            .then(|| unsafe { (*self.value.get()).assume_init_ref() })
    }

    fn claim(&self) -> Option<Claim<'_, T>> {
        self.state
            .compare_exchange(
                State::Empty as u8,
                State::Writing as u8,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .ok()
            .map(|_| Claim { cell: self })
    }

    /// Stores `value` if the cell is empty.
    ///
    /// # Errors
    /// Hands `value` back if the cell is already set or being set.
    pub fn set(&self, value: T) -> Result<&T, T> {
        match self.claim() {
            Some(claim) => Ok(claim.publish(value)),
            None => Err(value),
        }
    }

    /// The stored value, running `init` first if the cell is empty. Callers
    /// racing with an initializer spin until it has published.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        let mut init = Some(init);
        loop {
            if let Some(value) = self.get() {
                return value;
            }
            if let Some(claim) = self.claim() {
                if let Some(init) = init.take() {
                    return claim.publish(init());
                }
            }
            spin_loop();
        }
    }
}

impl<T> Drop for SyncOnceCell<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == State::Ready as u8 {
            // Safety: `Ready` means the slot holds a value.
            unsafe { self.value.get_mut().assume_init_drop() }
        }
    }
}

// Safety: the value is written once by the claim holder and only read
// after `Ready`.
unsafe impl<T: Sync + Send> Sync for SyncOnceCell<T> {}
unsafe impl<T: Send> Send for SyncOnceCell<T> {}
