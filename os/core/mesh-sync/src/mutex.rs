use crate::irq::{InterruptControl, IrqGuard, NoInterrupts};
use crate::raw_spin::RawSpin;
use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

/// A spin mutex that masks interrupts for as long as it is held.
///
/// Locking first masks interrupts via `I`, then acquires the spin lock; the
/// guard releases the lock and then restores interrupts. Holding the lock can
/// therefore never be interrupted by a handler on the same core that tries to
/// take it again.
pub struct SpinMutex<T, I: InterruptControl = NoInterrupts> {
    raw: RawSpin,
    cell: UnsafeCell<T>,
    _irq: PhantomData<fn() -> I>,
}

// Safety: the raw lock provides mutual exclusion; only T: Send may cross threads.
unsafe impl<T: Send, I: InterruptControl> Sync for SpinMutex<T, I> {}
unsafe impl<T: Send, I: InterruptControl> Send for SpinMutex<T, I> {}

impl<T: Default, I: InterruptControl> Default for SpinMutex<T, I> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T, I: InterruptControl> SpinMutex<T, I> {
    pub const fn new(value: T) -> Self {
        Self {
            raw: RawSpin::new(),
            cell: UnsafeCell::new(value),
            _irq: PhantomData,
        }
    }

    #[inline]
    pub fn lock(&self) -> SpinMutexGuard<'_, T, I> {
        let irq = IrqGuard::new();
        self.raw.lock();
        SpinMutexGuard { m: self, _irq: irq }
    }

    #[inline]
    pub fn try_lock(&self) -> Option<SpinMutexGuard<'_, T, I>> {
        let irq = IrqGuard::new();
        if self.raw.try_lock() {
            Some(SpinMutexGuard { m: self, _irq: irq })
        } else {
            None
        }
    }

    /// Runs `f` with exclusive access and releases the lock afterwards.
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut g = self.lock();
        f(&mut g)
    }

    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Mutable access through `&mut self`; no locking needed.
    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.cell.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.cell.into_inner()
    }
}

/// Guard returned by [`SpinMutex::lock`].
///
/// Field order matters: the lock is released in `Drop::drop` before `_irq`
/// is dropped and restores interrupts.
pub struct SpinMutexGuard<'a, T, I: InterruptControl> {
    m: &'a SpinMutex<T, I>,
    _irq: IrqGuard<I>,
}

impl<T, I: InterruptControl> Deref for SpinMutexGuard<'_, T, I> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.m.cell.get() }
    }
}

impl<T, I: InterruptControl> DerefMut for SpinMutexGuard<'_, T, I> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.m.cell.get() }
    }
}

impl<T, I: InterruptControl> Drop for SpinMutexGuard<'_, T, I> {
    fn drop(&mut self) {
        unsafe { self.m.raw.unlock() }
    }
}
