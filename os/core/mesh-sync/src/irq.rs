//! Interrupt masking seam.
//!
//! The primitives in this crate do not know how a given core masks
//! interrupts. A port supplies an [`InterruptControl`] implementation, e.g.
//! one toggling `PRIMASK` on Cortex-M or `PS.INTLEVEL` on Xtensa.

use core::marker::PhantomData;

/// Architecture hook for masking and restoring interrupts.
///
/// # Contract
///
/// `disable` must return whether interrupts were enabled before the call, and
/// `restore(true)` must re-enable them. `restore(false)` is a no-op, so nested
/// critical sections compose.
pub trait InterruptControl {
    fn disable() -> bool;
    fn restore(were_enabled: bool);
}

/// Interrupt control for hosted environments with no interrupts to mask.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoInterrupts;

impl InterruptControl for NoInterrupts {
    #[inline]
    fn disable() -> bool {
        false
    }

    #[inline]
    fn restore(_were_enabled: bool) {}
}

/// RAII guard that masks interrupts on creation and restores them on drop,
/// only if they were enabled to begin with.
///
/// ```
/// use mesh_sync::{IrqGuard, NoInterrupts};
///
/// {
///     let _g = IrqGuard::<NoInterrupts>::new();
///     // critical section
/// }
/// ```
pub struct IrqGuard<I: InterruptControl> {
    were_enabled: bool,
    // Restoring must happen on the core that masked.
    _not_send: PhantomData<(I, *mut ())>,
}

impl<I: InterruptControl> IrqGuard<I> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            were_enabled: I::disable(),
            _not_send: PhantomData,
        }
    }

    /// Whether interrupts were enabled when the guard was created.
    #[inline]
    #[must_use]
    pub const fn were_enabled(&self) -> bool {
        self.were_enabled
    }
}

impl<I: InterruptControl> Default for IrqGuard<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: InterruptControl> Drop for IrqGuard<I> {
    fn drop(&mut self) {
        I::restore(self.were_enabled);
    }
}
