//! # Interrupt-safe synchronization primitives
//!
//! Small locks shared by code that runs both in task context and in
//! interrupt / driver-callback context:
//!
//! * [`SpinMutex`] masks interrupts through an [`InterruptControl`]
//!   implementation and then spins on a [`RawSpin`]. Releasing happens in
//!   reverse order when the guard drops.
//! * [`SyncOnceCell`] publishes a value exactly once, and reports a second
//!   initialization attempt to the caller instead of ignoring it.
//!
//! Hosted builds use [`NoInterrupts`], where there is nothing to mask and the
//! spin lock alone provides exclusion.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod irq;
mod mutex;
mod raw_spin;
mod sync_once_cell;

pub use irq::{InterruptControl, IrqGuard, NoInterrupts};
pub use mutex::{SpinMutex, SpinMutexGuard};
pub use raw_spin::RawSpin;
pub use sync_once_cell::SyncOnceCell;
