//! # Platform abstraction layer
//!
//! Everything the mesh firmware needs from an operating system, behind one
//! [`Platform`] trait: a byte heap, fixed-item message queues, mutex
//! semaphores, tasks, software timers and the tick clock. All blocking calls
//! take a [`Timeout`] and report expiry as [`Error::TimedOut`].
//!
//! Two backends are provided:
//!
//! * [`rtos::RtosPal`], a tick-driven kernel running over a [`rtos::Port`].
//!   With the `std` feature, [`rtos::HostPort`] runs it on host threads.
//! * [`thread::ThreadPal`] (`std` only), built directly on OS threads.
//!
//! [`DefaultPlatform`] names the backend selected at build time; enable the
//! `backend-thread` feature to switch it to the thread backend.
//!
//! [`Error::TimedOut`]: mesh_status::Error::TimedOut

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

pub mod config;
mod heap;
mod platform;
pub mod rtos;
mod slots;
#[cfg(feature = "std")]
pub mod thread;
pub mod time;

pub use heap::Heap;
pub use platform::{
    Allocator, Mailbox, Platform, Semaphore, Task, TaskId, TaskParams, Timer, TimerParams,
};
pub use time::{NO_WAIT, Tick, Timeout, WAIT_FOREVER};

/// Backend chosen by the `backend-thread` feature.
#[cfg(feature = "backend-thread")]
pub type DefaultPlatform = thread::ThreadPal;

/// The RTOS backend on a host port, used unless `backend-thread` is on.
#[cfg(all(feature = "std", not(feature = "backend-thread")))]
pub type DefaultPlatform = rtos::RtosPal<rtos::HostPort>;

/// Creates the build-time default backend with the default tick rate.
#[cfg(feature = "std")]
#[must_use]
pub fn default_platform() -> DefaultPlatform {
    #[cfg(feature = "backend-thread")]
    {
        thread::ThreadPal::new()
    }
    #[cfg(not(feature = "backend-thread"))]
    {
        rtos::RtosPal::new(rtos::HostPort::default())
    }
}
