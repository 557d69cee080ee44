//! The interface every backend implements.
//!
//! Handles to queues, semaphores and timers are cheap to clone; all clones
//! refer to the same kernel object, which is released when the last clone
//! is dropped or destroyed.

use crate::config::MAX_PRIORITY;
use crate::time::{self, Tick, Timeout};
use core::ptr::NonNull;
use mesh_status::{Error, Result};

/// Identity of a task as seen by the backend.
///
/// Threads that were not created through [`Platform::task_create`] (the
/// program's main thread, for instance) are given an id the first time they
/// ask for one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u32);

impl TaskId {
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Untyped byte allocation.
pub trait Allocator {
    /// Returns `None` for a zero size or when memory is exhausted.
    fn allocate(&self, size: usize) -> Option<NonNull<u8>>;

    /// Releases a block obtained from [`allocate`](Self::allocate).
    ///
    /// # Safety
    /// `ptr` must come from `allocate` on this allocator and must not have
    /// been freed already.
    unsafe fn free(&self, ptr: NonNull<u8>);
}

impl<A: Allocator + ?Sized> Allocator for &A {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        (**self).allocate(size)
    }

    unsafe fn free(&self, ptr: NonNull<u8>) {
        // Safety: forwarded caller contract.
        unsafe { (**self).free(ptr) }
    }
}

/// Bounded FIFO of fixed-size items.
pub trait Mailbox: Clone + Send + Sync {
    /// Copies `item` into the next slot, zero-padding up to the item size.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for an empty item.
    /// - [`Error::NoMemory`] if the item is longer than the item size.
    /// - [`Error::TimedOut`] if the queue stayed full for the whole timeout.
    fn send(&self, item: &[u8], timeout: Timeout) -> Result<()>;

    /// Moves the oldest item into the first `item_size` bytes of `out`.
    ///
    /// # Errors
    /// - [`Error::NoMemory`] if `out` is shorter than the item size.
    /// - [`Error::TimedOut`] if the queue stayed empty for the whole timeout.
    fn receive(&self, out: &mut [u8], timeout: Timeout) -> Result<()>;

    fn item_size(&self) -> usize;

    fn capacity(&self) -> usize;

    /// Items currently queued.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases this handle.
    fn destroy(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// Binary, owner-tracked, non-recursive mutual-exclusion semaphore.
pub trait Semaphore: Clone + Send + Sync {
    /// # Errors
    /// [`Error::TimedOut`] if the semaphore stayed held for the whole
    /// timeout, including when the caller itself holds it.
    fn take(&self, timeout: Timeout) -> Result<()>;

    /// # Errors
    /// [`Error::Permission`] unless the calling task holds the semaphore.
    fn give(&self) -> Result<()>;

    fn destroy(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// Handle to a created task.
pub trait Task: Send {
    fn id(&self) -> TaskId;

    fn name(&self) -> &str;

    fn priority(&self) -> u8;

    /// Whether the entry function has returned.
    fn is_finished(&self) -> bool;

    /// Forgets the task. A hosted task whose entry is still running is
    /// detached and runs to completion on its own.
    ///
    /// # Errors
    /// Backend-specific; both bundled backends always succeed.
    fn delete(self) -> Result<()>
    where
        Self: Sized;
}

/// Software timer whose callback runs outside the creating task.
pub trait Timer: Clone + Send + Sync {
    /// Arms the timer to expire one period from now.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] once the timer has been destroyed.
    fn start(&self, timeout: Timeout) -> Result<()>;

    /// # Errors
    /// [`Error::InvalidArgument`] once the timer has been destroyed.
    fn stop(&self, timeout: Timeout) -> Result<()>;

    /// Sets a new period and arms the timer with it.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for a zero period or a destroyed timer.
    fn change_period(&self, period_ms: u32, timeout: Timeout) -> Result<()>;

    fn is_active(&self) -> bool;

    /// The caller-supplied id passed to every callback invocation.
    fn id(&self) -> usize;

    fn name(&self) -> &str;

    /// Disarms the timer permanently, for every clone of the handle.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if it was already destroyed.
    fn destroy(self) -> Result<()>
    where
        Self: Sized;
}

/// Parameters of [`Platform::task_create`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TaskParams<'a> {
    pub name: &'a str,
    pub stack_size: usize,
    pub priority: u8,
}

impl<'a> TaskParams<'a> {
    #[must_use]
    pub const fn new(name: &'a str, stack_size: usize, priority: u8) -> Self {
        Self {
            name,
            stack_size,
            priority,
        }
    }

    /// # Errors
    /// [`Error::InvalidArgument`] for a zero stack or a priority above
    /// [`MAX_PRIORITY`].
    pub const fn validate(&self) -> Result<()> {
        if self.stack_size == 0 || self.priority > MAX_PRIORITY {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

/// Parameters of [`Platform::timer_create`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerParams<'a> {
    pub name: &'a str,
    pub period_ms: u32,
    pub auto_reload: bool,
    /// Handed back to the callback on each expiry.
    pub id: usize,
}

impl<'a> TimerParams<'a> {
    #[must_use]
    pub const fn one_shot(name: &'a str, period_ms: u32, id: usize) -> Self {
        Self {
            name,
            period_ms,
            auto_reload: false,
            id,
        }
    }

    #[must_use]
    pub const fn periodic(name: &'a str, period_ms: u32, id: usize) -> Self {
        Self {
            name,
            period_ms,
            auto_reload: true,
            id,
        }
    }

    /// # Errors
    /// [`Error::InvalidArgument`] for a zero period.
    pub const fn validate(&self) -> Result<()> {
        if self.period_ms == 0 {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

/// A complete OS abstraction: heap, queues, locks, tasks, timers and time.
pub trait Platform: Allocator + Clone + Send + Sync + 'static {
    type Mailbox: Mailbox;
    type Semaphore: Semaphore;
    type Task: Task;
    type Timer: Timer;

    /// # Errors
    /// - [`Error::InvalidArgument`] for a zero capacity or item size.
    /// - [`Error::NoMemory`] if the storage cannot be allocated.
    fn queue_create(&self, capacity: usize, item_size: usize) -> Result<Self::Mailbox>;

    /// Creates an available semaphore.
    ///
    /// # Errors
    /// [`Error::NoMemory`] if the kernel object cannot be allocated.
    fn semaphore_create(&self) -> Result<Self::Semaphore>;

    /// Creates a task and makes it runnable immediately.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for invalid [`TaskParams`].
    /// - [`Error::NoMemory`] if the execution context cannot be created.
    fn task_create<F>(&self, params: &TaskParams<'_>, entry: F) -> Result<Self::Task>
    where
        F: FnOnce() + Send + 'static;

    /// Creates a dormant timer; call [`Timer::start`] to arm it.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for a zero period.
    /// - [`Error::NoMemory`] if the timer service cannot be started.
    fn timer_create<F>(&self, params: &TimerParams<'_>, callback: F) -> Result<Self::Timer>
    where
        F: FnMut(usize) + Send + 'static;

    /// Identity of the calling task.
    fn current_task(&self) -> TaskId;

    fn tick_count(&self) -> Tick;

    /// Lock-free tick read, callable from interrupt context.
    fn tick_count_from_isr(&self) -> Tick;

    fn tick_rate_hz(&self) -> u32;

    fn ms_to_ticks(&self, ms: u32) -> Tick {
        time::ms_to_ticks(ms, self.tick_rate_hz())
    }

    fn ticks_to_ms(&self, ticks: Tick) -> u32 {
        time::ticks_to_ms(ticks, self.tick_rate_hz())
    }

    /// Suspends the caller for at least `ms` milliseconds.
    fn delay_ms(&self, ms: u32);
}
