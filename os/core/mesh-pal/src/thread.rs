//! Hosted backend on OS threads and `std::sync`.
//!
//! Ticks are derived from a monotonic clock, blocking uses condition
//! variables, and every software timer gets its own thread.

mod mailbox;
mod semaphore;
mod task;
mod timer;

pub use mailbox::ThreadMailbox;
pub use semaphore::ThreadSemaphore;
pub use task::ThreadTask;
pub use timer::ThreadTimer;

use crate::config::{DEFAULT_TICK_RATE_HZ, HOST_MIN_STACK_SIZE};
use crate::heap::Heap;
use crate::platform::{Allocator, Platform, TaskId, TaskParams, TimerParams};
use crate::time::{Tick, Timeout};
use core::ptr::NonNull;
use log::{debug, info, warn};
use mesh_status::{Error, Result};
use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

static NEXT_TASK: AtomicU32 = AtomicU32::new(1);

thread_local! {
    static CURRENT: Cell<Option<TaskId>> = const { Cell::new(None) };
}

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK.fetch_add(1, Ordering::Relaxed))
}

/// Task id of the calling thread, assigned on first use for threads that
/// were not created through [`ThreadPal`].
pub(crate) fn current_task() -> TaskId {
    CURRENT.get().unwrap_or_else(|| {
        let id = next_task_id();
        CURRENT.set(Some(id));
        id
    })
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Copy, Clone)]
pub(crate) enum Deadline {
    Now,
    At(Instant),
    Never,
}

impl Deadline {
    pub(crate) fn after(timeout: Timeout) -> Self {
        match timeout {
            Timeout::NoWait | Timeout::Millis(0) => Self::Now,
            Timeout::Millis(ms) => Self::At(Instant::now() + Duration::from_millis(ms.into())),
            Timeout::Forever => Self::Never,
        }
    }
}

/// Waits once on `cv`; spurious wakeups are left to the caller's loop.
///
/// # Errors
/// [`Error::TimedOut`] if the deadline has already passed.
pub(crate) fn wait_until<'a, T>(
    cv: &Condvar,
    guard: MutexGuard<'a, T>,
    deadline: Deadline,
) -> Result<MutexGuard<'a, T>> {
    match deadline {
        Deadline::Now => Err(Error::TimedOut),
        Deadline::Never => Ok(cv.wait(guard).unwrap_or_else(PoisonError::into_inner)),
        Deadline::At(at) => {
            let now = Instant::now();
            if now >= at {
                return Err(Error::TimedOut);
            }
            let (guard, _) = cv
                .wait_timeout(guard, at - now)
                .unwrap_or_else(PoisonError::into_inner);
            Ok(guard)
        }
    }
}

struct Shared {
    heap: Heap,
    started: Instant,
    tick_rate_hz: u32,
}

/// [`Platform`] implementation on OS threads.
#[derive(Clone)]
pub struct ThreadPal {
    shared: Arc<Shared>,
}

impl ThreadPal {
    #[must_use]
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_RATE_HZ)
    }

    #[must_use]
    pub fn with_tick_rate(tick_rate_hz: u32) -> Self {
        let tick_rate_hz = tick_rate_hz.max(1);
        info!("thread platform started, tick {tick_rate_hz} Hz");
        Self {
            shared: Arc::new(Shared {
                heap: Heap::new(),
                started: Instant::now(),
                tick_rate_hz,
            }),
        }
    }

    #[must_use]
    pub fn heap(&self) -> &Heap {
        &self.shared.heap
    }
}

impl Default for ThreadPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for ThreadPal {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        self.shared.heap.allocate(size)
    }

    unsafe fn free(&self, ptr: NonNull<u8>) {
        // Safety: forwarded caller contract.
        unsafe { self.shared.heap.free(ptr) }
    }
}

impl Platform for ThreadPal {
    type Mailbox = ThreadMailbox;
    type Semaphore = ThreadSemaphore;
    type Task = ThreadTask;
    type Timer = ThreadTimer;

    fn queue_create(&self, capacity: usize, item_size: usize) -> Result<Self::Mailbox> {
        ThreadMailbox::new(capacity, item_size)
    }

    fn semaphore_create(&self) -> Result<Self::Semaphore> {
        Ok(ThreadSemaphore::new())
    }

    fn task_create<F>(&self, params: &TaskParams<'_>, entry: F) -> Result<Self::Task>
    where
        F: FnOnce() + Send + 'static,
    {
        params.validate()?;
        let id = next_task_id();
        let handle = thread::Builder::new()
            .name(params.name.into())
            .stack_size(params.stack_size.max(HOST_MIN_STACK_SIZE))
            .spawn(move || {
                CURRENT.set(Some(id));
                entry();
            })
            .map_err(|e| {
                warn!("cannot spawn task {}: {e}", params.name);
                Error::NoMemory
            })?;
        debug!("created {id} '{}' at priority {}", params.name, params.priority);
        Ok(ThreadTask::new(id, params, handle))
    }

    fn timer_create<F>(&self, params: &TimerParams<'_>, callback: F) -> Result<Self::Timer>
    where
        F: FnMut(usize) + Send + 'static,
    {
        params.validate()?;
        ThreadTimer::new(params, callback)
    }

    fn current_task(&self) -> TaskId {
        current_task()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn tick_count(&self) -> Tick {
        let ms = self.shared.started.elapsed().as_millis();
        // Truncation is the tick counter wrapping around.
        (ms * u128::from(self.shared.tick_rate_hz) / 1000) as Tick
    }

    fn tick_count_from_isr(&self) -> Tick {
        self.tick_count()
    }

    fn tick_rate_hz(&self) -> u32 {
        self.shared.tick_rate_hz
    }

    fn delay_ms(&self, ms: u32) {
        thread::sleep(Duration::from_millis(ms.into()));
    }
}
