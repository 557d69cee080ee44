//! Hosted port: tasks are OS threads and the tick interrupt is a timer
//! thread.

use super::port::{Port, TickSink};
use crate::config::{DEFAULT_TICK_RATE_HZ, HOST_MIN_STACK_SIZE};
use crate::platform::{TaskId, TaskParams};
use log::{error, warn};
use mesh_status::{Error, Result};
use std::boxed::Box;
use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError, Weak};
use std::thread;
use std::time::{Duration, Instant};
use std::vec::Vec;

static NEXT_PORT: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    /// Task identity of this thread, per port instance.
    static CONTEXTS: RefCell<Vec<(usize, TaskId)>> = const { RefCell::new(Vec::new()) };
    static IN_ISR: Cell<bool> = const { Cell::new(false) };
}

/// Simulates a single-core target on the host.
pub struct HostPort {
    uid: usize,
    tick_rate_hz: u32,
    free_running: bool,
    epoch: Mutex<u64>,
    wake: Condvar,
}

impl HostPort {
    /// A port whose tick thread fires `tick_rate_hz` times per second.
    #[must_use]
    pub fn new(tick_rate_hz: u32) -> Self {
        Self::build(tick_rate_hz, true)
    }

    /// A port without a tick thread; time advances only through
    /// [`Kernel::tick_from_isr`](super::Kernel::tick_from_isr).
    #[must_use]
    pub fn manual(tick_rate_hz: u32) -> Self {
        Self::build(tick_rate_hz, false)
    }

    fn build(tick_rate_hz: u32, free_running: bool) -> Self {
        Self {
            uid: NEXT_PORT.fetch_add(1, Ordering::Relaxed),
            tick_rate_hz: tick_rate_hz.max(1),
            free_running,
            epoch: Mutex::new(0),
            wake: Condvar::new(),
        }
    }

    #[must_use]
    pub const fn is_free_running(&self) -> bool {
        self.free_running
    }
}

impl Default for HostPort {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE_HZ)
    }
}

fn enter_context(port: usize, task: TaskId) {
    CONTEXTS.with_borrow_mut(|c| c.push((port, task)));
}

impl Port for HostPort {
    fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    fn start_tick(&self, sink: Weak<dyn TickSink>) {
        if !self.free_running {
            return;
        }
        let period = Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate_hz));
        let spawned = thread::Builder::new()
            .name("tick".into())
            .spawn(move || {
                IN_ISR.set(true);
                let mut next = Instant::now();
                loop {
                    next += period;
                    thread::sleep(next.saturating_duration_since(Instant::now()));
                    let Some(sink) = sink.upgrade() else {
                        break;
                    };
                    sink.on_tick();
                }
            });
        if let Err(e) = spawned {
            error!("tick source failed to start: {e}");
        }
    }

    fn spawn(
        &self,
        task: TaskId,
        params: &TaskParams<'_>,
        entry: Box<dyn FnOnce() + Send>,
    ) -> Result<()> {
        let port = self.uid;
        thread::Builder::new()
            .name(params.name.into())
            .stack_size(params.stack_size.max(HOST_MIN_STACK_SIZE))
            .spawn(move || {
                enter_context(port, task);
                entry();
            })
            .map(drop)
            .map_err(|e| {
                warn!("cannot spawn task {}: {e}", params.name);
                Error::NoMemory
            })
    }

    fn current(&self) -> Option<TaskId> {
        CONTEXTS.with_borrow(|c| {
            c.iter()
                .find(|(port, _)| *port == self.uid)
                .map(|&(_, task)| task)
        })
    }

    fn adopt(&self, task: TaskId) {
        enter_context(self.uid, task);
    }

    fn epoch(&self) -> u64 {
        *self.epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait(&self, seen: u64) {
        let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        while *epoch == seen {
            epoch = self.wake.wait(epoch).unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn signal(&self) {
        let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        *epoch = epoch.wrapping_add(1);
        self.wake.notify_all();
    }

    fn in_isr(&self) -> bool {
        IN_ISR.get()
    }
}
