use super::port::{Port, TickSink};
use super::timer::TimerCore;
use super::wait::WaitList;
use crate::heap::Heap;
use crate::platform::TaskId;
use crate::time::{Tick, Timeout, ticks_elapsed};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use mesh_status::{Error, Result};
use mesh_sync::SpinMutex;

/// Priority reported for contexts the kernel did not create.
const ADOPTED_PRIORITY: u8 = 0;

struct TaskRecord {
    id: TaskId,
    name: String,
    priority: u8,
}

/// Scheduler state shared by every handle of one [`RtosPal`](super::RtosPal).
pub struct Kernel<P: Port> {
    pub(crate) port: Arc<P>,
    pub(crate) heap: Heap,
    tick: AtomicU32,
    tick_rate_hz: u32,
    next_id: AtomicU32,
    tasks: SpinMutex<Vec<TaskRecord>>,
    pub(crate) timers: SpinMutex<Vec<Arc<TimerCore>>>,
    pub(crate) timer_service: AtomicBool,
}

impl<P: Port> Kernel<P> {
    pub(crate) fn new(port: P) -> Self {
        let tick_rate_hz = port.tick_rate_hz().max(1);
        Self {
            port: Arc::new(port),
            heap: Heap::new(),
            tick: AtomicU32::new(0),
            tick_rate_hz,
            next_id: AtomicU32::new(1),
            tasks: SpinMutex::new(Vec::new()),
            timers: SpinMutex::new(Vec::new()),
            timer_service: AtomicBool::new(false),
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Tick interrupt body: advances time and wakes every blocked task so
    /// that delays, timeouts and timers are re-evaluated.
    pub fn tick_from_isr(&self) {
        self.tick.fetch_add(1, Ordering::AcqRel);
        self.port.signal();
    }

    pub fn tick_count(&self) -> Tick {
        self.tick.load(Ordering::Acquire)
    }

    pub const fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    /// Tasks created through the kernel that have neither returned nor
    /// been deleted, including the timer service.
    pub fn task_count(&self) -> usize {
        self.tasks.with_lock(|t| t.len())
    }

    /// Name of a live task created through the kernel.
    pub fn task_name(&self, id: TaskId) -> Option<String> {
        self.tasks
            .with_lock(|t| t.iter().find(|r| r.id == id).map(|r| r.name.clone()))
    }

    pub fn current_task(&self) -> TaskId {
        if let Some(id) = self.port.current() {
            return id;
        }
        let id = self.alloc_id();
        self.port.adopt(id);
        id
    }

    pub(crate) fn alloc_id(&self) -> TaskId {
        TaskId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn register(&self, id: TaskId, name: &str, priority: u8) {
        self.tasks.with_lock(|t| {
            t.push(TaskRecord {
                id,
                name: name.into(),
                priority,
            });
        });
    }

    pub(crate) fn unregister(&self, id: TaskId) {
        self.tasks.with_lock(|t| t.retain(|r| r.id != id));
    }

    fn priority_of(&self, id: TaskId) -> u8 {
        self.tasks.with_lock(|t| {
            t.iter()
                .find(|r| r.id == id)
                .map_or(ADOPTED_PRIORITY, |r| r.priority)
        })
    }

    /// Wakes blocked tasks after an object changed state.
    pub(crate) fn notify(&self) {
        self.port.signal();
    }

    /// Blocks `me` on `waiters(object)` until `attempt` succeeds while the
    /// task is at the front of that list, or until `timeout` elapses.
    ///
    /// # Errors
    /// - [`Error::TimedOut`] once the timeout has elapsed.
    /// - [`Error::InvalidArgument`] for a blocking call from interrupt
    ///   context.
    pub(crate) fn block_on<S, T>(
        &self,
        me: TaskId,
        object: &SpinMutex<S>,
        waiters: fn(&mut S) -> &mut WaitList,
        timeout: Timeout,
        mut attempt: impl FnMut(&mut S) -> Option<T>,
    ) -> Result<T> {
        if timeout != Timeout::NoWait && self.port.in_isr() {
            return Err(Error::InvalidArgument);
        }
        let limit = timeout.to_ticks(self.tick_rate_hz);
        let priority = self.priority_of(me);
        let start = self.tick_count();
        let mut queued = false;

        loop {
            let seen = self.port.epoch();
            let outcome = {
                let mut guard = object.lock();
                let state: &mut S = &mut guard;
                if !queued {
                    waiters(state).insert(me, priority);
                    queued = true;
                }
                let mut outcome = None;
                if waiters(state).is_first(me) {
                    outcome = attempt(state).map(Ok);
                }
                if outcome.is_none()
                    && limit.is_some_and(|l| ticks_elapsed(self.tick_count(), start, l))
                {
                    outcome = Some(Err(Error::TimedOut));
                }
                if outcome.is_some() {
                    waiters(state).remove(me);
                }
                outcome
            };
            if let Some(result) = outcome {
                self.notify();
                return result;
            }
            self.port.wait(seen);
        }
    }

    pub(crate) fn delay_ticks(&self, ticks: Tick) {
        let start = self.tick_count();
        loop {
            let seen = self.port.epoch();
            if ticks_elapsed(self.tick_count(), start, ticks) {
                return;
            }
            self.port.wait(seen);
        }
    }
}

impl<P: Port> TickSink for Kernel<P> {
    fn on_tick(&self) {
        self.tick_from_isr();
    }
}

impl<P: Port> Drop for Kernel<P> {
    fn drop(&mut self) {
        // Lets the timer service observe that the kernel is gone.
        self.port.signal();
    }
}
