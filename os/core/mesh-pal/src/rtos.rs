//! Tick-driven RTOS backend.
//!
//! A [`Kernel`] keeps the tick counter, the task registry and the timer
//! list, and implements blocking on top of a [`Port`]. Blocked tasks sit on
//! per-object wait lists ordered by priority; every state change and every
//! tick wakes them to re-check. Timers run on a dedicated service task
//! created with the first timer.

mod kernel;
mod mailbox;
mod port;
mod semaphore;
mod task;
mod timer;
mod wait;

#[cfg(feature = "std")]
mod host;

pub use kernel::Kernel;
pub use mailbox::RtosMailbox;
pub use port::{Port, TickSink};
pub use semaphore::RtosSemaphore;
pub use task::RtosTask;
pub use timer::RtosTimer;

#[cfg(feature = "std")]
pub use host::HostPort;

use crate::config::{TIMER_SERVICE_PRIORITY, TIMER_SERVICE_STACK_SIZE};
use crate::platform::{Allocator, Platform, TaskId, TaskParams, TimerParams};
use crate::time::{self, Tick};
use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, Ordering};
use log::{debug, info};
use mesh_status::Result;
use timer::TimerCore;

/// [`Platform`] implementation over a [`Kernel`].
pub struct RtosPal<P: Port> {
    kernel: Arc<Kernel<P>>,
}

impl<P: Port> RtosPal<P> {
    /// Boots a kernel on `port` and starts its tick source.
    pub fn new(port: P) -> Self {
        let kernel = Arc::new(Kernel::new(port));
        let weak: Weak<Kernel<P>> = Arc::downgrade(&kernel);
        let sink: Weak<dyn TickSink> = weak;
        kernel.port.start_tick(sink);
        info!("kernel started, tick {} Hz", kernel.tick_rate_hz());
        Self { kernel }
    }

    pub fn kernel(&self) -> &Kernel<P> {
        &self.kernel
    }

    fn spawn<F>(&self, params: &TaskParams<'_>, entry: F) -> Result<RtosTask<P>>
    where
        F: FnOnce() + Send + 'static,
    {
        params.validate()?;
        let id = self.kernel.alloc_id();
        self.kernel.register(id, params.name, params.priority);

        let finished = Arc::new(AtomicBool::new(false));
        let done = Arc::clone(&finished);
        let kernel = Arc::downgrade(&self.kernel);
        let body: Box<dyn FnOnce() + Send> = Box::new(move || {
            entry();
            done.store(true, Ordering::Release);
            if let Some(kernel) = kernel.upgrade() {
                kernel.unregister(id);
            }
        });
        if let Err(e) = self.kernel.port.spawn(id, params, body) {
            self.kernel.unregister(id);
            return Err(e);
        }
        debug!("created {id} '{}' at priority {}", params.name, params.priority);

        Ok(RtosTask {
            id,
            name: params.name.into(),
            priority: params.priority,
            finished,
            kernel: Arc::downgrade(&self.kernel),
        })
    }

    fn ensure_timer_service(&self) -> Result<()> {
        if self.kernel.timer_service.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let kernel = Arc::downgrade(&self.kernel);
        let params = TaskParams::new("tmr svc", TIMER_SERVICE_STACK_SIZE, TIMER_SERVICE_PRIORITY);
        match self.spawn(&params, move || timer::service_loop(&kernel)) {
            Ok(_) => Ok(()),
            Err(e) => {
                self.kernel.timer_service.store(false, Ordering::Release);
                Err(e)
            }
        }
    }
}

impl<P: Port> Clone for RtosPal<P> {
    fn clone(&self) -> Self {
        Self {
            kernel: Arc::clone(&self.kernel),
        }
    }
}

impl<P: Port> Allocator for RtosPal<P> {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        self.kernel.heap.allocate(size)
    }

    unsafe fn free(&self, ptr: NonNull<u8>) {
        // Safety: forwarded caller contract.
        unsafe { self.kernel.heap.free(ptr) }
    }
}

impl<P: Port> Platform for RtosPal<P> {
    type Mailbox = RtosMailbox<P>;
    type Semaphore = RtosSemaphore<P>;
    type Task = RtosTask<P>;
    type Timer = RtosTimer<P>;

    fn queue_create(&self, capacity: usize, item_size: usize) -> Result<Self::Mailbox> {
        RtosMailbox::new(Arc::clone(&self.kernel), capacity, item_size)
    }

    fn semaphore_create(&self) -> Result<Self::Semaphore> {
        Ok(RtosSemaphore::new(Arc::clone(&self.kernel)))
    }

    fn task_create<F>(&self, params: &TaskParams<'_>, entry: F) -> Result<Self::Task>
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(params, entry)
    }

    fn timer_create<F>(&self, params: &TimerParams<'_>, callback: F) -> Result<Self::Timer>
    where
        F: FnMut(usize) + Send + 'static,
    {
        params.validate()?;
        self.ensure_timer_service()?;
        let period = time::ms_to_ticks(params.period_ms, self.kernel.tick_rate_hz());
        let core = Arc::new(TimerCore::new(
            params.name,
            params.id,
            period,
            params.auto_reload,
            Box::new(callback),
        ));
        self.kernel.add_timer(Arc::clone(&core));
        Ok(RtosTimer::new(core, Arc::clone(&self.kernel)))
    }

    fn current_task(&self) -> TaskId {
        self.kernel.current_task()
    }

    fn tick_count(&self) -> Tick {
        self.kernel.tick_count()
    }

    fn tick_count_from_isr(&self) -> Tick {
        self.kernel.tick_count()
    }

    fn tick_rate_hz(&self) -> u32 {
        self.kernel.tick_rate_hz()
    }

    fn delay_ms(&self, ms: u32) {
        let ticks = match time::ms_to_ticks(ms, self.kernel.tick_rate_hz()) {
            0 if ms > 0 => 1,
            t => t,
        };
        self.kernel.delay_ticks(ticks);
    }
}
