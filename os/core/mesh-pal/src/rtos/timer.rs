use super::kernel::Kernel;
use super::port::Port;
use crate::platform::Timer;
use crate::time::{self, Tick, Timeout, ticks_elapsed};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use log::{debug, trace};
use mesh_status::{Error, Result};
use mesh_sync::SpinMutex;

pub(crate) type Callback = Box<dyn FnMut(usize) + Send>;

struct TimerState {
    period: Tick,
    auto_reload: bool,
    active: bool,
    deleted: bool,
    /// Start of the running period.
    armed_at: Tick,
}

/// Timer object as kept on the kernel's timer list.
pub(crate) struct TimerCore {
    id: usize,
    name: String,
    state: SpinMutex<TimerState>,
    callback: SpinMutex<Callback>,
}

impl TimerCore {
    pub(crate) fn new(
        name: &str,
        id: usize,
        period: Tick,
        auto_reload: bool,
        callback: Callback,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            state: SpinMutex::new(TimerState {
                period: period.max(1),
                auto_reload,
                active: false,
                deleted: false,
                armed_at: 0,
            }),
            callback: SpinMutex::new(callback),
        }
    }

    fn arm(&self, now: Tick, period: Option<Tick>) -> Result<()> {
        self.state.with_lock(|s| {
            if s.deleted {
                return Err(Error::InvalidArgument);
            }
            if let Some(period) = period {
                s.period = period.max(1);
            }
            s.active = true;
            s.armed_at = now;
            Ok(())
        })
    }

    fn disarm(&self) -> Result<()> {
        self.state.with_lock(|s| {
            if s.deleted {
                return Err(Error::InvalidArgument);
            }
            s.active = false;
            Ok(())
        })
    }

    /// Marks the timer deleted; `false` if it already was.
    fn retire(&self) -> bool {
        self.state.with_lock(|s| {
            let was_live = !s.deleted;
            s.deleted = true;
            s.active = false;
            was_live
        })
    }

    /// Consumes one expiry due at `now`, rescheduling periodic timers.
    fn claim_expiry(&self, now: Tick) -> bool {
        self.state.with_lock(|s| {
            if !s.active || s.deleted || !ticks_elapsed(now, s.armed_at, s.period) {
                return false;
            }
            if s.auto_reload {
                let late = now.wrapping_sub(s.armed_at) - s.period;
                s.armed_at = if late >= s.period {
                    // Missed periods are dropped rather than replayed.
                    now
                } else {
                    s.armed_at.wrapping_add(s.period)
                };
            } else {
                s.active = false;
            }
            true
        })
    }

    fn fire(&self) {
        trace!("timer {} expired", self.name);
        let mut callback = self.callback.lock();
        (**callback)(self.id);
    }
}

impl<P: Port> Kernel<P> {
    pub(crate) fn add_timer(&self, core: Arc<TimerCore>) {
        self.timers.with_lock(|t| t.push(core));
    }

    fn retire_timer(&self, core: &Arc<TimerCore>) -> bool {
        let was_live = core.retire();
        self.timers.with_lock(|t| t.retain(|c| !Arc::ptr_eq(c, core)));
        was_live
    }

    fn run_due_timers(&self) {
        let now = self.tick_count();
        let due: Vec<Arc<TimerCore>> = self.timers.with_lock(|timers| {
            timers
                .iter()
                .filter(|t| t.claim_expiry(now))
                .cloned()
                .collect()
        });
        for timer in due {
            timer.fire();
        }
    }
}

/// Body of the timer service task. Returns once the kernel is gone.
pub(crate) fn service_loop<P: Port>(kernel: &Weak<Kernel<P>>) {
    debug!("timer service running");
    loop {
        let Some(k) = kernel.upgrade() else {
            break;
        };
        let seen = k.port.epoch();
        k.run_due_timers();
        let port = Arc::clone(&k.port);
        drop(k);
        port.wait(seen);
    }
    debug!("timer service stopped");
}

struct TimerHandle<P: Port> {
    core: Arc<TimerCore>,
    kernel: Arc<Kernel<P>>,
}

impl<P: Port> Drop for TimerHandle<P> {
    fn drop(&mut self) {
        self.kernel.retire_timer(&self.core);
    }
}

/// Software timer serviced by the kernel's timer service task.
///
/// The command timeouts are accepted for interface compatibility; commands
/// are applied directly to the timer list and never block.
pub struct RtosTimer<P: Port> {
    handle: Arc<TimerHandle<P>>,
}

impl<P: Port> RtosTimer<P> {
    pub(crate) fn new(core: Arc<TimerCore>, kernel: Arc<Kernel<P>>) -> Self {
        Self {
            handle: Arc::new(TimerHandle { core, kernel }),
        }
    }

    fn apply(&self, result: Result<()>) -> Result<()> {
        self.handle.kernel.notify();
        result
    }
}

impl<P: Port> Clone for RtosTimer<P> {
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<P: Port> Timer for RtosTimer<P> {
    fn start(&self, _timeout: Timeout) -> Result<()> {
        let now = self.handle.kernel.tick_count();
        self.apply(self.handle.core.arm(now, None))
    }

    fn stop(&self, _timeout: Timeout) -> Result<()> {
        self.apply(self.handle.core.disarm())
    }

    fn change_period(&self, period_ms: u32, _timeout: Timeout) -> Result<()> {
        if period_ms == 0 {
            return Err(Error::InvalidArgument);
        }
        let kernel = &self.handle.kernel;
        let period = time::ms_to_ticks(period_ms, kernel.tick_rate_hz());
        let now = kernel.tick_count();
        self.apply(self.handle.core.arm(now, Some(period)))
    }

    fn is_active(&self) -> bool {
        self.handle.core.state.with_lock(|s| s.active)
    }

    fn id(&self) -> usize {
        self.handle.core.id
    }

    fn name(&self) -> &str {
        &self.handle.core.name
    }

    fn destroy(self) -> Result<()> {
        if self.handle.kernel.retire_timer(&self.handle.core) {
            Ok(())
        } else {
            Err(Error::InvalidArgument)
        }
    }
}
