use super::lock;
use crate::platform::{Timer, TimerParams};
use crate::time::Timeout;
use log::warn;
use mesh_status::{Error, Result};
use std::string::String;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

struct TimerState {
    period: Duration,
    auto_reload: bool,
    active: bool,
    deleted: bool,
    expiry: Instant,
}

struct Shared {
    id: usize,
    name: String,
    state: Mutex<TimerState>,
    changed: Condvar,
}

impl Shared {
    fn update(&self, f: impl FnOnce(&mut TimerState)) -> Result<()> {
        let mut state = lock(&self.state);
        if state.deleted {
            return Err(Error::InvalidArgument);
        }
        f(&mut state);
        drop(state);
        self.changed.notify_one();
        Ok(())
    }

    fn retire(&self) -> bool {
        let mut state = lock(&self.state);
        let was_live = !state.deleted;
        state.deleted = true;
        state.active = false;
        drop(state);
        self.changed.notify_one();
        was_live
    }
}

fn run(shared: &Shared, mut callback: impl FnMut(usize)) {
    let mut state = lock(&shared.state);
    loop {
        if state.deleted {
            return;
        }
        if !state.active {
            state = shared
                .changed
                .wait(state)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            continue;
        }
        let now = Instant::now();
        if now < state.expiry {
            let wait = state.expiry - now;
            state = shared
                .changed
                .wait_timeout(state, wait)
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .0;
            continue;
        }
        if state.auto_reload {
            let period = state.period;
            state.expiry += period;
            if state.expiry <= now {
                state.expiry = now + period;
            }
        } else {
            state.active = false;
        }
        drop(state);
        callback(shared.id);
        state = lock(&shared.state);
    }
}

struct TimerHandle {
    shared: Arc<Shared>,
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.shared.retire();
    }
}

/// Software timer driven by its own thread.
#[derive(Clone)]
pub struct ThreadTimer {
    handle: Arc<TimerHandle>,
}

impl ThreadTimer {
    pub(crate) fn new<F>(params: &TimerParams<'_>, callback: F) -> Result<Self>
    where
        F: FnMut(usize) + Send + 'static,
    {
        let period = Duration::from_millis(params.period_ms.into());
        let shared = Arc::new(Shared {
            id: params.id,
            name: params.name.into(),
            state: Mutex::new(TimerState {
                period,
                auto_reload: params.auto_reload,
                active: false,
                deleted: false,
                expiry: Instant::now() + period,
            }),
            changed: Condvar::new(),
        });
        let worker = Arc::clone(&shared);
        thread::Builder::new()
            .name(format!("tmr {}", params.name))
            .spawn(move || run(&worker, callback))
            .map_err(|e| {
                warn!("cannot start timer {}: {e}", params.name);
                Error::NoMemory
            })?;
        Ok(Self {
            handle: Arc::new(TimerHandle { shared }),
        })
    }

    fn shared(&self) -> &Shared {
        &self.handle.shared
    }
}

impl Timer for ThreadTimer {
    fn start(&self, _timeout: Timeout) -> Result<()> {
        self.shared().update(|s| {
            s.active = true;
            s.expiry = Instant::now() + s.period;
        })
    }

    fn stop(&self, _timeout: Timeout) -> Result<()> {
        self.shared().update(|s| s.active = false)
    }

    fn change_period(&self, period_ms: u32, _timeout: Timeout) -> Result<()> {
        if period_ms == 0 {
            return Err(Error::InvalidArgument);
        }
        self.shared().update(|s| {
            s.period = Duration::from_millis(period_ms.into());
            s.active = true;
            s.expiry = Instant::now() + s.period;
        })
    }

    fn is_active(&self) -> bool {
        lock(&self.shared().state).active
    }

    fn id(&self) -> usize {
        self.shared().id
    }

    fn name(&self) -> &str {
        &self.shared().name
    }

    fn destroy(self) -> Result<()> {
        if self.shared().retire() {
            Ok(())
        } else {
            Err(Error::InvalidArgument)
        }
    }
}
