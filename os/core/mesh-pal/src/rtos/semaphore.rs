use super::kernel::Kernel;
use super::port::Port;
use super::wait::WaitList;
use crate::platform::{Semaphore, TaskId};
use crate::time::Timeout;
use alloc::sync::Arc;
use mesh_status::{Error, Result};
use mesh_sync::SpinMutex;

#[derive(Default)]
struct SemaphoreState {
    holder: Option<TaskId>,
    waiters: WaitList,
}

fn waiters(s: &mut SemaphoreState) -> &mut WaitList {
    &mut s.waiters
}

/// Kernel mutex semaphore; only the holder may give it back.
pub struct RtosSemaphore<P: Port> {
    state: Arc<SpinMutex<SemaphoreState>>,
    kernel: Arc<Kernel<P>>,
}

impl<P: Port> RtosSemaphore<P> {
    pub(crate) fn new(kernel: Arc<Kernel<P>>) -> Self {
        Self {
            state: Arc::default(),
            kernel,
        }
    }

    pub fn holder(&self) -> Option<TaskId> {
        self.state.with_lock(|s| s.holder)
    }
}

impl<P: Port> Clone for RtosSemaphore<P> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            kernel: Arc::clone(&self.kernel),
        }
    }
}

impl<P: Port> Semaphore for RtosSemaphore<P> {
    fn take(&self, timeout: Timeout) -> Result<()> {
        let me = self.kernel.current_task();
        self.kernel.block_on(me, &self.state, waiters, timeout, |s| {
            if s.holder.is_some() {
                return None;
            }
            s.holder = Some(me);
            Some(())
        })
    }

    fn give(&self) -> Result<()> {
        let me = self.kernel.current_task();
        self.state.with_lock(|s| {
            if s.holder != Some(me) {
                return Err(Error::Permission);
            }
            s.holder = None;
            Ok(())
        })?;
        self.kernel.notify();
        Ok(())
    }
}
