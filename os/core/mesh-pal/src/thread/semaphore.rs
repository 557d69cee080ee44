use super::{Deadline, current_task, lock, wait_until};
use crate::platform::{Semaphore, TaskId};
use crate::time::Timeout;
use mesh_status::{Error, Result};
use std::sync::{Arc, Condvar, Mutex};

#[derive(Default)]
struct Inner {
    holder: Mutex<Option<TaskId>>,
    released: Condvar,
}

/// Owner-tracked mutex semaphore.
#[derive(Clone, Default)]
pub struct ThreadSemaphore {
    inner: Arc<Inner>,
}

impl ThreadSemaphore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn holder(&self) -> Option<TaskId> {
        *lock(&self.inner.holder)
    }
}

impl Semaphore for ThreadSemaphore {
    fn take(&self, timeout: Timeout) -> Result<()> {
        let me = current_task();
        let deadline = Deadline::after(timeout);
        let mut holder = lock(&self.inner.holder);
        while holder.is_some() {
            holder = wait_until(&self.inner.released, holder, deadline)?;
        }
        *holder = Some(me);
        Ok(())
    }

    fn give(&self) -> Result<()> {
        let me = current_task();
        let mut holder = lock(&self.inner.holder);
        if *holder != Some(me) {
            return Err(Error::Permission);
        }
        *holder = None;
        drop(holder);
        self.inner.released.notify_one();
        Ok(())
    }
}
