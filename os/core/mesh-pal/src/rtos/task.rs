use super::kernel::Kernel;
use super::port::Port;
use crate::platform::{Task, TaskId};
use alloc::string::String;
use alloc::sync::{Arc, Weak};
use core::sync::atomic::{AtomicBool, Ordering};
use mesh_status::Result;

/// Handle to a kernel task.
pub struct RtosTask<P: Port> {
    pub(crate) id: TaskId,
    pub(crate) name: String,
    pub(crate) priority: u8,
    pub(crate) finished: Arc<AtomicBool>,
    pub(crate) kernel: Weak<Kernel<P>>,
}

impl<P: Port> Task for RtosTask<P> {
    fn id(&self) -> TaskId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    fn delete(self) -> Result<()> {
        if let Some(kernel) = self.kernel.upgrade() {
            kernel.unregister(self.id);
        }
        Ok(())
    }
}
