use crate::platform::{Task, TaskId, TaskParams};
use log::{debug, warn};
use mesh_status::Result;
use std::string::String;
use std::thread::JoinHandle;

/// Task backed by a joinable OS thread.
pub struct ThreadTask {
    id: TaskId,
    name: String,
    priority: u8,
    handle: JoinHandle<()>,
}

impl ThreadTask {
    pub(crate) fn new(id: TaskId, params: &TaskParams<'_>, handle: JoinHandle<()>) -> Self {
        Self {
            id,
            name: params.name.into(),
            priority: params.priority,
            handle,
        }
    }
}

impl Task for ThreadTask {
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
        self.handle.is_finished()
    }

    fn delete(self) -> Result<()> {
        if !self.handle.is_finished() {
            debug!("detaching running task '{}'", self.name);
            return Ok(());
        }
        if self.handle.join().is_err() {
            warn!("task '{}' panicked", self.name);
        }
        Ok(())
    }
}
