use crate::platform::{TaskId, TaskParams};
use alloc::boxed::Box;
use alloc::sync::Weak;
use mesh_status::Result;

/// Receiver of the periodic tick interrupt.
pub trait TickSink: Send + Sync {
    fn on_tick(&self);
}

/// What the kernel needs from the CPU / host underneath it.
///
/// A port supplies execution contexts, a tick source and a single broadcast
/// event that blocked tasks sleep on. The kernel implements every blocking
/// primitive on top of `epoch` / `wait` / `signal`: read the epoch, check
/// the condition, and wait for the epoch to move if it does not hold yet.
pub trait Port: Send + Sync + 'static {
    fn tick_rate_hz(&self) -> u32;

    /// Starts the tick source. The port calls `sink.on_tick()` once per
    /// tick for as long as the sink is alive.
    fn start_tick(&self, sink: Weak<dyn TickSink>);

    /// Creates an execution context for `task` and makes it runnable.
    ///
    /// # Errors
    /// [`mesh_status::Error::NoMemory`] if the context cannot be created.
    fn spawn(
        &self,
        task: TaskId,
        params: &TaskParams<'_>,
        entry: Box<dyn FnOnce() + Send>,
    ) -> Result<()>;

    /// The task the caller runs as, if the port knows it.
    fn current(&self) -> Option<TaskId>;

    /// Registers the calling context, which was not created by `spawn`, as
    /// `task`.
    fn adopt(&self, task: TaskId);

    fn epoch(&self) -> u64;

    /// Blocks the caller until the epoch differs from `seen`.
    fn wait(&self, seen: u64);

    /// Advances the epoch and wakes every waiter.
    fn signal(&self);

    /// Whether the caller runs in interrupt context.
    fn in_isr(&self) -> bool;
}
