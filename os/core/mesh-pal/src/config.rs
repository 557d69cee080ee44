//! Compile-time configuration shared by both backends.

/// Tick frequency used when a backend is created without an explicit rate.
pub const DEFAULT_TICK_RATE_HZ: u32 = 1000;

/// Highest task priority accepted by `task_create`. Larger is more urgent.
pub const MAX_PRIORITY: u8 = 24;

/// Priority of the RTOS backend's timer service task.
pub const TIMER_SERVICE_PRIORITY: u8 = MAX_PRIORITY;

/// Stack size requested for the RTOS backend's timer service task.
pub const TIMER_SERVICE_STACK_SIZE: usize = 4096;

/// Hosted threads never get less stack than this, whatever the caller
/// requested; firmware stack budgets are far below what `std` needs.
pub const HOST_MIN_STACK_SIZE: usize = 64 * 1024;

/// Alignment of every pointer returned by the PAL heap.
pub const HEAP_ALIGN: usize = 16;
