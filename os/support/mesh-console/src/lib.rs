//! # Console logging for the mesh node core
//!
//! The core crates only talk to the `log` facade. Firmware images install a
//! [`ConsoleLogger`] early in start-up and point it at whatever carries text
//! off the board (UART, USB-CDC, semihosting, a host-side `eprint!` in
//! simulation).
//!
//! ```text
//! core crate ──log::warn!──► log facade ──► ConsoleLogger ──► sink(fmt::Arguments)
//! ```
//!
//! Each record is rendered as `[LEVEL] target: message` and handed to the sink
//! in one call, so a sink that writes under a lock never interleaves lines.
//!
//! ```rust,no_run
//! use log::LevelFilter;
//! use mesh_console::ConsoleLogger;
//!
//! fn uart_sink(line: &core::fmt::Arguments<'_>) {
//!     // write `line` followed by "\r\n" to the console UART
//!     let _ = line;
//! }
//!
//! ConsoleLogger::new(LevelFilter::Info, uart_sink).init().ok();
//! log::info!("node up");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

use core::fmt;
use log::{LevelFilter, Log, Metadata, Record};
use mesh_status::{Error, Result};
use mesh_sync::SyncOnceCell;

/// Receives one fully formatted log line, without a trailing newline.
pub type Sink = fn(&fmt::Arguments<'_>);

static LOGGER: SyncOnceCell<ConsoleLogger> = SyncOnceCell::new();

pub struct ConsoleLogger {
    max_level: LevelFilter,
    sink: Sink,
}

impl ConsoleLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter, sink: Sink) -> Self {
        Self { max_level, sink }
    }

    /// Installs this logger as the process-wide `log` backend.
    ///
    /// # Errors
    /// [`Error::AlreadyDone`] if a console logger (or any other `log`
    /// backend) was installed before.
    pub fn init(self) -> Result<()> {
        let max_level = self.max_level;
        let logger = LOGGER.set(self).map_err(|_| Error::AlreadyDone)?;
        log::set_logger(logger).map_err(|_| Error::AlreadyDone)?;
        log::set_max_level(max_level);
        Ok(())
    }

    /// The installed logger, if [`init`](Self::init) succeeded before.
    pub fn installed() -> Option<&'static Self> {
        LOGGER.get()
    }

    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        (self.sink)(&format_args!(
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {}
}
