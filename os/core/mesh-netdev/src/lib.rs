//! # Network device abstraction
//!
//! Upper protocol layers talk to network hardware through the
//! [`NetworkDevice`] trait (`send`, `enable`, `disable`) and learn about
//! link and frame events through [`Callbacks`]. Which hardware sits behind
//! the trait object is decided once, when the device is constructed.
//!
//! [`SwitchDevice`] is the backend for a dual-port Ethernet switch. It
//! drives any [`SwitchDriver`], owns the DMA buffers it hands to the
//! driver, and forwards the driver's [`DriverEvents`] to the registered
//! callbacks in the driver's own (interrupt) context.
//!
//! ```text
//!   protocol code ──send/enable/disable──► SwitchDevice ──► SwitchDriver
//!        ▲                                      │               │
//!        └──── power / link_change / receive ◄──┴── DriverEvents┘
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod callbacks;
pub mod config;
mod device;
mod driver;
mod port_mask;
mod switch;

pub use callbacks::Callbacks;
pub use config::DeviceConfig;
pub use device::NetworkDevice;
pub use driver::{DriverEvents, SwitchDriver};
pub use port_mask::{PortMask, TxTarget};
pub use switch::{DeviceStats, SwitchDevice};
