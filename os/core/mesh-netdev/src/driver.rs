use crate::port_mask::TxTarget;
use alloc::sync::Arc;
use mesh_alloc::DmaBuffer;
use mesh_pal::Allocator;
use mesh_status::Result;

/// Notifications a driver raises, typically from its interrupt handler.
pub trait DriverEvents<A: Allocator>: Send + Sync {
    /// The driver is done with a transmit buffer and hands it back.
    fn transmit_complete(&self, buffer: DmaBuffer<A>);

    fn link_changed(&self, port: u8, up: bool);

    /// A frame arrived on `port`; returns the bytes the upper layer
    /// consumed. The driver keeps its receive buffer.
    fn frame_received(&self, port: u8, frame: &[u8]) -> usize;
}

/// Contract of a dual-port Ethernet switch driver.
///
/// Buffers passed in are owned by the driver until it returns transmit
/// buffers through [`DriverEvents::transmit_complete`] or drops them.
pub trait SwitchDriver<A: Allocator>: Send {
    /// Resets the switch and wires up its event sink.
    ///
    /// # Errors
    /// Any hardware fault.
    fn init(&mut self, events: Arc<dyn DriverEvents<A>>) -> Result<()>;

    /// # Errors
    /// If the receive ring is full or the buffer is unusable.
    fn submit_rx_buffer(&mut self, buffer: DmaBuffer<A>) -> Result<()>;

    /// # Errors
    /// If the frame cannot be queued; the buffer is dropped.
    fn transmit(&mut self, buffer: DmaBuffer<A>, target: TxTarget) -> Result<()>;

    /// Pushes the switch configuration (VLANs, forwarding table) to the
    /// hardware.
    ///
    /// # Errors
    /// Any hardware fault.
    fn sync_config(&mut self) -> Result<()>;

    /// # Errors
    /// Any hardware fault.
    fn enable_port(&mut self, port: u8) -> Result<()>;

    /// # Errors
    /// Any hardware fault.
    fn disable_port(&mut self, port: u8) -> Result<()>;

    /// Halts DMA and drops every buffer the driver still holds.
    fn stop(&mut self);
}
