//! Device parameters.

use mesh_status::{Error, Result};

/// Physical ports on the dual-port switch.
pub const SWITCH_PORT_COUNT: u8 = 2;

/// Receive buffers handed to the driver when the device is enabled.
pub const DEFAULT_RX_POOL_SIZE: usize = 8;

/// Large enough for a full Ethernet frame with VLAN tag and FCS.
pub const DEFAULT_RX_BUFFER_SIZE: usize = 1536;

/// Alignment the switch DMA engine requires for descriptors and buffers.
pub const DEFAULT_DMA_ALIGNMENT: usize = 32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub port_count: u8,
    pub rx_pool_size: usize,
    pub rx_buffer_size: usize,
    pub dma_alignment: usize,
}

impl DeviceConfig {
    /// # Errors
    /// [`Error::InvalidArgument`] for a port count outside
    /// `1..=SWITCH_PORT_COUNT`, an empty pool, zero-sized buffers or an
    /// alignment that is not a power of two.
    pub const fn validate(&self) -> Result<()> {
        if self.port_count == 0
            || self.port_count > SWITCH_PORT_COUNT
            || self.rx_pool_size == 0
            || self.rx_buffer_size == 0
            || !self.dma_alignment.is_power_of_two()
        {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port_count: SWITCH_PORT_COUNT,
            rx_pool_size: DEFAULT_RX_POOL_SIZE,
            rx_buffer_size: DEFAULT_RX_BUFFER_SIZE,
            dma_alignment: DEFAULT_DMA_ALIGNMENT,
        }
    }
}
