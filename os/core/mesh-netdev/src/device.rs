use crate::port_mask::PortMask;
use mesh_status::Result;

/// What upper layers may ask of any network interface.
///
/// Implementations are shared as `Arc<dyn NetworkDevice>` and called from
/// several tasks at once.
pub trait NetworkDevice: Send + Sync {
    /// Queues a copy of `frame` for transmission on `ports`. A mask that
    /// does not select exactly one port floods the frame.
    ///
    /// # Errors
    /// - [`Error::NoDevice`](mesh_status::Error::NoDevice) if the device is
    ///   not enabled.
    /// - [`Error::InvalidArgument`](mesh_status::Error::InvalidArgument) for
    ///   an empty frame.
    /// - [`Error::NoMemory`](mesh_status::Error::NoMemory) if no transmit
    ///   buffer is available.
    fn send(&self, frame: &[u8], ports: PortMask) -> Result<()>;

    /// Powers the hardware up and starts it.
    ///
    /// # Errors
    /// [`Error::NoDevice`](mesh_status::Error::NoDevice) if bring-up failed;
    /// the hardware is powered down again.
    fn enable(&self) -> Result<()>;

    /// Stops the hardware and powers it down.
    ///
    /// # Errors
    /// [`Error::NoDevice`](mesh_status::Error::NoDevice) if a step failed;
    /// power-down is attempted regardless.
    fn disable(&self) -> Result<()>;
}
