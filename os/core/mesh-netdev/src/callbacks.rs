use alloc::sync::Arc;
use core::fmt;

/// Power switch request: `true` to power the hardware up.
pub type PowerFn = dyn Fn(bool) + Send + Sync;

/// Link state change of a port: `(port, is_up)`.
pub type LinkChangeFn = dyn Fn(u8, bool) + Send + Sync;

/// Received frame on a port; returns the number of bytes consumed.
pub type ReceiveFn = dyn Fn(u8, &[u8]) -> usize + Send + Sync;

/// Notification hooks of a network device.
///
/// Link and receive hooks run in the driver's context, which may be an
/// interrupt handler; they must not block. A driver may also raise them
/// from inside a call made under the device's driver lock, so they must not
/// call back into the device. The power hook runs without that lock held.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub power: Option<Arc<PowerFn>>,
    pub link_change: Option<Arc<LinkChangeFn>>,
    pub receive: Option<Arc<ReceiveFn>>,
}

impl Callbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_power(mut self, f: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.power = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_link_change(mut self, f: impl Fn(u8, bool) + Send + Sync + 'static) -> Self {
        self.link_change = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_receive(mut self, f: impl Fn(u8, &[u8]) -> usize + Send + Sync + 'static) -> Self {
        self.receive = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("power", &self.power.is_some())
            .field("link_change", &self.link_change.is_some())
            .field("receive", &self.receive.is_some())
            .finish()
    }
}
