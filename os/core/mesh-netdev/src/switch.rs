use crate::callbacks::{Callbacks, LinkChangeFn, PowerFn, ReceiveFn};
use crate::config::DeviceConfig;
use crate::device::NetworkDevice;
use crate::driver::{DriverEvents, SwitchDriver};
use crate::port_mask::PortMask;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use log::{debug, error, info, trace};
use mesh_alloc::DmaBuffer;
use mesh_pal::Allocator;
use mesh_status::{Error, Result};
use mesh_sync::SpinMutex;

/// Snapshot of a device's traffic counters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Frames accepted by the driver.
    pub tx_submitted: u32,
    /// Transmit buffers the driver handed back.
    pub tx_completed: u32,
    /// Frames the driver refused.
    pub tx_failed: u32,
    pub rx_frames: u32,
    /// Frames received while no receive hook was registered.
    pub rx_dropped: u32,
    pub link_changes: u32,
}

#[derive(Debug, Default)]
struct Counters {
    tx_submitted: AtomicU32,
    tx_completed: AtomicU32,
    tx_failed: AtomicU32,
    rx_frames: AtomicU32,
    rx_dropped: AtomicU32,
    link_changes: AtomicU32,
}

impl Counters {
    fn bump(counter: &AtomicU32) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DeviceStats {
        DeviceStats {
            tx_submitted: self.tx_submitted.load(Ordering::Relaxed),
            tx_completed: self.tx_completed.load(Ordering::Relaxed),
            tx_failed: self.tx_failed.load(Ordering::Relaxed),
            rx_frames: self.rx_frames.load(Ordering::Relaxed),
            rx_dropped: self.rx_dropped.load(Ordering::Relaxed),
            link_changes: self.link_changes.load(Ordering::Relaxed),
        }
    }
}

/// State reachable from driver context.
#[derive(Default)]
struct Shared {
    callbacks: SpinMutex<Callbacks>,
    counters: Counters,
}

impl Shared {
    // Hooks are cloned out so user code never runs under the lock.
    fn power_hook(&self) -> Option<Arc<PowerFn>> {
        self.callbacks.with_lock(|cb| cb.power.clone())
    }

    fn link_hook(&self) -> Option<Arc<LinkChangeFn>> {
        self.callbacks.with_lock(|cb| cb.link_change.clone())
    }

    fn receive_hook(&self) -> Option<Arc<ReceiveFn>> {
        self.callbacks.with_lock(|cb| cb.receive.clone())
    }
}

impl<A: Allocator> DriverEvents<A> for Shared {
    fn transmit_complete(&self, buffer: DmaBuffer<A>) {
        drop(buffer);
        Counters::bump(&self.counters.tx_completed);
    }

    fn link_changed(&self, port: u8, up: bool) {
        Counters::bump(&self.counters.link_changes);
        debug!("port {port} link {}", if up { "up" } else { "down" });
        if let Some(hook) = self.link_hook() {
            hook(port, up);
        }
    }

    fn frame_received(&self, port: u8, frame: &[u8]) -> usize {
        trace!("port {port}: received {} bytes", frame.len());
        match self.receive_hook() {
            Some(hook) => {
                Counters::bump(&self.counters.rx_frames);
                hook(port, frame)
            }
            None => {
                Counters::bump(&self.counters.rx_dropped);
                0
            }
        }
    }
}

/// [`NetworkDevice`] backed by a dual-port Ethernet switch driver.
pub struct SwitchDevice<D, A> {
    driver: SpinMutex<D>,
    alloc: A,
    config: DeviceConfig,
    shared: Arc<Shared>,
    enabled: AtomicBool,
    /// Set while an `enable` is in progress.
    starting: AtomicBool,
}

impl<D, A> SwitchDevice<D, A>
where
    D: SwitchDriver<A>,
    A: Allocator + Clone + Send + Sync + 'static,
{
    /// Binds `driver` to a new, disabled device. Buffers come from `alloc`.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `config` does not validate.
    pub fn new(driver: D, alloc: A, config: DeviceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            driver: SpinMutex::new(driver),
            alloc,
            config,
            shared: Arc::new(Shared::default()),
            enabled: AtomicBool::new(false),
            starting: AtomicBool::new(false),
        })
    }

    /// Replaces every hook at once. May be called at any time.
    pub fn set_callbacks(&self, callbacks: Callbacks) {
        self.shared.callbacks.with_lock(|cb| *cb = callbacks);
    }

    pub fn set_power_callback(&self, f: impl Fn(bool) + Send + Sync + 'static) {
        self.shared.callbacks.with_lock(|cb| cb.power = Some(Arc::new(f)));
    }

    pub fn set_link_change_callback(&self, f: impl Fn(u8, bool) + Send + Sync + 'static) {
        self.shared
            .callbacks
            .with_lock(|cb| cb.link_change = Some(Arc::new(f)));
    }

    pub fn set_receive_callback(&self, f: impl Fn(u8, &[u8]) -> usize + Send + Sync + 'static) {
        self.shared.callbacks.with_lock(|cb| cb.receive = Some(Arc::new(f)));
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    #[must_use]
    pub const fn config(&self) -> &DeviceConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> DeviceStats {
        self.shared.counters.snapshot()
    }

    /// Runs `f` with exclusive access to the driver.
    pub fn with_driver<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        self.driver.with_lock(f)
    }

    fn power(&self, on: bool) {
        if let Some(hook) = self.shared.power_hook() {
            hook(on);
        }
    }

    fn bring_up(&self, driver: &mut D) -> Result<()> {
        let events: Arc<dyn DriverEvents<A>> = self.shared.clone();
        driver.init(events)?;

        for _ in 0..self.config.rx_pool_size {
            let buffer = DmaBuffer::new(
                self.alloc.clone(),
                self.config.dma_alignment,
                self.config.rx_buffer_size,
            )?;
            driver.submit_rx_buffer(buffer)?;
        }

        driver.sync_config()?;

        for port in 0..self.config.port_count {
            driver.enable_port(port)?;
        }
        Ok(())
    }

    fn shut_down(&self, driver: &mut D) -> Result<()> {
        let ports = (0..self.config.port_count).try_for_each(|port| driver.disable_port(port));
        driver.stop();
        ports
    }
}

impl<D, A> NetworkDevice for SwitchDevice<D, A>
where
    D: SwitchDriver<A>,
    A: Allocator + Clone + Send + Sync + 'static,
{
    fn send(&self, frame: &[u8], ports: PortMask) -> Result<()> {
        if !self.is_enabled() {
            return Err(Error::NoDevice);
        }

        let buffer = DmaBuffer::from_slice(self.alloc.clone(), self.config.dma_alignment, frame)?;
        let target = ports.target();

        // Counted up front: the driver may complete the frame before
        // `transmit` returns.
        let counters = &self.shared.counters;
        Counters::bump(&counters.tx_submitted);
        if let Err(e) = self.driver.lock().transmit(buffer, target) {
            counters.tx_submitted.fetch_sub(1, Ordering::Relaxed);
            Counters::bump(&counters.tx_failed);
            debug!("transmit to {target:?} refused: {e}");
            return Err(e);
        }
        Ok(())
    }

    fn enable(&self) -> Result<()> {
        if self.starting.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyDone);
        }
        if self.is_enabled() {
            self.starting.store(false, Ordering::Release);
            return Err(Error::AlreadyDone);
        }

        // Hooks run without the driver lock so they may call back in.
        self.power(true);
        let result = {
            let mut driver = self.driver.lock();
            let result = self.bring_up(&mut driver);
            if result.is_err() {
                driver.stop();
            } else {
                self.enabled.store(true, Ordering::Release);
            }
            result
        };
        self.starting.store(false, Ordering::Release);

        if let Err(e) = result {
            error!("switch bring-up failed: {e}; powering down");
            self.power(false);
            return Err(Error::NoDevice);
        }
        info!("switch enabled with {} ports", self.config.port_count);
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        let mut driver = self.driver.lock();
        if !self.is_enabled() {
            return Err(Error::NoDevice);
        }
        self.enabled.store(false, Ordering::Release);

        let result = self.shut_down(&mut driver);
        drop(driver);
        self.power(false);

        match result {
            Ok(()) => {
                info!("switch disabled");
                Ok(())
            }
            Err(e) => {
                error!("switch shutdown failed: {e}; powered down anyway");
                Err(Error::NoDevice)
            }
        }
    }
}
