use super::kernel::Kernel;
use super::port::Port;
use super::wait::WaitList;
use crate::platform::Mailbox;
use crate::slots::SlotRing;
use crate::time::Timeout;
use alloc::sync::Arc;
use mesh_status::Result;
use mesh_sync::SpinMutex;

struct MailboxState {
    ring: SlotRing,
    senders: WaitList,
    receivers: WaitList,
}

fn senders(s: &mut MailboxState) -> &mut WaitList {
    &mut s.senders
}

fn receivers(s: &mut MailboxState) -> &mut WaitList {
    &mut s.receivers
}

/// Kernel message queue.
pub struct RtosMailbox<P: Port> {
    state: Arc<SpinMutex<MailboxState>>,
    item_size: usize,
    capacity: usize,
    kernel: Arc<Kernel<P>>,
}

impl<P: Port> RtosMailbox<P> {
    pub(crate) fn new(kernel: Arc<Kernel<P>>, capacity: usize, item_size: usize) -> Result<Self> {
        let ring = SlotRing::new(capacity, item_size)?;
        Ok(Self {
            state: Arc::new(SpinMutex::new(MailboxState {
                ring,
                senders: WaitList::default(),
                receivers: WaitList::default(),
            })),
            item_size,
            capacity,
            kernel,
        })
    }

    /// Tasks currently blocked in `send` and `receive`.
    pub fn blocked(&self) -> (usize, usize) {
        self.state
            .with_lock(|s| (s.senders.len(), s.receivers.len()))
    }
}

impl<P: Port> Clone for RtosMailbox<P> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            item_size: self.item_size,
            capacity: self.capacity,
            kernel: Arc::clone(&self.kernel),
        }
    }
}

impl<P: Port> Mailbox for RtosMailbox<P> {
    fn send(&self, item: &[u8], timeout: Timeout) -> Result<()> {
        self.state.with_lock(|s| s.ring.check_item(item))?;
        let me = self.kernel.current_task();
        self.kernel
            .block_on(me, &self.state, senders, timeout, |s| {
                s.ring.push(item).then_some(())
            })
    }

    fn receive(&self, out: &mut [u8], timeout: Timeout) -> Result<()> {
        self.state.with_lock(|s| s.ring.check_out(out))?;
        let me = self.kernel.current_task();
        self.kernel
            .block_on(me, &self.state, receivers, timeout, |s| {
                s.ring.pop(out).then_some(())
            })
    }

    fn item_size(&self) -> usize {
        self.item_size
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.state.with_lock(|s| s.ring.len())
    }
}
