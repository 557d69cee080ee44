use super::{Deadline, lock, wait_until};
use crate::platform::Mailbox;
use crate::slots::SlotRing;
use crate::time::Timeout;
use mesh_status::Result;
use std::sync::{Arc, Condvar, Mutex};

struct Inner {
    ring: Mutex<SlotRing>,
    not_empty: Condvar,
    not_full: Condvar,
    item_size: usize,
    capacity: usize,
}

/// Message queue on a mutex and two condition variables.
#[derive(Clone)]
pub struct ThreadMailbox {
    inner: Arc<Inner>,
}

impl ThreadMailbox {
    pub(crate) fn new(capacity: usize, item_size: usize) -> Result<Self> {
        let ring = SlotRing::new(capacity, item_size)?;
        Ok(Self {
            inner: Arc::new(Inner {
                ring: Mutex::new(ring),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                item_size,
                capacity,
            }),
        })
    }
}

impl Mailbox for ThreadMailbox {
    fn send(&self, item: &[u8], timeout: Timeout) -> Result<()> {
        let inner = &*self.inner;
        let mut ring = lock(&inner.ring);
        ring.check_item(item)?;
        let deadline = Deadline::after(timeout);
        while !ring.push(item) {
            ring = wait_until(&inner.not_full, ring, deadline)?;
        }
        drop(ring);
        inner.not_empty.notify_one();
        Ok(())
    }

    fn receive(&self, out: &mut [u8], timeout: Timeout) -> Result<()> {
        let inner = &*self.inner;
        let mut ring = lock(&inner.ring);
        ring.check_out(out)?;
        let deadline = Deadline::after(timeout);
        while !ring.pop(out) {
            ring = wait_until(&inner.not_empty, ring, deadline)?;
        }
        drop(ring);
        inner.not_full.notify_one();
        Ok(())
    }

    fn item_size(&self) -> usize {
        self.inner.item_size
    }

    fn capacity(&self) -> usize {
        self.inner.capacity
    }

    fn len(&self) -> usize {
        lock(&self.inner.ring).len()
    }
}
