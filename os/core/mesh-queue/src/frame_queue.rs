use alloc::boxed::Box;
use alloc::vec::Vec;
use mesh_status::{Error, Result};

/// Bytes of length prefix stored before each payload.
pub const HEADER_SIZE: usize = size_of::<u32>();

/// Circular queue of length-prefixed items over the storage `B`.
///
/// `head` is where the next item is written and `tail` where the oldest
/// item starts. `head == tail` is ambiguous on its own; the item count
/// tells an empty queue (`len() == 0`) from a full one.
#[derive(Debug, Clone)]
pub struct FrameQueue<B = Box<[u8]>> {
    buf: B,
    head: usize,
    tail: usize,
    count: usize,
}

impl FrameQueue<Box<[u8]>> {
    /// A queue over a freshly allocated buffer of `capacity` bytes.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for a zero capacity.
    /// - [`Error::NoMemory`] if the buffer cannot be allocated.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument);
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| Error::NoMemory)?;
        buf.resize(capacity, 0);
        Self::from_buffer(buf.into_boxed_slice())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> FrameQueue<B> {
    /// A queue over caller-provided storage; its whole length is capacity.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for empty storage.
    pub fn from_buffer(buf: B) -> Result<Self> {
        if buf.as_ref().is_empty() {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            buf,
            head: 0,
            tail: 0,
            count: 0,
        })
    }

    /// Tears the queue down, handing the storage back.
    pub fn destroy(self) -> B {
        self.buf
    }

    pub fn capacity(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Number of queued items.
    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Write index.
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Read index.
    pub const fn tail(&self) -> usize {
        self.tail
    }

    /// Bytes available for headers and payloads.
    pub fn free_space(&self) -> usize {
        let cap = self.capacity();
        match self.head.cmp(&self.tail) {
            core::cmp::Ordering::Less => self.tail - self.head,
            core::cmp::Ordering::Greater => cap - self.head + self.tail,
            core::cmp::Ordering::Equal if self.count == 0 => cap,
            core::cmp::Ordering::Equal => 0,
        }
    }

    /// Appends `item` behind its length header.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for an empty item.
    /// - [`Error::NoMemory`] if header and payload do not fit into the free
    ///   space; the queue is left untouched.
    pub fn enqueue(&mut self, item: &[u8]) -> Result<()> {
        if item.is_empty() {
            return Err(Error::InvalidArgument);
        }
        let len = u32::try_from(item.len()).map_err(|_| Error::NoMemory)?;
        if item.len() > self.free_space().saturating_sub(HEADER_SIZE) {
            return Err(Error::NoMemory);
        }
        let at = self.write_at(self.head, &len.to_le_bytes());
        self.head = self.write_at(at, item);
        self.count += 1;
        Ok(())
    }

    /// Moves the oldest item into the front of `out` and returns its length.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for an empty `out`.
    /// - [`Error::NoData`] if the queue is empty.
    /// - [`Error::NoMemory`] if the item is longer than `out`; the item
    ///   stays queued.
    pub fn dequeue(&mut self, out: &mut [u8]) -> Result<usize> {
        if out.is_empty() {
            return Err(Error::InvalidArgument);
        }
        let len = self.peek_len().ok_or(Error::NoData)?;
        if len > out.len() {
            return Err(Error::NoMemory);
        }
        let at = self.advance(self.tail, HEADER_SIZE);
        self.tail = self.read_at(at, &mut out[..len]);
        self.count -= 1;
        Ok(len)
    }

    /// Payload length of the oldest item.
    pub fn peek_len(&self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let mut header = [0u8; HEADER_SIZE];
        self.read_at(self.tail, &mut header);
        Some(u32::from_le_bytes(header) as usize)
    }

    /// Drops every item. The stored bytes are not scrubbed.
    pub const fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    fn advance(&self, at: usize, by: usize) -> usize {
        (at + by) % self.capacity()
    }

    fn write_at(&mut self, at: usize, bytes: &[u8]) -> usize {
        let buf = self.buf.as_mut();
        let first = bytes.len().min(buf.len() - at);
        buf[at..at + first].copy_from_slice(&bytes[..first]);
        buf[..bytes.len() - first].copy_from_slice(&bytes[first..]);
        self.advance(at, bytes.len())
    }

    fn read_at(&self, at: usize, out: &mut [u8]) -> usize {
        let buf = self.buf.as_ref();
        let first = out.len().min(buf.len() - at);
        let (near, far) = out.split_at_mut(first);
        near.copy_from_slice(&buf[at..at + first]);
        far.copy_from_slice(&buf[..far.len()]);
        self.advance(at, out.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_may_straddle_the_end() {
        let mut q = FrameQueue::from_buffer([0u8; 16]).expect("queue");
        q.enqueue(&[1; 10]).expect("first");
        let mut out = [0u8; 16];
        assert_eq!(q.dequeue(&mut out), Ok(10));
        assert_eq!(q.head(), 14);

        q.enqueue(&[2, 3, 4]).expect("wrapping header");
        assert_eq!(q.head(), 5);
        assert_eq!(q.peek_len(), Some(3));
        assert_eq!(q.dequeue(&mut out), Ok(3));
        assert_eq!(&out[..3], &[2, 3, 4]);
        assert_eq!(q.tail(), q.head());
    }

    #[test]
    fn exact_fill_is_full_not_empty() {
        let mut q = FrameQueue::from_buffer([0u8; 12]).expect("queue");
        q.enqueue(&[9; 8]).expect("fill");
        assert_eq!(q.head(), q.tail());
        assert_eq!(q.free_space(), 0);
        assert_eq!(q.len(), 1);
        assert_eq!(q.enqueue(&[1]), Err(Error::NoMemory));
    }
}
