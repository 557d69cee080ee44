//! Fixed-slot ring shared by the mailbox implementations.

use alloc::vec::Vec;
use mesh_status::{Error, Result};

pub(crate) struct SlotRing {
    buf: Vec<u8>,
    item_size: usize,
    capacity: usize,
    head: usize,
    len: usize,
}

impl SlotRing {
    pub(crate) fn new(capacity: usize, item_size: usize) -> Result<Self> {
        if capacity == 0 || item_size == 0 {
            return Err(Error::InvalidArgument);
        }
        let bytes = capacity.checked_mul(item_size).ok_or(Error::NoMemory)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes).map_err(|_| Error::NoMemory)?;
        buf.resize(bytes, 0);
        Ok(Self {
            buf,
            item_size,
            capacity,
            head: 0,
            len: 0,
        })
    }

    pub(crate) const fn item_size(&self) -> usize {
        self.item_size
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn check_item(&self, item: &[u8]) -> Result<()> {
        if item.is_empty() {
            Err(Error::InvalidArgument)
        } else if item.len() > self.item_size {
            Err(Error::NoMemory)
        } else {
            Ok(())
        }
    }

    pub(crate) const fn check_out(&self, out: &[u8]) -> Result<()> {
        if out.len() < self.item_size {
            Err(Error::NoMemory)
        } else {
            Ok(())
        }
    }

    /// Returns `false` when full. The item must have passed `check_item`.
    pub(crate) fn push(&mut self, item: &[u8]) -> bool {
        if self.len == self.capacity {
            return false;
        }
        let slot = (self.head + self.len) % self.capacity;
        let start = slot * self.item_size;
        let dst = &mut self.buf[start..start + self.item_size];
        dst[..item.len()].copy_from_slice(item);
        dst[item.len()..].fill(0);
        self.len += 1;
        true
    }

    /// Returns `false` when empty. `out` must have passed `check_out`.
    pub(crate) fn pop(&mut self, out: &mut [u8]) -> bool {
        if self.len == 0 {
            return false;
        }
        let start = self.head * self.item_size;
        out[..self.item_size].copy_from_slice(&self.buf[start..start + self.item_size]);
        self.head = (self.head + 1) % self.capacity;
        self.len -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_and_pads() {
        let mut ring = SlotRing::new(2, 4).expect("ring");
        assert!(ring.push(&[1, 2, 3, 4]));
        assert!(ring.push(&[5]));
        assert!(!ring.push(&[6]));

        let mut out = [0xFF; 4];
        assert!(ring.pop(&mut out));
        assert_eq!(out, [1, 2, 3, 4]);
        assert!(ring.push(&[7, 8]));
        assert!(ring.pop(&mut out));
        assert_eq!(out, [5, 0, 0, 0]);
        assert!(ring.pop(&mut out));
        assert_eq!(out, [7, 8, 0, 0]);
        assert!(!ring.pop(&mut out));
    }

    #[test]
    fn rejects_bad_geometry_and_items() {
        assert_eq!(SlotRing::new(0, 4).err(), Some(Error::InvalidArgument));
        assert_eq!(SlotRing::new(4, 0).err(), Some(Error::InvalidArgument));
        assert_eq!(SlotRing::new(usize::MAX, 2).err(), Some(Error::NoMemory));

        let ring = SlotRing::new(1, 2).expect("ring");
        assert_eq!(ring.check_item(&[]), Err(Error::InvalidArgument));
        assert_eq!(ring.check_item(&[1, 2, 3]), Err(Error::NoMemory));
        assert_eq!(ring.check_out(&[0]), Err(Error::NoMemory));
    }
}
