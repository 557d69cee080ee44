use crate::aligned::{aligned_allocate, aligned_free};
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;
use mesh_pal::Allocator;
use mesh_status::{Error, Result};

/// An aligned, heap-allocated byte buffer that frees itself on drop.
pub struct DmaBuffer<A: Allocator> {
    ptr: NonNull<u8>,
    len: usize,
    alignment: usize,
    alloc: A,
}

// Safety: the buffer exclusively owns its memory; sharing follows the
// allocator it must be returned to.
unsafe impl<A: Allocator + Send> Send for DmaBuffer<A> {}
unsafe impl<A: Allocator + Sync> Sync for DmaBuffer<A> {}

impl<A: Allocator> DmaBuffer<A> {
    fn allocate(alloc: A, alignment: usize, len: usize) -> Result<Self> {
        if len == 0 || !alignment.is_power_of_two() {
            return Err(Error::InvalidArgument);
        }
        let ptr = aligned_allocate(&alloc, alignment, len).ok_or(Error::NoMemory)?;
        Ok(Self {
            ptr,
            len,
            alignment,
            alloc,
        })
    }

    /// A zero-filled buffer of `len` bytes.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for a zero length or an alignment that
    ///   is not a power of two.
    /// - [`Error::NoMemory`] if the allocator fails.
    pub fn new(alloc: A, alignment: usize, len: usize) -> Result<Self> {
        let buf = Self::allocate(alloc, alignment, len)?;
        // Safety: `len` bytes at `ptr` belong to this buffer.
        unsafe { buf.ptr.as_ptr().write_bytes(0, len) };
        Ok(buf)
    }

    /// A buffer holding a copy of `data`.
    ///
    /// # Errors
    /// As [`DmaBuffer::new`]; an empty `data` is an invalid argument.
    pub fn from_slice(alloc: A, alignment: usize, data: &[u8]) -> Result<Self> {
        let buf = Self::allocate(alloc, alignment, data.len())?;
        // Safety: the destination holds `data.len()` bytes and cannot overlap
        // a live borrow.
        unsafe {
            core::ptr::copy_nonoverlapping(data.as_ptr(), buf.ptr.as_ptr(), data.len());
        }
        Ok(buf)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; empty buffers cannot be created.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn alignment(&self) -> usize {
        self.alignment
    }

    /// Bus address handed to the DMA engine.
    #[must_use]
    pub const fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub const fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[u8] {
        // Safety: initialised by the constructors, exclusively owned.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub const fn as_mut_slice(&mut self) -> &mut [u8] {
        // Safety: as above, and `&mut self` guarantees uniqueness.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub const fn allocator(&self) -> &A {
        &self.alloc
    }
}

impl<A: Allocator> Deref for DmaBuffer<A> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<A: Allocator> DerefMut for DmaBuffer<A> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl<A: Allocator> Drop for DmaBuffer<A> {
    fn drop(&mut self) {
        // Safety: `ptr` came from `aligned_allocate` on `alloc` and is freed
        // only here.
        unsafe { aligned_free(&self.alloc, self.ptr) };
    }
}

impl<A: Allocator> fmt::Debug for DmaBuffer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DmaBuffer")
            .field("addr", &self.ptr)
            .field("len", &self.len)
            .field("alignment", &self.alignment)
            .finish()
    }
}
