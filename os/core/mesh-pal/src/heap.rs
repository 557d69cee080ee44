//! General-purpose heap used by both backends.
//!
//! Every block carries a small header recording its full layout size so
//! that [`Allocator::free`] only needs the pointer.

use crate::config::HEAP_ALIGN;
use crate::platform::Allocator;
use alloc::alloc::{Layout, alloc, dealloc};
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

const HEADER: usize = HEAP_ALIGN;

const _: () = assert!(HEADER >= size_of::<usize>());

/// Header-prefixed allocator over the global allocator.
#[derive(Debug, Default)]
pub struct Heap {
    live: AtomicUsize,
}

impl Heap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            live: AtomicUsize::new(0),
        }
    }

    /// Blocks handed out and not yet freed.
    #[must_use]
    pub fn live_allocations(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

impl Allocator for Heap {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }
        let total = size.checked_add(HEADER)?;
        let layout = Layout::from_size_align(total, HEAP_ALIGN).ok()?;
        // Safety: `layout` has a non-zero size.
        let base = NonNull::new(unsafe { alloc(layout) })?;
        // Safety: the block is at least HEADER bytes and HEAP_ALIGN-aligned.
        unsafe {
            base.cast::<usize>().write(total);
            self.live.fetch_add(1, Ordering::Relaxed);
            Some(base.add(HEADER))
        }
    }

    unsafe fn free(&self, ptr: NonNull<u8>) {
        // Safety: `ptr` came from `allocate`, so the header precedes it.
        unsafe {
            let base = ptr.sub(HEADER);
            let total = base.cast::<usize>().read();
            dealloc(
                base.as_ptr(),
                Layout::from_size_align_unchecked(total, HEAP_ALIGN),
            );
        }
        self.live.fetch_sub(1, Ordering::Relaxed);
    }
}
