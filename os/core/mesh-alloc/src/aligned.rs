use core::ptr::NonNull;
use mesh_pal::Allocator;

/// Size of the offset header stored before every aligned block.
pub const HEADER_SIZE: usize = size_of::<usize>();

/// Allocates `size` bytes starting at a multiple of `alignment`.
///
/// Requests `size + HEADER_SIZE + alignment - 1` bytes from `alloc`. Returns
/// `None` for a zero size, an alignment that is not a power of two, or when
/// the allocator fails.
#[must_use]
pub fn aligned_allocate<A: Allocator + ?Sized>(
    alloc: &A,
    alignment: usize,
    size: usize,
) -> Option<NonNull<u8>> {
    if size == 0 || !alignment.is_power_of_two() {
        return None;
    }
    let total = size
        .checked_add(HEADER_SIZE)?
        .checked_add(alignment - 1)?;
    let raw = alloc.allocate(total)?;

    let base = raw.as_ptr().addr();
    let offset = (base + HEADER_SIZE).next_multiple_of(alignment) - base;
    debug_assert!(offset >= HEADER_SIZE && offset < HEADER_SIZE + alignment);

    // Safety: `offset + size <= total`, so both the header and the payload
    // lie inside the raw block. The header may be unaligned for small
    // alignments.
    unsafe {
        let ptr = raw.add(offset);
        ptr.sub(HEADER_SIZE).cast::<usize>().write_unaligned(offset);
        Some(ptr)
    }
}

/// Releases a block obtained from [`aligned_allocate`].
///
/// # Safety
/// `ptr` must come from [`aligned_allocate`] with the same allocator and must
/// not have been freed already.
pub unsafe fn aligned_free<A: Allocator + ?Sized>(alloc: &A, ptr: NonNull<u8>) {
    // Safety: the caller guarantees the header written by `aligned_allocate`
    // precedes `ptr`.
    unsafe {
        let offset = ptr.sub(HEADER_SIZE).cast::<usize>().read_unaligned();
        alloc.free(ptr.sub(offset));
    }
}
