//! Buffer allocation.
//!
//! Allocation failure aborts the process, so nothing here returns an error.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Fill byte for fresh buffers.
///
/// Writing every byte makes the OS commit the pages at allocation time.
pub const POISON: u8 = 0xA5;

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);

/// Allocate a buffer of `size` bytes, every byte set to [`POISON`].
pub fn alloc_buffer(size: usize) -> Box<[u8]> {
    ALLOCATED.fetch_add(size, Ordering::Relaxed);
    vec![POISON; size].into_boxed_slice()
}

/// Total bytes handed out by [`alloc_buffer`] since the process started.
pub fn allocated_bytes() -> usize {
    ALLOCATED.load(Ordering::Relaxed)
}
