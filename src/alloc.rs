//! Per-thread allocation accounting.
//!
//! Install [`CountingAlloc`] as the global allocator to get allocation
//! figures in reports:
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: algs_bench::alloc::CountingAlloc = algs_bench::alloc::CountingAlloc;
//! ```
//!
//! Without it, every window reports zero allocated bytes.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

thread_local! {
    static TL_ALLOC_BYTES: Cell<u64> = const { Cell::new(0) };
}

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Global allocator wrapper that counts bytes allocated on each thread.
pub struct CountingAlloc;

// SAFETY: Delegates all allocation/deallocation to the System allocator.
// `try_with` skips counting while TLS is unavailable (thread startup/teardown).
unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        // SAFETY: Forwarding to System with the caller's layout.
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        // SAFETY: Forwarding to System with the caller's layout.
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record(new_size.saturating_sub(layout.size()));
        // SAFETY: ptr was allocated by System with `layout`.
        unsafe { System.realloc(ptr, layout, new_size) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: ptr was allocated by System with `layout`.
        unsafe { System.dealloc(ptr, layout) }
    }
}

fn record(bytes: usize) {
    if !INSTALLED.load(Ordering::Relaxed) {
        INSTALLED.store(true, Ordering::Relaxed);
    }
    let _ = TL_ALLOC_BYTES.try_with(|c| c.set(c.get().wrapping_add(bytes as u64)));
}

/// Total bytes allocated by the current thread so far.
pub fn allocated_bytes() -> u64 {
    TL_ALLOC_BYTES.try_with(Cell::get).unwrap_or(0)
}

/// Whether [`CountingAlloc`] has served at least one allocation in this process.
pub fn is_tracking() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic_without_installed_allocator() {
        let before = allocated_bytes();
        let v: Vec<u8> = Vec::with_capacity(1024);
        drop(v);
        assert!(allocated_bytes() >= before);
    }
}
