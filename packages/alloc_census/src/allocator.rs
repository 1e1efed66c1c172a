//! Allocation wrapper that reports every allocation to a [`Tracker`].

use std::alloc::{GlobalAlloc, Layout};
use std::fmt;

use crate::{Summary, Tracker};

/// A memory allocator that reports allocations and deallocations to a [`Tracker`].
///
/// This allocator wraps any [`GlobalAlloc`] implementation. Every request is served by the
/// underlying allocator first; the tracker only observes the outcome. A failed allocation
/// (null pointer) is returned unchanged and never recorded.
///
/// Reallocation is reported as a release of the old block plus an acquisition of the new
/// one, which is how a growing container shows up in the counts.
///
/// # Examples
///
/// ```rust
/// use alloc_census::Allocator;
///
/// #[global_allocator]
/// static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
///
/// fn main() {
///     ALLOCATOR.enable();
///     let data = vec![1_u64, 2, 3];
///     let summary = ALLOCATOR.disable();
///
///     assert!(summary.total_bytes_allocated() >= 24);
///     drop(data);
/// }
/// ```
pub struct Allocator<A: GlobalAlloc> {
    inner: A,
    tracker: Tracker,
}

impl<A: GlobalAlloc> fmt::Debug for Allocator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("inner", &"<allocator>")
            .field("tracker", &self.tracker)
            .finish()
    }
}

impl Allocator<std::alloc::System> {
    /// Creates a new tracking allocator using the system's default allocator.
    #[must_use]
    #[inline]
    pub const fn system() -> Self {
        Self::new(std::alloc::System)
    }
}

impl<A: GlobalAlloc> Allocator<A> {
    /// Creates a new tracking allocator on top of the provided allocator.
    #[must_use]
    #[inline]
    pub const fn new(allocator: A) -> Self {
        Self {
            inner: allocator,
            tracker: Tracker::new(),
        }
    }

    /// Creates a new tracking allocator whose tracker reserves room for `reserved_entries`
    /// live allocations whenever a window opens.
    #[must_use]
    #[inline]
    pub const fn with_reserved_entries(allocator: A, reserved_entries: usize) -> Self {
        Self {
            inner: allocator,
            tracker: Tracker::with_reserved_entries(reserved_entries),
        }
    }

    /// The tracker that observes this allocator.
    #[must_use]
    #[inline]
    pub const fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Opens a tracking window. See [`Tracker::enable()`].
    #[inline]
    pub fn enable(&self) {
        self.tracker.enable();
    }

    /// Closes the tracking window and returns what it recorded. See [`Tracker::disable()`].
    #[inline]
    pub fn disable(&self) -> Summary {
        self.tracker.disable()
    }
}

// SAFETY: We delegate all allocation operations to the underlying allocator,
// which already implements GlobalAlloc safely, and only observe the results.
unsafe impl<A: GlobalAlloc> GlobalAlloc for Allocator<A> {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        let ptr = unsafe { self.inner.alloc(layout) };
        self.tracker.record_acquire(ptr, layout.size());
        ptr
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.tracker.record_release(ptr);

        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.dealloc(ptr, layout) }
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        let ptr = unsafe { self.inner.alloc_zeroed(layout) };
        self.tracker.record_acquire(ptr, layout.size());
        ptr
    }

    #[inline]
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };

        // On failure the old block is untouched and still owned by the caller.
        if !new_ptr.is_null() {
            self.tracker.record_release(ptr);
            self.tracker.record_acquire(new_ptr, new_size);
        }

        new_ptr
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::alloc::System;
    use std::ptr;

    use super::*;

    static_assertions::assert_impl_all!(Allocator<System>: Send, Sync);

    /// An allocator whose every request fails.
    struct Exhausted;

    // SAFETY: Never hands out memory, so there is nothing to get wrong.
    unsafe impl GlobalAlloc for Exhausted {
        unsafe fn alloc(&self, _layout: Layout) -> *mut u8 {
            ptr::null_mut()
        }

        unsafe fn dealloc(&self, _ptr: *mut u8, _layout: Layout) {}

        unsafe fn realloc(&self, _ptr: *mut u8, _layout: Layout, _new_size: usize) -> *mut u8 {
            ptr::null_mut()
        }
    }

    fn layout(size: usize) -> Layout {
        Layout::from_size_align(size, 8).unwrap()
    }

    #[test]
    fn end_to_end_window() {
        let allocator = Allocator::system();

        allocator.enable();
        // SAFETY: Layouts have non-zero size.
        let a = unsafe { allocator.alloc(layout(8)) };
        // SAFETY: Layouts have non-zero size.
        let b = unsafe { allocator.alloc(layout(16)) };
        assert!(!a.is_null());
        assert!(!b.is_null());

        // SAFETY: `a` was allocated above with the same layout.
        unsafe {
            allocator.dealloc(a, layout(8));
        }
        let summary = allocator.disable();

        assert_eq!(summary, Summary::new(16, 24, 2, 1));

        // SAFETY: `b` was allocated above with the same layout.
        unsafe {
            allocator.dealloc(b, layout(16));
        }
    }

    #[test]
    fn allocations_outside_window_are_served_but_not_counted() {
        let allocator = Allocator::system();

        // SAFETY: Layout has non-zero size.
        let before = unsafe { allocator.alloc(layout(32)) };
        assert!(!before.is_null());

        allocator.enable();
        // SAFETY: `before` was allocated above with the same layout.
        unsafe {
            allocator.dealloc(before, layout(32));
        }
        let summary = allocator.disable();

        // Memory from before the window still counts as a free, but was never live.
        assert_eq!(summary, Summary::new(0, 0, 0, 1));
    }

    #[test]
    fn zeroed_allocations_are_counted() {
        let allocator = Allocator::system();

        allocator.enable();
        // SAFETY: Layout has non-zero size.
        let ptr = unsafe { allocator.alloc_zeroed(layout(48)) };
        assert!(!ptr.is_null());
        let summary = allocator.disable();

        assert_eq!(summary, Summary::new(48, 48, 1, 0));

        // SAFETY: `ptr` was allocated above with the same layout.
        unsafe {
            allocator.dealloc(ptr, layout(48));
        }
    }

    #[test]
    fn realloc_counts_as_free_plus_malloc() {
        let allocator = Allocator::system();

        allocator.enable();
        // SAFETY: Layout has non-zero size.
        let ptr = unsafe { allocator.alloc(layout(16)) };
        assert!(!ptr.is_null());
        // SAFETY: `ptr` was allocated above with this layout and 64 is a valid new size.
        let grown = unsafe { allocator.realloc(ptr, layout(16), 64) };
        assert!(!grown.is_null());
        let summary = allocator.disable();

        assert_eq!(summary, Summary::new(64, 80, 2, 1));

        // SAFETY: `grown` is the live block, now described by a 64-byte layout.
        unsafe {
            allocator.dealloc(grown, layout(64));
        }
    }

    #[test]
    fn failed_allocation_is_returned_and_not_counted() {
        let allocator = Allocator::new(Exhausted);

        allocator.enable();
        // SAFETY: Layout has non-zero size.
        let ptr = unsafe { allocator.alloc(layout(8)) };
        // SAFETY: Layout has non-zero size.
        let zeroed = unsafe { allocator.alloc_zeroed(layout(8)) };
        let summary = allocator.disable();

        assert!(ptr.is_null());
        assert!(zeroed.is_null());
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn failed_realloc_leaves_old_block_live() {
        let allocator = Allocator::new(Exhausted);
        let old = ptr::without_provenance_mut::<u8>(0x1000);

        allocator.enable();
        allocator.tracker().record_acquire(old, 16);
        // SAFETY: The exhausted allocator never touches the pointer.
        let grown = unsafe { allocator.realloc(old, layout(16), 64) };
        let summary = allocator.disable();

        assert!(grown.is_null());
        assert_eq!(summary, Summary::new(16, 16, 1, 0));
    }

    #[test]
    fn reserved_entries_reach_the_tracker() {
        let allocator = Allocator::with_reserved_entries(System, 12);

        assert_eq!(allocator.tracker().reserved_entries(), 12);
    }
}
