//! Tracking window state and the bookkeeping behind it.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{self, AtomicBool};
use std::sync::{Mutex, MutexGuard, PoisonError};

use foldhash::fast::FixedState;

use crate::Summary;

/// Number of live allocations a [`Tracker`] reserves room for when a window opens,
/// unless configured otherwise via [`Tracker::with_reserved_entries()`].
pub const DEFAULT_RESERVED_ENTRIES: usize = 4096;

// Fixed seed so the live map can be built in a const context and placed in a static.
const LIVE_MAP_SEED: u64 = 0x616c_6c6f_6373;

type LiveAllocations = HashMap<usize, usize, FixedState>;

thread_local! {
    // Set while this thread is inside tracker bookkeeping. Anything the bookkeeping itself
    // allocates (the live map growing, for example) reaches the allocator while this is set
    // and must pass through unrecorded, otherwise we would deadlock on the state lock or
    // count our own overhead as workload activity.
    static IN_BOOKKEEPING: Cell<bool> = const { Cell::new(false) };
}

/// Runs `f` with the bookkeeping flag set for the current thread.
///
/// Returns `None` without calling `f` if the flag is already set, i.e. if we got here by
/// re-entering the allocator from inside bookkeeping.
fn bookkeeping<R>(f: impl FnOnce() -> R) -> Option<R> {
    IN_BOOKKEEPING.with(|flag| {
        if flag.replace(true) {
            return None;
        }

        let _reset = scopeguard::guard((), |()| flag.set(false));
        Some(f())
    })
}

#[inline]
fn size_to_u64(size: usize) -> u64 {
    size.try_into().expect("usize always fits into u64")
}

// Counters saturate, so the live total can never exceed the overall total.
#[derive(Debug)]
struct TrackerState {
    total_bytes_allocated: u64,
    allocation_count: u64,
    free_count: u64,
    live_allocations: LiveAllocations,
}

impl TrackerState {
    const fn new() -> Self {
        Self {
            total_bytes_allocated: 0,
            allocation_count: 0,
            free_count: 0,
            live_allocations: HashMap::with_hasher(FixedState::with_seed(LIVE_MAP_SEED)),
        }
    }

    fn reset(&mut self, reserved_entries: usize) {
        self.total_bytes_allocated = 0;
        self.allocation_count = 0;
        self.free_count = 0;
        self.live_allocations.clear();
        self.live_allocations.reserve(reserved_entries);
    }

    fn summary(&self) -> Summary {
        let still_live = self
            .live_allocations
            .values()
            .fold(0_u64, |sum, &size| sum.saturating_add(size_to_u64(size)));

        debug_assert!(size_to_u64(self.live_allocations.len()) <= self.allocation_count);
        debug_assert!(still_live <= self.total_bytes_allocated);

        Summary::new(
            still_live,
            self.total_bytes_allocated,
            self.allocation_count,
            self.free_count,
        )
    }
}

/// Process-wide allocation bookkeeping with an explicit start/stop tracking window.
///
/// A `Tracker` observes allocation events reported to it through
/// [`record_acquire()`][Self::record_acquire] and [`record_release()`][Self::record_release].
/// Events are only recorded between [`enable()`][Self::enable] and
/// [`disable()`][Self::disable]. The tracker never owns the memory it observes; it only
/// remembers the address and size of each allocation made inside the window until that
/// allocation is released.
///
/// Normally you do not drive a `Tracker` by hand. An [`Allocator`](crate::Allocator) owns
/// one and reports every allocation it serves.
///
/// # Examples
///
/// ```
/// use std::ptr;
///
/// use alloc_census::Tracker;
///
/// let tracker = Tracker::new();
/// let a = ptr::without_provenance_mut::<u8>(0x1000);
/// let b = ptr::without_provenance_mut::<u8>(0x2000);
///
/// tracker.enable();
/// tracker.record_acquire(a, 8);
/// tracker.record_acquire(b, 16);
/// tracker.record_release(a);
/// let summary = tracker.disable();
///
/// assert_eq!(summary.still_live(), 16);
/// assert_eq!(summary.total_bytes_allocated(), 24);
/// assert_eq!(summary.allocation_count(), 2);
/// assert_eq!(summary.free_count(), 1);
/// ```
///
/// # Thread safety
///
/// The tracker is safe to share between threads but does not distinguish between them:
/// while a window is open, events from every thread are counted.
#[derive(Debug)]
pub struct Tracker {
    enabled: AtomicBool,
    reserved_entries: usize,
    state: Mutex<TrackerState>,
}

impl Tracker {
    /// Creates a disabled tracker that reserves [`DEFAULT_RESERVED_ENTRIES`] live entries
    /// whenever a window opens.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_reserved_entries(DEFAULT_RESERVED_ENTRIES)
    }

    /// Creates a disabled tracker that reserves room for `reserved_entries` live
    /// allocations whenever a window opens.
    ///
    /// Reserving enough room up front keeps the live map from rehashing in the middle of a
    /// window. Growth beyond the reservation is still correct, just slower.
    #[must_use]
    pub const fn with_reserved_entries(reserved_entries: usize) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            reserved_entries,
            state: Mutex::new(TrackerState::new()),
        }
    }

    /// Opens a tracking window, discarding everything recorded by any previous window.
    ///
    /// Calling this while a window is already open simply starts it over.
    pub fn enable(&self) {
        bookkeeping(|| self.lock_state().reset(self.reserved_entries));
        self.enabled.store(true, atomic::Ordering::Relaxed);
    }

    /// Closes the tracking window and returns what it recorded.
    ///
    /// The recorded data stays in place until the next [`enable()`][Self::enable], so
    /// [`snapshot()`][Self::snapshot] keeps returning the same figures.
    pub fn disable(&self) -> Summary {
        self.enabled.store(false, atomic::Ordering::Relaxed);
        self.snapshot()
    }

    /// Returns the figures recorded so far without closing the window.
    #[must_use]
    pub fn snapshot(&self) -> Summary {
        bookkeeping(|| self.lock_state().summary()).unwrap_or_default()
    }

    /// Whether a tracking window is currently open.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(atomic::Ordering::Relaxed)
    }

    /// How many live entries are reserved when a window opens.
    #[must_use]
    pub const fn reserved_entries(&self) -> usize {
        self.reserved_entries
    }

    /// Number of allocations made inside the current (or most recent) window that have
    /// not been released.
    #[must_use]
    pub fn live_allocation_count(&self) -> usize {
        bookkeeping(|| self.lock_state().live_allocations.len()).unwrap_or_default()
    }

    /// Records that `size` bytes were acquired at `address`.
    ///
    /// Ignored if no window is open or if `address` is null (the underlying allocation
    /// failed).
    #[inline]
    pub fn record_acquire(&self, address: *mut u8, size: usize) {
        if address.is_null() || !self.is_enabled() {
            return;
        }

        let size_u64 = size_to_u64(size);

        bookkeeping(|| {
            let mut state = self.lock_state();
            state.allocation_count = state.allocation_count.saturating_add(1);
            state.total_bytes_allocated = state.total_bytes_allocated.saturating_add(size_u64);
            state.live_allocations.insert(address.addr(), size);
        });
    }

    /// Records that the allocation at `address` was released.
    ///
    /// Ignored if no window is open or if `address` is null. Releasing an address the
    /// tracker has not seen is normal: that memory was acquired before the window opened.
    #[inline]
    pub fn record_release(&self, address: *mut u8) {
        if address.is_null() || !self.is_enabled() {
            return;
        }

        bookkeeping(|| {
            let mut state = self.lock_state();
            state.free_count = state.free_count.saturating_add(1);
            state.live_allocations.remove(&address.addr());
        });
    }

    // A panic inside the allocator aborts the process, so a poisoned lock is recovered
    // rather than propagated. The state is plain counters and stays consistent enough.
    fn lock_state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}
