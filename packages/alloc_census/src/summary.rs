//! Result of a single tracking window.

use std::fmt;

/// Allocation statistics gathered between an `enable()` and the matching `disable()`.
///
/// The `Display` form is a single line in the census output format:
///
/// ```
/// use alloc_census::Summary;
///
/// let summary = Summary::new(16, 24, 2, 1);
/// assert_eq!(
///     summary.to_string(),
///     "16 bytes allocd at end - total: 24 bytes mallocd, 2 malloc(s), 1 free(s)"
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Summary {
    still_live: u64,
    total_bytes_allocated: u64,
    allocation_count: u64,
    free_count: u64,
}

impl Summary {
    /// Creates a summary from raw figures.
    #[must_use]
    pub const fn new(
        still_live: u64,
        total_bytes_allocated: u64,
        allocation_count: u64,
        free_count: u64,
    ) -> Self {
        Self {
            still_live,
            total_bytes_allocated,
            allocation_count,
            free_count,
        }
    }

    /// Bytes acquired inside the window that had not been released when it closed.
    #[must_use]
    pub const fn still_live(&self) -> u64 {
        self.still_live
    }

    /// Sum of all sizes acquired inside the window, released or not.
    #[must_use]
    pub const fn total_bytes_allocated(&self) -> u64 {
        self.total_bytes_allocated
    }

    /// Number of successful acquisitions inside the window.
    #[must_use]
    pub const fn allocation_count(&self) -> u64 {
        self.allocation_count
    }

    /// Number of releases inside the window, including releases of memory
    /// acquired before the window opened.
    #[must_use]
    pub const fn free_count(&self) -> u64 {
        self.free_count
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes allocd at end - total: {} bytes mallocd, {} malloc(s), {} free(s)",
            self.still_live, self.total_bytes_allocated, self.allocation_count, self.free_count
        )
    }
}
