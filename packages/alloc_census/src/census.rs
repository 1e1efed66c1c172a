//! Populates each standard container kind inside its own tracking window.

use std::alloc::GlobalAlloc;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hint::black_box;

use crate::{Allocator, Error, Result, Summary};

/// The largest number of insertions per container that [`run()`] accepts.
pub const MAX_INSERTIONS: u64 = 2048;

/// A standard container kind exercised by the census.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ContainerKind {
    /// Ordered sequence, filled with `push`.
    Vec,

    /// Ordered key-value map, filled with `(i, i)` pairs.
    BTreeMap,

    /// Ordered unique-key set.
    BTreeSet,

    /// Hash-based key-value map, filled with `(i, i)` pairs.
    HashMap,

    /// Hash-based set.
    HashSet,

    /// Double-ended queue, filled with `push_back`.
    VecDeque,
}

impl ContainerKind {
    /// Every container kind, in census order.
    pub const ALL: [Self; 6] = [
        Self::Vec,
        Self::BTreeMap,
        Self::BTreeSet,
        Self::HashMap,
        Self::HashSet,
        Self::VecDeque,
    ];

    /// Human-readable name of the container type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vec => "Vec",
            Self::BTreeMap => "BTreeMap",
            Self::BTreeSet => "BTreeSet",
            Self::HashMap => "HashMap",
            Self::HashSet => "HashSet",
            Self::VecDeque => "VecDeque",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// The container is dropped only after the window closes, so its final contents count as live.
fn measure_with<A: GlobalAlloc, C>(allocator: &Allocator<A>, fill: impl FnOnce() -> C) -> Summary {
    allocator.enable();
    let container = black_box(fill());
    let summary = allocator.disable();

    drop(container);
    summary
}

/// Opens a tracking window, inserts `0..insertions` into a fresh container of the given
/// kind, closes the window and returns what it recorded.
///
/// Only allocations that pass through `allocator` are seen, so in practice `allocator`
/// must be the registered `#[global_allocator]`.
///
/// # Examples
///
/// ```
/// use alloc_census::{Allocator, ContainerKind, measure};
///
/// #[global_allocator]
/// static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
///
/// fn main() {
///     let summary = measure(&ALLOCATOR, ContainerKind::Vec, 100);
///
///     // The vector's final buffer was still alive when the window closed.
///     assert!(summary.still_live() >= 800);
/// }
/// ```
pub fn measure<A: GlobalAlloc>(
    allocator: &Allocator<A>,
    kind: ContainerKind,
    insertions: u64,
) -> Summary {
    match kind {
        ContainerKind::Vec => measure_with(allocator, || {
            let mut container = Vec::new();
            for i in 0..insertions {
                container.push(black_box(i));
            }
            container
        }),
        ContainerKind::BTreeMap => measure_with(allocator, || {
            let mut container = BTreeMap::new();
            for i in 0..insertions {
                container.insert(black_box(i), i);
            }
            container
        }),
        ContainerKind::BTreeSet => measure_with(allocator, || {
            let mut container = BTreeSet::new();
            for i in 0..insertions {
                container.insert(black_box(i));
            }
            container
        }),
        ContainerKind::HashMap => measure_with(allocator, || {
            let mut container = HashMap::new();
            for i in 0..insertions {
                container.insert(black_box(i), i);
            }
            container
        }),
        ContainerKind::HashSet => measure_with(allocator, || {
            let mut container = HashSet::new();
            for i in 0..insertions {
                container.insert(black_box(i));
            }
            container
        }),
        ContainerKind::VecDeque => measure_with(allocator, || {
            let mut container = VecDeque::new();
            for i in 0..insertions {
                container.push_back(black_box(i));
            }
            container
        }),
    }
}

/// Measures every [`ContainerKind`] in census order with `insertions` insertions each.
///
/// # Errors
///
/// Returns [`Error::TooManyInsertions`] without measuring anything if `insertions` exceeds
/// [`MAX_INSERTIONS`].
pub fn run<A: GlobalAlloc>(allocator: &Allocator<A>, insertions: u64) -> Result<CensusReport> {
    if insertions > MAX_INSERTIONS {
        return Err(Error::TooManyInsertions {
            requested: insertions,
            limit: MAX_INSERTIONS,
        });
    }

    let mut rows = Vec::with_capacity(ContainerKind::ALL.len());

    for kind in ContainerKind::ALL {
        let summary = measure(allocator, kind, insertions);
        rows.push((kind, summary));
    }

    Ok(CensusReport { insertions, rows })
}

/// The outcome of a census run: one [`Summary`] per container kind.
///
/// The `Display` form is the full census table: a header naming the insertion count, a
/// separator, then one line per container kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CensusReport {
    insertions: u64,
    rows: Vec<(ContainerKind, Summary)>,
}

impl CensusReport {
    /// Number of insertions made into each container.
    #[must_use]
    pub const fn insertions(&self) -> u64 {
        self.insertions
    }

    /// The measured container kinds with their summaries, in census order.
    #[must_use]
    pub fn rows(&self) -> &[(ContainerKind, Summary)] {
        &self.rows
    }

    /// The summary recorded for `kind`, if it was measured.
    #[must_use]
    pub fn summary(&self, kind: ContainerKind) -> Option<Summary> {
        self.rows
            .iter()
            .find(|(row_kind, _)| *row_kind == kind)
            .map(|(_, summary)| *summary)
    }

    /// Prints the census table to stdout, followed by two blank lines.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        println!("{self}");
        println!();
    }
}

impl fmt::Display for CensusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "n = {:>5}", self.insertions)?;
        writeln!(f, "---------")?;

        for (kind, summary) in &self.rows {
            writeln!(f, "{:<15}=> {summary}", kind.name())?;
        }

        Ok(())
    }
}
