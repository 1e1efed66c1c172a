#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Counts heap allocations, frees and live bytes inside explicit tracking windows.
//!
//! This package wraps a global allocator so that, between an `enable()` and a `disable()`
//! call, every allocation and deallocation the process makes is counted and every
//! allocation that is still alive at the end of the window is accounted for.
//!
//! The core types are:
//! - [`Allocator`] - A [`GlobalAlloc`](std::alloc::GlobalAlloc) wrapper that reports to a tracker
//! - [`Tracker`] - The tracking window and its bookkeeping
//! - [`Summary`] - What a single window recorded
//!
//! On top of those, [`run()`] performs a census of the standard container kinds, filling
//! each one with sequential integers inside its own window and collecting the results into
//! a [`CensusReport`]. The `alloc_census` binary prints that report.
//!
//! This package is not meant for use in production, serving only as a development tool.
//!
//! # Simple Usage
//!
//! ```
//! use alloc_census::Allocator;
//!
//! #[global_allocator]
//! static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
//!
//! fn main() {
//!     ALLOCATOR.enable();
//!     let mut words = Vec::new();
//!     words.push(String::from("hello"));
//!     words.push(String::from("world"));
//!     let summary = ALLOCATOR.disable();
//!
//!     println!("{summary}");
//!     drop(words);
//! }
//! ```
//!
//! # Container census
//!
//! ```
//! use alloc_census::{Allocator, ContainerKind, run};
//!
//! #[global_allocator]
//! static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
//!
//! fn main() {
//!     let report = run(&ALLOCATOR, 100).unwrap();
//!
//!     let vec = report.summary(ContainerKind::Vec).unwrap();
//!     assert!(vec.still_live() >= 800);
//!
//!     report.print_to_stdout();
//! }
//! ```
//!
//! # Re-entrancy
//!
//! The tracker's own bookkeeping allocates (the map of live allocations grows). Those
//! allocations reach the same global allocator while the tracker is busy, so they are
//! detected with a per-thread flag and passed through without being recorded. Each window
//! also reserves room for [`DEFAULT_RESERVED_ENTRIES`] live allocations up front (see
//! [`Tracker::with_reserved_entries()`]) so the map rarely needs to grow mid-window.
//!
//! # Threads
//!
//! Tracking is process-wide and does not tell threads apart. Measurements are only
//! meaningful when nothing else allocates while a window is open.
//!
//! # Miri compatibility
//!
//! Miri replaces the global allocator with its own logic, so you cannot execute code that uses
//! this package under Miri.

mod allocator;
mod census;
mod error;
mod summary;
mod tracker;

pub use allocator::*;
pub use census::*;
pub use error::*;
pub use summary::*;
pub use tracker::*;
