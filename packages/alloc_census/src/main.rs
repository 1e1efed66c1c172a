#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Binary entry point for the container allocation census.
//!
//! This module is excluded from mutation testing because testing process entry/exit behavior
//! is impractical - it is covered by the integration tests that spawn the binary instead.

use std::alloc::System;
use std::process::ExitCode;

use alloc_census::{Allocator, run};
use argh::FromArgs;

#[global_allocator]
static ALLOCATOR: Allocator<System> = Allocator::system();

/// Counts heap allocations made while inserting sequential integers into each standard
/// container kind.
#[derive(FromArgs)]
struct Args {
    /// number of integers to insert into each container (at most 2048)
    #[argh(positional, default = "0")]
    n: u64,
}

// Binary entry point - mutations would require subprocess testing which is impractical.
#[cfg_attr(test, mutants::skip)]
fn main() -> ExitCode {
    let args: Args = argh::from_env();

    match run(&ALLOCATOR, args.n) {
        Ok(report) => {
            report.print_to_stdout();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
