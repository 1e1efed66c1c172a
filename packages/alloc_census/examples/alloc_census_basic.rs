//! Basic example of measuring a few hand-picked workloads with `alloc_census`.
//!
//! Run with: `cargo run --example alloc_census_basic`

use std::collections::HashMap;
use std::hint::black_box;

use alloc_census::Allocator;

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

fn main() {
    println!("=== Allocation Census Example ===");
    println!();

    ALLOCATOR.enable();
    let text = black_box(format!("{} + {} = {}", 2, 2, 4));
    let formatting = ALLOCATOR.disable();
    drop(text);

    // Pre-sizing avoids the intermediate buffers a growing vector would free along the way.
    ALLOCATOR.enable();
    let mut presized = Vec::with_capacity(1000);
    presized.extend(0..1000_u32);
    let presized_summary = ALLOCATOR.disable();
    drop(black_box(presized));

    ALLOCATOR.enable();
    let mut grown = Vec::new();
    for i in 0..1000_u32 {
        grown.push(black_box(i));
    }
    let grown_summary = ALLOCATOR.disable();
    drop(black_box(grown));

    ALLOCATOR.enable();
    let mut lookup = HashMap::new();
    for i in 0..100_u32 {
        lookup.insert(i, i.to_string());
    }
    let lookup_summary = ALLOCATOR.disable();
    drop(black_box(lookup));

    println!("{:<20}=> {formatting}", "format!");
    println!("{:<20}=> {presized_summary}", "presized Vec");
    println!("{:<20}=> {grown_summary}", "grown Vec");
    println!("{:<20}=> {lookup_summary}", "HashMap<u32, String>");
}
