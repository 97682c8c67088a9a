//! Basic benchmarks for the `occupancy_trie` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use occupancy_trie::OccupancyTrie;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const BIT_DEPTH: u32 = 16;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("occupancy_basic");

    group.bench_function("reserve_release_scattered", |b| {
        let mut trie = OccupancyTrie::new(BIT_DEPTH).expect("bit depth is valid");
        let mut next = 0_u64;

        b.iter(|| {
            // Golden-ratio stride scatters ids across the space, keeping the
            // boundary count (and therefore the node count) high.
            let id = next & trie.max_id();
            next = next.wrapping_add(0x9E37_79B9);

            if trie.reserve(black_box(id)).is_err() {
                trie.release(black_box(id))
                    .expect("the id was occupied, so releasing it succeeds");
            }
        });
    });

    group.bench_function("allocate_any_clustered", |b| {
        let mut trie = OccupancyTrie::new(BIT_DEPTH).expect("bit depth is valid");

        // Fill the lower half so the search has a full spine to skip over.
        for id in 0..(trie.id_capacity() / 2) {
            trie.reserve(id).expect("id space is half empty");
        }

        b.iter(|| black_box(trie.allocate_any()));
    });

    group.bench_function("count_vacant_fragmented", |b| {
        let mut trie = OccupancyTrie::new(BIT_DEPTH).expect("bit depth is valid");

        for id in (0..trie.id_capacity()).step_by(7) {
            trie.reserve(id).expect("stride never repeats an id");
        }

        b.iter(|| black_box(trie.count_vacant()));
    });

    group.finish();
}
