//! A hierarchical occupancy index over a flat id space of size 2^N.
//!
//! This crate provides [`OccupancyTrie`], a binary trie of occupancy status
//! nodes that tracks which ids in `0..2^N` are reserved. Memory use is
//! proportional to the number of occupancy *boundaries* in the space rather
//! than to its size, which is what makes it preferable to a flat bitmap for
//! large, sparse or clustered id spaces.
//!
//! # Key properties
//!
//! - **Implicit ids**: a node stores no id; its place in the id space is
//!   implied by the branch choices from the root, most significant bit
//!   first, keeping nodes small.
//! - **Lazy expansion, eager compaction**: subtrees materialize only when an
//!   operation needs to split a uniform region, and any sibling pair that
//!   becomes uniform is immediately destroyed and folded into its parent.
//! - **Bounded operations**: every operation walks at most N levels,
//!   independent of how many ids are reserved.
//! - **Separate search and commit**: [`allocate_any()`][OccupancyTrie::allocate_any]
//!   finds a free id without claiming it; ids are claimed with
//!   [`reserve()`][OccupancyTrie::reserve], whether caller-chosen or found.
//! - **Single-threaded by design**: no internal locking; wrap the trie in
//!   external synchronization if shared, and keep an allocate-then-reserve
//!   sequence inside one critical section.
//!
//! # Example
//!
//! ```rust
//! use occupancy_trie::OccupancyTrie;
//!
//! let mut trie = OccupancyTrie::new(16)?;
//! assert_eq!(trie.count_vacant(), 65_536);
//!
//! // Claim a specific id and a trie-chosen one.
//! trie.reserve(4660)?;
//! let found = trie.allocate_any().expect("space remains");
//! trie.reserve(found)?;
//!
//! assert_eq!(trie.count_occupied(), 2);
//!
//! // Occupied regions enumerate in ascending order, e.g. for persistence.
//! for region in trie.occupied_ranges() {
//!     println!("occupied: {region:?}");
//! }
//!
//! trie.release(4660)?;
//! trie.release(found)?;
//! assert!(trie.is_empty());
//! # Ok::<(), occupancy_trie::Error>(())
//! ```
//!
//! # Memory accounting
//!
//! [`node_count()`][OccupancyTrie::node_count] and
//! [`memory_footprint()`][OccupancyTrie::memory_footprint] report live node
//! usage; [`shrink_to_fit()`][OccupancyTrie::shrink_to_fit] releases storage
//! that compaction has already returned to the internal free list.

mod arena;
mod builder;
mod error;
mod ranges;
mod status;
mod trie;

pub(crate) use arena::*;
pub use builder::OccupancyTrieBuilder;
pub use error::Error;
pub(crate) use error::Result;
pub use ranges::OccupiedRanges;
pub(crate) use status::*;
pub use trie::{MAX_BIT_DEPTH, OccupancyTrie};
