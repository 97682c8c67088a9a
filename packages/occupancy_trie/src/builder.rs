use crate::{OccupancyTrie, Result};

/// Builder for creating an instance of [`OccupancyTrie`].
///
/// You only need the builder if you want to pre-size node storage; the
/// configuration taken by [`OccupancyTrie::new()`][1] is sufficient for most
/// use cases.
///
/// # Example
///
/// ```rust
/// use occupancy_trie::OccupancyTrie;
///
/// let trie = OccupancyTrie::builder()
///     .bit_depth(16)
///     .node_capacity(1024)
///     .build()?;
///
/// assert!(trie.node_capacity() >= 1024);
/// # Ok::<(), occupancy_trie::Error>(())
/// ```
///
/// [1]: OccupancyTrie::new
#[derive(Debug)]
#[must_use]
pub struct OccupancyTrieBuilder {
    bit_depth: u32,
    node_capacity: usize,
}

impl OccupancyTrieBuilder {
    pub(crate) fn new() -> Self {
        Self {
            bit_depth: 0,
            node_capacity: 0,
        }
    }

    /// Sets the number of id bits; the trie covers ids `0..2^bit_depth`.
    ///
    /// This is the one mandatory setting: [`build()`][Self::build] rejects
    /// the unset value of zero.
    pub fn bit_depth(mut self, bit_depth: u32) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Pre-reserves storage for this many nodes, so early reserve/release
    /// churn does not have to grow the node table.
    ///
    /// The root node is allocated on top of this.
    pub fn node_capacity(mut self, node_capacity: usize) -> Self {
        self.node_capacity = node_capacity;
        self
    }

    /// Builds the trie with the specified configuration.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBitDepth`][crate::Error::InvalidBitDepth] if the bit
    /// depth was not set or is out of range;
    /// [`Error::AllocationFailed`][crate::Error::AllocationFailed] if the
    /// requested storage cannot be allocated.
    pub fn build(self) -> Result<OccupancyTrie> {
        OccupancyTrie::new_inner(self.bit_depth, self.node_capacity)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, OccupancyTrie};

    #[test]
    fn builder_without_bit_depth_is_rejected() {
        assert!(matches!(
            OccupancyTrie::builder().build(),
            Err(Error::InvalidBitDepth { bit_depth: 0 })
        ));
    }

    #[test]
    fn node_capacity_is_reserved_up_front() {
        let trie = OccupancyTrie::builder()
            .bit_depth(8)
            .node_capacity(64)
            .build()
            .unwrap();

        assert!(trie.node_capacity() >= 64);
        assert_eq!(trie.node_count(), 1);
    }

    #[test]
    fn builder_defaults_match_new() {
        let built = OccupancyTrie::builder().bit_depth(4).build().unwrap();
        let direct = OccupancyTrie::new(4).unwrap();

        assert_eq!(built.bit_depth(), direct.bit_depth());
        assert_eq!(built.max_id(), direct.max_id());
        assert_eq!(built.count_vacant(), direct.count_vacant());
    }
}
