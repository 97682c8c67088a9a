use crate::{Error, Node, NodeArena, OccupancyTrieBuilder, OccupiedRanges, Result, Status};

/// The highest supported bit depth.
///
/// Id capacities and vacancy counts are `u64` values; a 64-bit-deep trie
/// would need to count to 2^64, one past `u64::MAX`.
pub const MAX_BIT_DEPTH: u32 = 63;

/// A hierarchical occupancy index over a flat id space of size 2^N.
///
/// The trie tracks which ids in `0..2^N` are occupied while keeping memory
/// proportional to the number of occupancy boundaries in the space rather
/// than to its size: a childless node stands in for an entire uniformly
/// occupied or uniformly free region, and whenever both halves of a region
/// become uniform the pair is destroyed and folded back into the parent.
/// Every operation is a bounded walk of at most N steps.
///
/// Finding a free id and claiming it are deliberately separate steps:
/// [`allocate_any()`][Self::allocate_any] only searches, and the returned id
/// is claimed through the same [`reserve()`][Self::reserve] primitive used
/// for caller-chosen ids. The pair is not atomic; callers that interleave
/// other mutations must serialize externally.
///
/// # Example
///
/// ```rust
/// use occupancy_trie::OccupancyTrie;
///
/// let mut trie = OccupancyTrie::new(8)?;
/// assert_eq!(trie.count_vacant(), 256);
///
/// trie.reserve(5)?;
/// assert!(trie.is_occupied(5));
///
/// let free = trie.allocate_any().expect("space remains");
/// assert_ne!(free, 5);
///
/// trie.release(5)?;
/// assert_eq!(trie.count_vacant(), 256);
/// # Ok::<(), occupancy_trie::Error>(())
/// ```
#[derive(Debug)]
pub struct OccupancyTrie {
    arena: NodeArena,

    /// The root always exists; a fresh or cleared trie is a single childless
    /// vacant root.
    root: usize,

    /// Number of id bits. Ids run from 0 through `max_id`.
    bit_depth: u32,

    max_id: u64,
}

impl OccupancyTrie {
    /// Creates a trie covering the id space `0..2^bit_depth`, fully vacant.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBitDepth`] if `bit_depth` is zero or above
    /// [`MAX_BIT_DEPTH`]; [`Error::AllocationFailed`] if the root node
    /// cannot be allocated.
    ///
    /// # Example
    ///
    /// ```rust
    /// use occupancy_trie::OccupancyTrie;
    ///
    /// let trie = OccupancyTrie::new(10)?;
    ///
    /// assert_eq!(trie.id_capacity(), 1024);
    /// assert_eq!(trie.max_id(), 1023);
    /// # Ok::<(), occupancy_trie::Error>(())
    /// ```
    pub fn new(bit_depth: u32) -> Result<Self> {
        Self::builder().bit_depth(bit_depth).build()
    }

    /// Starts building a trie.
    ///
    /// Use this when you want to pre-size node storage; otherwise
    /// [`new()`][Self::new] is sufficient.
    pub fn builder() -> OccupancyTrieBuilder {
        OccupancyTrieBuilder::new()
    }

    pub(crate) fn new_inner(bit_depth: u32, node_capacity: usize) -> Result<Self> {
        if bit_depth == 0 || bit_depth > MAX_BIT_DEPTH {
            return Err(Error::InvalidBitDepth { bit_depth });
        }

        let mut arena = NodeArena::new();
        arena.try_reserve(node_capacity)?;
        let root = arena.try_insert(Node::childless(Status::Vacant))?;

        let max_id = 1_u64
            .checked_shl(bit_depth)
            .expect("bit depth was just validated to be at most 63")
            .checked_sub(1)
            .expect("id capacity is at least 2");

        Ok(Self {
            arena,
            root,
            bit_depth,
            max_id,
        })
    }

    /// The number of id bits this trie was created with.
    #[must_use]
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// The highest id in the space.
    #[must_use]
    pub fn max_id(&self) -> u64 {
        self.max_id
    }

    /// The total number of ids in the space, occupied or not.
    #[must_use]
    pub fn id_capacity(&self) -> u64 {
        self.max_id
            .checked_add(1)
            .expect("max id is at most 2^63 - 1")
    }

    /// Marks `id` as occupied.
    ///
    /// The id is masked to the low [`bit_depth()`][Self::bit_depth] bits:
    /// extraneous high bits are silently truncated rather than rejected, so
    /// an out-of-range id lands on its in-range alias.
    ///
    /// # Errors
    ///
    /// [`Error::RegionOccupied`] if the descent encounters a region that is
    /// already fully occupied, in which case nothing is mutated.
    /// [`Error::AllocationFailed`] if node storage cannot be grown
    /// mid-descent; status bits already updated along the visited part of
    /// the path are not rolled back.
    ///
    /// # Example
    ///
    /// ```rust
    /// use occupancy_trie::{Error, OccupancyTrie};
    ///
    /// let mut trie = OccupancyTrie::new(3)?;
    ///
    /// trie.reserve(5)?;
    /// assert!(matches!(trie.reserve(5), Err(Error::RegionOccupied { id: 5 })));
    /// # Ok::<(), occupancy_trie::Error>(())
    /// ```
    pub fn reserve(&mut self, id: u64) -> Result<()> {
        let id = id & self.max_id;
        self.mark(self.root, id, self.bit_depth, Status::Full)
    }

    /// Marks `id` as free again.
    ///
    /// The id is masked exactly as in [`reserve()`][Self::reserve].
    ///
    /// # Errors
    ///
    /// [`Error::RegionVacant`] if the descent encounters a region that is
    /// already fully vacant; [`Error::AllocationFailed`] as for `reserve`.
    pub fn release(&mut self, id: u64) -> Result<()> {
        let id = id & self.max_id;
        self.mark(self.root, id, self.bit_depth, Status::Vacant)
    }

    /// Returns a currently free id, without marking it occupied.
    ///
    /// `None` means the space is exhausted, which is an expected outcome
    /// rather than a fault. A fully vacant trie returns id 0 immediately;
    /// when no ids are reserved yet, any id is as free as any other.
    ///
    /// # Example
    ///
    /// ```rust
    /// use occupancy_trie::OccupancyTrie;
    ///
    /// let mut trie = OccupancyTrie::new(1)?;
    ///
    /// let id = trie.allocate_any().expect("fresh trie has space");
    /// trie.reserve(id)?;
    /// trie.reserve(trie.allocate_any().expect("one id left"))?;
    ///
    /// assert_eq!(trie.allocate_any(), None);
    /// # Ok::<(), occupancy_trie::Error>(())
    /// ```
    #[must_use]
    pub fn allocate_any(&self) -> Option<u64> {
        match self.arena.get(self.root).status {
            Status::Full => None,
            Status::Vacant => Some(0),
            Status::Partial => Some(self.first_free_below(self.root, 0, self.bit_depth)),
        }
    }

    /// Whether `id` (masked as in [`reserve()`][Self::reserve]) is occupied.
    #[must_use]
    pub fn is_occupied(&self, id: u64) -> bool {
        let id = id & self.max_id;

        let mut node = self.root;
        let mut levels_left = self.bit_depth;

        loop {
            let current = self.arena.get(node);
            let Some([left, right]) = current.children else {
                // A childless node's status is authoritative for its whole
                // region, and only nodes with children can be partial.
                return current.status == Status::Full;
            };

            let level = levels_left
                .checked_sub(1)
                .expect("a node with children is above the terminal depth");
            node = if (id >> level) & 1 == 0 { left } else { right };
            levels_left = level;
        }
    }

    /// Whether every id in the space is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.arena.get(self.root).status == Status::Full
    }

    /// Whether no id in the space is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.get(self.root).status == Status::Vacant
    }

    /// The number of free ids remaining.
    ///
    /// # Example
    ///
    /// ```rust
    /// use occupancy_trie::OccupancyTrie;
    ///
    /// let mut trie = OccupancyTrie::new(3)?;
    /// assert_eq!(trie.count_vacant(), 8);
    ///
    /// trie.reserve(5)?;
    /// assert_eq!(trie.count_vacant(), 7);
    /// # Ok::<(), occupancy_trie::Error>(())
    /// ```
    #[must_use]
    pub fn count_vacant(&self) -> u64 {
        self.vacant_below(self.root, self.bit_depth)
    }

    /// The number of occupied ids.
    #[must_use]
    pub fn count_occupied(&self) -> u64 {
        self.id_capacity()
            .checked_sub(self.count_vacant())
            .expect("vacant ids never exceed the id capacity")
    }

    /// The number of live trie nodes.
    ///
    /// This is a memory-accounting diagnostic, not an id count: compaction
    /// keeps it bounded by the number of occupancy boundaries in the space,
    /// not by the id capacity.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// The number of nodes the backing storage can hold without growing.
    ///
    /// Compaction returns slots to a free list but does not release them;
    /// use [`shrink_to_fit()`][Self::shrink_to_fit] for that.
    #[must_use]
    pub fn node_capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Approximate bytes used: live node count × per-slot size, plus the
    /// fixed structure overhead. Diagnostic only.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Byte accounting has nothing to assert beyond the formula itself.
    pub fn memory_footprint(&self) -> usize {
        self.arena
            .len()
            .checked_mul(NodeArena::slot_size())
            .and_then(|nodes| nodes.checked_add(size_of::<Self>()))
            .expect("footprint of live nodes always fits usize")
    }

    /// Iterates over the maximal fully-occupied regions as inclusive id
    /// ranges, in ascending order.
    ///
    /// This is the enumeration hook for collaborators that persist or
    /// mirror the occupancy state; the trie itself does not persist
    /// anything.
    ///
    /// # Example
    ///
    /// ```rust
    /// use occupancy_trie::OccupancyTrie;
    ///
    /// let mut trie = OccupancyTrie::new(4)?;
    /// for id in 4..8 {
    ///     trie.reserve(id)?;
    /// }
    /// trie.reserve(9)?;
    ///
    /// let regions = trie.occupied_ranges().collect::<Vec<_>>();
    /// assert_eq!(regions, vec![4..=7, 9..=9]);
    /// # Ok::<(), occupancy_trie::Error>(())
    /// ```
    #[must_use]
    pub fn occupied_ranges(&self) -> OccupiedRanges<'_> {
        OccupiedRanges::new(self)
    }

    /// Resets the trie to fully vacant.
    ///
    /// This is the whole-tree teardown path: one arena reset instead of a
    /// node-by-node walk. Node storage capacity is retained.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self
            .arena
            .try_insert(Node::childless(Status::Vacant))
            .expect("cleared arena retains capacity for at least the root slot");
    }

    /// Releases node storage that compaction has returned to the free list.
    pub fn shrink_to_fit(&mut self) {
        self.arena.shrink_to_fit();
    }

    pub(crate) fn root_index(&self) -> usize {
        self.root
    }

    pub(crate) fn node(&self, index: usize) -> &Node {
        self.arena.get(index)
    }

    /// Recursive descent for both reserve and release, choosing the child
    /// indicated by each id bit from most significant to least significant.
    ///
    /// The conflict check runs at every visited node before the
    /// terminal-depth check, so a request is rejected at whichever node on
    /// the path first carries the target status.
    fn mark(&mut self, node: usize, id: u64, levels_left: u32, target: Status) -> Result<()> {
        if self.arena.get(node).status == target {
            return Err(Self::conflict(target, id));
        }

        let Some(level) = levels_left.checked_sub(1) else {
            // Terminal depth: this childless node now stands for `id` alone.
            self.arena.get_mut(node).status = target;
            return Ok(());
        };

        if self.arena.get(node).children.is_none() {
            self.try_split(node)?;
        }

        let [left, right] = self
            .arena
            .get(node)
            .children
            .expect("the node was split above if it was childless");
        let child = if (id >> level) & 1 == 0 { left } else { right };

        let outcome = self.mark(child, id, level, target);

        // The rollup runs on the unwind whether or not the deeper call
        // succeeded; on the error path the children are unchanged and the
        // recomputation is a no-op.
        self.rollup(node);

        outcome
    }

    fn conflict(target: Status, id: u64) -> Error {
        match target {
            Status::Full => Error::RegionOccupied { id },
            Status::Vacant => Error::RegionVacant { id },
            Status::Partial => unreachable!("mark is never asked to apply a partial status"),
        }
    }

    /// Gives a childless node its two children, both inheriting the node's
    /// current status so the region's meaning is unchanged.
    ///
    /// If the second allocation fails, the first child is returned to the
    /// arena and the node stays childless.
    fn try_split(&mut self, node: usize) -> Result<()> {
        let child = Node::childless(self.arena.get(node).status);

        let left = self.arena.try_insert(child)?;
        let right = match self.arena.try_insert(child) {
            Ok(index) => index,
            Err(error) => {
                self.arena.remove(left);
                return Err(error.into());
            }
        };

        self.arena.get_mut(node).children = Some([left, right]);
        Ok(())
    }

    /// Recomputes a parent's status from its children, compacting a uniform
    /// pair: both children are destroyed and the parent becomes childless
    /// with their shared status.
    fn rollup(&mut self, node: usize) {
        let Some([left, right]) = self.arena.get(node).children else {
            return;
        };

        let left_status = self.arena.get(left).status;
        let right_status = self.arena.get(right).status;

        match Status::fold_uniform(left_status, right_status) {
            Some(folded) => {
                self.arena.remove(left);
                self.arena.remove(right);

                let parent = self.arena.get_mut(node);
                parent.children = None;
                parent.status = folded;
            }
            None => self.arena.get_mut(node).status = Status::Partial,
        }
    }

    /// Walks toward a guaranteed-free id below a partial node: a partial
    /// child always contains a free leaf, and a vacant child is free
    /// everywhere below it, so the walk can stop there with the remaining
    /// low bits at zero.
    fn first_free_below(&self, node: usize, accumulated: u64, levels_left: u32) -> u64 {
        let Some(level) = levels_left.checked_sub(1) else {
            return accumulated;
        };

        let [left, right] = self
            .arena
            .get(node)
            .children
            .expect("a partial node always has children");

        if self.arena.get(left).status == Status::Partial {
            return self.first_free_below(left, accumulated, level);
        }
        if self.arena.get(right).status == Status::Partial {
            return self.first_free_below(right, accumulated | (1_u64 << level), level);
        }

        // Neither child is partial, so exactly one is uniformly vacant
        // (two vacant siblings would have been compacted away). A vacant
        // left child keeps the accumulated bit at zero.
        if self.arena.get(right).status == Status::Vacant {
            return accumulated | (1_u64 << level);
        }

        accumulated
    }

    fn vacant_below(&self, node: usize, levels_left: u32) -> u64 {
        let current = self.arena.get(node);

        if current.status == Status::Vacant {
            // A childless vacant node stands in for 2^levels free ids.
            return 1_u64
                .checked_shl(levels_left)
                .expect("levels never exceed the validated bit depth");
        }

        match current.children {
            None => 0,
            Some([left, right]) => {
                let level = levels_left
                    .checked_sub(1)
                    .expect("a node with children is above the terminal depth");

                self.vacant_below(left, level)
                    .checked_add(self.vacant_below(right, level))
                    .expect("vacancy counts sum to at most the id capacity")
            }
        }
    }
}
