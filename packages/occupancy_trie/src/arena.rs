use std::collections::TryReserveError;

use crate::Status;

/// A status node of the occupancy trie.
///
/// A node stores no id and no parent reference. Its place in the id space is
/// implied entirely by the sequence of left/right choices taken from the
/// root, most significant id bit first, which is what keeps the node small.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Node {
    pub(crate) status: Status,

    /// Arena indexes of the two children, or `None` for a childless node.
    /// A node never has exactly one child.
    pub(crate) children: Option<[usize; 2]>,
}

impl Node {
    pub(crate) fn childless(status: Status) -> Self {
        Self {
            status,
            children: None,
        }
    }
}

#[derive(Debug)]
enum Slot {
    Occupied { node: Node },

    Vacant { next_free: Option<usize> },
}

/// Backing storage for trie nodes.
///
/// Nodes live in a growable slot table and reference each other by index.
/// Freed slots are recycled through an intrusive free list threaded through
/// the vacant slots themselves, so compaction churn does not keep growing
/// the table. Whole-tree teardown is a single table reset.
#[derive(Debug)]
pub(crate) struct NodeArena {
    slots: Vec<Slot>,

    /// Head of the free list. Think of this as a virtual stack of the most
    /// recently freed slots, with the stack entries stored in the vacant
    /// slots themselves.
    first_free: Option<usize>,

    /// The number of occupied slots. Kept separately because the free list
    /// does not know its own length.
    live: usize,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            first_free: None,
            live: 0,
        }
    }

    /// The number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// The number of nodes the table can hold without growing.
    #[cfg_attr(test, mutants::skip)] // Just capacity reporting; mutations only change how eagerly we reallocate.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn slot_size() -> usize {
        size_of::<Slot>()
    }

    pub(crate) fn get(&self, index: usize) -> &Node {
        match self.slots.get(index) {
            Some(Slot::Occupied { node }) => node,
            _ => panic!("node index {index} does not refer to a live node"),
        }
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Node {
        match self.slots.get_mut(index) {
            Some(Slot::Occupied { node }) => node,
            _ => panic!("node index {index} does not refer to a live node"),
        }
    }

    /// Grows the table so that at least `additional` more nodes fit without
    /// further allocation.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.slots.try_reserve(additional)
    }

    /// Places a node into a recycled slot if one is free, growing the table
    /// otherwise. Growth is fallible so that a failed allocation surfaces to
    /// the caller instead of aborting the process.
    pub(crate) fn try_insert(&mut self, node: Node) -> Result<usize, TryReserveError> {
        let index = match self.first_free {
            Some(index) => {
                let slot = self
                    .slots
                    .get_mut(index)
                    .expect("free list entries always point at existing slots");
                let next_free = match slot {
                    Slot::Vacant { next_free } => *next_free,
                    Slot::Occupied { .. } => {
                        unreachable!("free list entry pointed at an occupied slot")
                    }
                };

                *slot = Slot::Occupied { node };
                self.first_free = next_free;
                index
            }
            None => {
                self.slots.try_reserve(1)?;
                self.slots.push(Slot::Occupied { node });

                self.slots
                    .len()
                    .checked_sub(1)
                    .expect("we just pushed a slot, so len >= 1")
            }
        };

        self.live = self
            .live
            .checked_add(1)
            .expect("live count cannot exceed slot count");

        Ok(index)
    }

    /// Returns a node's slot to the free list.
    pub(crate) fn remove(&mut self, index: usize) {
        let slot = self
            .slots
            .get_mut(index)
            .expect("caller only removes nodes it previously inserted");

        debug_assert!(
            matches!(slot, Slot::Occupied { .. }),
            "removed slot must be occupied"
        );

        *slot = Slot::Vacant {
            next_free: self.first_free,
        };
        self.first_free = Some(index);

        self.live = self
            .live
            .checked_sub(1)
            .expect("remove is only called on live nodes");
    }

    /// Discards every node and all free-list state. Capacity is retained so
    /// the arena can be repopulated without reallocating.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.first_free = None;
        self.live = 0;
    }

    /// Releases unused capacity.
    ///
    /// Trailing free slots are dropped from the table, the free list is
    /// relinked over the vacant slots that remain (lowest index first, so
    /// the table refills from the start), and the table itself shrinks.
    pub(crate) fn shrink_to_fit(&mut self) {
        let new_len = self
            .slots
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, slot)| match slot {
                Slot::Occupied { .. } => {
                    Some(index.checked_add(1).expect("slot index cannot overflow"))
                }
                Slot::Vacant { .. } => None,
            })
            .unwrap_or(0);

        self.slots.truncate(new_len);

        // The old free list may have pointed into the truncated tail.
        let mut first_free = None;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if let Slot::Vacant { next_free } = slot {
                *next_free = first_free;
                first_free = Some(index);
            }
        }
        self.first_free = first_free;

        self.slots.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vacant_node() -> Node {
        Node::childless(Status::Vacant)
    }

    #[test]
    fn insert_and_remove_track_live_count() {
        let mut arena = NodeArena::new();
        assert_eq!(arena.len(), 0);

        let a = arena.try_insert(vacant_node()).unwrap();
        let b = arena.try_insert(vacant_node()).unwrap();
        assert_eq!(arena.len(), 2);

        arena.remove(a);
        assert_eq!(arena.len(), 1);

        arena.remove(b);
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn freed_slots_are_recycled_most_recent_first() {
        let mut arena = NodeArena::new();

        let a = arena.try_insert(vacant_node()).unwrap();
        let b = arena.try_insert(vacant_node()).unwrap();
        let c = arena.try_insert(vacant_node()).unwrap();

        arena.remove(a);
        arena.remove(c);

        // The most recently freed slot comes back first.
        assert_eq!(arena.try_insert(vacant_node()).unwrap(), c);
        assert_eq!(arena.try_insert(vacant_node()).unwrap(), a);

        // No free slots remain, so the table grows.
        let d = arena.try_insert(vacant_node()).unwrap();
        assert_ne!(d, a);
        assert_ne!(d, b);
        assert_ne!(d, c);
    }

    #[test]
    fn get_mut_updates_are_visible() {
        let mut arena = NodeArena::new();

        let index = arena.try_insert(vacant_node()).unwrap();
        arena.get_mut(index).status = Status::Full;

        assert_eq!(arena.get(index).status, Status::Full);
    }

    #[test]
    #[should_panic]
    fn get_on_freed_slot_panics() {
        let mut arena = NodeArena::new();

        let index = arena.try_insert(vacant_node()).unwrap();
        arena.remove(index);

        _ = arena.get(index);
    }

    #[test]
    fn clear_resets_everything() {
        let mut arena = NodeArena::new();

        let a = arena.try_insert(vacant_node()).unwrap();
        _ = arena.try_insert(vacant_node()).unwrap();
        arena.remove(a);

        arena.clear();
        assert_eq!(arena.len(), 0);

        // The first insert after a clear lands at the start of the table.
        assert_eq!(arena.try_insert(vacant_node()).unwrap(), 0);
    }

    #[test]
    fn shrink_to_fit_drops_trailing_free_slots() {
        let mut arena = NodeArena::new();

        let keep = arena.try_insert(vacant_node()).unwrap();
        let freed = (0..16)
            .map(|_| arena.try_insert(vacant_node()).unwrap())
            .collect::<Vec<_>>();
        for index in freed {
            arena.remove(index);
        }

        arena.shrink_to_fit();

        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(keep).status, Status::Vacant);
        assert!(arena.capacity() <= 1);
    }

    #[test]
    fn shrink_to_fit_relinks_interior_holes_lowest_first() {
        let mut arena = NodeArena::new();

        let a = arena.try_insert(vacant_node()).unwrap();
        let b = arena.try_insert(vacant_node()).unwrap();
        let c = arena.try_insert(vacant_node()).unwrap();
        let _keep = arena.try_insert(vacant_node()).unwrap();

        arena.remove(c);
        arena.remove(a);
        arena.remove(b);

        arena.shrink_to_fit();

        // Interior holes survive the shrink and are handed out from the
        // start of the table.
        assert_eq!(arena.try_insert(vacant_node()).unwrap(), a);
        assert_eq!(arena.try_insert(vacant_node()).unwrap(), b);
        assert_eq!(arena.try_insert(vacant_node()).unwrap(), c);
    }
}
