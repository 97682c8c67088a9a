/// Occupancy rollup for the region a trie node stands in for.
///
/// A childless node's status is authoritative for every id in its region; a
/// node with children always carries the rollup of its two children.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Status {
    /// Every id in the region is occupied.
    Full,

    /// Every id in the region is free.
    Vacant,

    /// The region contains both occupied and free ids. Only nodes with
    /// children can be partial.
    Partial,
}

impl Status {
    /// The rollup of a sibling pair, when it is uniform.
    ///
    /// `Some` is also the compaction trigger: a uniform pair is destroyed
    /// and the parent becomes childless with the folded status.
    pub(crate) fn fold_uniform(left: Self, right: Self) -> Option<Self> {
        match (left, right) {
            (Self::Full, Self::Full) => Some(Self::Full),
            (Self::Vacant, Self::Vacant) => Some(Self::Vacant),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_pairs_fold() {
        assert_eq!(
            Status::fold_uniform(Status::Full, Status::Full),
            Some(Status::Full)
        );
        assert_eq!(
            Status::fold_uniform(Status::Vacant, Status::Vacant),
            Some(Status::Vacant)
        );
    }

    #[test]
    fn mixed_pairs_do_not_fold() {
        assert_eq!(Status::fold_uniform(Status::Full, Status::Vacant), None);
        assert_eq!(Status::fold_uniform(Status::Vacant, Status::Full), None);
        assert_eq!(Status::fold_uniform(Status::Partial, Status::Partial), None);
        assert_eq!(Status::fold_uniform(Status::Partial, Status::Vacant), None);
        assert_eq!(Status::fold_uniform(Status::Full, Status::Partial), None);
    }
}
