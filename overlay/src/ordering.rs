//! The order in which the traverser sees turn operations.
//!
//! Operations are sorted by where they sit on their own boundary (segment, then
//! distance along the segment), with ties broken first by the other ring and
//! then by a configurable rank of the operation kind.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
    num::Float,
    turns::{OperationKind, Turn, TurnOperation},
};

/// Tie-breaking ranks for operations at the same place.
///
/// Lower ranks sort first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationRanks {
    pub none: i32,
    pub union: i32,
    pub intersection: i32,
    pub blocked: i32,
    pub continue_: i32,
    pub opposite: i32,
}

impl Default for OperationRanks {
    fn default() -> Self {
        OperationRanks {
            none: 0,
            union: 1,
            intersection: 2,
            blocked: 3,
            continue_: 4,
            opposite: 0,
        }
    }
}

impl OperationRanks {
    pub fn rank(&self, kind: OperationKind) -> i32 {
        match kind {
            OperationKind::None => self.none,
            OperationKind::Union => self.union,
            OperationKind::Intersection => self.intersection,
            OperationKind::Blocked => self.blocked,
            OperationKind::Continue => self.continue_,
            OperationKind::Opposite => self.opposite,
        }
    }
}

fn compare_distance<F: Float>(left: &Option<F>, right: &Option<F>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) if l.approx_eq(r) => Ordering::Equal,
        (l, r) => l.cmp(r),
    }
}

/// Operations without an other ring go after those with one.
fn compare_other_ring<T: Ord>(left: &Option<T>, right: &Option<T>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.cmp(r),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

/// The total ordering on operations.
///
/// Distances that are approximately equal count as equal, so this is only a
/// strict weak ordering as long as distinct distances aren't clustered more
/// tightly than the tolerance of [`Float::approx_eq`].
pub fn compare_operations<F: Float>(
    left: &TurnOperation<F>,
    right: &TurnOperation<F>,
    ranks: &OperationRanks,
) -> Ordering {
    left.seg_id
        .cmp(&right.seg_id)
        .then_with(|| compare_distance(&left.enriched.distance, &right.enriched.distance))
        .then_with(|| compare_other_ring(&left.enriched.other_ring, &right.enriched.other_ring))
        .then_with(|| ranks.rank(left.kind).cmp(&ranks.rank(right.kind)))
}

/// Is `left` strictly before `right`?
pub fn operation_less<F: Float>(
    left: &TurnOperation<F>,
    right: &TurnOperation<F>,
    ranks: &OperationRanks,
) -> bool {
    compare_operations(left, right, ranks) == Ordering::Less
}

/// Orders whole turns by one of their operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegDistOpOrder {
    /// Which operation (that is, which source) to order by.
    pub op_index: usize,
    pub ranks: OperationRanks,
}

impl SegDistOpOrder {
    pub fn new(op_index: usize) -> Self {
        SegDistOpOrder {
            op_index,
            ranks: OperationRanks::default(),
        }
    }

    pub fn compare<F: Float>(&self, left: &Turn<F>, right: &Turn<F>) -> Ordering {
        compare_operations(
            &left.operations[self.op_index],
            &right.operations[self.op_index],
            &self.ranks,
        )
    }

    pub fn less<F: Float>(&self, left: &Turn<F>, right: &Turn<F>) -> bool {
        self.compare(left, right) == Ordering::Less
    }

    /// Stable-sorts `turns` by this order.
    pub fn sort<F: Float>(&self, turns: &mut [Turn<F>]) {
        turns.sort_by(|l, r| self.compare(l, r));
    }
}
