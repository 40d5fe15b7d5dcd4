//! The data model shared by every phase of the overlay.
//!
//! A [`Turn`] is a point where the boundaries of the two input geometries meet.
//! It carries one [`TurnOperation`] per input, describing what happens if you
//! leave the turn along that input's boundary. The detector creates turns, the
//! enricher fills in their [`EnrichmentInfo`], and the traverser walks them.

use serde::{Deserialize, Serialize};

use crate::{geom::Point, num::Float, rings::RingId, rings::SegmentId};

/// How two segments meet at a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Method {
    /// The segments cross at a point interior to both.
    Crossing,
    /// A segment starts in the interior of the other one.
    Touch,
    /// Both segments start at the turn point.
    TouchVertex,
    /// The segments overlap along a stretch.
    Collinear,
    /// The segments are identical.
    Equal,
    /// The segments don't meet.
    Disjoint,
    /// The turn couldn't be classified; the overlay fails if it sees one.
    Error,
}

/// What leaving a turn along one geometry's boundary does to the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum OperationKind {
    #[default]
    None,
    /// The outgoing edge runs outside the other geometry.
    Union,
    /// The outgoing edge runs inside the other geometry.
    Intersection,
    /// Never to be taken.
    Blocked,
    /// The outgoing edge coincides with one of the other geometry's edges, and
    /// both run the same way.
    Continue,
    /// The outgoing edge coincides with one of the other geometry's edges, and
    /// they run opposite ways.
    Opposite,
}

impl OperationKind {
    /// Union and intersection trade places when the rings run the other way.
    pub fn reversed(self) -> Self {
        match self {
            OperationKind::Union => OperationKind::Intersection,
            OperationKind::Intersection => OperationKind::Union,
            other => other,
        }
    }
}

/// Which boolean operation to compute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[default]
    Union,
    Intersection,
    /// The first input minus the second.
    Difference,
}

impl Operator {
    /// The operation kind the traverser follows for this operator.
    ///
    /// A difference gets computed as an intersection with the reversed second
    /// input.
    pub fn traversal_kind(self) -> OperationKind {
        match self {
            Operator::Union => OperationKind::Union,
            Operator::Intersection | Operator::Difference => OperationKind::Intersection,
        }
    }
}

/// Per-operation data filled in by the enricher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnrichmentInfo<F: Float> {
    /// A comparable distance from the start of the operation's segment to the
    /// turn point.
    pub distance: Option<F>,
    /// The ring of the other geometry that this turn touches.
    pub other_ring: Option<RingId>,
    /// The next operation (on this operation's ring) at a different point.
    pub travels_to: Option<OpIdx>,
    /// The first ring vertex to emit when travelling to `travels_to`, or `None`
    /// if the target lies further along the same segment.
    pub travels_to_vertex: Option<usize>,
}

impl<F: Float> Default for EnrichmentInfo<F> {
    fn default() -> Self {
        EnrichmentInfo {
            distance: None,
            other_ring: None,
            travels_to: None,
            travels_to_vertex: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnOperation<F: Float> {
    pub seg_id: SegmentId,
    pub kind: OperationKind,
    pub enriched: EnrichmentInfo<F>,
}

impl<F: Float> TurnOperation<F> {
    pub fn new(seg_id: SegmentId, kind: OperationKind) -> Self {
        TurnOperation {
            seg_id,
            kind,
            enriched: EnrichmentInfo::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Turn<F: Float> {
    pub point: Point<F>,
    pub method: Method,
    /// Indexed by source: `operations[0]` is on the first input.
    pub operations: [TurnOperation<F>; 2],
}

impl<F: Float> Turn<F> {
    pub fn both(&self, kind: OperationKind) -> bool {
        self.operations.iter().all(|op| op.kind == kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TurnIdx(pub usize);

/// Points at one operation of one turn.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OpIdx {
    pub turn: TurnIdx,
    pub source: usize,
}

impl std::fmt::Debug for OpIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}[{}]", self.turn.0, self.source)
    }
}

impl OpIdx {
    pub fn new(turn: usize, source: usize) -> Self {
        OpIdx {
            turn: TurnIdx(turn),
            source,
        }
    }

    /// The operation of the same turn on the other input.
    pub fn sibling(self) -> Self {
        OpIdx {
            turn: self.turn,
            source: 1 - self.source,
        }
    }
}

/// Every operation of every turn, in index order.
pub fn op_indices<F: Float>(turns: &[Turn<F>]) -> impl Iterator<Item = OpIdx> {
    (0..turns.len()).flat_map(|t| [OpIdx::new(t, 0), OpIdx::new(t, 1)])
}

/// The operation `idx` points at.
pub fn operation<F: Float>(turns: &[Turn<F>], idx: OpIdx) -> &TurnOperation<F> {
    &turns[idx.turn.0].operations[idx.source]
}

pub fn operation_mut<F: Float>(turns: &mut [Turn<F>], idx: OpIdx) -> &mut TurnOperation<F> {
    &mut turns[idx.turn.0].operations[idx.source]
}

/// A side table with one entry per operation.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct OpVec<T> {
    pub first: Vec<T>,
    pub second: Vec<T>,
}

impl<T: Clone> OpVec<T> {
    pub fn with_size(num_turns: usize, init: T) -> Self {
        OpVec {
            first: vec![init.clone(); num_turns],
            second: vec![init; num_turns],
        }
    }
}

impl<T> OpVec<T> {
    pub fn iter(&self) -> impl Iterator<Item = (OpIdx, &T)> {
        let first = self.first.iter().enumerate().map(|(i, x)| (OpIdx::new(i, 0), x));
        let second = self.second.iter().enumerate().map(|(i, x)| (OpIdx::new(i, 1), x));
        first.chain(second)
    }
}

impl<T> std::ops::Index<OpIdx> for OpVec<T> {
    type Output = T;

    fn index(&self, index: OpIdx) -> &Self::Output {
        if index.source == 0 {
            &self.first[index.turn.0]
        } else {
            &self.second[index.turn.0]
        }
    }
}

impl<T> std::ops::IndexMut<OpIdx> for OpVec<T> {
    fn index_mut(&mut self, index: OpIdx) -> &mut T {
        if index.source == 0 {
            &mut self.first[index.turn.0]
        } else {
            &mut self.second[index.turn.0]
        }
    }
}
