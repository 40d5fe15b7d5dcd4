//! Walking the enriched turns to build the rings of the output.
//!
//! A walk starts at an unvisited operation whose kind matches the operation
//! being computed. It follows its ring to the next turn, and there picks the
//! operation to leave along, preferring to switch to the other geometry. The
//! walk is done once it comes back to the turn it started from.

use std::collections::HashMap;

use crate::{
    error::{OverlayError, Result},
    geom::{Point, Ring},
    num::Float,
    ordering::{compare_operations, OperationRanks},
    rings::Rings,
    turns::{op_indices, operation, OpIdx, OpVec, OperationKind, Operator, Turn},
};

/// The result of a traversal.
#[derive(Clone, Debug)]
pub struct Traversal<F: Float> {
    /// The closed rings assembled from pieces of the input boundaries.
    pub rings: Vec<Ring<F>>,
    /// How many times each operation was marked visited. At most once, if all
    /// is well.
    pub visits: OpVec<u32>,
}

enum State<F: Float> {
    SeekingStart,
    Walking {
        start: OpIdx,
        current: OpIdx,
        points: Vec<Point<F>>,
    },
    Closed {
        points: Vec<Point<F>>,
    },
}

struct Traverser<'a, F: Float> {
    rings: [&'a Rings<F>; 2],
    turns: &'a [Turn<F>],
    kind: OperationKind,
    visits: OpVec<u32>,
    /// All the turns at each turn point.
    nodes: HashMap<&'a Point<F>, Vec<usize>>,
    /// Candidate starting operations, in the order they get tried.
    starts: Vec<OpIdx>,
    next_start: usize,
    /// Steps left before we give up on a walk that never closes.
    budget: usize,
}

/// Walks `turns` (which must already be enriched) and returns the output rings.
///
/// `a` and `b` must be the rings the turns were detected on.
pub fn traverse<F: Float>(
    a: &Rings<F>,
    b: &Rings<F>,
    turns: &[Turn<F>],
    operator: Operator,
    ranks: &OperationRanks,
) -> Result<Traversal<F>> {
    let kind = operator.traversal_kind();
    let mut nodes: HashMap<&Point<F>, Vec<usize>> = HashMap::new();
    for (idx, turn) in turns.iter().enumerate() {
        nodes.entry(&turn.point).or_default().push(idx);
    }

    let mut starts: Vec<OpIdx> = op_indices(turns)
        .filter(|&idx| matches(operation(turns, idx).kind, kind))
        .collect();
    starts.sort_by(|&l, &r| compare_operations(operation(turns, l), operation(turns, r), ranks));

    let traverser = Traverser {
        rings: [a, b],
        turns,
        kind,
        visits: OpVec::with_size(turns.len(), 0),
        nodes,
        starts,
        next_start: 0,
        budget: 2 * turns.len() + 1,
    };
    traverser.run()
}

/// Can a walk computing `target` leave along an operation of this kind?
fn matches(kind: OperationKind, target: OperationKind) -> bool {
    kind == target || kind == OperationKind::Continue
}

impl<'a, F: Float> Traverser<'a, F> {
    fn run(mut self) -> Result<Traversal<F>> {
        let mut out = Vec::new();
        let mut state = State::SeekingStart;
        loop {
            state = match state {
                State::SeekingStart => {
                    let Some(start) = self.find_start() else {
                        break;
                    };
                    log::trace!("starting at {:?}", start);
                    self.take(start);
                    State::Walking {
                        start,
                        current: start,
                        points: vec![self.point(start).clone()],
                    }
                }
                State::Walking {
                    start,
                    current,
                    mut points,
                } => {
                    if self.budget == 0 {
                        return Err(self.stuck(start));
                    }
                    self.budget -= 1;
                    let arrival = self.advance(start, current, &mut points)?;
                    let node = self.node(arrival);
                    if node.iter().any(|&t| t == start.turn.0) {
                        State::Closed { points }
                    } else {
                        let next = self
                            .choose(arrival, current.source)
                            .ok_or_else(|| self.stuck(start))?;
                        log::trace!("at {:?}, leaving along {:?}", self.point(arrival), next);
                        self.take(next);
                        State::Walking {
                            start,
                            current: next,
                            points,
                        }
                    }
                }
                State::Closed { points } => {
                    out.push(Ring::new(points));
                    State::SeekingStart
                }
            };
        }
        log::debug!("traversal closed {} rings", out.len());
        Ok(Traversal {
            rings: out,
            visits: self.visits,
        })
    }

    fn point(&self, idx: OpIdx) -> &'a Point<F> {
        &self.turns[idx.turn.0].point
    }

    fn kind(&self, idx: OpIdx) -> OperationKind {
        operation(self.turns, idx).kind
    }

    fn node(&self, idx: OpIdx) -> &[usize] {
        self.nodes
            .get(self.point(idx))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn stuck(&self, start: OpIdx) -> OverlayError {
        let p = self.point(start);
        log::debug!("traversal from {:?} got stuck", p);
        OverlayError::NonClosingFragment {
            x: p.x.to_f64(),
            y: p.y.to_f64(),
        }
    }

    fn find_start(&mut self) -> Option<OpIdx> {
        while let Some(&idx) = self.starts.get(self.next_start) {
            if self.visits[idx] == 0 {
                return Some(idx);
            }
            self.next_start += 1;
        }
        None
    }

    /// Follows `current` along its ring, appending the points passed on the way.
    ///
    /// Returns the operation arrived at.
    fn advance(&self, start: OpIdx, current: OpIdx, points: &mut Vec<Point<F>>) -> Result<OpIdx> {
        let op = operation(self.turns, current);
        let target = op.enriched.travels_to.ok_or_else(|| self.stuck(start))?;
        let ring = self.rings[current.source].ring(op.seg_id.ring()).points();

        let mut push = |p: &Point<F>| {
            if points.last() != Some(p) {
                points.push(p.clone());
            }
        };
        if let Some(first) = op.enriched.travels_to_vertex {
            let last = operation(self.turns, target).seg_id.segment_index;
            let mut i = first;
            loop {
                push(&ring[i]);
                if i == last {
                    break;
                }
                i = (i + 1) % ring.len();
            }
        }
        push(self.point(target));
        Ok(target)
    }

    /// Picks the operation to leave along after arriving at `arrival` on
    /// geometry `source`.
    fn choose(&self, arrival: OpIdx, source: usize) -> Option<OpIdx> {
        let other = 1 - source;
        let node_turns: Vec<usize> = std::iter::once(arrival.turn.0)
            .chain(self.node(arrival).iter().copied().filter(|&t| t != arrival.turn.0))
            .collect();
        let visits = &self.visits;
        let candidates = |s: usize| {
            node_turns
                .iter()
                .map(move |&t| OpIdx::new(t, s))
                .filter(move |&idx| visits[idx] == 0)
        };

        candidates(other)
            .find(|&idx| self.kind(idx) == self.kind)
            .or_else(|| candidates(source).find(|&idx| matches(self.kind(idx), self.kind)))
            .or_else(|| candidates(other).find(|&idx| self.kind(idx) == OperationKind::Continue))
    }

    /// Marks `idx` visited, together with every other operation at the same
    /// point that leaves along the same edge.
    fn take(&mut self, idx: OpIdx) {
        let op = operation(self.turns, idx);
        let mut edges = vec![op.seg_id];
        let sibling = operation(self.turns, idx.sibling());
        if op.kind == OperationKind::Continue && sibling.kind == OperationKind::Continue {
            edges.push(sibling.seg_id);
        }

        self.visits[idx] += 1;
        let node = self.node(idx).to_vec();
        for t in node {
            for s in 0..2 {
                let other = OpIdx::new(t, s);
                if self.visits[other] == 0 && edges.contains(&operation(self.turns, other).seg_id) {
                    self.visits[other] += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use ordered_float::NotNan;

    use super::*;
    use crate::{
        detect::{detect, NoInterrupt},
        enrich::enrich,
        geom::{Geometry, PointOrder},
        strategy::{ExactSide, SquaredDistance},
        turns::operation_mut,
    };

    type F = NotNan<f64>;

    fn p(x: f64, y: f64) -> Point<F> {
        Point::from((x, y))
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry<F> {
        Geometry::Ring(Ring::new([p(x0, y0), p(x0, y1), p(x1, y1), p(x1, y0)]))
    }

    fn prepare(a: &Geometry<F>, b: &Geometry<F>) -> (Rings<F>, Rings<F>, Vec<Turn<F>>) {
        let a = Rings::from_geometry(0, a, false);
        let b = Rings::from_geometry(1, b, false);
        let mut turns = detect(&a, &b, &ExactSide, &mut NoInterrupt);
        enrich(
            &mut turns,
            &a,
            &b,
            PointOrder::Clockwise,
            &SquaredDistance,
            &OperationRanks::default(),
        );
        (a, b, turns)
    }

    fn run(a: &Geometry<F>, b: &Geometry<F>, operator: Operator) -> Traversal<F> {
        let (a, b, turns) = prepare(a, b);
        traverse(&a, &b, &turns, operator, &OperationRanks::default()).unwrap()
    }

    #[test]
    fn crossing_squares_intersection() {
        let t = run(
            &rect(0.0, 0.0, 4.0, 4.0),
            &rect(2.0, 2.0, 6.0, 6.0),
            Operator::Intersection,
        );
        assert_eq!(
            t.rings,
            vec![Ring::new([p(2.0, 4.0), p(4.0, 4.0), p(4.0, 2.0), p(2.0, 2.0)])]
        );
    }

    #[test]
    fn crossing_squares_union() {
        let t = run(
            &rect(0.0, 0.0, 4.0, 4.0),
            &rect(2.0, 2.0, 6.0, 6.0),
            Operator::Union,
        );
        assert_eq!(
            t.rings,
            vec![Ring::new([
                p(4.0, 2.0),
                p(4.0, 0.0),
                p(0.0, 0.0),
                p(0.0, 4.0),
                p(2.0, 4.0),
                p(2.0, 6.0),
                p(6.0, 6.0),
                p(6.0, 2.0),
            ])]
        );
        assert!(t.visits.iter().all(|(_, &v)| v <= 1));
    }

    #[test]
    fn shared_edge_union() {
        let t = run(
            &rect(0.0, 0.0, 2.0, 2.0),
            &rect(2.0, 0.0, 4.0, 2.0),
            Operator::Union,
        );
        assert_eq!(t.rings.len(), 1);
        assert_eq!(t.rings[0].area(), NotNan::new(8.0).unwrap());
    }

    #[test]
    fn continue_operations_share_a_visit() {
        let t = run(
            &rect(0.0, 0.0, 2.0, 2.0),
            &rect(0.0, 0.0, 2.0, 2.0),
            Operator::Intersection,
        );
        assert_eq!(t.rings, vec![Ring::new([p(0.0, 0.0), p(0.0, 2.0), p(2.0, 2.0), p(2.0, 0.0)])]);
        assert!(t.visits.iter().all(|(_, &v)| v == 1));
    }

    #[test]
    fn touching_corners_close_separately() {
        let t = run(
            &rect(0.0, 0.0, 1.0, 1.0),
            &rect(1.0, 1.0, 2.0, 2.0),
            Operator::Union,
        );
        assert_eq!(t.rings.len(), 2);
        assert!(t.rings.iter().all(|r| r.len() == 4));
    }

    #[test]
    fn blocked_walk_is_an_error() {
        let (a, b, mut turns) = prepare(&rect(0.0, 0.0, 4.0, 4.0), &rect(2.0, 2.0, 6.0, 6.0));
        let right = turns.iter().position(|t| t.point == p(4.0, 2.0)).unwrap();
        operation_mut(&mut turns, OpIdx::new(right, 1)).kind = OperationKind::Blocked;
        assert_matches!(
            traverse(&a, &b, &turns, Operator::Intersection, &OperationRanks::default()),
            Err(OverlayError::NonClosingFragment { x, y }) if x == 2.0 && y == 4.0
        );
    }
}
