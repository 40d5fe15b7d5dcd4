//! Finding the turns: every point where the boundaries of the two inputs meet.
//!
//! Each turn is reported exactly once per pair of rings. When a contact point
//! is a vertex, the segments that *end* there don't report it; the segments
//! that *start* there do. That's also the convention that makes each turn
//! operation's segment the one you leave the turn along.

use malachite::Rational;

use crate::{
    geom::{Point, Segment},
    num::Float,
    rings::{Rings, SegmentId},
    strategy::{Side, SideStrategy},
    turns::{Method, OperationKind, Turn, TurnOperation},
};

/// Lets the caller stop detection early.
pub trait InterruptPolicy<F: Float> {
    /// Called after every batch of new turns. Returning `true` stops detection.
    fn apply(&mut self, turns: &[Turn<F>]) -> bool;
}

/// Finds all the turns.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterrupt;

impl<F: Float> InterruptPolicy<F> for NoInterrupt {
    fn apply(&mut self, _turns: &[Turn<F>]) -> bool {
        false
    }
}

/// Stops as soon as there's a single turn, for when all you want to know is
/// whether the boundaries meet.
#[derive(Clone, Copy, Debug, Default)]
pub struct StopAtFirstTurn {
    pub has_intersections: bool,
}

impl<F: Float> InterruptPolicy<F> for StopAtFirstTurn {
    fn apply(&mut self, turns: &[Turn<F>]) -> bool {
        self.has_intersections = !turns.is_empty();
        self.has_intersections
    }
}

/// Finds the turns between the boundaries of `a` (source 0) and `b` (source 1).
///
/// The rings are assumed to be clockwise; see
/// [`reverse_operations`](crate::enrich::reverse_operations) for the fix-up
/// when they aren't. A turn that can't be classified is reported with
/// [`Method::Error`] and operations of kind [`OperationKind::None`].
pub fn detect<F, S, I>(a: &Rings<F>, b: &Rings<F>, side: &S, interrupt: &mut I) -> Vec<Turn<F>>
where
    F: Float,
    S: SideStrategy<F>,
    I: InterruptPolicy<F>,
{
    let a_segs: Vec<_> = a.segments().collect();
    let mut b_segs: Vec<_> = b.segments().collect();
    b_segs.sort_by(|(_, s), (_, t)| s.min_x().cmp(t.min_x()));

    let mut turns = Vec::new();
    let mut candidates = 0usize;
    for (a_id, a_seg) in &a_segs {
        for (b_id, b_seg) in &b_segs {
            if b_seg.min_x() > a_seg.max_x() {
                break;
            }
            if !a_seg.bbox_overlaps(b_seg) {
                continue;
            }
            candidates += 1;

            let found = segment_turns(a_seg, b_seg, side);
            if found.is_empty() {
                continue;
            }
            for (point, method) in found {
                let turn = classify(point, method, (a, *a_id, a_seg), (b, *b_id, b_seg), side);
                log::trace!("turn {:?}", turn);
                turns.push(turn);
            }
            if interrupt.apply(&turns) {
                log::debug!("turn detection interrupted after {} turns", turns.len());
                return turns;
            }
        }
    }
    log::debug!(
        "found {} turns among {} candidate segment pairs",
        turns.len(),
        candidates
    );
    turns
}

/// The contact points between two segments, and how they meet there.
///
/// Contacts at the end point of either segment are skipped, because the
/// following segment reports them.
fn segment_turns<F: Float, S: SideStrategy<F>>(
    a: &Segment<F>,
    b: &Segment<F>,
    side: &S,
) -> Vec<(Point<F>, Method)> {
    let a0_side = side.side(&b.start, &b.end, &a.start);
    let a1_side = side.side(&b.start, &b.end, &a.end);
    let b0_side = side.side(&a.start, &a.end, &b.start);
    let b1_side = side.side(&a.start, &a.end, &b.end);

    let not_an_end = |p: &Point<F>| p != &a.end && p != &b.end;

    if a0_side.is_collinear() && a1_side.is_collinear() {
        let method = if (a.start == b.start && a.end == b.end)
            || (a.start == b.end && a.end == b.start)
        {
            Method::Equal
        } else {
            Method::Collinear
        };
        let mut ret = Vec::new();
        if b.bbox_contains(&a.start) && not_an_end(&a.start) {
            ret.push((a.start.clone(), method));
        }
        if a.bbox_contains(&b.start) && not_an_end(&b.start) && b.start != a.start {
            ret.push((b.start.clone(), method));
        }
        return ret;
    }

    if a0_side.opposes(a1_side) && b0_side.opposes(b1_side) {
        return match crossing_point(a, b) {
            Some(p) => vec![(p, Method::Crossing)],
            None => {
                log::debug!("{:?} and {:?} cross, but are parallel", a, b);
                vec![(a.start.clone(), Method::Error)]
            }
        };
    }

    // The segments aren't parallel, so they meet at most once.
    if a0_side.is_collinear() && b.bbox_contains(&a.start) && not_an_end(&a.start) {
        let method = if a.start == b.start {
            Method::TouchVertex
        } else {
            Method::Touch
        };
        return vec![(a.start.clone(), method)];
    }
    if b0_side.is_collinear() && a.bbox_contains(&b.start) && not_an_end(&b.start) {
        return vec![(b.start.clone(), Method::Touch)];
    }
    Vec::new()
}

/// Where two properly crossing segments cross, rounded to the nearest `F`.
///
/// The crossing is computed exactly, so nearly parallel segments are fine. An
/// inexact side strategy can claim a crossing for exactly parallel segments,
/// though, and then this returns `None`.
fn crossing_point<F: Float>(a: &Segment<F>, b: &Segment<F>) -> Option<Point<F>> {
    let a = a.to_exact();
    let b = b.to_exact();
    let denom = a.direction().cross(&b.direction());
    if denom == 0 {
        return None;
    }
    let t = (&b.start - &a.start).cross(&b.direction()) / denom;
    let t = t.clamp(Rational::from(0), Rational::from(1));
    let p = a.start.affine(&a.end, &t);
    Some(Point::new(F::from_exact(&p.x), F::from_exact(&p.y)))
}

/// Fills in the operations of the turn at `point`.
fn classify<F: Float, S: SideStrategy<F>>(
    point: Point<F>,
    method: Method,
    (a, a_id, a_seg): (&Rings<F>, SegmentId, &Segment<F>),
    (b, b_id, b_seg): (&Rings<F>, SegmentId, &Segment<F>),
    side: &S,
) -> Turn<F> {
    let a_kind = operation_kind(&point, a_seg, b, b_id, b_seg, side);
    let b_kind = operation_kind(&point, b_seg, a, a_id, a_seg, side);
    match (a_kind, b_kind) {
        (Some(a_kind), Some(b_kind)) => Turn {
            point,
            method,
            operations: [
                TurnOperation::new(a_id, a_kind),
                TurnOperation::new(b_id, b_kind),
            ],
        },
        _ => {
            log::debug!("unclassifiable turn at {:?}", point);
            Turn {
                point,
                method: Method::Error,
                operations: [
                    TurnOperation::new(a_id, OperationKind::None),
                    TurnOperation::new(b_id, OperationKind::None),
                ],
            }
        }
    }
}

/// What leaving `point` along `own` does, relative to the other geometry.
///
/// Returns `None` if the other geometry's boundary is degenerate at `point`.
fn operation_kind<F: Float, S: SideStrategy<F>>(
    point: &Point<F>,
    own: &Segment<F>,
    other: &Rings<F>,
    other_id: SegmentId,
    other_seg: &Segment<F>,
    side: &S,
) -> Option<OperationKind> {
    if point == &other_seg.start {
        let prev = other.prev_point(other_id);
        wedge_kind(prev, point, &other_seg.end, &own.end, side)
    } else {
        Some(edge_kind(own, other_seg, side))
    }
}

/// Classifies the end point `own.end` against an edge whose interior contains the
/// turn point.
fn edge_kind<F: Float, S: SideStrategy<F>>(
    own: &Segment<F>,
    other: &Segment<F>,
    side: &S,
) -> OperationKind {
    match side.side(&other.start, &other.end, &own.end) {
        Side::Right => OperationKind::Intersection,
        Side::Left => OperationKind::Union,
        Side::Collinear => {
            if own.direction().dot(&other.direction()) > F::from_f32(0.0) {
                OperationKind::Continue
            } else {
                OperationKind::Opposite
            }
        }
    }
}

/// Classifies the point `d` against the corner `prev -> p -> next` of a
/// clockwise ring.
fn wedge_kind<F: Float, S: SideStrategy<F>>(
    prev: &Point<F>,
    p: &Point<F>,
    next: &Point<F>,
    d: &Point<F>,
    side: &S,
) -> Option<OperationKind> {
    if prev == next {
        return None;
    }
    let zero = F::from_f32(0.0);
    let dir = d - p;
    let s_in = side.side(prev, p, d);
    let s_out = side.side(p, next, d);
    if s_out.is_collinear() && dir.dot(&(next - p)) > zero {
        return Some(OperationKind::Continue);
    }
    if s_in.is_collinear() && dir.dot(&(prev - p)) > zero {
        return Some(OperationKind::Opposite);
    }

    let inside = match side.side(prev, p, next) {
        // Convex corner: the interior is the intersection of the two half-planes.
        Side::Right => s_in == Side::Right && s_out == Side::Right,
        // Reflex corner: the exterior is the intersection of the two half-planes.
        Side::Left => !(s_in == Side::Left && s_out == Side::Left),
        Side::Collinear => {
            if (next - p).dot(&(p - prev)) > zero {
                s_out == Side::Right
            } else {
                // A spike.
                return None;
            }
        }
    };
    Some(if inside {
        OperationKind::Intersection
    } else {
        OperationKind::Union
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use ordered_float::NotNan;

    use super::*;
    use crate::{
        geom::{Geometry, Ring},
        strategy::ExactSide,
    };

    type F = NotNan<f64>;

    fn p(x: f64, y: f64) -> Point<F> {
        Point::from((x, y))
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry<F> {
        Geometry::Ring(Ring::new([p(x0, y0), p(x0, y1), p(x1, y1), p(x1, y0)]))
    }

    fn turns(a: &Geometry<F>, b: &Geometry<F>) -> Vec<Turn<F>> {
        let a = Rings::from_geometry(0, a, false);
        let b = Rings::from_geometry(1, b, false);
        let mut turns = detect(&a, &b, &ExactSide, &mut NoInterrupt);
        turns.sort_by(|s, t| s.point.cmp(&t.point));
        turns
    }

    fn summary(turns: &[Turn<F>]) -> Vec<((f64, f64), Method, OperationKind, OperationKind)> {
        turns
            .iter()
            .map(|t| {
                (
                    (t.point.x.into_inner(), t.point.y.into_inner()),
                    t.method,
                    t.operations[0].kind,
                    t.operations[1].kind,
                )
            })
            .collect()
    }

    #[test]
    fn crossing_squares() {
        let turns = turns(&rect(0.0, 0.0, 4.0, 4.0), &rect(2.0, 2.0, 6.0, 6.0));
        insta::assert_debug_snapshot!(summary(&turns), @r###"
        [
            (
                (
                    4.0,
                    2.0,
                ),
                Crossing,
                Union,
                Intersection,
            ),
            (
                (
                    2.0,
                    4.0,
                ),
                Crossing,
                Intersection,
                Union,
            ),
        ]
        "###);
    }

    #[test]
    fn shared_edge() {
        let turns = turns(&rect(0.0, 0.0, 2.0, 2.0), &rect(2.0, 0.0, 4.0, 2.0));
        assert_eq!(
            summary(&turns),
            vec![
                (
                    (2.0, 0.0),
                    Method::TouchVertex,
                    OperationKind::Union,
                    OperationKind::Opposite
                ),
                (
                    (2.0, 2.0),
                    Method::TouchVertex,
                    OperationKind::Opposite,
                    OperationKind::Union
                ),
            ]
        );
    }

    #[test]
    fn partially_overlapping_edges() {
        let turns = turns(&rect(0.0, 0.0, 2.0, 2.0), &rect(1.0, 0.0, 3.0, 2.0));
        assert_eq!(
            summary(&turns),
            vec![
                (
                    (1.0, 0.0),
                    Method::Touch,
                    OperationKind::Union,
                    OperationKind::Intersection
                ),
                (
                    (2.0, 0.0),
                    Method::Collinear,
                    OperationKind::Continue,
                    OperationKind::Continue
                ),
                (
                    (1.0, 2.0),
                    Method::Collinear,
                    OperationKind::Continue,
                    OperationKind::Continue
                ),
                (
                    (2.0, 2.0),
                    Method::Touch,
                    OperationKind::Intersection,
                    OperationKind::Union
                ),
            ]
        );
    }

    #[test]
    fn identical_rings() {
        let turns = turns(&rect(0.0, 0.0, 1.0, 1.0), &rect(0.0, 0.0, 1.0, 1.0));
        assert_eq!(turns.len(), 4);
        for t in &turns {
            assert_eq!(t.method, Method::Equal);
            assert!(t.both(OperationKind::Continue));
            assert_eq!(t.operations[0].seg_id.segment_index, t.operations[1].seg_id.segment_index);
        }
    }

    #[test]
    fn corner_touch() {
        let turns = turns(&rect(0.0, 0.0, 1.0, 1.0), &rect(1.0, 1.0, 2.0, 2.0));
        assert_eq!(
            summary(&turns),
            vec![(
                (1.0, 1.0),
                Method::TouchVertex,
                OperationKind::Union,
                OperationKind::Union
            )]
        );
    }

    #[test]
    fn disjoint_and_contained() {
        assert!(turns(&rect(0.0, 0.0, 1.0, 1.0), &rect(5.0, 5.0, 6.0, 6.0)).is_empty());
        assert!(turns(&rect(0.0, 0.0, 10.0, 10.0), &rect(1.0, 1.0, 2.0, 2.0)).is_empty());
    }

    #[test]
    fn spike_is_an_error() {
        // The second ring doubles back on itself at (2, 2), right where the first
        // ring passes through.
        let spiky = Geometry::Ring(Ring::new([
            p(2.0, 4.0),
            p(2.0, 2.0),
            p(2.0, 3.0),
            p(3.0, 5.0),
        ]));
        let turns = turns(&rect(0.0, 0.0, 4.0, 2.0), &spiky);
        assert_matches!(
            turns.iter().find(|t| t.method == Method::Error),
            Some(Turn { point, .. }) if point == &p(2.0, 2.0)
        );
    }

    #[test]
    fn nearly_parallel_crossing() {
        // In f64, the cross product of the two long edges rounds to zero.
        let a = Geometry::Ring(Ring::new([p(0.0, 0.0), p(1e9 + 1.0, 1e9), p(1e9 + 1.0, 0.0)]));
        let b = Geometry::Ring(Ring::new([
            p(0.5, 0.5),
            p(0.5, 1e9),
            p(1e9 + 0.5, 1e9 - 0.5),
        ]));
        let turns = turns(&a, &b);
        assert!(!turns.is_empty());
        assert!(turns.iter().all(|t| t.method != Method::Error));

        let a = Rings::from_geometry(0, &a, false);
        let b = Rings::from_geometry(1, &b, false);
        for t in turns.iter().filter(|t| t.method == Method::Crossing) {
            let [op_a, op_b] = &t.operations;
            assert!(a.segment(op_a.seg_id).bbox_contains(&t.point));
            assert!(b.segment(op_b.seg_id).bbox_contains(&t.point));
        }
    }

    #[test]
    fn stops_at_first_turn() {
        let a = Rings::from_geometry(0, &rect(0.0, 0.0, 4.0, 4.0), false);
        let b = Rings::from_geometry(1, &rect(2.0, 2.0, 6.0, 6.0), false);
        let mut policy = StopAtFirstTurn::default();
        let turns = detect(&a, &b, &ExactSide, &mut policy);
        assert_eq!(turns.len(), 1);
        assert!(policy.has_intersections);
    }
}
