//! Turning traversed rings (and untouched input rings) into polygons.

use std::collections::BTreeMap;

use crate::{
    error::Result,
    geom::{MultiPolygon, Point, PointOrder, Polygon, Ring},
    num::Float,
    rings::{RingId, Rings},
    strategy::{Side, SideStrategy},
    turns::{Operator, Turn},
};

/// How many turn operations lie on each input ring.
///
/// Rings that don't appear here don't meet the other input's boundary at all.
pub type RingMap = BTreeMap<RingId, usize>;

pub fn map_turns<F: Float>(turns: &[Turn<F>]) -> RingMap {
    let mut map = RingMap::new();
    for turn in turns {
        for op in &turn.operations {
            *map.entry(op.seg_id.ring()).or_default() += 1;
        }
    }
    map
}

/// Where a point (or a ring) lies relative to a geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RingPosition {
    Within,
    Outside,
    OnBoundary,
}

/// The winding number of `ring` around `p`, or `None` if `p` is on the ring.
fn winding<F: Float, S: SideStrategy<F>>(p: &Point<F>, ring: &Ring<F>, side: &S) -> Option<i32> {
    let mut w = 0;
    for seg in ring.segments() {
        let s = side.side(&seg.start, &seg.end, p);
        if s == Side::Collinear && seg.bbox_contains(p) {
            return None;
        }
        if seg.start.y <= p.y {
            if seg.end.y > p.y && s == Side::Left {
                w += 1;
            }
        } else if seg.end.y <= p.y && s == Side::Right {
            w -= 1;
        }
    }
    Some(w)
}

/// Classifies a point against a single ring, ignoring its point order.
pub fn point_in_ring<F: Float, S: SideStrategy<F>>(
    p: &Point<F>,
    ring: &Ring<F>,
    side: &S,
) -> RingPosition {
    match winding(p, ring, side) {
        None => RingPosition::OnBoundary,
        Some(0) => RingPosition::Outside,
        Some(_) => RingPosition::Within,
    }
}

/// Classifies a point against a whole geometry (holes included).
pub fn point_position<F: Float, S: SideStrategy<F>>(
    p: &Point<F>,
    geometry: &Rings<F>,
    side: &S,
) -> RingPosition {
    let mut total = 0;
    for (_, ring) in geometry.rings() {
        match winding(p, ring, side) {
            None => return RingPosition::OnBoundary,
            Some(w) => total += w,
        }
    }
    // Exteriors and holes wind opposite ways, so a point in a hole gets zero.
    if total == 0 {
        RingPosition::Outside
    } else {
        RingPosition::Within
    }
}

/// Classifies a ring by the first of its points that isn't on the boundary.
///
/// If all the vertices are on the boundary, tries the edge midpoints.
fn ring_position_by<F: Float>(
    ring: &Ring<F>,
    mut classify: impl FnMut(&Point<F>) -> RingPosition,
) -> RingPosition {
    let vertices = ring.points().iter().cloned();
    let midpoints = ring.segments().map(|s| s.start.midpoint(&s.end));
    vertices
        .chain(midpoints)
        .map(|p| classify(&p))
        .find(|&pos| pos != RingPosition::OnBoundary)
        .unwrap_or(RingPosition::OnBoundary)
}

/// Classifies a ring that doesn't cross `geometry`'s boundary.
pub fn ring_position<F: Float, S: SideStrategy<F>>(
    ring: &Ring<F>,
    geometry: &Rings<F>,
    side: &S,
) -> RingPosition {
    ring_position_by(ring, |p| point_position(p, geometry, side))
}

/// Does an untouched ring of input `source` belong in the output?
fn keep_untouched(operator: Operator, source: usize, position: RingPosition) -> bool {
    match (operator, source) {
        (Operator::Union, _) => position != RingPosition::Within,
        (Operator::Difference, 0) => position == RingPosition::Outside,
        (Operator::Intersection, _) | (Operator::Difference, _) => position == RingPosition::Within,
    }
}

/// Receives the polygons of an overlay.
pub trait PolygonSink<F: Float> {
    fn push(&mut self, polygon: Polygon<F>);
}

impl<F: Float> PolygonSink<F> for Vec<Polygon<F>> {
    fn push(&mut self, polygon: Polygon<F>) {
        Vec::push(self, polygon);
    }
}

impl<F: Float> PolygonSink<F> for MultiPolygon<F> {
    fn push(&mut self, polygon: Polygon<F>) {
        self.0.push(polygon);
    }
}

/// Builds the output polygons.
///
/// `fragments` are the rings produced by traversal; they're always kept.
/// Input rings that no turn touched are kept or dropped depending on where
/// they lie relative to the other input. The surviving rings with point order
/// `order` become exteriors, and the others get nested into them as holes.
#[allow(clippy::too_many_arguments)]
pub fn assemble<F, S, O>(
    fragments: Vec<Ring<F>>,
    map: &RingMap,
    a: &Rings<F>,
    b: &Rings<F>,
    operator: Operator,
    order: PointOrder,
    side: &S,
    out: &mut O,
) -> Result<()>
where
    F: Float,
    S: SideStrategy<F>,
    O: PolygonSink<F>,
{
    let mut rings = fragments;
    for (this, other) in [(a, b), (b, a)] {
        for (id, ring) in this.rings() {
            if map.contains_key(&id) {
                continue;
            }
            let position = ring_position(ring, other, side);
            log::trace!("untouched ring {:?} is {:?}", id, position);
            if keep_untouched(operator, id.source, position) {
                rings.push(ring.clone());
            }
        }
    }

    let before = rings.len();
    rings.retain(|r| r.distinct_points() >= 3 && r.point_order().is_some());
    if rings.len() < before {
        log::debug!("dropped {} degenerate rings", before - rings.len());
    }

    let (exteriors, holes): (Vec<_>, Vec<_>) =
        rings.into_iter().partition(|r| r.point_order() == Some(order));

    let mut interiors: Vec<Vec<Ring<F>>> = vec![Vec::new(); exteriors.len()];
    for hole in holes {
        let parent = exteriors
            .iter()
            .enumerate()
            .filter(|(_, ext)| {
                ring_position_by(&hole, |p| point_in_ring(p, ext, side)) != RingPosition::Outside
            })
            .min_by(|(_, e), (_, f)| e.area().cmp(&f.area()))
            .map(|(i, _)| i);
        match parent {
            Some(i) => interiors[i].push(hole),
            None => log::warn!("dropping hole {:?}, which is in no exterior ring", hole),
        }
    }

    log::debug!("assembled {} polygons", exteriors.len());
    for (exterior, interiors) in exteriors.into_iter().zip(interiors) {
        out.push(Polygon::new(exterior, interiors));
    }
    Ok(())
}
