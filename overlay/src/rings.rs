use serde::Serialize;

use crate::{
    geom::{Geometry, Point, Polygon, Ring, Segment},
    num::Float,
};

/// Identifies one ring of one of the two input geometries.
///
/// `ring_index` is 0 for a polygon's exterior ring and `i + 1` for its `i`th
/// interior ring. Rings are ordered component-wise, in field order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RingId {
    pub source: usize,
    pub multi_index: usize,
    pub ring_index: usize,
}

impl std::fmt::Debug for RingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r_{}.{}.{}", self.source, self.multi_index, self.ring_index)
    }
}

impl RingId {
    pub fn is_exterior(&self) -> bool {
        self.ring_index == 0
    }

    pub fn segment(self, segment_index: usize) -> SegmentId {
        SegmentId {
            source: self.source,
            multi_index: self.multi_index,
            ring_index: self.ring_index,
            segment_index,
        }
    }
}

/// Identifies a single directed edge of one of the input geometries.
///
/// Segment `i` of a ring runs from its point `i` to its point `i + 1`
/// (wrapping around). Segment identifiers are ordered component-wise, in field
/// order, which sorts the edges of a ring in the order its walker visits them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SegmentId {
    pub source: usize,
    pub multi_index: usize,
    pub ring_index: usize,
    pub segment_index: usize,
}

impl std::fmt::Debug for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "s_{}.{}.{}.{}",
            self.source, self.multi_index, self.ring_index, self.segment_index
        )
    }
}

impl SegmentId {
    pub fn ring(&self) -> RingId {
        RingId {
            source: self.source,
            multi_index: self.multi_index,
            ring_index: self.ring_index,
        }
    }
}

/// The rings of one input geometry, flattened into a uniform representation.
///
/// Every geometry variant (ring, polygon, multi-polygon) ends up as a list of
/// polygons, each of which is a list of rings with the exterior first. Rings with
/// fewer than three points can't bound anything and are dropped on the way in
/// (a polygon whose exterior is dropped is dropped entirely).
#[derive(Debug, Clone)]
pub struct Rings<F: Float> {
    source: usize,
    // TODO: a flat ring list with offsets would avoid the nested allocations
    polygons: Vec<Vec<Ring<F>>>,
}

impl<F: Float> Rings<F> {
    /// Flattens `geometry`, tagging it as input number `source` (0 or 1).
    ///
    /// If `reverse` is set, every ring is reversed. This is how a difference gets
    /// expressed as an intersection with the complement.
    pub fn from_geometry(source: usize, geometry: &Geometry<F>, reverse: bool) -> Self {
        let polygons = geometry
            .polygons()
            .iter()
            .filter_map(|poly| Self::normalize(poly, reverse))
            .collect();
        Rings { source, polygons }
    }

    fn normalize(poly: &Polygon<F>, reverse: bool) -> Option<Vec<Ring<F>>> {
        let usable = |r: &&Ring<F>| r.len() >= 3;
        if !usable(&&poly.exterior) {
            if !poly.exterior.is_empty() {
                log::debug!("dropping polygon with degenerate exterior {:?}", poly.exterior);
            }
            return None;
        }
        Some(
            poly.rings()
                .filter(usable)
                .map(|r| if reverse { r.reversed() } else { r.clone() })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn num_points(&self) -> usize {
        self.polygons.iter().flatten().map(Ring::len).sum()
    }

    pub fn ring(&self, id: RingId) -> &Ring<F> {
        debug_assert_eq!(id.source, self.source);
        &self.polygons[id.multi_index][id.ring_index]
    }

    pub fn rings(&self) -> impl Iterator<Item = (RingId, &Ring<F>)> {
        let source = self.source;
        self.polygons
            .iter()
            .enumerate()
            .flat_map(move |(multi_index, poly)| {
                poly.iter().enumerate().map(move |(ring_index, ring)| {
                    (
                        RingId {
                            source,
                            multi_index,
                            ring_index,
                        },
                        ring,
                    )
                })
            })
    }

    pub fn segment(&self, id: SegmentId) -> Segment<F> {
        let pts = self.ring(id.ring()).points();
        let i = id.segment_index;
        Segment::new(pts[i].clone(), pts[(i + 1) % pts.len()].clone())
    }

    /// The start point of the segment before `id` in its ring.
    pub fn prev_point(&self, id: SegmentId) -> &Point<F> {
        let pts = self.ring(id.ring()).points();
        &pts[(id.segment_index + pts.len() - 1) % pts.len()]
    }

    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, Segment<F>)> + '_ {
        self.rings().flat_map(|(ring_id, ring)| {
            ring.segments()
                .enumerate()
                .map(move |(i, seg)| (ring_id.segment(i), seg))
        })
    }
}
