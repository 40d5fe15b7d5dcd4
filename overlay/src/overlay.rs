//! The boolean operations, end to end.

use serde::{Deserialize, Serialize};

use crate::{
    assemble::{assemble, map_turns, point_position, PolygonSink, RingMap, RingPosition},
    detect::{detect, NoInterrupt, StopAtFirstTurn},
    enrich::enrich,
    error::{OverlayError, Result},
    geom::{Geometry, MultiPolygon, PointOrder},
    num::Float,
    ordering::OperationRanks,
    rings::Rings,
    strategy::{ComparableDistance, ExactSide, SideStrategy, SquaredDistance},
    traverse::traverse,
    turns::{Method, Operator},
};

/// Everything that configures an overlay, apart from the strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    pub operator: Operator,
    /// The point order of the exterior rings, in the inputs and in the output.
    pub point_order: PointOrder,
    pub ranks: OperationRanks,
}

impl OverlayOptions {
    pub fn new(operator: Operator) -> Self {
        OverlayOptions {
            operator,
            ..OverlayOptions::default()
        }
    }
}

/// Computes `a <operator> b`, pushing the resulting polygons into `out`.
///
/// Both inputs need to be valid: rings are closed and don't self-intersect,
/// holes lie in their exteriors, and exteriors have the point order given in
/// `options` (holes the opposite one). On error, `out` is left untouched.
pub fn overlay<F, S, D, O>(
    a: &Geometry<F>,
    b: &Geometry<F>,
    options: &OverlayOptions,
    side: &S,
    distance: &D,
    out: &mut O,
) -> Result<()>
where
    F: Float,
    S: SideStrategy<F>,
    D: ComparableDistance<F>,
    O: PolygonSink<F>,
{
    let reverse_b = options.operator == Operator::Difference;
    let rings_a = Rings::from_geometry(0, a, false);
    let rings_b = Rings::from_geometry(1, b, reverse_b);
    log::debug!(
        "{:?} of {} and {} points",
        options.operator,
        rings_a.num_points(),
        rings_b.num_points()
    );

    let mut polygons = Vec::new();
    if rings_a.is_empty() || rings_b.is_empty() {
        // Nothing can meet, so every ring is untouched.
        assemble(
            Vec::new(),
            &RingMap::new(),
            &rings_a,
            &rings_b,
            options.operator,
            options.point_order,
            side,
            &mut polygons,
        )?;
    } else {
        let mut turns = detect(&rings_a, &rings_b, side, &mut NoInterrupt);
        if let Some(bad) = turns.iter().find(|t| t.method == Method::Error) {
            return Err(OverlayError::Classification {
                x: bad.point.x.to_f64(),
                y: bad.point.y.to_f64(),
            });
        }
        enrich(
            &mut turns,
            &rings_a,
            &rings_b,
            options.point_order,
            distance,
            &options.ranks,
        );
        let traversal = traverse(&rings_a, &rings_b, &turns, options.operator, &options.ranks)?;
        assemble(
            traversal.rings,
            &map_turns(&turns),
            &rings_a,
            &rings_b,
            options.operator,
            options.point_order,
            side,
            &mut polygons,
        )?;
    }

    for poly in polygons {
        out.push(poly);
    }
    Ok(())
}

fn run<F: Float>(
    a: &Geometry<F>,
    b: &Geometry<F>,
    operator: Operator,
    point_order: PointOrder,
) -> Result<MultiPolygon<F>> {
    let options = OverlayOptions {
        operator,
        point_order,
        ..OverlayOptions::default()
    };
    let mut out = MultiPolygon::default();
    overlay(a, b, &options, &ExactSide, &SquaredDistance, &mut out)?;
    Ok(out)
}

/// The union of two geometries, with exact predicates.
pub fn union<F: Float>(
    a: &Geometry<F>,
    b: &Geometry<F>,
    point_order: PointOrder,
) -> Result<MultiPolygon<F>> {
    run(a, b, Operator::Union, point_order)
}

/// The intersection of two geometries, with exact predicates.
pub fn intersection<F: Float>(
    a: &Geometry<F>,
    b: &Geometry<F>,
    point_order: PointOrder,
) -> Result<MultiPolygon<F>> {
    run(a, b, Operator::Intersection, point_order)
}

/// `a` minus `b`, with exact predicates.
pub fn difference<F: Float>(
    a: &Geometry<F>,
    b: &Geometry<F>,
    point_order: PointOrder,
) -> Result<MultiPolygon<F>> {
    run(a, b, Operator::Difference, point_order)
}

/// Do the two geometries share at least one point?
///
/// Touching boundaries count.
pub fn intersects<F: Float, S: SideStrategy<F>>(
    a: &Geometry<F>,
    b: &Geometry<F>,
    side: &S,
) -> bool {
    let rings_a = Rings::from_geometry(0, a, false);
    let rings_b = Rings::from_geometry(1, b, false);
    if rings_a.is_empty() || rings_b.is_empty() {
        return false;
    }

    let mut policy = StopAtFirstTurn::default();
    detect(&rings_a, &rings_b, side, &mut policy);
    if policy.has_intersections {
        return true;
    }
    // The boundaries don't meet, so every polygon is either inside the other
    // geometry or apart from it. Any polygon of a multi-polygon can be the one
    // that's inside.
    let inside = |this: &Rings<F>, other: &Rings<F>| {
        this.rings()
            .filter(|(id, _)| id.is_exterior())
            .any(|(_, ring)| {
                point_position(&ring.points()[0], other, side) != RingPosition::Outside
            })
    };
    inside(&rings_a, &rings_b) || inside(&rings_b, &rings_a)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use ordered_float::NotNan;
    use proptest::prelude::*;

    use super::*;
    use crate::{
        geom::{Point, Polygon, Ring},
        perturbation::{perturbation, realize_perturbation},
        strategy::RobustSide,
    };

    type F = NotNan<f64>;

    fn p(x: f64, y: f64) -> Point<F> {
        Point::from((x, y))
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry<F> {
        Geometry::Ring(Ring::new([p(x0, y0), p(x0, y1), p(x1, y1), p(x1, y0)]))
    }

    #[test]
    fn options_round_trip_through_ron() {
        let options = OverlayOptions::new(Operator::Difference);
        insta::assert_ron_snapshot!(options, @r###"
        OverlayOptions(
          operator: difference,
          point_order: clockwise,
          ranks: OperationRanks(
            none: 0,
            union: 1,
            intersection: 2,
            blocked: 3,
            continue_: 4,
            opposite: 0,
          ),
        )
        "###);
    }

    #[test]
    fn robust_strategy_gives_the_same_answer() {
        let a = rect(0.0, 0.0, 4.0, 4.0);
        let b = rect(2.0, 2.0, 6.0, 6.0);
        let mut exact = Vec::new();
        let mut robust = Vec::new();
        let options = OverlayOptions::new(Operator::Union);
        overlay(&a, &b, &options, &ExactSide, &SquaredDistance, &mut exact).unwrap();
        overlay(&a, &b, &options, &RobustSide, &SquaredDistance, &mut robust).unwrap();
        assert_eq!(exact, robust);
        assert_eq!(exact.len(), 1);
    }

    #[test]
    fn unclassifiable_input_fails() {
        let spiky = Geometry::Ring(Ring::new([p(2.0, 4.0), p(2.0, 2.0), p(2.0, 3.0), p(3.0, 5.0)]));
        let mut out: Vec<Polygon<F>> = Vec::new();
        let res = overlay(
            &rect(0.0, 0.0, 4.0, 2.0),
            &spiky,
            &OverlayOptions::default(),
            &ExactSide,
            &SquaredDistance,
            &mut out,
        );
        assert_matches!(res, Err(OverlayError::Classification { x, y }) if x == 2.0 && y == 2.0);
        assert!(out.is_empty());
    }

    #[test]
    fn intersects_cases() {
        let big = rect(0.0, 0.0, 10.0, 10.0);
        assert!(intersects(&big, &rect(1.0, 1.0, 2.0, 2.0), &ExactSide));
        assert!(intersects(&rect(1.0, 1.0, 2.0, 2.0), &big, &ExactSide));
        assert!(intersects(&big, &rect(10.0, 10.0, 12.0, 12.0), &ExactSide));
        assert!(intersects(&big, &rect(5.0, 5.0, 15.0, 15.0), &RobustSide));
        assert!(!intersects(&big, &rect(11.0, 11.0, 12.0, 12.0), &ExactSide));
        let empty = Geometry::MultiPolygon(MultiPolygon::default());
        assert!(!intersects(&big, &empty, &ExactSide));

        // Only the second polygon is inside.
        let scattered = Geometry::MultiPolygon(MultiPolygon(vec![
            rect_ring(100.0, 100.0, 101.0, 101.0).into(),
            rect_ring(2.0, 2.0, 3.0, 3.0).into(),
        ]));
        assert!(intersects(&scattered, &big, &ExactSide));
        assert!(intersects(&big, &scattered, &ExactSide));
        let far = Geometry::MultiPolygon(MultiPolygon(vec![
            rect_ring(100.0, 100.0, 101.0, 101.0).into(),
            rect_ring(20.0, 2.0, 30.0, 3.0).into(),
        ]));
        assert!(!intersects(&far, &big, &ExactSide));
    }

    fn rect_ring(x0: f64, y0: f64, x1: f64, y1: f64) -> Ring<F> {
        Ring::new([p(x0, y0), p(x0, y1), p(x1, y1), p(x1, y0)])
    }

    proptest! {
    #[test]
    fn perturbed_areas_add_up(
        pa in perturbation(1e-9),
        pb in perturbation(1e-9),
    ) {
        let a = realize_perturbation(&[rect_ring(0.0, 0.0, 4.0, 4.0)], &pa);
        let b = realize_perturbation(
            &[rect_ring(2.0, 2.0, 6.0, 6.0), rect_ring(1.0, -1.0, 3.0, 5.0)],
            &pb,
        );
        let (area_a, area_b) = (a.area().into_inner(), b.area().into_inner());
        let (a, b) = (Geometry::Ring(a), Geometry::Ring(b));

        let order = PointOrder::Clockwise;
        let u = union(&a, &b, order).unwrap().area().into_inner();
        let i = intersection(&a, &b, order).unwrap().area().into_inner();
        let d = difference(&a, &b, order).unwrap().area().into_inner();
        prop_assert!((u + i - area_a - area_b).abs() < 1e-6);
        prop_assert!((d + i - area_a).abs() < 1e-6);
    }
    }
}
