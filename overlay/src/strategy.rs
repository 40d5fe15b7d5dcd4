//! Pluggable geometric predicates.
//!
//! The overlay never does orientation tests or distance comparisons directly;
//! it goes through the traits here so that callers can choose between exact
//! and fast-but-adaptive arithmetic.

use malachite::num::arithmetic::traits::Sign;
use robust::Coord;

use crate::{geom::Point, num::Float};

/// Which side of a directed line a point is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Collinear,
}

impl Side {
    /// The side implied by the sign of a cross product.
    pub fn from_ordering(ord: std::cmp::Ordering) -> Self {
        match ord {
            std::cmp::Ordering::Less => Side::Right,
            std::cmp::Ordering::Equal => Side::Collinear,
            std::cmp::Ordering::Greater => Side::Left,
        }
    }

    pub fn is_collinear(self) -> bool {
        self == Side::Collinear
    }

    /// Are `self` and `other` strictly on opposite sides?
    pub fn opposes(self, other: Side) -> bool {
        matches!(
            (self, other),
            (Side::Left, Side::Right) | (Side::Right, Side::Left)
        )
    }
}

/// Decides which side of the directed line `p -> q` the point `r` is on.
///
/// Implementations must be consistent: the three points of any triple must get
/// the same classification no matter how often (or in which pipeline phase) they
/// get asked about.
pub trait SideStrategy<F: Float> {
    fn side(&self, p: &Point<F>, q: &Point<F>, r: &Point<F>) -> Side;
}

/// Side tests in exact rational arithmetic.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactSide;

impl<F: Float> SideStrategy<F> for ExactSide {
    fn side(&self, p: &Point<F>, q: &Point<F>, r: &Point<F>) -> Side {
        let p = p.to_exact();
        let cross = (&q.to_exact() - &p).cross(&(&r.to_exact() - &p));
        Side::from_ordering(cross.sign())
    }
}

/// Side tests using Shewchuk's adaptive-precision orientation predicate.
///
/// This is exact for `f64` inputs, and much faster than [`ExactSide`]. Inputs
/// that aren't `f64` get rounded to the nearest `f64` first, so for rationals it
/// is only approximately right.
#[derive(Clone, Copy, Debug, Default)]
pub struct RobustSide;

fn coord<F: Float>(p: &Point<F>) -> Coord<f64> {
    Coord {
        x: p.x.to_f64(),
        y: p.y.to_f64(),
    }
}

impl<F: Float> SideStrategy<F> for RobustSide {
    fn side(&self, p: &Point<F>, q: &Point<F>, r: &Point<F>) -> Side {
        let orient = robust::orient2d(coord(p), coord(q), coord(r));
        if orient > 0.0 {
            Side::Left
        } else if orient < 0.0 {
            Side::Right
        } else {
            Side::Collinear
        }
    }
}

/// A distance that's only good for comparing with other distances.
///
/// Implementations need to be monotone in the true Euclidean distance, and
/// nothing else.
pub trait ComparableDistance<F: Float> {
    fn comparable(&self, from: &Point<F>, to: &Point<F>) -> F;
}

/// The squared Euclidean distance, which saves a square root.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquaredDistance;

impl<F: Float> ComparableDistance<F> for SquaredDistance {
    fn comparable(&self, from: &Point<F>, to: &Point<F>) -> F {
        let d = to - from;
        d.dot(&d)
    }
}
