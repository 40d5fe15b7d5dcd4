//! Proptest generators for slightly wiggled versions of known-good rings.

use ordered_float::NotNan;
use proptest::{arbitrary::any, prop_oneof, strategy::Strategy};

use crate::geom::{Point, Ring};

type Float = NotNan<f64>;

/// The neighboring representable value of a finite `x`.
fn step(x: f64, up: bool) -> f64 {
    if x == 0.0 {
        let tiny = f64::from_bits(1);
        return if up { tiny } else { -tiny };
    }
    // Moving away from zero increments the magnitude's bit pattern.
    let bits = x.to_bits();
    if (x > 0.0) == up {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum FloatPerturbation {
    /// Step this many representable values up (or down, if negative).
    Ulp(i8),
    /// Add a bounded amount.
    Eps(f64),
}

impl FloatPerturbation {
    fn apply(&self, f: Float) -> Float {
        let x = f.into_inner();
        let x = match *self {
            FloatPerturbation::Ulp(n) => (0..n.unsigned_abs()).fold(x, |x, _| step(x, n > 0)),
            FloatPerturbation::Eps(eps) => x + eps,
        };
        Float::new(x).unwrap()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PointPerturbation {
    pub x: FloatPerturbation,
    pub y: FloatPerturbation,
}

impl PointPerturbation {
    pub fn apply(&self, p: &Point<Float>) -> Point<Float> {
        Point::new(self.x.apply(p.x), self.y.apply(p.y))
    }
}

/// A recipe for turning one of a list of base rings into a nearby ring.
///
/// Vertex indices wrap around, so any `usize` is fine.
#[derive(Clone, Debug)]
pub enum Perturbation {
    Base {
        idx: usize,
    },
    /// Moves one vertex.
    Point {
        perturbation: PointPerturbation,
        idx: usize,
        next: Box<Perturbation>,
    },
    /// Splits an edge, at a parameter between 0.0 and 1.0.
    Subdivision {
        t: f64,
        idx: usize,
        next: Box<Perturbation>,
    },
}

pub fn float_perturbation(eps: f64) -> impl Strategy<Value = FloatPerturbation> {
    prop_oneof![
        any::<i8>().prop_map(FloatPerturbation::Ulp),
        (-eps..=eps).prop_map(FloatPerturbation::Eps)
    ]
}

pub fn point_perturbation(eps: f64) -> impl Strategy<Value = PointPerturbation> {
    (float_perturbation(eps), float_perturbation(eps)).prop_map(|(x, y)| PointPerturbation { x, y })
}

pub fn perturbation(eps: f64) -> impl Strategy<Value = Perturbation> {
    let leaf = any::<usize>().prop_map(|idx| Perturbation::Base { idx });
    leaf.prop_recursive(3, 16, 8, move |inner| {
        prop_oneof![
            (point_perturbation(eps), any::<usize>(), inner.clone()).prop_map(
                |(perturbation, idx, next)| Perturbation::Point {
                    perturbation,
                    idx,
                    next: Box::new(next),
                }
            ),
            (0.0..1.0, any::<usize>(), inner).prop_map(|(t, idx, next)| {
                Perturbation::Subdivision {
                    t,
                    idx,
                    next: Box::new(next),
                }
            }),
        ]
    })
}

fn realize_points(base_cases: &[Ring<Float>], pert: &Perturbation) -> Vec<Point<Float>> {
    match pert {
        Perturbation::Base { idx } => base_cases[idx % base_cases.len()].points().to_vec(),
        Perturbation::Point {
            perturbation,
            idx,
            next,
        } => {
            let mut points = realize_points(base_cases, next);
            let i = idx % points.len();
            points[i] = perturbation.apply(&points[i]);
            points
        }
        Perturbation::Subdivision { t, idx, next } => {
            let mut points = realize_points(base_cases, next);
            let i = idx % points.len();
            let p0 = &points[i];
            let p1 = &points[(i + 1) % points.len()];
            let mid = p0.affine(p1, &Float::new(*t).unwrap());
            points.insert(i + 1, mid);
            points
        }
    }
}

pub fn realize_perturbation(base_cases: &[Ring<Float>], pert: &Perturbation) -> Ring<Float> {
    Ring::new(realize_points(base_cases, pert))
}
