use malachite::Rational;
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::num::Float;

// Points are sorted by `y` and then by `x`
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Point<F: Float> {
    pub y: F,
    pub x: F,
}

impl<F: Float> std::fmt::Debug for Point<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl<F: Float> Point<F> {
    pub fn new(x: F, y: F) -> Self {
        Point { x, y }
    }

    pub fn to_exact(&self) -> Point<Rational> {
        Point {
            x: self.x.to_exact(),
            y: self.y.to_exact(),
        }
    }

    // Panics on nans. Should be fine as long as everything is finite.
    pub fn affine(&self, other: &Self, t: &F) -> Self {
        let one = F::from_f32(1.0);
        Point {
            x: (one.clone() - t) * &self.x + t.clone() * &other.x,
            y: (one - t) * &self.y + t.clone() * &other.y,
        }
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        self.affine(other, &F::from_f32(0.5))
    }
}

impl<F: Float> From<(F, F)> for Point<F> {
    fn from((x, y): (F, F)) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point<NotNan<f64>> {
    fn from((x, y): (f64, f64)) -> Self {
        Self {
            x: x.try_into().unwrap(),
            y: y.try_into().unwrap(),
        }
    }
}

impl<F: Float> std::ops::Sub for &Point<F> {
    type Output = Vector<F>;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x.clone() - &rhs.x,
            y: self.y.clone() - &rhs.y,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vector<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Vector<F> {
    pub fn dot(&self, other: &Self) -> F {
        self.x.clone() * &other.x + self.y.clone() * &other.y
    }

    pub fn cross(&self, other: &Self) -> F {
        self.x.clone() * &other.y - self.y.clone() * &other.x
    }
}

/// A directed segment, oriented the way its ring walks it.
///
/// `start` may compare greater than `end`.
#[derive(Clone, PartialEq, Eq)]
pub struct Segment<F: Float> {
    pub start: Point<F>,
    pub end: Point<F>,
}

impl<F: Float> std::fmt::Debug for Segment<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -> {:?}", self.start, self.end)
    }
}

impl<F: Float> Segment<F> {
    pub fn new(start: Point<F>, end: Point<F>) -> Self {
        Segment { start, end }
    }

    pub fn min_x(&self) -> &F {
        (&self.start.x).min(&self.end.x)
    }

    pub fn max_x(&self) -> &F {
        (&self.start.x).max(&self.end.x)
    }

    pub fn min_y(&self) -> &F {
        (&self.start.y).min(&self.end.y)
    }

    pub fn max_y(&self) -> &F {
        (&self.start.y).max(&self.end.y)
    }

    /// Do the axis-aligned bounding boxes of the two segments overlap (touching counts)?
    pub fn bbox_overlaps(&self, other: &Self) -> bool {
        self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_y() <= other.max_y()
            && other.min_y() <= self.max_y()
    }

    /// Is `p` inside this segment's bounding box?
    ///
    /// For a point already known to be collinear with the segment, this is the
    /// same as asking whether it lies on the (closed) segment.
    pub fn bbox_contains(&self, p: &Point<F>) -> bool {
        self.min_x() <= &p.x && &p.x <= self.max_x() && self.min_y() <= &p.y && &p.y <= self.max_y()
    }

    pub fn direction(&self) -> Vector<F> {
        &self.end - &self.start
    }

    pub fn to_exact(&self) -> Segment<Rational> {
        Segment {
            start: self.start.to_exact(),
            end: self.end.to_exact(),
        }
    }
}

/// The order in which the exterior ring of a polygon visits its points.
///
/// Holes always run the other way. Orientation is measured in a y-up frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointOrder {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl PointOrder {
    pub fn reversed(self) -> Self {
        match self {
            PointOrder::Clockwise => PointOrder::CounterClockwise,
            PointOrder::CounterClockwise => PointOrder::Clockwise,
        }
    }
}

fn cyclic_pairs<T>(xs: &[T]) -> impl Iterator<Item = (&T, &T)> {
    xs.windows(2)
        .map(|pair| (&pair[0], &pair[1]))
        .chain(xs.last().zip(xs.first()))
}

/// A closed ring of points.
///
/// The points are stored without repeating the first point at the end, and with
/// consecutive duplicates removed. Use [`Ring::closed_points`] to get the
/// conventional closed form, where the first and last points coincide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Ring<F: Float> {
    points: Vec<Point<F>>,
}

impl<F: Float> Default for Ring<F> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<F: Float> Ring<F> {
    pub fn new<P: Into<Point<F>>>(ps: impl IntoIterator<Item = P>) -> Self {
        let mut points: Vec<Point<F>> = Vec::new();
        for p in ps {
            let p = p.into();
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Ring { points }
    }

    pub fn points(&self) -> &[Point<F>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The points of this ring, with the first point repeated at the end.
    pub fn closed_points(&self) -> impl Iterator<Item = &Point<F>> {
        self.points.iter().chain(self.points.first())
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment<F>> + '_ {
        cyclic_pairs(&self.points).map(|(p, q)| Segment::new(p.clone(), q.clone()))
    }

    /// The shoelace area: positive for counter-clockwise rings.
    pub fn signed_area(&self) -> F {
        let zero = F::from_f32(0.0);
        if self.points.len() < 3 {
            return zero;
        }
        let origin = &self.points[0];
        let twice = cyclic_pairs(&self.points).fold(zero, |acc, (p, q)| {
            acc + (p - origin).cross(&(q - origin))
        });
        twice * F::from_f32(0.5)
    }

    pub fn area(&self) -> F {
        self.signed_area().abs()
    }

    /// The point order of this ring, or `None` if it encloses no area.
    pub fn point_order(&self) -> Option<PointOrder> {
        let area = self.signed_area();
        let zero = F::from_f32(0.0);
        match area.cmp(&zero) {
            std::cmp::Ordering::Less => Some(PointOrder::Clockwise),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(PointOrder::CounterClockwise),
        }
    }

    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Ring { points }
    }

    /// The number of pairwise distinct points.
    pub fn distinct_points(&self) -> usize {
        let mut ps: Vec<_> = self.points.iter().collect();
        ps.sort();
        ps.dedup();
        ps.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Polygon<F: Float> {
    pub exterior: Ring<F>,
    pub interiors: Vec<Ring<F>>,
}

impl<F: Float> Polygon<F> {
    pub fn new(exterior: Ring<F>, interiors: Vec<Ring<F>>) -> Self {
        Polygon {
            exterior,
            interiors,
        }
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring<F>> {
        std::iter::once(&self.exterior).chain(&self.interiors)
    }

    pub fn area(&self) -> F {
        self.interiors
            .iter()
            .fold(self.exterior.area(), |acc, hole| acc - hole.area())
    }

    pub fn num_points(&self) -> usize {
        self.rings().map(Ring::len).sum()
    }
}

impl<F: Float> From<Ring<F>> for Polygon<F> {
    fn from(exterior: Ring<F>) -> Self {
        Polygon::new(exterior, Vec::new())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MultiPolygon<F: Float>(pub Vec<Polygon<F>>);

impl<F: Float> Default for MultiPolygon<F> {
    fn default() -> Self {
        MultiPolygon(Vec::new())
    }
}

impl<F: Float> MultiPolygon<F> {
    pub fn polygons(&self) -> &[Polygon<F>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn area(&self) -> F {
        self.0
            .iter()
            .fold(F::from_f32(0.0), |acc, poly| acc + poly.area())
    }

    pub fn num_points(&self) -> usize {
        self.0.iter().map(Polygon::num_points).sum()
    }
}

/// The geometries the overlay accepts.
///
/// These get flattened into a uniform collection of rings (see
/// [`Rings`](crate::rings::Rings)) before any of the overlay machinery sees them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Geometry<F: Float> {
    Ring(Ring<F>),
    Polygon(Polygon<F>),
    MultiPolygon(MultiPolygon<F>),
}

impl<F: Float> Geometry<F> {
    pub fn num_points(&self) -> usize {
        match self {
            Geometry::Ring(r) => r.len(),
            Geometry::Polygon(p) => p.num_points(),
            Geometry::MultiPolygon(m) => m.num_points(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_points() == 0
    }

    /// The geometry's polygons, with a bare ring treated as a polygon without holes.
    pub fn polygons(&self) -> Vec<Polygon<F>> {
        match self {
            Geometry::Ring(r) => vec![Polygon::from(r.clone())],
            Geometry::Polygon(p) => vec![p.clone()],
            Geometry::MultiPolygon(m) => m.0.clone(),
        }
    }
}

impl<F: Float> From<Ring<F>> for Geometry<F> {
    fn from(r: Ring<F>) -> Self {
        Geometry::Ring(r)
    }
}

impl<F: Float> From<Polygon<F>> for Geometry<F> {
    fn from(p: Polygon<F>) -> Self {
        Geometry::Polygon(p)
    }
}

impl<F: Float> From<MultiPolygon<F>> for Geometry<F> {
    fn from(m: MultiPolygon<F>) -> Self {
        Geometry::MultiPolygon(m)
    }
}
