//! Boolean operations (union, intersection, difference) on polygons.
//!
//! The overlay runs in phases. The [detector](detect) finds every point where
//! the two input boundaries meet, and classifies what happens when you leave
//! that point along either boundary. The [enricher](enrich) sorts those
//! points along each ring, and the [traverser](traverse) walks them to stitch
//! pieces of the input boundaries into output rings. Finally the
//! [assembler](assemble) adds back the input rings that were never touched and
//! nests holes into their exteriors.
//!
//! Geometric predicates go through the [`strategy`] traits, and all the
//! geometry is generic over [`Float`], so exact arithmetic is available
//! everywhere.

pub mod assemble;
pub mod detect;
pub mod enrich;
mod error;
mod geom;
mod num;
pub mod ordering;
mod overlay;
pub mod rings;
pub mod strategy;
pub mod traverse;
pub mod turns;

pub use error::{OverlayError, Result};
pub use geom::{Geometry, MultiPolygon, Point, PointOrder, Polygon, Ring, Segment, Vector};
pub use num::Float;
pub use overlay::{difference, intersection, intersects, overlay, union, OverlayOptions};
pub use turns::Operator;

#[cfg(test)]
pub mod perturbation;
