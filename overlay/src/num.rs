//! A thin abstraction over the different numerical types we support.

use std::hash::Hash;

use malachite::{
    num::conversion::traits::RoundingFrom, rounding_modes::RoundingMode, Rational,
};
use ordered_float::NotNan;

/// A trait for abstracting over the properties we need from numerical types.
///
/// This is implemented for `NotNan<f64>`, `NotNan<f32>`, and `malachite::Rational`.
pub trait Float:
    Sized
    + std::ops::Add<Self, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::Mul<Self, Output = Self>
    + std::ops::Div<Self, Output = Self>
    + std::ops::Neg<Output = Self>
    + for<'a> std::ops::Add<&'a Self, Output = Self>
    + for<'a> std::ops::Sub<&'a Self, Output = Self>
    + for<'a> std::ops::Mul<&'a Self, Output = Self>
    + for<'a> std::ops::Div<&'a Self, Output = Self>
    + Clone
    + std::fmt::Debug
    + Ord
    + Eq
    + Hash
    + 'static
{
    fn from_f32(x: f32) -> Self;

    fn to_exact(&self) -> Rational;

    /// The nearest value of this type.
    fn from_exact(x: &Rational) -> Self;

    /// The nearest `f64`, for strategies that work in double precision.
    fn to_f64(&self) -> f64;

    fn abs(self) -> Self;

    /// Equality up to a few ulps, scaled by the magnitude of the operands.
    ///
    /// Exact types compare exactly.
    fn approx_eq(&self, other: &Self) -> bool;
}

impl Float for Rational {
    fn from_f32(x: f32) -> Self {
        Rational::try_from(x).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.clone()
    }

    fn from_exact(x: &Rational) -> Self {
        x.clone()
    }

    fn to_f64(&self) -> f64 {
        f64::rounding_from(self, RoundingMode::Nearest).0
    }

    fn abs(self) -> Self {
        <Rational as malachite::num::arithmetic::traits::Abs>::abs(self)
    }

    fn approx_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl Float for NotNan<f32> {
    fn from_f32(x: f32) -> Self {
        NotNan::try_from(x).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.into_inner().try_into().unwrap()
    }

    fn from_exact(x: &Rational) -> Self {
        NotNan::new(f32::rounding_from(x, RoundingMode::Nearest).0).unwrap()
    }

    fn to_f64(&self) -> f64 {
        f64::from(self.into_inner())
    }

    fn abs(self) -> Self {
        self.into_inner().abs().try_into().unwrap()
    }

    fn approx_eq(&self, other: &Self) -> bool {
        let (a, b) = (self.into_inner(), other.into_inner());
        let scale = 1.0f32.max(a.abs()).max(b.abs());
        (a - b).abs() <= f32::EPSILON * scale
    }
}

impl Float for NotNan<f64> {
    fn from_f32(x: f32) -> Self {
        NotNan::try_from(f64::from(x)).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.into_inner().try_into().unwrap()
    }

    fn from_exact(x: &Rational) -> Self {
        NotNan::new(f64::rounding_from(x, RoundingMode::Nearest).0).unwrap()
    }

    fn to_f64(&self) -> f64 {
        self.into_inner()
    }

    fn abs(self) -> Self {
        self.into_inner().abs().try_into().unwrap()
    }

    fn approx_eq(&self, other: &Self) -> bool {
        let (a, b) = (self.into_inner(), other.into_inner());
        let scale = 1.0f64.max(a.abs()).max(b.abs());
        (a - b).abs() <= f64::EPSILON * scale
    }
}
