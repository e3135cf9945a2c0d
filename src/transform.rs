//! Planar rigid motions.
//!
//! A [`Motion`] is a rotation followed by a translation. Composition reads
//! right to left: `a * b` applies `b` first, then `a`. The planet placement
//! ```text
//! rotor(sa + c) * translator(1, 0) * rotor(p - sa·R/P - c)
//! ```
//! therefore spins the planet about its own centre, moves it out to the
//! orbit radius and finally swings it around the sun.

use crate::float_types::Real;
use nalgebra::{Isometry2, Point2, Vector2};

pub type Motion = Isometry2<Real>;

/// Rotation by `angle` radians about the origin.
pub fn rotor(angle: Real) -> Motion {
    Isometry2::rotation(angle)
}

/// Translation by `(x, y)`.
pub fn translator(x: Real, y: Real) -> Motion {
    Isometry2::translation(x, y)
}

pub fn identity() -> Motion {
    Isometry2::identity()
}

/// Apply `motion` to a single `(x, y)` point.
pub fn apply(motion: &Motion, x: Real, y: Real) -> (Real, Real) {
    let p = motion * Point2::new(x, y);
    (p.x, p.y)
}

/// Where `motion` takes the origin.
pub fn origin_of(motion: &Motion) -> Vector2<Real> {
    motion.translation.vector
}
