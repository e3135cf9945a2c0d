//! Closed 2D polyline profiles.
//!
//! A [`Profile`] is one or more closed loops of vertices. Loops are stored
//! *open* (the last vertex is implicitly connected back to the first), which
//! keeps transforms and exports free of duplicated points. Every operation
//! returns a new profile; the receiver is never modified.

pub mod generators;
mod offset;

pub use generators::{Circle, EpiHypoGear, Epitrochoid, Hypotrochoid, PinCircle, ProfileGenerator};

use crate::float_types::Real;
use crate::transform::{Motion, rotor, translator};
use geo::{BoundingRect, Coord, LineString, MapCoords, MultiPolygon, Polygon, Rect};
use nalgebra::Point2;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    loops: Vec<LineString<Real>>,
}

impl Profile {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single loop from an open list of points.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (Real, Real)>,
    {
        let line: LineString<Real> = points.into_iter().collect::<Vec<_>>().into();
        Self { loops: vec![line] }
    }

    pub fn from_loops(loops: Vec<LineString<Real>>) -> Self {
        Self { loops }
    }

    /// Concatenate the loops of several profiles into one profile.
    pub fn concat<'a>(profiles: impl IntoIterator<Item = &'a Profile>) -> Self {
        Self {
            loops: profiles
                .into_iter()
                .flat_map(|p| p.loops.iter().cloned())
                .collect(),
        }
    }

    pub fn loops(&self) -> &[LineString<Real>] {
        &self.loops
    }

    pub fn is_empty(&self) -> bool {
        self.loops.iter().all(|l| l.0.is_empty())
    }

    pub fn vertices(&self) -> impl Iterator<Item = Coord<Real>> + '_ {
        self.loops.iter().flat_map(|l| l.0.iter().copied())
    }

    pub fn vertex_count(&self) -> usize {
        self.loops.iter().map(|l| l.0.len()).sum()
    }

    /// Apply a rigid motion to every vertex.
    pub fn transform(&self, motion: &Motion) -> Self {
        self.map(|c| {
            let p = motion * Point2::new(c.x, c.y);
            Coord { x: p.x, y: p.y }
        })
    }

    pub fn rotate(&self, angle: Real) -> Self {
        self.transform(&rotor(angle))
    }

    pub fn translate(&self, x: Real, y: Real) -> Self {
        self.transform(&translator(x, y))
    }

    /// Uniform scale about the origin.
    pub fn scale(&self, factor: Real) -> Self {
        self.map(|c| Coord {
            x: c.x * factor,
            y: c.y * factor,
        })
    }

    fn map(&self, f: impl Fn(Coord<Real>) -> Coord<Real> + Copy) -> Self {
        Self {
            loops: self.loops.iter().map(|l| l.map_coords(f)).collect(),
        }
    }

    /// Largest distance of any vertex from the origin; zero when empty.
    pub fn max_radius(&self) -> Real {
        self.vertices()
            .map(|c| c.x.hypot(c.y))
            .fold(0.0, Real::max)
    }

    pub fn bounding_rect(&self) -> Option<Rect<Real>> {
        let all: LineString<Real> = self.vertices().collect::<Vec<_>>().into();
        all.bounding_rect()
    }

    /// Each loop as a polygon without holes, for area and containment queries.
    pub fn to_multi_polygon(&self) -> MultiPolygon<Real> {
        MultiPolygon::new(
            self.loops
                .iter()
                .filter(|l| l.0.len() >= 3)
                .map(|l| {
                    let mut closed = l.clone();
                    closed.close();
                    Polygon::new(closed, vec![])
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::PI;
    use approx::assert_relative_eq;

    fn square() -> Profile {
        Profile::from_points([(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)])
    }

    #[test]
    fn transforms_return_new_profiles() {
        let s = square();
        let moved = s.translate(2.0, 0.0).rotate(PI);
        assert_eq!(s, square());
        let first = moved.vertices().next().unwrap();
        assert_relative_eq!(first.x, -3.0, epsilon = 1e-12);
        assert_relative_eq!(first.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn radius_and_bounds() {
        let s = square().scale(2.0);
        assert_relative_eq!(s.max_radius(), 8.0_f64.sqrt() as Real, epsilon = 1e-12);
        let rect = s.bounding_rect().unwrap();
        assert_relative_eq!(rect.min().x, -2.0);
        assert_relative_eq!(rect.max().y, 2.0);
        assert_eq!(Profile::empty().max_radius(), 0.0);
        assert!(Profile::empty().bounding_rect().is_none());
    }

    #[test]
    fn concat_keeps_loops_separate() {
        let both = Profile::concat([&square(), &square().translate(5.0, 0.0)]);
        assert_eq!(both.loops().len(), 2);
        assert_eq!(both.vertex_count(), 8);
        assert_eq!(both.to_multi_polygon().0.len(), 2);
    }
}
