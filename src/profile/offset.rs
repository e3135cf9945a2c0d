//! **Equidistant curves of tooth profiles**
//!
//! For a closed loop `P` and a disk `D` of radius `|d|` the offset is the
//! boundary of
//! ```text
//! P ⊕ D  (d > 0, grow)      P ⊖ D  (d < 0, shrink)
//! ```
//! Every loop is buffered on its own as a hole-free polygon through the
//! `geo-buf` straight skeleton, with round joins where the offset moves
//! away from a vertex. Swallowtails at cusps are resolved by the skeleton,
//! so cycloid discs stay simple polygons up to the full cycloid depth.
//!
//! A loop that splits while shrinking keeps only its largest piece; a loop
//! that vanishes is dropped.

use super::Profile;
use crate::float_types::Real;
use geo::orient::{Direction, Orient};
use geo::{Area, Coord, LineString, MapCoords, Polygon};
use geo_buf::buffer_polygon_rounded;

impl Profile {
    /// Offset every loop by `distance`; positive grows the enclosed area.
    pub fn offset(&self, distance: Real) -> Profile {
        Profile::from_loops(
            self.loops()
                .iter()
                .filter_map(|l| offset_loop(l, distance))
                .collect(),
        )
    }
}

fn offset_loop(line: &LineString<Real>, distance: Real) -> Option<LineString<Real>> {
    if line.0.len() < 3 {
        return Some(line.clone());
    }
    let exterior: LineString<f64> = line.map_coords(|c| Coord {
        x: f64::from(c.x),
        y: f64::from(c.y),
    });
    let polygon = Polygon::new(exterior, vec![]).orient(Direction::Default);
    let buffered = buffer_polygon_rounded(&polygon, f64::from(distance));
    let largest = buffered
        .0
        .into_iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))?;
    let mut outline: LineString<Real> = largest.exterior().map_coords(|c| Coord {
        x: c.x as Real,
        y: c.y as Real,
    });
    // loops are stored open
    if outline.0.len() > 1 && outline.is_closed() {
        outline.0.pop();
    }
    (outline.0.len() >= 3).then_some(outline)
}
