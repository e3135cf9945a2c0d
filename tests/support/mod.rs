//! Test support library
//! Builders for the reference trains and geometric helpers for contact checks.
#![allow(dead_code)]

use geartrain::float_types::Real;
use geartrain::profile::Profile;
use geo::{Contains, LineString, Point, Polygon};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

fn segment_distance(p: (Real, Real), a: (Real, Real), b: (Real, Real)) -> Real {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
    };
    (p.0 - a.0 - t * dx).hypot(p.1 - a.1 - t * dy)
}

/// Distance from `(x, y)` to the closed polyline `outline`.
pub fn distance_to_outline(x: Real, y: Real, outline: &LineString<Real>) -> Real {
    let pts = &outline.0;
    let n = pts.len();
    (0..n)
        .map(|i| {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            segment_distance((x, y), (a.x, a.y), (b.x, b.y))
        })
        .fold(Real::MAX, Real::min)
}

pub fn polygon(outline: &LineString<Real>) -> Polygon<Real> {
    let mut closed = outline.clone();
    closed.close();
    Polygon::new(closed, vec![])
}

/// Deepest vertex of `body` inside the first loop of `other`; zero when
/// they do not overlap.
pub fn depth_inside(body: &Profile, other: &Profile) -> Real {
    let outline = &other.loops()[0];
    let area = polygon(outline);
    body.vertices()
        .filter(|v| area.contains(&Point::new(v.x, v.y)))
        .map(|v| distance_to_outline(v.x, v.y, outline))
        .fold(0.0, Real::max)
}

/// Farthest vertex of `body` outside the first loop of `container`.
pub fn excursion_outside(body: &Profile, container: &Profile) -> Real {
    let outline = &container.loops()[0];
    body.loops()
        .iter()
        .map(|l| loop_excursion(l, outline))
        .fold(0.0, Real::max)
}

/// Farthest vertex of `body` outside the closed loop `outline`.
pub fn loop_excursion(body: &LineString<Real>, outline: &LineString<Real>) -> Real {
    let area = polygon(outline);
    body.0
        .iter()
        .filter(|v| !area.contains(&Point::new(v.x, v.y)))
        .map(|v| distance_to_outline(v.x, v.y, outline))
        .fold(0.0, Real::max)
}

fn cross(o: (Real, Real), a: (Real, Real), b: (Real, Real)) -> Real {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Pairs of non-adjacent edges of the closed loop `outline` that cross.
pub fn self_crossings(outline: &LineString<Real>) -> usize {
    let pts: Vec<(Real, Real)> = outline.0.iter().map(|c| (c.x, c.y)).collect();
    let n = pts.len();
    let edge = |i: usize| (pts[i], pts[(i + 1) % n]);
    let mut count = 0;
    for i in 0..n {
        let (a, b) = edge(i);
        for j in i + 2..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = edge(j);
            if a.0.max(b.0) < c.0.min(d.0)
                || c.0.max(d.0) < a.0.min(b.0)
                || a.1.max(b.1) < c.1.min(d.1)
                || c.1.max(d.1) < a.1.min(b.1)
            {
                continue;
            }
            let straddles_cd = cross(c, d, a) * cross(c, d, b) < 0.0;
            let straddles_ab = cross(a, b, c) * cross(a, b, d) < 0.0;
            if straddles_cd && straddles_ab {
                count += 1;
            }
        }
    }
    count
}

/// Largest vertex distance from the loop centre.
pub fn loop_radius(outline: &LineString<Real>) -> Real {
    let (x, y) = loop_centre(outline);
    outline
        .0
        .iter()
        .map(|c| (c.x - x).hypot(c.y - y))
        .fold(0.0, Real::max)
}

/// Vertex centroid of a loop; the centre of a sampled circle.
pub fn loop_centre(outline: &LineString<Real>) -> (Real, Real) {
    let n = outline.0.len() as Real;
    let x = outline.0.iter().map(|c| c.x).sum::<Real>() / n;
    let y = outline.0.iter().map(|c| c.y).sum::<Real>() / n;
    (x, y)
}
