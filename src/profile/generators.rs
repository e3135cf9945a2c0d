//! Tooth-profile generators.
//!
//! Every generator turns a handful of parameters into a closed [`Profile`]
//! in its generation orientation: centred on the origin, first tooth (or
//! first pin) on the positive x axis.

use super::Profile;
use crate::errors::ConfigurationError;
use crate::float_types::{EPSILON, Real, TAU};
use crate::transform::rotor;

/// Parameters in, closed 2D loop(s) out.
pub trait ProfileGenerator {
    fn generate(&self) -> Profile;

    /// [`ProfileGenerator::generate`], rejecting results that collapse
    /// below numerical tolerance. `body` names the part in the error.
    fn generate_checked(&self, body: &str) -> Result<Profile, ConfigurationError> {
        let profile = self.generate();
        let degenerate = |reason: &str| ConfigurationError::DegenerateProfile {
            body: body.to_string(),
            reason: reason.to_string(),
        };
        if profile.loops().is_empty() {
            return Err(degenerate("no loops"));
        }
        if profile.loops().iter().any(|l| l.0.len() < 3) {
            return Err(degenerate("a loop has fewer than 3 vertices"));
        }
        if profile.max_radius() < EPSILON {
            return Err(degenerate("all vertices coincide with the origin"));
        }
        Ok(profile)
    }
}

/// One flank section of a rolling curve: a circle of radius `r` rolling on
/// (`side = 1`) or inside (`side = -1`) a fixed circle of radius `big_r`,
/// traced over the arc `[0, 2π·r/R)` of the fixed circle.
///
/// `resolution` is the number of samples per unit of rolling radius.
fn trochoid_part(big_r: Real, r: Real, side: Real, resolution: usize) -> Vec<(Real, Real)> {
    let count = ((r * resolution as Real) as usize).max(2);
    let span = TAU * r / big_r;
    let arm = big_r + r * side;
    let rate = arm / r * side;
    (0..count)
        .map(|k| {
            let a = span * k as Real / count as Real;
            let b = rate * a;
            (
                arm * a.cos() - r * side * b.cos(),
                arm * a.sin() - r * side * b.sin(),
            )
        })
        .collect()
}

fn rotate_points(points: &[(Real, Real)], angle: Real) -> impl Iterator<Item = (Real, Real)> + '_ {
    let (s, c) = angle.sin_cos();
    points.iter().map(move |&(x, y)| (x * c - y * s, x * s + y * c))
}

/// Cycloidal gear built from alternating epicycloid (addendum) and
/// hypocycloid (dedendum) flanks.
///
/// A pair of such gears meshes exactly when the epicycloid fraction of one
/// matches the hypocycloid fraction of the other, which is why a planetary
/// sun is generated with `1 - fraction`.
#[derive(Debug, Clone, PartialEq)]
pub struct EpiHypoGear {
    /// Pitch radius.
    pub radius: Real,
    pub teeth: usize,
    /// Share of each tooth pitch taken by the epicycloid flank, in (0, 1).
    pub fraction: Real,
    /// Samples per unit of rolling radius.
    pub resolution: usize,
}

impl EpiHypoGear {
    pub const fn new(radius: Real, teeth: usize, fraction: Real) -> Self {
        Self {
            radius,
            teeth,
            fraction,
            resolution: 500,
        }
    }

    pub const fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

impl ProfileGenerator for EpiHypoGear {
    fn generate(&self) -> Profile {
        if self.teeth == 0 {
            return Profile::empty();
        }
        let n = self.teeth as Real;
        let r = self.radius / n;
        let pitch = TAU / n;
        let f = self.fraction;

        let epi = trochoid_part(self.radius, r * f, 1.0, self.resolution);
        let hypo = trochoid_part(self.radius, r * (1.0 - f), -1.0, self.resolution);
        let tooth: Vec<(Real, Real)> = rotate_points(&epi, -pitch * f / 2.0)
            .chain(rotate_points(&hypo, pitch * f / 2.0))
            .collect();

        Profile::from_points(
            (0..self.teeth).flat_map(|i| rotate_points(&tooth, pitch * i as Real).collect::<Vec<_>>()),
        )
    }
}

/// Default sample count of a closed trochoid with `q` lobes: 400 per lobe,
/// never fewer than 2000. The pin valleys of a disc are its fastest
/// moving part and need that density to stay within 1e-3 of the exact curve.
fn trochoid_samples(q: Real) -> usize {
    ((400.0 * q) as usize).max(2000)
}

/// Curve traced by a point at distance `d` from the centre of a circle of
/// radius `a/q` rolling around the outside of a circle of radius `a`.
#[derive(Debug, Clone, PartialEq)]
pub struct Epitrochoid {
    pub a: Real,
    pub q: Real,
    pub d: Real,
    pub samples: usize,
}

impl Epitrochoid {
    /// Sampled with [`trochoid_samples`] points.
    pub fn new(a: Real, q: Real, d: Real) -> Self {
        Self {
            a,
            q,
            d,
            samples: trochoid_samples(q),
        }
    }

    pub const fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }
}

impl ProfileGenerator for Epitrochoid {
    fn generate(&self) -> Profile {
        let b = self.a / self.q;
        let k = (self.a + b) / b;
        Profile::from_points((0..self.samples).map(|i| {
            let t = TAU * i as Real / self.samples as Real;
            (
                (self.a + b) * t.cos() - self.d * (k * t).cos(),
                (self.a + b) * t.sin() - self.d * (k * t).sin(),
            )
        }))
    }
}

/// Companion of [`Epitrochoid`] for the rolling circle inside the base
/// circle, shifted out by one rolling radius so that the pins of the mating
/// disc sit on the pitch circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypotrochoid {
    pub a: Real,
    pub q: Real,
    pub d: Real,
    pub samples: usize,
}

impl Hypotrochoid {
    pub fn new(a: Real, q: Real, d: Real) -> Self {
        Self {
            a,
            q,
            d,
            samples: trochoid_samples(q),
        }
    }

    pub const fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }
}

impl ProfileGenerator for Hypotrochoid {
    fn generate(&self) -> Profile {
        let b = self.a / self.q;
        let k = (self.a - b) / b;
        Profile::from_points((0..self.samples).map(|i| {
            let t = TAU * i as Real / self.samples as Real;
            (
                (self.a + b) * t.cos() + self.d * (k * t).cos(),
                (self.a + b) * t.sin() - self.d * (k * t).sin(),
            )
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub radius: Real,
    pub center: (Real, Real),
    pub segments: usize,
}

impl Circle {
    pub const fn new(radius: Real) -> Self {
        Self {
            radius,
            center: (0.0, 0.0),
            segments: 100,
        }
    }

    pub const fn at(mut self, x: Real, y: Real) -> Self {
        self.center = (x, y);
        self
    }
}

impl ProfileGenerator for Circle {
    fn generate(&self) -> Profile {
        if self.segments < 3 {
            return Profile::empty();
        }
        let (cx, cy) = self.center;
        Profile::from_points((0..self.segments).map(|i| {
            let theta = TAU * i as Real / self.segments as Real;
            (cx + self.radius * theta.cos(), cy + self.radius * theta.sin())
        }))
    }
}

/// `count` circular pins of radius `pin_radius`, evenly spaced on a circle
/// of radius `pitch_radius`, the first one on the positive x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PinCircle {
    pub count: usize,
    pub pitch_radius: Real,
    pub pin_radius: Real,
    pub segments: usize,
}

impl PinCircle {
    pub const fn new(count: usize, pitch_radius: Real, pin_radius: Real) -> Self {
        Self {
            count,
            pitch_radius,
            pin_radius,
            segments: 100,
        }
    }
}

impl ProfileGenerator for PinCircle {
    fn generate(&self) -> Profile {
        let pin = Circle {
            radius: self.pin_radius,
            center: (self.pitch_radius, 0.0),
            segments: self.segments,
        }
        .generate();
        let pins: Vec<Profile> = (0..self.count)
            .map(|i| pin.transform(&rotor(TAU * i as Real / self.count as Real)))
            .collect();
        Profile::concat(&pins)
    }
}
