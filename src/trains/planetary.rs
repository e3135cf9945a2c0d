//! Single-stage planetary gear with cycloidal teeth.
//!
//! Ring, planets and sun are scaled so that the planet centres orbit on the
//! unit circle (`S + P` maps to 1). The stage helpers are shared with the
//! compound planetary, which stacks two of these stages on common planets.

use super::{
    Arrangement, BodyId, GearTrain, Hand, Template, bind, expect_topology, require_count,
    require_fraction,
};
use crate::errors::ConfigurationError;
use crate::float_types::{PI, Real, TAU};
use crate::geometry::GearGeometry;
use crate::kinematics::{Kinematics, Topology};
use crate::profile::{EpiHypoGear, Profile, ProfileGenerator};
use crate::transform::{Motion, rotor, translator};
use std::sync::Arc;

/// Tooth counts of one planetary stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToothCounts {
    pub ring: usize,
    pub planet: usize,
    pub sun: usize,
}

impl ToothCounts {
    /// `(R, P, S)`.
    pub const fn new(ring: usize, planet: usize, sun: usize) -> Self {
        Self { ring, planet, sun }
    }

    /// Check `R = S + 2P` and that `planets` can be spaced evenly.
    pub fn validate(&self, planets: usize, stage: &str) -> Result<(), ConfigurationError> {
        require_count(&format!("R{stage}"), self.ring)?;
        require_count(&format!("P{stage}"), self.planet)?;
        require_count(&format!("S{stage}"), self.sun)?;
        require_count("planets", planets)?;
        if self.ring != self.sun + 2 * self.planet {
            return Err(ConfigurationError::invalid(
                format!("R{stage}"),
                format!(
                    "ring teeth must equal sun + 2 * planet ({} != {} + 2 * {})",
                    self.ring, self.sun, self.planet
                ),
            ));
        }
        if (self.ring + self.sun) % planets != 0 {
            return Err(ConfigurationError::invalid(
                "planets",
                format!(
                    "{planets} planets cannot be spaced evenly: R{stage} + S{stage} = {} is not a multiple",
                    self.ring + self.sun
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn values(&self, stage: &str) -> [(String, Real); 3] {
        [
            (format!("R{stage}"), self.ring as Real),
            (format!("P{stage}"), self.planet as Real),
            (format!("S{stage}"), self.sun as Real),
        ]
    }
}

/// Template profiles of one stage.
#[derive(Debug, Clone)]
pub(crate) struct StageProfiles {
    pub ring: Profile,
    pub planet: Profile,
    pub sun: Profile,
}

/// Generate ring, planet and sun. `offset` (in planet teeth) rolls the
/// whole stage along its pitch circles, so stacked stages can be phased
/// against each other while still meshing.
pub(crate) fn generate_stage(
    teeth: ToothCounts,
    fraction: Real,
    resolution: usize,
    offset: Real,
) -> Result<StageProfiles, ConfigurationError> {
    let r = teeth.ring as Real;
    let unit = (teeth.sun + teeth.planet) as Real;
    let ring = EpiHypoGear::new(r / unit, teeth.ring, fraction)
        .with_resolution(resolution)
        .generate_checked("ring")?
        .rotate(offset / r * PI);
    let (planet, sun) = generate_planet_and_sun(teeth, fraction, resolution, offset, "planet")?;
    Ok(StageProfiles { ring, planet, sun })
}

/// Planet and sun of a stage, without its ring. `planet_body` names the
/// planet in errors.
pub(crate) fn generate_planet_and_sun(
    teeth: ToothCounts,
    fraction: Real,
    resolution: usize,
    offset: Real,
    planet_body: &str,
) -> Result<(Profile, Profile), ConfigurationError> {
    let (p, s) = (teeth.planet as Real, teeth.sun as Real);
    let unit = s + p;
    let planet = EpiHypoGear::new(p / unit, teeth.planet, fraction)
        .with_resolution(resolution)
        .generate_checked(planet_body)?
        .rotate(offset / p * PI);
    // even planets need the sun turned by half a tooth to mesh
    let sun = EpiHypoGear::new(s / unit, teeth.sun, 1.0 - fraction)
        .with_resolution(resolution)
        .generate_checked("sun")?
        .rotate(-offset / s * PI)
        .rotate(TAU / s * ((teeth.planet + 1) % 2) as Real / 2.0);
    Ok((planet, sun))
}

/// Angles of the bodies of one stage.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StageAngles {
    pub ring: Real,
    pub planet: Real,
    pub sun: Real,
    pub carrier: Real,
}

/// Placement of planet `index` of `count` on the unit orbit.
///
/// Planet `i` orbits at `sa = 2πi/N`. Its spin is compensated by
/// `-sa·R/P` (`ratio = R/P`) so that a planet carried to another slot has
/// rolled along the ring exactly as far as its orbit demands. The carrier
/// angle enters both the orbit and, negated, the spin, so planets ride
/// with the carrier as a rigid unit.
pub(crate) fn planet_motion(index: usize, count: usize, ratio: Real, planet: Real, carrier: Real) -> Motion {
    let sa = TAU * index as Real / count as Real;
    rotor(sa + carrier) * translator(1.0, 0.0) * rotor(planet - sa * ratio - carrier)
}

/// Place ring, `planets` planets and sun.
pub(crate) fn arrange_stage(
    out: &mut Arrangement,
    profiles: &StageProfiles,
    teeth: ToothCounts,
    planets: usize,
    stage: Option<u8>,
    angles: StageAngles,
) {
    let id = |name: &'static str| match stage {
        Some(s) => BodyId::new(name).stage(s),
        None => BodyId::new(name),
    };
    let ratio = teeth.ring as Real / teeth.planet as Real;

    out.place(id("ring"), rotor(angles.ring), &profiles.ring);
    for i in 0..planets {
        let motion = planet_motion(i, planets, ratio, angles.planet, angles.carrier);
        out.place(id("planet").index(i), motion, &profiles.planet);
    }
    out.place(id("sun"), rotor(angles.sun), &profiles.sun);
}

pub(crate) fn stage_templates<'a>(
    profiles: &'a StageProfiles,
    teeth: ToothCounts,
    stage: Option<u8>,
) -> [Template<'a>; 3] {
    let id = |name: &'static str| match stage {
        Some(s) => BodyId::new(name).stage(s),
        None => BodyId::new(name),
    };
    [
        Template {
            body: id("ring"),
            teeth: Some(teeth.ring),
            hand: Hand::Opposite,
            profile: &profiles.ring,
        },
        Template {
            body: id("planet"),
            teeth: Some(teeth.planet),
            hand: Hand::Opposite,
            profile: &profiles.planet,
        },
        Template {
            body: id("sun"),
            teeth: Some(teeth.sun),
            hand: Hand::Base,
            profile: &profiles.sun,
        },
    ]
}

/// Construction parameters of a [`Planetary`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetaryParams {
    pub teeth: ToothCounts,
    pub planets: usize,
    /// Epicycloid share of the ring and planet teeth; the sun uses `1 - fraction`.
    pub fraction: Real,
    pub resolution: usize,
}

impl PlanetaryParams {
    pub const fn new(teeth: ToothCounts, planets: usize) -> Self {
        Self {
            teeth,
            planets,
            fraction: 0.5,
            resolution: 500,
        }
    }

    pub const fn with_fraction(mut self, fraction: Real) -> Self {
        self.fraction = fraction;
        self
    }

    pub const fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

#[derive(Debug)]
pub struct Planetary {
    geometry: GearGeometry,
    params: PlanetaryParams,
    profiles: StageProfiles,
}

impl Planetary {
    /// Planet-sun and planet-ring rolling contacts.
    pub fn topology() -> Topology {
        Topology::new(
            "planetary",
            &[
                "S * s + P * p - (S + P) * c",
                "R * r - P * p - (R - P) * c",
            ],
        )
    }

    pub fn kinematics(input: &str, output: &str, aux: &[&str]) -> Result<Arc<Kinematics>, ConfigurationError> {
        bind(Self::topology(), input, output, aux)
    }

    pub fn new(kinematics: Arc<Kinematics>, params: PlanetaryParams) -> Result<Self, ConfigurationError> {
        expect_topology(&kinematics, &Self::topology())?;
        params.teeth.validate(params.planets, "")?;
        require_fraction("fraction", params.fraction)?;
        let geometry = GearGeometry::new(kinematics, params.teeth.values(""))?;
        let profiles = generate_stage(params.teeth, params.fraction, params.resolution, 0.0)?;
        Ok(Self {
            geometry,
            params,
            profiles,
        })
    }

    pub fn params(&self) -> &PlanetaryParams {
        &self.params
    }
}

impl GearTrain for Planetary {
    fn geometry(&self) -> &GearGeometry {
        &self.geometry
    }

    fn templates(&self) -> Vec<Template<'_>> {
        stage_templates(&self.profiles, self.params.teeth, None).to_vec()
    }

    fn arrange(&self, phase: Real) -> Result<Arrangement, ConfigurationError> {
        let g = &self.geometry;
        let angles = StageAngles {
            ring: g.ratio_of("r")? * phase,
            planet: g.ratio_of("p")? * phase,
            sun: g.ratio_of("s")? * phase,
            carrier: g.ratio_of("c")? * phase,
        };
        let mut out = Arrangement::new();
        arrange_stage(
            &mut out,
            &self.profiles,
            self.params.teeth,
            self.params.planets,
            None,
            angles,
        );
        Ok(out)
    }

    fn carrier_radius(&self) -> Option<Real> {
        Some(1.0)
    }
}
