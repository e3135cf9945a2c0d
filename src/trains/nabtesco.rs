//! Nabtesco-style drive: a cycloid stage driven through a planetary one.
//!
//! The input sun turns `N` crank gears mounted on the output carrier. Every
//! crank carries an eccentric journal; together they wobble a single lobed
//! disc inside a fixed pin ring, and the disc's slow rotation is taken off
//! by the carrier itself (`o = l`).
//!
//! Identifiers: `s` input sun, `w` cranks, `o` output carrier, `l` lobed
//! disc, `r` pin ring.

use super::cycloid::{CycloidStage, LobeKind};
use super::planetary::{ToothCounts, generate_planet_and_sun, planet_motion};
use super::{
    Arrangement, BodyId, GearTrain, Hand, Template, bind, expect_topology, require_count,
    require_positive,
};
use crate::errors::ConfigurationError;
use crate::float_types::{Real, TAU};
use crate::geometry::GearGeometry;
use crate::kinematics::{Kinematics, Topology};
use crate::profile::{Circle, PinCircle, Profile, ProfileGenerator};
use crate::transform::{rotor, translator};
use std::sync::Arc;

/// Outer diameter of the cycloid stage relative to the crank orbit.
const CYCLOID_SPAN: Real = 1.8;

#[derive(Debug, Clone, PartialEq)]
pub struct NabtescoParams {
    /// Lobes on the disc; the ring has one pin more.
    pub lobes: usize,
    pub sun: usize,
    /// Teeth on each crank gear.
    pub crank: usize,
    pub cranks: usize,
    /// Pin radius, in lobe pitches.
    pub bearing: Real,
    /// Eccentricity as a fraction of the lobe pitch.
    pub depth: Real,
    pub resolution: usize,
}

impl NabtescoParams {
    /// `(L, S, W)` with three cranks.
    pub const fn new(lobes: usize, sun: usize, crank: usize) -> Self {
        Self {
            lobes,
            sun,
            crank,
            cranks: 3,
            bearing: 1.0,
            depth: 0.5,
            resolution: 500,
        }
    }

    pub const fn with_cranks(mut self, cranks: usize) -> Self {
        self.cranks = cranks;
        self
    }

    pub const fn with_bearing(mut self, bearing: Real) -> Self {
        self.bearing = bearing;
        self
    }

    pub const fn with_depth(mut self, depth: Real) -> Self {
        self.depth = depth;
        self
    }

    pub const fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Planetary stage formed by sun and crank gears; its ring is virtual.
    pub const fn planetary_teeth(&self) -> ToothCounts {
        ToothCounts::new(self.sun + 2 * self.crank, self.crank, self.sun)
    }
}

#[derive(Debug)]
pub struct Nabtesco {
    geometry: GearGeometry,
    params: NabtescoParams,
    stage: CycloidStage,
    ring: Profile,
    disc: Profile,
    crank: Profile,
    journal: Profile,
    sun: Profile,
}

impl Nabtesco {
    pub fn topology() -> Topology {
        Topology::new(
            "nabtesco",
            &[
                "(L+1) * r - L * l - (1) * w",
                "S * s + W * w - (S+W) * o",
                "o - l",
            ],
        )
    }

    pub fn kinematics(input: &str, output: &str, aux: &[&str]) -> Result<Arc<Kinematics>, ConfigurationError> {
        bind(Self::topology(), input, output, aux)
    }

    pub fn new(kinematics: Arc<Kinematics>, params: NabtescoParams) -> Result<Self, ConfigurationError> {
        expect_topology(&kinematics, &Self::topology())?;
        require_count("L", params.lobes)?;
        require_count("S", params.sun)?;
        require_count("W", params.crank)?;
        require_count("cranks", params.cranks)?;
        require_positive("bearing", params.bearing)?;
        if !(params.depth > 0.0 && params.depth <= 1.0) {
            return Err(ConfigurationError::invalid("depth", "must lie in (0, 1]"));
        }
        let teeth = params.planetary_teeth();
        if (teeth.ring + teeth.sun) % params.cranks != 0 {
            return Err(ConfigurationError::invalid(
                "cranks",
                format!(
                    "{} cranks cannot be spaced evenly around 2 * (S + W) = {}",
                    params.cranks,
                    teeth.ring + teeth.sun
                ),
            ));
        }

        let geometry = GearGeometry::new(
            kinematics,
            [
                ("L", params.lobes as Real),
                ("S", params.sun as Real),
                ("W", params.crank as Real),
            ],
        )?;

        let scale = CYCLOID_SPAN / params.lobes as Real;
        let stage = CycloidStage {
            kind: LobeKind::Epi,
            lobes: params.lobes,
            scale,
            eccentricity: params.depth * scale,
            bearing: params.bearing * scale,
        };
        stage.validate("")?;
        let (disc, ring) = stage.generate()?;
        // crank holes sit on the crank orbit; the journals fill them exactly
        let holes = PinCircle::new(params.cranks, 1.0, stage.bearing).generate_checked("disc")?;
        let disc = Profile::concat([&disc, &holes]);
        let journal = Circle::new(stage.bearing).generate_checked("journal")?;
        let (crank, sun) = generate_planet_and_sun(teeth, 0.5, params.resolution, 0.0, "crank")?;

        Ok(Self {
            geometry,
            params,
            stage,
            ring,
            disc,
            crank,
            journal,
            sun,
        })
    }

    pub fn params(&self) -> &NabtescoParams {
        &self.params
    }

    pub fn eccentricity(&self) -> Real {
        self.stage.eccentricity
    }
}

impl GearTrain for Nabtesco {
    fn geometry(&self) -> &GearGeometry {
        &self.geometry
    }

    fn templates(&self) -> Vec<Template<'_>> {
        vec![
            Template {
                body: BodyId::new("ring"),
                teeth: Some(self.params.lobes + 1),
                hand: Hand::Base,
                profile: &self.ring,
            },
            Template {
                body: BodyId::new("disc"),
                teeth: Some(self.params.lobes),
                hand: Hand::Base,
                profile: &self.disc,
            },
            Template {
                body: BodyId::new("crank"),
                teeth: Some(self.params.crank),
                hand: Hand::Opposite,
                profile: &self.crank,
            },
            Template {
                body: BodyId::new("journal"),
                teeth: None,
                hand: Hand::Base,
                profile: &self.journal,
            },
            Template {
                body: BodyId::new("sun"),
                teeth: Some(self.params.sun),
                hand: Hand::Base,
                profile: &self.sun,
            },
        ]
    }

    fn arrange(&self, phase: Real) -> Result<Arrangement, ConfigurationError> {
        let g = &self.geometry;
        let angle = |dof| g.ratio_of(dof).map(|r| r * phase);
        let (r, l, w, s, o) = (angle("r")?, angle("l")?, angle("w")?, angle("s")?, angle("o")?);
        let e = self.stage.eccentricity;
        let teeth = self.params.planetary_teeth();
        let ratio = teeth.ring as Real / teeth.planet as Real;
        let n = self.params.cranks;

        let mut out = Arrangement::new();
        out.place(BodyId::new("ring"), rotor(r), &self.ring);
        out.place(BodyId::new("disc"), self.stage.disc_motion(l, w), &self.disc);
        for i in 0..n {
            out.place(
                BodyId::new("crank").index(i),
                planet_motion(i, n, ratio, w, o),
                &self.crank,
            );
        }
        for i in 0..n {
            let orbit = TAU * i as Real / n as Real + o;
            let motion = translator(orbit.cos() + e * w.cos(), orbit.sin() + e * w.sin()) * rotor(w);
            out.place(BodyId::new("journal").index(i), motion, &self.journal);
        }
        out.place(BodyId::new("sun"), rotor(s), &self.sun);
        Ok(out)
    }

    fn carrier_radius(&self) -> Option<Real> {
        Some(1.0)
    }
}
