//! Two cycloid discs of different lobe counts back to back on one eccentric.
//!
//! Both discs turn together and share the eccentricity; the second stage is
//! scaled so that its rolling geometry matches that shared offset. Seen as
//! gearing it is a carrier-driven compound planetary with a single planet.

use super::cycloid::{CycloidStage, LobeKind};
use super::{Arrangement, BodyId, GearTrain, Hand, Template, bind, expect_topology};
use crate::errors::ConfigurationError;
use crate::float_types::Real;
use crate::geometry::GearGeometry;
use crate::kinematics::{Kinematics, Topology};
use crate::profile::Profile;
use crate::transform::rotor;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundCycloidParams {
    pub lobes: (usize, usize),
    pub kind: LobeKind,
    pub bearing: Real,
    pub depth: Real,
}

impl CompoundCycloidParams {
    pub const fn new(first: usize, second: usize) -> Self {
        Self {
            lobes: (first, second),
            kind: LobeKind::Epi,
            bearing: 1.0,
            depth: 0.8,
        }
    }

    pub const fn with_kind(mut self, kind: LobeKind) -> Self {
        self.kind = kind;
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
}

/// Disc-to-ring pitch ratio of a stage with `lobes` lobes.
fn eccentricity_ratio(lobes: usize) -> Real {
    lobes as Real / (lobes + 1) as Real
}

#[derive(Debug)]
struct Stage {
    stage: CycloidStage,
    disc: Profile,
    ring: Profile,
}

#[derive(Debug)]
pub struct CompoundCycloid {
    geometry: GearGeometry,
    params: CompoundCycloidParams,
    stages: [Stage; 2],
    eccentric: Profile,
}

impl CompoundCycloid {
    pub fn topology() -> Topology {
        Topology::new(
            "compound cycloid",
            &[
                "(P1+1) * r1 - P1 * p - (1) * c",
                "(P2+1) * r2 - P2 * p - (1) * c",
            ],
        )
    }

    pub fn kinematics(input: &str, output: &str, aux: &[&str]) -> Result<Arc<Kinematics>, ConfigurationError> {
        bind(Self::topology(), input, output, aux)
    }

    pub fn new(
        kinematics: Arc<Kinematics>,
        params: CompoundCycloidParams,
    ) -> Result<Self, ConfigurationError> {
        expect_topology(&kinematics, &Self::topology())?;
        if !(params.depth > 0.0 && params.depth <= 1.0) {
            return Err(ConfigurationError::invalid("depth", "must lie in (0, 1]"));
        }
        let (first, second) = params.lobes;
        let second_scale = if first == 0 || second == 0 {
            1.0
        } else {
            eccentricity_ratio(first) / eccentricity_ratio(second)
        };
        let stage = |lobes, scale| CycloidStage {
            kind: params.kind,
            lobes,
            scale,
            eccentricity: params.depth,
            bearing: params.bearing,
        };
        let specs = [stage(first, 1.0), stage(second, second_scale)];
        specs[0].validate("1")?;
        specs[1].validate("2")?;

        let geometry = GearGeometry::new(
            kinematics,
            [("P1", first as Real), ("P2", second as Real)],
        )?;

        let build = |stage: CycloidStage| -> Result<Stage, ConfigurationError> {
            let (disc, ring) = stage.generate()?;
            Ok(Stage { stage, disc, ring })
        };
        let stages = [build(specs[0])?, build(specs[1])?];
        let eccentric = specs[0].eccentric()?;

        Ok(Self {
            geometry,
            params,
            stages,
            eccentric,
        })
    }

    pub fn params(&self) -> &CompoundCycloidParams {
        &self.params
    }

    /// Rolling radius of each stage; the first is the unit.
    pub fn scales(&self) -> (Real, Real) {
        (self.stages[0].stage.scale, self.stages[1].stage.scale)
    }
}

impl GearTrain for CompoundCycloid {
    fn geometry(&self) -> &GearGeometry {
        &self.geometry
    }

    fn templates(&self) -> Vec<Template<'_>> {
        let mut out = Vec::with_capacity(5);
        for (i, s) in self.stages.iter().enumerate() {
            let n = i as u8 + 1;
            out.push(Template {
                body: BodyId::new("disc").stage(n),
                teeth: Some(s.stage.lobes),
                hand: Hand::Base,
                profile: &s.disc,
            });
            out.push(Template {
                body: BodyId::new("ring").stage(n),
                teeth: Some(s.stage.lobes + 1),
                hand: Hand::Base,
                profile: &s.ring,
            });
        }
        out.push(Template {
            body: BodyId::new("eccentric"),
            teeth: None,
            hand: Hand::Base,
            profile: &self.eccentric,
        });
        out
    }

    fn arrange(&self, phase: Real) -> Result<Arrangement, ConfigurationError> {
        let g = &self.geometry;
        let p = g.ratio_of("p")? * phase;
        let c = g.ratio_of("c")? * phase;
        let mut out = Arrangement::new();
        for (i, (s, ring)) in self.stages.iter().zip(["r1", "r2"]).enumerate() {
            let n = i as u8 + 1;
            out.place(BodyId::new("disc").stage(n), s.stage.disc_motion(p, c), &s.disc);
            out.place(
                BodyId::new("ring").stage(n),
                rotor(g.ratio_of(ring)? * phase),
                &s.ring,
            );
        }
        out.place(BodyId::new("eccentric"), rotor(c), &self.eccentric);
        Ok(out)
    }
}
