//! Two planetary stages joined through common planets and carrier.

use super::planetary::{
    StageAngles, StageProfiles, ToothCounts, arrange_stage, generate_stage, stage_templates,
};
use super::{Arrangement, GearTrain, Template, bind, expect_topology, require_fraction};
use crate::errors::ConfigurationError;
use crate::float_types::Real;
use crate::geometry::GearGeometry;
use crate::kinematics::{Kinematics, Topology};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundPlanetaryParams {
    pub first: ToothCounts,
    pub second: ToothCounts,
    pub planets: usize,
    pub fractions: (Real, Real),
    pub resolution: usize,
}

impl CompoundPlanetaryParams {
    pub const fn new(first: ToothCounts, second: ToothCounts, planets: usize) -> Self {
        Self {
            first,
            second,
            planets,
            fractions: (0.5, 0.5),
            resolution: 500,
        }
    }

    pub const fn with_fractions(mut self, first: Real, second: Real) -> Self {
        self.fractions = (first, second);
        self
    }

    pub const fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

#[derive(Debug)]
pub struct CompoundPlanetary {
    geometry: GearGeometry,
    params: CompoundPlanetaryParams,
    stages: [StageProfiles; 2],
}

impl CompoundPlanetary {
    pub fn topology() -> Topology {
        Topology::new(
            "compound planetary",
            &[
                "S1 * s1 + P1 * p - (S1 + P1) * c",
                "R1 * r1 - P1 * p - (R1 - P1) * c",
                "S2 * s2 + P2 * p - (S2 + P2) * c",
                "R2 * r2 - P2 * p - (R2 - P2) * c",
            ],
        )
    }

    pub fn kinematics(input: &str, output: &str, aux: &[&str]) -> Result<Arc<Kinematics>, ConfigurationError> {
        bind(Self::topology(), input, output, aux)
    }

    pub fn new(
        kinematics: Arc<Kinematics>,
        params: CompoundPlanetaryParams,
    ) -> Result<Self, ConfigurationError> {
        expect_topology(&kinematics, &Self::topology())?;
        params.first.validate(params.planets, "1")?;
        params.second.validate(params.planets, "2")?;
        require_fraction("fraction1", params.fractions.0)?;
        require_fraction("fraction2", params.fractions.1)?;

        let values = params
            .first
            .values("1")
            .into_iter()
            .chain(params.second.values("2"));
        let geometry = GearGeometry::new(kinematics, values)?;

        // half a planet tooth count of roll keeps the second stage meshing
        // for single-tooth planets too
        let stages = [
            generate_stage(params.first, params.fractions.0, params.resolution, 0.0)?,
            generate_stage(
                params.second,
                params.fractions.1,
                params.resolution,
                0.5 * params.second.planet as Real,
            )?,
        ];
        Ok(Self {
            geometry,
            params,
            stages,
        })
    }

    pub fn params(&self) -> &CompoundPlanetaryParams {
        &self.params
    }
}

impl GearTrain for CompoundPlanetary {
    fn geometry(&self) -> &GearGeometry {
        &self.geometry
    }

    fn templates(&self) -> Vec<Template<'_>> {
        let mut out = stage_templates(&self.stages[0], self.params.first, Some(1)).to_vec();
        out.extend(stage_templates(&self.stages[1], self.params.second, Some(2)));
        out
    }

    fn arrange(&self, phase: Real) -> Result<Arrangement, ConfigurationError> {
        let g = &self.geometry;
        let planet = g.ratio_of("p")? * phase;
        let carrier = g.ratio_of("c")? * phase;
        let mut out = Arrangement::new();
        for (index, (teeth, ring, sun)) in [
            (self.params.first, "r1", "s1"),
            (self.params.second, "r2", "s2"),
        ]
        .into_iter()
        .enumerate()
        {
            let angles = StageAngles {
                ring: g.ratio_of(ring)? * phase,
                planet,
                sun: g.ratio_of(sun)? * phase,
                carrier,
            };
            arrange_stage(
                &mut out,
                &self.stages[index],
                teeth,
                self.params.planets,
                Some(index as u8 + 1),
                angles,
            );
        }
        Ok(out)
    }

    fn carrier_radius(&self) -> Option<Real> {
        Some(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_stages_are_validated() {
        let k = CompoundPlanetary::kinematics("s1", "r2", &["r1"]).unwrap();
        let params = CompoundPlanetaryParams::new(ToothCounts::new(5, 2, 1), ToothCounts::new(5, 1, 2), 3);
        let err = CompoundPlanetary::new(k, params).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidParameter { ref name, .. } if name == "R2"));
    }

    #[test]
    fn stages_are_labelled() {
        let k = CompoundPlanetary::kinematics("s1", "r2", &["r1"]).unwrap();
        let params = CompoundPlanetaryParams::new(ToothCounts::new(5, 2, 1), ToothCounts::new(4, 1, 2), 3)
            .with_resolution(100);
        let gear = CompoundPlanetary::new(k, params).unwrap();
        let a = gear.arrange(0.3).unwrap();
        assert_eq!(a.len(), 10);
        assert_eq!(a.named("planet").count(), 6);
        let labels: Vec<String> = gear.templates().iter().map(|t| t.label()).collect();
        assert_eq!(labels, ["ring1_5", "planet1_2", "sun1_1", "ring2_4", "planet2_1", "sun2_2"]);
    }
}
