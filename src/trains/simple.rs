//! Two-gear trains: an external pair and a nested (gerotor-like) pair.
//!
//! Both are mostly useful as small, easily checked fixtures for the
//! kinematics and arrangement machinery.

use super::{Arrangement, BodyId, GearTrain, Hand, Template, bind, expect_topology, require_count};
use crate::errors::ConfigurationError;
use crate::float_types::{Real, TAU};
use crate::geometry::GearGeometry;
use crate::kinematics::{Kinematics, Topology};
use crate::profile::{EpiHypoGear, Profile, ProfileGenerator};
use crate::transform::{rotor, translator};
use std::sync::Arc;

/// Epicycloid share of the driving gear's teeth.
const FRACTION: Real = 0.6;
const RESOLUTION: usize = 100;

fn gear(teeth: usize, fraction: Real, body: &str) -> Result<Profile, ConfigurationError> {
    EpiHypoGear::new(teeth as Real, teeth, fraction)
        .with_resolution(RESOLUTION)
        .generate_checked(body)
}

/// External pair of `A` and `B` teeth touching at the origin.
#[derive(Debug)]
pub struct SimpleGear {
    geometry: GearGeometry,
    teeth: (usize, usize),
    a: Profile,
    b: Profile,
}

impl SimpleGear {
    pub fn topology() -> Topology {
        Topology::new("simple", &["A * a + B * b"])
    }

    pub fn kinematics(input: &str, output: &str, aux: &[&str]) -> Result<Arc<Kinematics>, ConfigurationError> {
        bind(Self::topology(), input, output, aux)
    }

    pub fn new(kinematics: Arc<Kinematics>, a: usize, b: usize) -> Result<Self, ConfigurationError> {
        expect_topology(&kinematics, &Self::topology())?;
        require_count("A", a)?;
        require_count("B", b)?;
        let geometry = GearGeometry::new(kinematics, [("A", a as Real), ("B", b as Real)])?;
        let first = gear(a, FRACTION, "a")?;
        // an even count needs half a tooth of turn to put a gap opposite a tooth
        let second = gear(b, 1.0 - FRACTION, "b")?.rotate(TAU / b as Real * ((b + 1) % 2) as Real / 2.0);
        Ok(Self {
            geometry,
            teeth: (a, b),
            a: first,
            b: second,
        })
    }

    pub fn teeth(&self) -> (usize, usize) {
        self.teeth
    }
}

impl GearTrain for SimpleGear {
    fn geometry(&self) -> &GearGeometry {
        &self.geometry
    }

    fn templates(&self) -> Vec<Template<'_>> {
        vec![
            Template {
                body: BodyId::new("a"),
                teeth: Some(self.teeth.0),
                hand: Hand::Base,
                profile: &self.a,
            },
            Template {
                body: BodyId::new("b"),
                teeth: Some(self.teeth.1),
                hand: Hand::Opposite,
                profile: &self.b,
            },
        ]
    }

    fn arrange(&self, phase: Real) -> Result<Arrangement, ConfigurationError> {
        let g = &self.geometry;
        let (a, b) = (self.teeth.0 as Real, self.teeth.1 as Real);
        let mut out = Arrangement::new();
        out.place(
            BodyId::new("a"),
            translator(-a, 0.0) * rotor(g.ratio_of("a")? * phase),
            &self.a,
        );
        out.place(
            BodyId::new("b"),
            translator(b, 0.0) * rotor(g.ratio_of("b")? * phase),
            &self.b,
        );
        Ok(out)
    }
}

/// An `N`-lobe rotor running inside an `N + 1`-lobe stator, as in a
/// progressive cavity pump.
#[derive(Debug)]
pub struct NestedGear {
    geometry: GearGeometry,
    lobes: usize,
    rotor: Profile,
    stator: Profile,
}

impl NestedGear {
    pub fn topology() -> Topology {
        Topology::new("nested", &["N * a - (N + 1) * b"])
    }

    pub fn kinematics(input: &str, output: &str, aux: &[&str]) -> Result<Arc<Kinematics>, ConfigurationError> {
        bind(Self::topology(), input, output, aux)
    }

    pub fn new(kinematics: Arc<Kinematics>, lobes: usize) -> Result<Self, ConfigurationError> {
        expect_topology(&kinematics, &Self::topology())?;
        require_count("N", lobes)?;
        let geometry = GearGeometry::new(kinematics, [("N", lobes as Real)])?;
        Ok(Self {
            geometry,
            lobes,
            rotor: gear(lobes, FRACTION, "a")?,
            stator: gear(lobes + 1, FRACTION, "b")?,
        })
    }

    pub fn lobes(&self) -> usize {
        self.lobes
    }
}

impl GearTrain for NestedGear {
    fn geometry(&self) -> &GearGeometry {
        &self.geometry
    }

    fn templates(&self) -> Vec<Template<'_>> {
        // internal mesh: both bodies share the hand
        vec![
            Template {
                body: BodyId::new("a"),
                teeth: Some(self.lobes),
                hand: Hand::Base,
                profile: &self.rotor,
            },
            Template {
                body: BodyId::new("b"),
                teeth: Some(self.lobes + 1),
                hand: Hand::Base,
                profile: &self.stator,
            },
        ]
    }

    fn arrange(&self, phase: Real) -> Result<Arrangement, ConfigurationError> {
        let g = &self.geometry;
        let mut out = Arrangement::new();
        out.place(
            BodyId::new("a"),
            translator(1.0, 0.0) * rotor(g.ratio_of("a")? * phase),
            &self.rotor,
        );
        out.place(BodyId::new("b"), rotor(g.ratio_of("b")? * phase), &self.stator);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_pair_ratio() {
        let k = SimpleGear::kinematics("a", "b", &[]).unwrap();
        let gear = SimpleGear::new(k, 12, 18).unwrap();
        assert!((gear.ratio_f().unwrap() + 1.5).abs() < 1e-12);
        let a = gear.arrange(0.0).unwrap();
        assert_eq!(a.len(), 2);
        let centre = crate::transform::origin_of(&a.bodies()[1].motion);
        assert!((centre.x - 18.0).abs() < 1e-12);
    }

    #[test]
    fn nested_pair_ratio() {
        let k = NestedGear::kinematics("a", "b", &[]).unwrap();
        let gear = NestedGear::new(k, 5).unwrap();
        assert!((gear.ratio_f().unwrap() - 6.0 / 5.0).abs() < 1e-12);
        assert_eq!(gear.templates()[1].label(), "b_6");
        assert!(NestedGear::new(NestedGear::kinematics("a", "b", &[]).unwrap(), 0).is_err());
    }
}
