//! Cycloidal drive: a lobed disc wobbling inside a ring of pins.
//!
//! Kinematically a cycloid is a planetary with a single planet grown to fill
//! the ring: the sun turns one-to-one with the eccentric and drops out, and
//! the ring has one lobe more than the disc.
//!
//! Two lobe arrangements are supported. [`LobeKind::Epi`] puts the
//! epitrochoidal lobes on the disc and round pins in the ring;
//! [`LobeKind::Hypo`] swaps them, with pins on the disc and a lobed ring.

use super::{
    Arrangement, BodyId, GearTrain, Hand, Template, bind, expect_topology, require_count,
    require_positive,
};
use crate::errors::ConfigurationError;
use crate::float_types::Real;
use crate::geometry::GearGeometry;
use crate::kinematics::{Kinematics, Topology};
use crate::profile::{Circle, Epitrochoid, Hypotrochoid, PinCircle, Profile, ProfileGenerator};
use crate::transform::{Motion, rotor, translator};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LobeKind {
    #[default]
    Epi,
    Hypo,
}

impl std::str::FromStr for LobeKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "epi" => Ok(LobeKind::Epi),
            "hypo" => Ok(LobeKind::Hypo),
            other => Err(ConfigurationError::invalid(
                "cycloid",
                format!("unknown lobe kind `{other}`, expected `epi` or `hypo`"),
            )),
        }
    }
}

/// Dimensions of one disc/ring pair.
///
/// `scale` is the rolling radius (one lobe pitch), `eccentricity` the
/// offset of the disc centre, `bearing` the pin radius. The disc has
/// `lobes` lobes and the ring `lobes + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CycloidStage {
    pub kind: LobeKind,
    pub lobes: usize,
    pub scale: Real,
    pub eccentricity: Real,
    pub bearing: Real,
}

impl CycloidStage {
    /// Undercut appears once the disc offset exceeds one rolling radius.
    pub fn validate(&self, stage: &str) -> Result<(), ConfigurationError> {
        require_count(&format!("P{stage}"), self.lobes)?;
        require_positive("bearing", self.bearing)?;
        require_positive("depth", self.eccentricity)?;
        if self.eccentricity > self.scale {
            return Err(ConfigurationError::invalid(
                "depth",
                format!(
                    "eccentricity {} exceeds the rolling radius {} of stage {stage}",
                    self.eccentricity, self.scale
                ),
            ));
        }
        Ok(())
    }

    fn ring_count(&self) -> usize {
        self.lobes + 1
    }

    /// Disc and ring, generation orientation, disc centred on the origin.
    pub fn generate(&self) -> Result<(Profile, Profile), ConfigurationError> {
        let p = self.lobes as Real;
        let r = self.ring_count() as Real;
        let m = self.scale;
        let (disc, ring) = match self.kind {
            LobeKind::Epi => (
                Epitrochoid::new(p * m, p, self.eccentricity)
                    .generate_checked("disc")?
                    .offset(-self.bearing),
                PinCircle::new(self.ring_count(), r * m, self.bearing).generate_checked("ring")?,
            ),
            LobeKind::Hypo => (
                PinCircle::new(self.lobes, (p + 2.0) * m, self.bearing).generate_checked("disc")?,
                Hypotrochoid::new(r * m, r, self.eccentricity)
                    .generate_checked("ring")?
                    .offset(self.bearing),
            ),
        };
        // a pin radius beyond the lobe depth shrinks the disc to nothing
        if disc.loops().is_empty() {
            return Err(ConfigurationError::DegenerateProfile {
                body: "disc".to_string(),
                reason: format!("pin radius {} leaves no disc", self.bearing),
            });
        }
        Ok((disc, ring))
    }

    /// Cam on the input shaft: the journal the disc rides on, plus the shaft.
    pub fn eccentric(&self) -> Result<Profile, ConfigurationError> {
        let journal = Circle::new(self.bearing + self.eccentricity)
            .at(self.eccentricity, 0.0)
            .generate_checked("eccentric")?;
        let shaft = Circle::new(self.bearing).generate_checked("eccentric")?;
        Ok(Profile::concat([&journal, &shaft]))
    }

    /// Disc spun by `disc` about its own centre, then carried around by the
    /// eccentric at `crank`.
    pub fn disc_motion(&self, disc: Real, crank: Real) -> Motion {
        translator(
            self.eccentricity * crank.cos(),
            self.eccentricity * crank.sin(),
        ) * rotor(disc)
    }
}

/// Construction parameters of a [`Cycloid`].
#[derive(Debug, Clone, PartialEq)]
pub struct CycloidParams {
    pub lobes: usize,
    pub kind: LobeKind,
    /// Pin radius, in lobe pitches.
    pub bearing: Real,
    /// Eccentricity as a fraction of the lobe pitch; 1 is a full cycloid.
    pub depth: Real,
    /// Number of output pins; zero draws none.
    pub output_pins: usize,
}

impl CycloidParams {
    pub const fn new(lobes: usize) -> Self {
        Self {
            lobes,
            kind: LobeKind::Epi,
            bearing: 1.0,
            depth: 0.8,
            output_pins: 0,
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

    pub const fn with_output_pins(mut self, output_pins: usize) -> Self {
        self.output_pins = output_pins;
        self
    }
}

#[derive(Debug)]
pub struct Cycloid {
    geometry: GearGeometry,
    params: CycloidParams,
    stage: CycloidStage,
    ring: Profile,
    disc: Profile,
    eccentric: Profile,
    output: Option<Profile>,
}

impl Cycloid {
    pub fn topology() -> Topology {
        Topology::new("cycloid", &["(P+1) * r - P * p - (1) * c"])
    }

    pub fn kinematics(input: &str, output: &str, aux: &[&str]) -> Result<Arc<Kinematics>, ConfigurationError> {
        bind(Self::topology(), input, output, aux)
    }

    pub fn new(kinematics: Arc<Kinematics>, params: CycloidParams) -> Result<Self, ConfigurationError> {
        expect_topology(&kinematics, &Self::topology())?;
        if !(params.depth > 0.0 && params.depth <= 1.0) {
            return Err(ConfigurationError::invalid("depth", "must lie in (0, 1]"));
        }
        let stage = CycloidStage {
            kind: params.kind,
            lobes: params.lobes,
            scale: 1.0,
            eccentricity: params.depth,
            bearing: params.bearing,
        };
        stage.validate("")?;
        let geometry = GearGeometry::new(kinematics, [("P", params.lobes as Real)])?;

        let (mut disc, ring) = stage.generate()?;
        let eccentric = stage.eccentric()?;
        let mut output = None;
        if params.output_pins > 0 {
            // holes leave room for the pins to orbit with the disc offset
            let radius = stage.ring_count() as Real * stage.scale / 2.0;
            if params.kind == LobeKind::Epi {
                let holes = PinCircle::new(params.output_pins, radius, stage.bearing + stage.eccentricity)
                    .generate_checked("disc")?;
                disc = Profile::concat([&disc, &holes]);
            }
            output = Some(PinCircle::new(params.output_pins, radius, stage.bearing).generate_checked("output")?);
        }

        Ok(Self {
            geometry,
            params,
            stage,
            ring,
            disc,
            eccentric,
            output,
        })
    }

    pub fn params(&self) -> &CycloidParams {
        &self.params
    }

    pub fn eccentricity(&self) -> Real {
        self.stage.eccentricity
    }
}

impl GearTrain for Cycloid {
    fn geometry(&self) -> &GearGeometry {
        &self.geometry
    }

    fn templates(&self) -> Vec<Template<'_>> {
        let mut out = vec![
            Template {
                body: BodyId::new("ring"),
                teeth: Some(self.stage.ring_count()),
                hand: Hand::Base,
                profile: &self.ring,
            },
            Template {
                body: BodyId::new("disc"),
                teeth: Some(self.stage.lobes),
                hand: Hand::Base,
                profile: &self.disc,
            },
            Template {
                body: BodyId::new("eccentric"),
                teeth: None,
                hand: Hand::Base,
                profile: &self.eccentric,
            },
        ];
        if let Some(output) = &self.output {
            out.push(Template {
                body: BodyId::new("output"),
                teeth: Some(self.params.output_pins),
                hand: Hand::Base,
                profile: output,
            });
        }
        out
    }

    fn arrange(&self, phase: Real) -> Result<Arrangement, ConfigurationError> {
        let g = &self.geometry;
        let (r, p, c) = (
            g.ratio_of("r")? * phase,
            g.ratio_of("p")? * phase,
            g.ratio_of("c")? * phase,
        );
        let mut out = Arrangement::new();
        out.place(BodyId::new("ring"), rotor(r), &self.ring);
        out.place(BodyId::new("disc"), self.stage.disc_motion(p, c), &self.disc);
        out.place(BodyId::new("eccentric"), rotor(c), &self.eccentric);
        if let Some(output) = &self.output {
            out.place(BodyId::new("output"), rotor(p), output);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lobe_kind_from_str() {
        assert_eq!("epi".parse::<LobeKind>(), Ok(LobeKind::Epi));
        assert_eq!("hypo".parse::<LobeKind>(), Ok(LobeKind::Hypo));
        assert!("involute".parse::<LobeKind>().is_err());
    }

    #[test]
    fn depth_is_bounded() {
        let k = Cycloid::kinematics("c", "p", &["r"]).unwrap();
        assert!(Cycloid::new(k.clone(), CycloidParams::new(4).with_depth(0.0)).is_err());
        assert!(Cycloid::new(k.clone(), CycloidParams::new(4).with_depth(1.2)).is_err());
        assert!(Cycloid::new(k.clone(), CycloidParams::new(0)).is_err());
        assert!(Cycloid::new(k, CycloidParams::new(4).with_depth(1.0)).is_ok());
    }

    #[test]
    fn output_pins_add_a_body() {
        let k = Cycloid::kinematics("c", "p", &["r"]).unwrap();
        let plain = Cycloid::new(k.clone(), CycloidParams::new(6)).unwrap();
        let pinned = Cycloid::new(k, CycloidParams::new(6).with_output_pins(4)).unwrap();
        assert_eq!(plain.arrange(0.0).unwrap().len(), 3);
        assert_eq!(pinned.arrange(0.0).unwrap().len(), 4);
        assert_eq!(pinned.templates()[1].profile.loops().len(), 5);
    }
}
