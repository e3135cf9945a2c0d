//! Gear-train facades and the arrangement they produce.
//!
//! Each facade couples a kinematic binding with concrete geometry and the
//! tooth profiles of its bodies. Profiles are generated once, at
//! construction, in their generation orientation; [`GearTrain::arrange`]
//! then places them for any output phase using only rigid motions derived
//! from the per-body angles.

pub mod angular_contact;
pub mod compound_cycloid;
pub mod compound_planetary;
pub mod cycloid;
pub mod nabtesco;
pub mod planetary;
pub mod simple;

use crate::errors::ConfigurationError;
use crate::float_types::Real;
use crate::geometry::GearGeometry;
use crate::kinematics::{Kinematics, Topology};
use crate::profile::Profile;
use crate::transform::Motion;
use std::fmt;
use std::sync::Arc;

/// Identity of one placed body: a name, an optional stage for compound
/// trains and an optional instance index for replicated bodies (planets,
/// cranks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId {
    pub name: &'static str,
    pub stage: Option<u8>,
    pub index: Option<usize>,
}

impl BodyId {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            stage: None,
            index: None,
        }
    }

    pub const fn stage(mut self, stage: u8) -> Self {
        self.stage = Some(stage);
        self
    }

    pub const fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        if let Some(stage) = self.stage {
            write!(f, "{stage}")?;
        }
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

/// A body's profile moved to its place for one phase.
#[derive(Debug, Clone)]
pub struct PlacedBody {
    pub body: BodyId,
    pub motion: Motion,
    pub profile: Profile,
}

/// Ordered list of placed bodies for one phase.
#[derive(Debug, Clone, Default)]
pub struct Arrangement {
    bodies: Vec<PlacedBody>,
}

impl Arrangement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `template` with `motion` and append it.
    pub fn place(&mut self, body: BodyId, motion: Motion, template: &Profile) {
        self.bodies.push(PlacedBody {
            body,
            motion,
            profile: template.transform(&motion),
        });
    }

    pub fn bodies(&self) -> &[PlacedBody] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, body: BodyId) -> Option<&PlacedBody> {
        self.bodies.iter().find(|b| b.body == body)
    }

    /// Every body called `name`, whatever its stage or index.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PlacedBody> + 'a {
        self.bodies.iter().filter(move |b| b.body.name == name)
    }

    /// Plot bounds: 1.05 times the largest vertex radius.
    pub fn limit(&self) -> Real {
        self.bodies
            .iter()
            .map(|b| b.profile.max_radius())
            .fold(0.0, Real::max)
            * 1.05
    }
}

/// Helical hand of a body relative to the base hand of the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Base,
    Opposite,
}

impl Hand {
    pub const fn sign(self) -> Real {
        match self {
            Hand::Base => 1.0,
            Hand::Opposite => -1.0,
        }
    }
}

/// An unplaced body profile, as exported for CAD.
#[derive(Debug, Clone, Copy)]
pub struct Template<'a> {
    pub body: BodyId,
    pub teeth: Option<usize>,
    pub hand: Hand,
    pub profile: &'a Profile,
}

impl Template<'_> {
    /// File stem for exports: `ring_21`, `eccentric`, ...
    pub fn label(&self) -> String {
        match self.teeth {
            Some(teeth) => format!("{}_{}", self.body, teeth),
            None => self.body.to_string(),
        }
    }
}

/// Common surface of all gear-train facades.
pub trait GearTrain {
    fn geometry(&self) -> &GearGeometry;

    /// Body profiles in generation orientation, one per distinct body.
    fn templates(&self) -> Vec<Template<'_>>;

    /// Place every body for an output rotation of `phase` radians.
    fn arrange(&self, phase: Real) -> Result<Arrangement, ConfigurationError>;

    fn ratio_f(&self) -> Result<Real, ConfigurationError> {
        self.geometry().ratio_f()
    }

    fn limit(&self) -> Result<Real, ConfigurationError> {
        Ok(self.arrange(0.0)?.limit())
    }

    /// Radius of the orbit the replicated bodies ride on, in profile units,
    /// for trains with a carrier.
    fn carrier_radius(&self) -> Option<Real> {
        None
    }

    /// `count` arrangements at phases `0, step, 2·step, ...`; the default
    /// step is [`GearGeometry::animation_step`].
    fn frames(&self, count: usize, step: Option<Real>) -> Result<Vec<Arrangement>, ConfigurationError> {
        let step = step.unwrap_or_else(|| self.geometry().animation_step());
        (0..count).map(|i| self.arrange(i as Real * step)).collect()
    }
}

/// Build the binding for `topology` and share it.
pub(crate) fn bind(
    topology: Topology,
    input: &str,
    output: &str,
    aux: &[&str],
) -> Result<Arc<Kinematics>, ConfigurationError> {
    Kinematics::new(topology, input, output, aux).map(Arc::new)
}

/// Reject a binding made for another mechanism.
pub(crate) fn expect_topology(kinematics: &Kinematics, expected: &Topology) -> Result<(), ConfigurationError> {
    if kinematics.topology() == expected {
        Ok(())
    } else {
        Err(ConfigurationError::invalid(
            "kinematics",
            format!(
                "expected the {} topology, got {}",
                expected.name(),
                kinematics.topology().name()
            ),
        ))
    }
}

pub(crate) fn require_count(name: &str, value: usize) -> Result<(), ConfigurationError> {
    if value == 0 {
        return Err(ConfigurationError::invalid(name, "must be at least 1"));
    }
    Ok(())
}

pub(crate) fn require_fraction(name: &str, value: Real) -> Result<(), ConfigurationError> {
    if !(value > 0.0 && value < 1.0) {
        return Err(ConfigurationError::invalid(name, "must lie strictly between 0 and 1"));
    }
    Ok(())
}

pub(crate) fn require_positive(name: &str, value: Real) -> Result<(), ConfigurationError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigurationError::invalid(name, "must be positive"));
    }
    Ok(())
}
