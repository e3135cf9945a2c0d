//! Four-point angular-contact traction transmission.
//!
//! A ball (or planet) of unit radius touches four races: inner and outer,
//! top and bottom. Each contact rolls without slipping, which gives one
//! traction equation per contact in the race angles `r{io}{tb}`, the cage
//! angle `c` and the ball's spin components `px`, `py`. `Dr` is the ring
//! diameter in ball diameters; `P{io}{tb}{x,y}` are the contact points on
//! the ball, derived from four angles in degrees.
//!
//! Typical bindings fuse the two inner races (`"rib-rit"`) and hold one
//! outer race, e.g. `rib` in, `rot` out with `rob` fixed.

use super::{Arrangement, BodyId, GearTrain, Hand, Template, bind, expect_topology, require_positive};
use crate::errors::ConfigurationError;
use crate::float_types::{EPSILON, Real};
use crate::geometry::GearGeometry;
use crate::kinematics::{Kinematics, Topology};
use crate::profile::{Circle, Profile, ProfileGenerator};
use crate::transform::identity;
use std::sync::Arc;

const MARKER_RADIUS: Real = 0.05;
const AXIS_LENGTH: Real = 1.1;
const AXIS_WIDTH: Real = 0.01;

/// Contact layout, all angles in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct AngularContactParams {
    /// Conicity; the main driver of the ratio.
    pub cone: Real,
    /// Flatness of the contacts: more squat means more radial contacts.
    pub squat: Real,
    pub tilt: Real,
    /// Difference in spacing between the inner and outer contact pairs.
    pub asym: Real,
    pub diameter_ratio: Real,
}

impl Default for AngularContactParams {
    fn default() -> Self {
        Self {
            cone: 5.0,
            squat: 10.0,
            tilt: 0.0,
            asym: 0.0,
            diameter_ratio: 3.0,
        }
    }
}

impl AngularContactParams {
    pub fn with_cone(mut self, cone: Real) -> Self {
        self.cone = cone;
        self
    }

    pub fn with_squat(mut self, squat: Real) -> Self {
        self.squat = squat;
        self
    }

    pub fn with_tilt(mut self, tilt: Real) -> Self {
        self.tilt = tilt;
        self
    }

    pub fn with_asym(mut self, asym: Real) -> Self {
        self.asym = asym;
        self
    }

    pub fn with_diameter_ratio(mut self, diameter_ratio: Real) -> Self {
        self.diameter_ratio = diameter_ratio;
        self
    }

    /// Contact angles `[inner, outer] x [bottom, top]`, degrees.
    pub fn angles(&self) -> [[Real; 2]; 2] {
        let (cone, squat, tilt, asym) = (self.cone, self.squat, self.tilt, self.asym);
        [
            [
                -135.0 - cone + tilt - squat + asym,
                135.0 - cone + tilt + squat - asym,
            ],
            [
                -45.0 + cone + tilt + squat + asym,
                45.0 + cone + tilt - squat - asym,
            ],
        ]
    }

    /// Contact points on the unit ball, indexed like [`Self::angles`].
    pub fn points(&self) -> [[(Real, Real); 2]; 2] {
        self.angles().map(|row| {
            row.map(|deg| {
                let rad = deg.to_radians();
                (rad.cos(), rad.sin())
            })
        })
    }

    fn values(&self) -> Vec<(String, Real)> {
        let mut out = vec![("Dr".to_string(), self.diameter_ratio)];
        for (io, row) in ['i', 'o'].into_iter().zip(self.points()) {
            for (bt, (x, y)) in ['b', 't'].into_iter().zip(row) {
                out.push((format!("P{io}{bt}x"), x));
                out.push((format!("P{io}{bt}y"), y));
            }
        }
        out
    }
}

#[derive(Debug)]
pub struct AngularContact {
    geometry: GearGeometry,
    params: AngularContactParams,
    ball: Profile,
    contacts: Profile,
    axis: Profile,
}

impl AngularContact {
    pub fn topology() -> Topology {
        let equations: Vec<String> = ['t', 'b']
            .into_iter()
            .flat_map(|tb| {
                ['i', 'o'].into_iter().map(move |io| {
                    format!("(Dr + P{io}{tb}x) * r{io}{tb} - Dr*c + P{io}{tb}x * px + P{io}{tb}y * py")
                })
            })
            .collect();
        Topology::from_equations("angular contact", equations)
    }

    pub fn kinematics(input: &str, output: &str, aux: &[&str]) -> Result<Arc<Kinematics>, ConfigurationError> {
        bind(Self::topology(), input, output, aux)
    }

    pub fn new(kinematics: Arc<Kinematics>, params: AngularContactParams) -> Result<Self, ConfigurationError> {
        expect_topology(&kinematics, &Self::topology())?;
        require_positive("Dr", params.diameter_ratio)?;
        for (name, value) in [
            ("cone", params.cone),
            ("squat", params.squat),
            ("tilt", params.tilt),
            ("asym", params.asym),
        ] {
            if !value.is_finite() {
                return Err(ConfigurationError::invalid(name, "must be finite"));
            }
        }
        let geometry = GearGeometry::new(kinematics, params.values())?;

        let ball = Circle::new(1.0).generate_checked("ball")?;
        let markers: Vec<Profile> = params
            .points()
            .iter()
            .flatten()
            .map(|&(x, y)| Circle::new(MARKER_RADIUS).at(x, y).generate())
            .collect();
        let contacts = Profile::concat(&markers);
        let axis = spin_axis(geometry.ratio_of("px")?, geometry.ratio_of("py")?);

        Ok(Self {
            geometry,
            params,
            ball,
            contacts,
            axis,
        })
    }

    pub fn params(&self) -> &AngularContactParams {
        &self.params
    }
}

/// Thin bar through the ball centre along the spin axis `(-py, px)`.
fn spin_axis(px: Real, py: Real) -> Profile {
    let norm = px.hypot(py);
    // a ball without spin gets a horizontal bar
    let (dx, dy) = if norm < EPSILON { (1.0, 0.0) } else { (-py / norm, px / norm) };
    let (ax, ay) = (dx * AXIS_LENGTH, dy * AXIS_LENGTH);
    let (nx, ny) = (-dy * AXIS_WIDTH, dx * AXIS_WIDTH);
    Profile::from_points([
        (-ax - nx, -ay - ny),
        (ax - nx, ay - ny),
        (ax + nx, ay + ny),
        (-ax + nx, -ay + ny),
    ])
}

impl GearTrain for AngularContact {
    fn geometry(&self) -> &GearGeometry {
        &self.geometry
    }

    fn templates(&self) -> Vec<Template<'_>> {
        [("ball", &self.ball), ("contact", &self.contacts), ("axis", &self.axis)]
            .into_iter()
            .map(|(name, profile)| Template {
                body: BodyId::new(name),
                teeth: None,
                hand: Hand::Base,
                profile,
            })
            .collect()
    }

    /// The cross-section does not move with the phase.
    fn arrange(&self, _phase: Real) -> Result<Arrangement, ConfigurationError> {
        let mut out = Arrangement::new();
        out.place(BodyId::new("ball"), identity(), &self.ball);
        for (i, marker) in self.contacts.loops().iter().enumerate() {
            let marker = Profile::from_loops(vec![marker.clone()]);
            out.place(BodyId::new("contact").index(i), identity(), &marker);
        }
        out.place(BodyId::new("axis"), identity(), &self.axis);
        Ok(out)
    }
}
