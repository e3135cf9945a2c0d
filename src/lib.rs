//! Exact **gear-train kinematics** and **meshing tooth-profile arrangement** for
//! planetary, cycloidal and compound gear trains.
//!
//! A mechanism is described by a handful of linear equations over the angles
//! of its bodies (lowercase identifiers) and its geometry (uppercase
//! identifiers). [`kinematics::Kinematics`] solves them symbolically, with
//! exact rational arithmetic, for any choice of input, output and fixed
//! bodies; [`geometry::GearGeometry`] evaluates that solution for concrete
//! tooth counts; and the facades in [`trains`] place the generated tooth
//! profiles into a consistent, meshing [`trains::Arrangement`] at any phase.
//!
//! ```
//! use geartrain::trains::GearTrain;
//! use geartrain::trains::planetary::{Planetary, PlanetaryParams, ToothCounts};
//!
//! let kinematics = Planetary::kinematics("s", "c", &["r"]).unwrap();
//! let gear = Planetary::new(kinematics, PlanetaryParams::new(ToothCounts::new(21, 6, 9), 3)).unwrap();
//! assert!((gear.ratio_f().unwrap() - 30.0 / 9.0).abs() < 1e-12);
//! assert_eq!(gear.arrange(0.25).unwrap().len(), 5);
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - **svg-io**: render arrangements as SVG
//! - [**dxf-io**](https://en.wikipedia.org/wiki/AutoCAD_DXF): `.dxf` export of arrangements
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64

#![forbid(unsafe_code)]
#![warn(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod geometry;
pub mod io;
pub mod kinematics;
pub mod profile;
pub mod trains;
pub mod transform;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::ConfigurationError;
pub use geometry::GearGeometry;
pub use kinematics::{Kinematics, Topology};
pub use profile::Profile;
pub use trains::{Arrangement, GearTrain};
