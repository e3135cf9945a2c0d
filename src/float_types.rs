// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

/// A small epsilon for geometric comparisons (radius checks, degenerate edges).
#[cfg(feature = "f32")]
pub const EPSILON: Real = 1e-4;
/// A small epsilon for geometric comparisons (radius checks, degenerate edges).
#[cfg(feature = "f64")]
pub const EPSILON: Real = 1e-9;

/// Default distance below which two consecutive exported points are merged.
///
/// This is only a default: every exporter takes its tolerance explicitly
/// through [`crate::io::xyz::ExportConfig`].
#[cfg(feature = "f32")]
pub const DEFAULT_TOLERANCE: Real = 1e-5;
/// Default distance below which two consecutive exported points are merged.
///
/// This is only a default: every exporter takes its tolerance explicitly
/// through [`crate::io::xyz::ExportConfig`].
#[cfg(feature = "f64")]
pub const DEFAULT_TOLERANCE: Real = 1e-7;

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Tau
/// The full circle constant (τ)
#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
/// The full circle constant (τ)
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;
