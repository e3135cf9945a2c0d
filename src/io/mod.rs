//! Getting gear trains out of the crate: point lists for CAD, plus SVG and
//! DXF drawings of an arrangement behind their cargo features.

pub mod xyz;

#[cfg(feature = "svg-io")]
mod svg;

#[cfg(feature = "dxf-io")]
mod dxf;

use crate::errors::ConfigurationError;

/// Export and rendering errors.
///
/// The DXF variant only exists when the `dxf-io` feature is enabled.
#[derive(Debug)]
pub enum ExportError {
    StdIo(std::io::Error),
    Configuration(ConfigurationError),

    /// The reference profile has no extent to scale from.
    ZeroRadius(String),
    MalformedPath(String),

    #[cfg(feature = "dxf-io")]
    /// Error bubbled up from the `dxf` crate while writing.
    Dxf(::dxf::DxfError),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ExportError::*;

        match self {
            StdIo(error) => write!(f, "std::io::Error: {error}"),
            Configuration(error) => write!(f, "{error}"),

            ZeroRadius(what) => write!(f, "cannot scale {what}: largest radius is zero"),
            MalformedPath(msg) => write!(f, "The path is malformed: {msg}"),

            #[cfg(feature = "dxf-io")]
            Dxf(error) => write!(f, "DXF error: {error}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::StdIo(value)
    }
}

impl From<ConfigurationError> for ExportError {
    fn from(value: ConfigurationError) -> Self {
        Self::Configuration(value)
    }
}

#[cfg(feature = "dxf-io")]
impl From<::dxf::DxfError> for ExportError {
    fn from(value: ::dxf::DxfError) -> Self {
        Self::Dxf(value)
    }
}
