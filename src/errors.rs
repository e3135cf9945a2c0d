//! Configuration errors

/// Everything that can make a gear train description unusable.
///
/// All variants are fatal and surface at construction time; each carries the
/// offending equation, identifier or parameter name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// (Parse) An equation string is not a valid expression
    #[error("(Parse) cannot parse `{equation}`: {message}")]
    Parse { equation: String, message: String },
    /// (Nonlinear) Two degree-of-freedom factors were multiplied together
    #[error("(Nonlinear) `{equation}` is not linear in its degrees of freedom")]
    Nonlinear { equation: String },
    /// (UnsupportedDivision) Division by anything but a non-zero number
    #[error("(UnsupportedDivision) `{equation}` divides by a non-constant or zero expression")]
    UnsupportedDivision { equation: String },
    /// (UnknownIdentifier) A boundary condition references a foreign identifier
    #[error("(UnknownIdentifier) `{0}` does not appear in the topology equations")]
    UnknownIdentifier(String),
    /// (NotADof) Input or output is not a degree of freedom of the topology
    #[error("(NotADof) `{0}` is not a degree of freedom of the topology")]
    NotADof(String),
    /// (NoUniqueSolution) The equations plus boundary conditions do not pin every dof
    #[error("(NoUniqueSolution) {topology} with input `{input}`, output `{output}` and fixed {aux:?} has no unique solution")]
    NoUniqueSolution {
        topology: String,
        input: String,
        output: String,
        aux: Vec<String>,
    },
    /// (Inconsistent) Redundant equations contradict each other
    #[error("(Inconsistent) equation `{equation}` contradicts the rest of {topology}")]
    Inconsistent { topology: String, equation: String },
    /// (MissingParameter) A geometry parameter required by the equations was not supplied
    #[error("(MissingParameter) geometry parameter `{0}` is required")]
    MissingParameter(String),
    /// (UnexpectedParameter) A supplied geometry parameter is not used by the equations
    #[error("(UnexpectedParameter) geometry parameter `{0}` is not used by the topology")]
    UnexpectedParameter(String),
    /// (InvalidParameter) A parameter value is out of range
    #[error("(InvalidParameter) `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
    /// (SingularGeometry) The ratio denominator vanishes for the supplied values
    #[error("(SingularGeometry) the ratio of `{0}` is undefined for this geometry")]
    SingularGeometry(String),
    /// (DegenerateProfile) A generated profile collapses below numerical tolerance
    #[error("(DegenerateProfile) profile `{body}` is degenerate: {reason}")]
    DegenerateProfile { body: String, reason: String },
}

impl ConfigurationError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
