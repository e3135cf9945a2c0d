//! Kinematic equations and their exact symbolic solution.
//!
//! A [`Topology`] is a fixed list of linear equations relating the angular
//! positions of the bodies of one mechanism. Lowercase identifiers are degrees
//! of freedom (`s`, `p1`, `rib`); identifiers containing an uppercase letter
//! are geometry parameters (`R`, `P1`, `Dr`).
//!
//! A [`Kinematics`] binding picks an input, an output and any number of fixed
//! (auxiliary) constraints, and solves for every degree of freedom per unit
//! rotation of the output:
//!
//! ```
//! use geartrain::kinematics::{Kinematics, Topology};
//!
//! let planetary = Topology::new(
//!     "planetary",
//!     &["S*s + P*p - (S+P)*c", "R*r - P*p - (R-P)*c"],
//! );
//! let k = Kinematics::new(planetary, "s", "c", &["r"]).unwrap();
//! assert_eq!(k.ratio().unwrap().to_string(), "(R + S)/S");
//! ```

pub mod expr;
pub mod linear;
pub mod polynomial;
mod solver;

use crate::errors::ConfigurationError;
use expr::Expr;
use linear::LinearForm;
use log::debug;
use num_rational::BigRational;
use polynomial::RationalFunction;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

/// `true` when `identifier` names a degree of freedom: it has at least one
/// letter and no uppercase letter.
pub fn is_dof(identifier: &str) -> bool {
    identifier.chars().any(char::is_alphabetic) && !identifier.chars().any(char::is_uppercase)
}

/// Named, ordered set of linear equations describing one mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    name: String,
    equations: Vec<String>,
}

impl Topology {
    pub fn new(name: impl Into<String>, equations: &[&str]) -> Self {
        Self {
            name: name.into(),
            equations: equations.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Build from owned equation strings, for generated equation sets.
    pub fn from_equations(name: impl Into<String>, equations: Vec<String>) -> Self {
        Self {
            name: name.into(),
            equations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn equations(&self) -> &[String] {
        &self.equations
    }

    /// Every identifier used by the equations, sorted.
    pub fn identifiers(&self) -> BTreeSet<String> {
        self.equations
            .iter()
            .flat_map(|e| expr::identifiers(e))
            .collect()
    }

    /// Degrees of freedom, sorted.
    pub fn dofs(&self) -> Vec<String> {
        self.identifiers().into_iter().filter(|i| is_dof(i)).collect()
    }

    /// Geometry parameters, sorted.
    pub fn geometry(&self) -> Vec<String> {
        self.identifiers().into_iter().filter(|i| !is_dof(i)).collect()
    }
}

/// Exact solution of a binding: every dof as a rational function of the
/// geometry symbols, per unit output rotation.
#[derive(Debug, Clone)]
pub struct Solution {
    values: BTreeMap<String, RationalFunction>,
    dofs: Vec<String>,
    raw: solver::CramerSolution,
}

impl Solution {
    pub fn get(&self, dof: &str) -> Option<&RationalFunction> {
        self.values.get(dof)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RationalFunction)> {
        self.values.iter()
    }

    /// Substitute the solution into `form`; zero for every equation the
    /// solution was derived from.
    pub fn residual(&self, form: &LinearForm) -> RationalFunction {
        RationalFunction::new(
            self.raw.residual_numerator(form, &self.dofs),
            self.raw.determinant.clone(),
        )
    }

    /// Substitute a subset of the geometry values; entries stay symbolic in
    /// the remaining parameters.
    pub fn substitute(
        &self,
        values: &BTreeMap<String, BigRational>,
    ) -> Result<BTreeMap<String, RationalFunction>, ConfigurationError> {
        self.values
            .iter()
            .map(|(dof, f)| {
                f.substitute(values)
                    .map(|s| (dof.clone(), s))
                    .ok_or_else(|| ConfigurationError::SingularGeometry(dof.clone()))
            })
            .collect()
    }
}

/// A topology bound to an input, an output and fixed constraints.
#[derive(Debug)]
pub struct Kinematics {
    topology: Topology,
    input: String,
    output: String,
    aux: Vec<String>,
    forms: Vec<LinearForm>,
    solution: OnceLock<Result<Solution, ConfigurationError>>,
}

impl Kinematics {
    /// Bind `topology` to `input`/`output` and fix every expression in `aux`
    /// to zero. A bare identifier pins that body; a combination such as
    /// `"rib-rit"` fuses two bodies.
    ///
    /// Equations are parsed and checked for linearity here; the solve itself
    /// is deferred to [`Kinematics::solve`].
    pub fn new(
        topology: Topology,
        input: &str,
        output: &str,
        aux: &[&str],
    ) -> Result<Self, ConfigurationError> {
        let identifiers = topology.identifiers();
        for selected in [input, output] {
            if !is_dof(selected) || !identifiers.contains(selected) {
                return Err(ConfigurationError::NotADof(selected.to_string()));
            }
        }

        let mut forms = Vec::with_capacity(topology.equations.len() + aux.len() + 1);
        for equation in &topology.equations {
            forms.push(Self::expand(equation)?);
        }

        let boundary = format!("{output} - 1");
        forms.push(Self::expand(&boundary)?);
        for constraint in aux {
            let parsed = Expr::parse(constraint)?;
            let mut used = BTreeSet::new();
            parsed.collect_identifiers(&mut used);
            if let Some(unknown) = used.iter().find(|u| !identifiers.contains(*u)) {
                return Err(ConfigurationError::UnknownIdentifier(unknown.clone()));
            }
            forms.push(LinearForm::from_expr(&parsed, &is_dof, constraint)?);
        }

        Ok(Self {
            topology,
            input: input.to_string(),
            output: output.to_string(),
            aux: aux.iter().map(|a| a.to_string()).collect(),
            forms,
            solution: OnceLock::new(),
        })
    }

    fn expand(equation: &str) -> Result<LinearForm, ConfigurationError> {
        LinearForm::from_expr(&Expr::parse(equation)?, &is_dof, equation)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn aux(&self) -> &[String] {
        &self.aux
    }

    /// Topology equations followed by the boundary conditions, as linear forms.
    pub fn forms(&self) -> &[LinearForm] {
        &self.forms
    }

    /// Solve once; later calls return the cached result.
    pub fn solve(&self) -> Result<&Solution, ConfigurationError> {
        self.solution
            .get_or_init(|| self.compute())
            .as_ref()
            .map_err(|err| err.clone())
    }

    fn compute(&self) -> Result<Solution, ConfigurationError> {
        let dofs = self.topology.dofs();
        debug!(
            "solving {} for {:?} with {} equations",
            self.topology.name,
            dofs,
            self.forms.len()
        );
        match solver::solve(&self.forms, &dofs) {
            solver::Solve::Unique(raw) => {
                let values = dofs
                    .iter()
                    .zip(&raw.numerators)
                    .map(|(dof, n)| {
                        (
                            dof.clone(),
                            RationalFunction::new(n.clone(), raw.determinant.clone()),
                        )
                    })
                    .collect();
                let solution = Solution { values, dofs, raw };
                debug!("{}: {}", self.topology.name, self.describe(&solution));
                Ok(solution)
            },
            solver::Solve::Underdetermined => Err(ConfigurationError::NoUniqueSolution {
                topology: self.topology.name.clone(),
                input: self.input.clone(),
                output: self.output.clone(),
                aux: self.aux.clone(),
            }),
            solver::Solve::Inconsistent(index) => Err(ConfigurationError::Inconsistent {
                topology: self.topology.name.clone(),
                equation: self.equation_source(index),
            }),
        }
    }

    fn equation_source(&self, index: usize) -> String {
        let n = self.topology.equations.len();
        match index {
            i if i < n => self.topology.equations[i].clone(),
            i if i == n => format!("{} - 1", self.output),
            i => self.aux[i - n - 1].clone(),
        }
    }

    fn describe(&self, solution: &Solution) -> String {
        match solution.get(&self.input) {
            Some(ratio) => format!("{}/{}: {}", self.input, self.output, ratio),
            None => format!("{}/{}: ?", self.input, self.output),
        }
    }

    /// Rotation of the input per unit rotation of the output.
    pub fn ratio(&self) -> Result<&RationalFunction, ConfigurationError> {
        let solution = self.solve()?;
        solution
            .get(&self.input)
            .ok_or_else(|| ConfigurationError::NotADof(self.input.clone()))
    }

    /// Substitute the solution into an arbitrary equation over this topology.
    pub fn residual(&self, equation: &str) -> Result<RationalFunction, ConfigurationError> {
        let form = Self::expand(equation)?;
        Ok(self.solve()?.residual(&form))
    }
}

impl fmt::Display for Kinematics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.solve() {
            Ok(solution) => f.write_str(&self.describe(solution)),
            Err(err) => write!(f, "{}/{}: {}", self.input, self.output, err),
        }
    }
}
