//! Expansion of parsed equations into forms linear in the degrees of freedom.

use super::expr::Expr;
use super::polynomial::Polynomial;
use crate::errors::ConfigurationError;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::collections::BTreeMap;

/// `Σ coefficient(dof)·dof + constant`, with coefficients and constant being
/// polynomials in the geometry symbols.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinearForm {
    pub coefficients: BTreeMap<String, Polynomial>,
    pub constant: Polynomial,
}

impl LinearForm {
    /// Expand `expr`, treating identifiers for which `is_dof` holds as unknowns.
    ///
    /// `source` is only used to name the equation in errors.
    pub fn from_expr(
        expr: &Expr,
        is_dof: &dyn Fn(&str) -> bool,
        source: &str,
    ) -> Result<Self, ConfigurationError> {
        Ok(match expr {
            Expr::Number(value) => Self::constant(Polynomial::constant(value.clone())),
            Expr::Ident(name) if is_dof(name) => {
                let mut form = Self::default();
                form.coefficients.insert(name.clone(), Polynomial::one());
                form
            },
            Expr::Ident(name) => Self::constant(Polynomial::symbol(name)),
            Expr::Neg(inner) => Self::from_expr(inner, is_dof, source)?.negated(),
            Expr::Add(a, b) => {
                let a = Self::from_expr(a, is_dof, source)?;
                let b = Self::from_expr(b, is_dof, source)?;
                a.add(&b)
            },
            Expr::Sub(a, b) => {
                let a = Self::from_expr(a, is_dof, source)?;
                let b = Self::from_expr(b, is_dof, source)?;
                a.sub(&b)
            },
            Expr::Mul(a, b) => {
                let a = Self::from_expr(a, is_dof, source)?;
                let b = Self::from_expr(b, is_dof, source)?;
                match (a.is_constant(), b.is_constant()) {
                    (true, _) => b.scale(&a.constant),
                    (_, true) => a.scale(&b.constant),
                    _ => {
                        return Err(ConfigurationError::Nonlinear {
                            equation: source.to_string(),
                        });
                    },
                }
            },
            Expr::Div(a, b) => {
                let a = Self::from_expr(a, is_dof, source)?;
                let b = Self::from_expr(b, is_dof, source)?;
                let divisor = b
                    .is_constant()
                    .then(|| b.constant.as_constant())
                    .flatten()
                    .filter(|d| !d.is_zero())
                    .ok_or_else(|| ConfigurationError::UnsupportedDivision {
                        equation: source.to_string(),
                    })?;
                a.scale(&Polynomial::constant(divisor.recip()))
            },
        })
    }

    pub fn constant(constant: Polynomial) -> Self {
        Self {
            coefficients: BTreeMap::new(),
            constant,
        }
    }

    /// Free of any degree of freedom.
    pub fn is_constant(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Coefficient of `dof`, zero when absent.
    pub fn coefficient(&self, dof: &str) -> Polynomial {
        self.coefficients.get(dof).cloned().unwrap_or_default()
    }

    pub fn scale(&self, factor: &Polynomial) -> Self {
        let mut out = Self::constant(&self.constant * factor);
        for (dof, c) in &self.coefficients {
            out.insert(dof, c * factor);
        }
        out
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.constant = &out.constant + &other.constant;
        for (dof, c) in &other.coefficients {
            let sum = &out.coefficient(dof) + c;
            out.insert(dof, sum);
        }
        out
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negated())
    }

    pub fn negated(&self) -> Self {
        self.scale(&Polynomial::constant(-BigRational::one()))
    }

    fn insert(&mut self, dof: &str, coefficient: Polynomial) {
        if coefficient.is_zero() {
            self.coefficients.remove(dof);
        } else {
            self.coefficients.insert(dof.to_string(), coefficient);
        }
    }
}
