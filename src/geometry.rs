//! Numeric evaluation of a solved kinematic binding for one concrete geometry.

use crate::errors::ConfigurationError;
use crate::float_types::Real;
use crate::kinematics::Kinematics;
use crate::kinematics::polynomial::RationalFunction;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A kinematic binding together with values for every geometry parameter.
///
/// The key set of `values` must match the topology's geometry identifiers
/// exactly. Exact and float ratios are evaluated once, at construction.
#[derive(Debug)]
pub struct GearGeometry {
    kinematics: Arc<Kinematics>,
    values: BTreeMap<String, Real>,
    exact: BTreeMap<String, BigRational>,
    ratios: BTreeMap<String, BigRational>,
    ratios_f: BTreeMap<String, Real>,
}

impl GearGeometry {
    /// Validate the parameter names and values, then solve and evaluate once
    /// so that every configuration error surfaces here.
    pub fn new<K, I>(kinematics: Arc<Kinematics>, values: I) -> Result<Self, ConfigurationError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Real)>,
    {
        let values: BTreeMap<String, Real> =
            values.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let expected = kinematics.topology().geometry();
        if let Some(missing) = expected.iter().find(|name| !values.contains_key(*name)) {
            return Err(ConfigurationError::MissingParameter(missing.clone()));
        }
        if let Some(extra) = values.keys().find(|name| !expected.contains(name)) {
            return Err(ConfigurationError::UnexpectedParameter(extra.clone()));
        }

        let mut exact = BTreeMap::new();
        for (name, value) in &values {
            let converted = BigRational::from_float(*value)
                .ok_or_else(|| ConfigurationError::invalid(name.as_str(), "value must be finite"))?;
            exact.insert(name.clone(), converted);
        }

        let ratios = evaluate(&kinematics, &exact)?;
        let ratios_f = ratios
            .iter()
            .map(|(dof, v)| {
                v.to_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| (dof.clone(), f as Real))
                    .ok_or_else(|| ConfigurationError::SingularGeometry(dof.clone()))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            kinematics,
            values,
            exact,
            ratios,
            ratios_f,
        })
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// The geometry values this instance was created with.
    pub fn values(&self) -> &BTreeMap<String, Real> {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<Real> {
        self.values.get(name).copied()
    }

    /// Exact rotation of every dof per unit output rotation.
    pub fn ratios(&self) -> Result<&BTreeMap<String, BigRational>, ConfigurationError> {
        Ok(&self.ratios)
    }

    /// Float rendition of [`GearGeometry::ratios`].
    pub fn ratios_f(&self) -> Result<&BTreeMap<String, Real>, ConfigurationError> {
        Ok(&self.ratios_f)
    }

    /// Exact input ratio.
    pub fn ratio(&self) -> Result<BigRational, ConfigurationError> {
        self.ratios
            .get(self.kinematics.input())
            .cloned()
            .ok_or_else(|| ConfigurationError::NotADof(self.kinematics.input().to_string()))
    }

    pub fn ratio_f(&self) -> Result<Real, ConfigurationError> {
        self.ratio_of(self.kinematics.input())
    }

    /// Float ratio of one dof; names that are not dofs are an error.
    pub fn ratio_of(&self, dof: &str) -> Result<Real, ConfigurationError> {
        self.ratios_f
            .get(dof)
            .copied()
            .ok_or_else(|| ConfigurationError::NotADof(dof.to_string()))
    }

    /// Angle of every dof when the output has advanced by `phase`.
    pub fn phases(&self, phase: Real) -> BTreeMap<String, Real> {
        self.ratios_f
            .iter()
            .map(|(dof, r)| (dof.clone(), r * phase))
            .collect()
    }

    /// Default per-frame phase increment for animations: the geometric mean of
    /// `|1/r|` over the non-zero ratios, over 50.
    pub fn animation_step(&self) -> Real {
        let inverse: Vec<Real> = self
            .ratios_f
            .values()
            .filter(|r| **r != 0.0)
            .map(|r| (1.0 / r).abs())
            .collect();
        if inverse.is_empty() {
            return 1.0 / 50.0;
        }
        let log_mean = inverse.iter().map(|r| r.ln()).sum::<Real>() / inverse.len() as Real;
        log_mean.exp() / 50.0
    }

    /// Substitute only the given values, leaving the others symbolic.
    pub fn partial<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<BTreeMap<String, RationalFunction>, ConfigurationError> {
        let mut subset = BTreeMap::new();
        for name in names {
            let value = self
                .exact
                .get(name)
                .ok_or_else(|| ConfigurationError::UnexpectedParameter(name.to_string()))?;
            subset.insert(name.to_string(), value.clone());
        }
        self.kinematics.solve()?.substitute(&subset)
    }
}

fn evaluate(
    kinematics: &Kinematics,
    exact: &BTreeMap<String, BigRational>,
) -> Result<BTreeMap<String, BigRational>, ConfigurationError> {
    let solution = kinematics.solve()?;
    solution
        .iter()
        .map(|(dof, f)| {
            f.evaluate(exact)?
                .map(|v| (dof.clone(), v))
                .ok_or_else(|| ConfigurationError::SingularGeometry(dof.clone()))
        })
        .collect()
}

impl fmt::Display for GearGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ratio = self
            .ratio()
            .map(|r| r.to_string())
            .unwrap_or_else(|_| "?".to_string());
        let values: Vec<String> = self.values.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(
            f,
            "{}/{}: {} + {{{}}}",
            self.kinematics.input(),
            self.kinematics.output(),
            ratio,
            values.join(",")
        )
    }
}
