//! Exact multivariate polynomials and rational functions over `BigRational`.
//!
//! Geometry symbols (tooth counts, bearing ratios, ...) stay symbolic while the
//! kinematic system is solved; they are only substituted afterwards. Keeping
//! every coefficient an exact rational means ratios such as `30/9` come out
//! exactly, without rounding creeping through the elimination.

use crate::errors::ConfigurationError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Write};
use std::ops::{Add, Mul, Neg, Sub};

/// Symbol name -> exponent. The empty monomial is the constant term.
pub type Monomial = BTreeMap<String, u32>;

const MAX_DIVISION_STEPS: usize = 4096;

fn lex_cmp(a: &Monomial, b: &Monomial) -> Ordering {
    let symbols: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
    for s in symbols {
        let ea = a.get(s).copied().unwrap_or(0);
        let eb = b.get(s).copied().unwrap_or(0);
        if ea != eb {
            return ea.cmp(&eb);
        }
    }
    Ordering::Equal
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(value: BigRational) -> Self {
        let mut p = Self::zero();
        p.add_term(Monomial::new(), value);
        p
    }

    pub fn symbol(name: &str) -> Self {
        let mut monomial = Monomial::new();
        monomial.insert(name.to_string(), 1);
        let mut p = Self::zero();
        p.add_term(monomial, BigRational::one());
        p
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Vacant(slot) => {
                slot.insert(coefficient);
            },
            Entry::Occupied(mut slot) => {
                *slot.get_mut() += coefficient;
                if slot.get().is_zero() {
                    slot.remove();
                }
            },
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// `Some(c)` when the polynomial does not depend on any symbol.
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self.terms.get(&Monomial::new()).cloned(),
            _ => None,
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    pub fn symbols(&self) -> BTreeSet<&str> {
        self.terms
            .keys()
            .flat_map(|m| m.keys().map(String::as_str))
            .collect()
    }

    pub fn scale(&self, factor: &BigRational) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
    }

    /// Leading term under lexicographic order, `A > B > ... > Z > a > ...`.
    fn leading(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().max_by(|x, y| lex_cmp(x.0, y.0))
    }

    /// Replace the symbols present in `values`; the others stay symbolic.
    pub fn substitute(&self, values: &BTreeMap<String, BigRational>) -> Self {
        let mut out = Self::zero();
        for (monomial, coefficient) in &self.terms {
            let mut remaining = Monomial::new();
            let mut c = coefficient.clone();
            for (symbol, exponent) in monomial {
                match values.get(symbol) {
                    Some(v) => c *= num_traits::pow(v.clone(), *exponent as usize),
                    None => {
                        remaining.insert(symbol.clone(), *exponent);
                    },
                }
            }
            out.add_term(remaining, c);
        }
        out
    }

    /// Evaluate completely; fails on the first symbol without a value.
    pub fn evaluate(&self, values: &BTreeMap<String, BigRational>) -> Result<BigRational, ConfigurationError> {
        let mut total = BigRational::zero();
        for (monomial, coefficient) in &self.terms {
            let mut c = coefficient.clone();
            for (symbol, exponent) in monomial {
                let v = values
                    .get(symbol)
                    .ok_or_else(|| ConfigurationError::MissingParameter(symbol.clone()))?;
                c *= num_traits::pow(v.clone(), *exponent as usize);
            }
            total += c;
        }
        Ok(total)
    }

    /// Largest monomial dividing every term.
    fn monomial_content(&self) -> Monomial {
        let mut iter = self.terms.keys();
        let Some(first) = iter.next() else {
            return Monomial::new();
        };
        let mut content = first.clone();
        for m in iter {
            content = content
                .into_iter()
                .filter_map(|(s, e)| m.get(&s).map(|&f| (s, e.min(f))))
                .collect();
        }
        content
    }

    fn divide_monomial(&self, divisor: &Monomial) -> Self {
        let terms = self
            .terms
            .iter()
            .map(|(m, c)| {
                let mut quotient = m.clone();
                for (s, e) in divisor {
                    if let Some(x) = quotient.get_mut(s) {
                        *x -= e;
                        if *x == 0 {
                            quotient.remove(s);
                        }
                    }
                }
                (quotient, c.clone())
            })
            .collect();
        Self { terms }
    }

    /// Exact division, `None` when `divisor` does not divide `self`.
    pub fn exact_div(&self, divisor: &Polynomial) -> Option<Polynomial> {
        let (lead_m, lead_c) = divisor.leading()?;
        let mut remainder = self.clone();
        let mut quotient = Polynomial::zero();
        for _ in 0..MAX_DIVISION_STEPS {
            let Some((m, c)) = remainder.leading() else {
                return Some(quotient);
            };
            let mut q_m = m.clone();
            for (s, e) in lead_m {
                match q_m.get_mut(s) {
                    Some(x) if *x >= *e => {
                        *x -= e;
                        if *x == 0 {
                            q_m.remove(s);
                        }
                    },
                    _ => return None,
                }
            }
            let q_c = c / lead_c;
            let mut step = Polynomial::zero();
            step.add_term(q_m, q_c);
            remainder = &remainder - &(&step * divisor);
            quotient = &quotient + &step;
        }
        remainder.is_zero().then_some(quotient)
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let mut out = self.clone();
        for (m, c) in &rhs.terms {
            out.add_term(m.clone(), c.clone());
        }
        out
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        let mut out = self.clone();
        for (m, c) in &rhs.terms {
            out.add_term(m.clone(), -c.clone());
        }
        out
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut out = Polynomial::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &rhs.terms {
                let mut m = ma.clone();
                for (s, e) in mb {
                    *m.entry(s.clone()).or_insert(0) += e;
                }
                out.add_term(m, ca * cb);
            }
        }
        out
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self.scale(&-BigRational::one())
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        for (i, (monomial, coefficient)) in self.terms.iter().enumerate() {
            let negative = coefficient.is_negative();
            match (i, negative) {
                (0, true) => f.write_char('-')?,
                (0, false) => {},
                (_, true) => f.write_str(" - ")?,
                (_, false) => f.write_str(" + ")?,
            }
            let magnitude = coefficient.abs();
            let mut factors: Vec<String> = Vec::new();
            if !magnitude.numer().is_one() || monomial.is_empty() {
                factors.push(magnitude.numer().to_string());
            }
            for (symbol, exponent) in monomial {
                if *exponent == 1 {
                    factors.push(symbol.clone());
                } else {
                    factors.push(format!("{symbol}**{exponent}"));
                }
            }
            f.write_str(&factors.join("*"))?;
            if !magnitude.denom().is_one() {
                write!(f, "/{}", magnitude.denom())?;
            }
        }
        Ok(())
    }
}

/// `numerator / denominator`, kept in a normal form: shared monomial factors
/// cancelled, integer coefficients without a common factor, positive leading
/// denominator term.
///
/// A shared polynomial factor is cancelled only when one part divides the
/// other exactly. Other common factors, such as `R + S` in
/// `(R + S)*(R - P) / ((R + S)*S)`, are kept: there is no multivariate gcd
/// step, so the printed form may be longer than necessary. Values are
/// unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalFunction {
    numerator: Polynomial,
    denominator: Polynomial,
}

impl RationalFunction {
    /// Build and normalise. The denominator must not be the zero polynomial.
    pub fn new(numerator: Polynomial, denominator: Polynomial) -> Self {
        debug_assert!(!denominator.is_zero(), "zero denominator");
        if numerator.is_zero() {
            return Self::from(Polynomial::zero());
        }
        if let Some(quotient) = numerator.exact_div(&denominator) {
            return Self::from(quotient);
        }
        let (numerator, denominator) = match denominator.exact_div(&numerator) {
            Some(cofactor) => (Polynomial::one(), cofactor),
            None => (numerator, denominator),
        };

        let shared: Monomial = {
            let num = numerator.monomial_content();
            let den = denominator.monomial_content();
            num.into_iter()
                .filter_map(|(s, e)| den.get(&s).map(|&f| (s, e.min(f))))
                .collect()
        };
        let numerator = numerator.divide_monomial(&shared);
        let denominator = denominator.divide_monomial(&shared);

        // one factor for both parts: clears every fraction, then every common integer
        let mut numer_gcd = BigInt::zero();
        let mut denom_lcm = BigInt::one();
        for c in numerator.terms.values().chain(denominator.terms.values()) {
            numer_gcd = numer_gcd.gcd(c.numer());
            denom_lcm = denom_lcm.lcm(c.denom());
        }
        let mut factor = BigRational::new(denom_lcm, numer_gcd);
        if denominator.leading().is_some_and(|(_, c)| c.is_negative()) {
            factor = -factor;
        }
        Self {
            numerator: numerator.scale(&factor),
            denominator: denominator.scale(&factor),
        }
    }

    pub fn numerator(&self) -> &Polynomial {
        &self.numerator
    }

    pub fn denominator(&self) -> &Polynomial {
        &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn symbols(&self) -> BTreeSet<&str> {
        let mut out = self.numerator.symbols();
        out.extend(self.denominator.symbols());
        out
    }

    /// Partial substitution; the result may still be symbolic.
    ///
    /// Returns `None` when the substitution makes the denominator vanish.
    pub fn substitute(&self, values: &BTreeMap<String, BigRational>) -> Option<Self> {
        let denominator = self.denominator.substitute(values);
        if denominator.is_zero() {
            return None;
        }
        Some(Self::new(self.numerator.substitute(values), denominator))
    }

    /// Full evaluation. `Ok(None)` when the denominator evaluates to zero.
    pub fn evaluate(
        &self,
        values: &BTreeMap<String, BigRational>,
    ) -> Result<Option<BigRational>, ConfigurationError> {
        let numerator = self.numerator.evaluate(values)?;
        let denominator = self.denominator.evaluate(values)?;
        if denominator.is_zero() {
            return Ok(None);
        }
        Ok(Some(numerator / denominator))
    }
}

impl From<Polynomial> for RationalFunction {
    fn from(numerator: Polynomial) -> Self {
        Self {
            numerator,
            denominator: Polynomial::one(),
        }
    }
}

impl Display for RationalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wrap = |p: &Polynomial| {
            if p.terms.len() > 1 {
                format!("({p})")
            } else {
                p.to_string()
            }
        };
        match self.denominator.as_constant() {
            Some(c) if c.is_one() => write!(f, "{}", self.numerator),
            _ => write!(f, "{}/{}", wrap(&self.numerator), wrap(&self.denominator)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> BigRational {
        BigRational::from_integer(v.into())
    }

    fn sym(s: &str) -> Polynomial {
        Polynomial::symbol(s)
    }

    #[test]
    fn arithmetic_cancels_terms() {
        let a = sym("A");
        let b = sym("B");
        let sum = &a + &b;
        let diff = &sum - &b;
        assert_eq!(diff, a);
        assert!((&diff - &a).is_zero());
        let square = &sum * &sum;
        assert_eq!(square.terms().count(), 3);
        assert_eq!(square.to_string(), "2*A*B + A**2 + B**2");
    }

    #[test]
    fn evaluate_reports_missing_symbol() {
        let p = &sym("R") + &sym("S");
        let mut values = BTreeMap::new();
        values.insert("R".to_string(), int(21));
        assert_eq!(
            p.evaluate(&values),
            Err(ConfigurationError::MissingParameter("S".to_string()))
        );
        values.insert("S".to_string(), int(9));
        assert_eq!(p.evaluate(&values), Ok(int(30)));
    }

    #[test]
    fn partial_substitution_keeps_other_symbols() {
        let p = &(&sym("R") * &sym("P")) + &sym("S");
        let mut values = BTreeMap::new();
        values.insert("P".to_string(), int(2));
        let q = p.substitute(&values);
        assert_eq!(q, &sym("R").scale(&int(2)) + &sym("S"));
    }

    #[test]
    fn exact_division() {
        let a = &sym("R") + &sym("S");
        let b = &sym("P") - &Polynomial::constant(int(3));
        let product = &a * &b;
        assert_eq!(product.exact_div(&a), Some(b.clone()));
        assert_eq!(product.exact_div(&b), Some(a.clone()));
        assert_eq!(a.exact_div(&b), None);
    }

    #[test]
    fn rational_function_normal_form() {
        // (-2*B*P) / (2*A*P) -> -B/A
        let num = (&sym("B") * &sym("P")).scale(&int(-2));
        let den = (&sym("A") * &sym("P")).scale(&int(2));
        let r = RationalFunction::new(num, den);
        assert_eq!(r.to_string(), "-B/A");

        // (R + S) * P / (S * P) -> (R + S)/S
        let num = &(&sym("R") + &sym("S")) * &sym("P");
        let den = &sym("S") * &sym("P");
        let r = RationalFunction::new(num, den);
        assert_eq!(r.to_string(), "(R + S)/S");

        // negative denominators are flipped
        let r = RationalFunction::new(sym("A"), sym("B").scale(&int(-3)));
        assert_eq!(r.numerator(), &sym("A").scale(&int(-1)));
        assert_eq!(r.denominator(), &sym("B").scale(&int(3)));
    }

    #[test]
    fn divisible_parts_cancel_but_other_common_factors_stay() {
        let sum = &sym("R") + &sym("S");
        // (R + S) / ((R + S) * S) -> 1/S
        let r = RationalFunction::new(sum.clone(), &sum * &sym("S"));
        assert_eq!(r.to_string(), "1/S");

        // 2 / (4 * S) -> 1/(2*S)
        let r = RationalFunction::new(Polynomial::constant(int(2)), sym("S").scale(&int(4)));
        assert_eq!(r.numerator(), &Polynomial::one());
        assert_eq!(r.denominator(), &sym("S").scale(&int(2)));

        // neither part divides the other: the shared R + S is not found
        let diff = &sym("R") - &sym("P");
        let r = RationalFunction::new(&sum * &diff, &sum * &sym("S"));
        assert_eq!(r.denominator(), &(&sum * &sym("S")));
        let values: BTreeMap<String, BigRational> = [("R", 21), ("P", 6), ("S", 9)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), int(v)))
            .collect();
        assert_eq!(r.evaluate(&values), Ok(Some(BigRational::new(15.into(), 9.into()))));
    }

    #[test]
    fn evaluation_detects_vanishing_denominator() {
        let r = RationalFunction::new(sym("A"), &sym("B") - &sym("C"));
        let values: BTreeMap<String, BigRational> =
            [("A", 1), ("B", 2), ("C", 2)].into_iter().map(|(k, v)| (k.to_string(), int(v))).collect();
        assert_eq!(r.evaluate(&values), Ok(None));
        assert!(r.substitute(&values).is_none());
    }
}
