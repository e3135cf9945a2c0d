//! Exact Cramer elimination over polynomial matrices.
//!
//! The systems are tiny (a handful of unknowns), so the determinant is a
//! Laplace expansion along the rows, memoised on the set of columns still in
//! play. That keeps every intermediate an exact polynomial in the geometry
//! symbols.

use super::linear::LinearForm;
use super::polynomial::Polynomial;
use std::collections::HashMap;

/// Square matrix of polynomial entries, row major.
pub(crate) struct Matrix {
    rows: Vec<Vec<Polynomial>>,
}

impl Matrix {
    pub(crate) fn new(rows: Vec<Vec<Polynomial>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == rows.len()));
        Self { rows }
    }

    fn size(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn determinant(&self) -> Polynomial {
        let n = self.size();
        if n == 0 {
            return Polynomial::one();
        }
        let mut memo = HashMap::new();
        self.minor(0, (1u64 << n) - 1, &mut memo)
    }

    /// Determinant of rows `row..` restricted to the columns set in `columns`.
    fn minor(&self, row: usize, columns: u64, memo: &mut HashMap<u64, Polynomial>) -> Polynomial {
        if columns == 0 {
            return Polynomial::one();
        }
        if let Some(hit) = memo.get(&columns) {
            return hit.clone();
        }
        let mut total = Polynomial::zero();
        let mut sign_positive = true;
        for col in 0..self.size() {
            if columns & (1 << col) == 0 {
                continue;
            }
            let entry = &self.rows[row][col];
            if !entry.is_zero() {
                let sub = self.minor(row + 1, columns & !(1 << col), memo);
                let term = entry * &sub;
                total = if sign_positive {
                    &total + &term
                } else {
                    &total - &term
                };
            }
            sign_positive = !sign_positive;
        }
        memo.insert(columns, total.clone());
        total
    }

    fn with_column(&self, col: usize, values: &[Polynomial]) -> Self {
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, v)| {
                let mut row = row.clone();
                row[col] = v.clone();
                row
            })
            .collect();
        Self { rows }
    }
}

/// Raw Cramer solution: `dofs[i] = numerators[i] / determinant`.
#[derive(Debug, Clone)]
pub(crate) struct CramerSolution {
    pub determinant: Polynomial,
    pub numerators: Vec<Polynomial>,
}

impl CramerSolution {
    /// `Σ coefficient·numerator + constant·determinant`, the numerator of the
    /// residual of `form` over the shared determinant.
    pub(crate) fn residual_numerator(&self, form: &LinearForm, dofs: &[String]) -> Polynomial {
        let mut total = &form.constant * &self.determinant;
        for (dof, numerator) in dofs.iter().zip(&self.numerators) {
            if let Some(c) = form.coefficients.get(dof) {
                total = &total + &(c * numerator);
            }
        }
        total
    }
}

/// Outcome of an exact solve.
#[derive(Debug)]
pub(crate) enum Solve {
    Unique(CramerSolution),
    /// Fewer independent equations than unknowns.
    Underdetermined,
    /// A redundant equation (by index) does not vanish under the solution.
    Inconsistent(usize),
}

/// Solve `forms = 0` for `dofs`.
pub(crate) fn solve(forms: &[LinearForm], dofs: &[String]) -> Solve {
    let n = dofs.len();
    if forms.len() < n {
        return Solve::Underdetermined;
    }
    let coefficient_rows: Vec<Vec<Polynomial>> = forms
        .iter()
        .map(|f| dofs.iter().map(|d| f.coefficient(d)).collect())
        .collect();

    let Some(selected) = combinations(forms.len(), n).find(|rows| {
        !Matrix::new(rows.iter().map(|&r| coefficient_rows[r].clone()).collect())
            .determinant()
            .is_zero()
    }) else {
        return Solve::Underdetermined;
    };

    let matrix = Matrix::new(
        selected
            .iter()
            .map(|&r| coefficient_rows[r].clone())
            .collect(),
    );
    let rhs: Vec<Polynomial> = selected.iter().map(|&r| -&forms[r].constant).collect();
    let solution = CramerSolution {
        determinant: matrix.determinant(),
        numerators: (0..n)
            .map(|col| matrix.with_column(col, &rhs).determinant())
            .collect(),
    };

    for (index, form) in forms.iter().enumerate() {
        if selected.contains(&index) {
            continue;
        }
        if !solution.residual_numerator(form, dofs).is_zero() {
            return Solve::Inconsistent(index);
        }
    }
    Solve::Unique(solution)
}

/// Lexicographic `k`-subsets of `0..n`.
fn combinations(n: usize, k: usize) -> impl Iterator<Item = Vec<usize>> {
    let mut current: Option<Vec<usize>> = (k <= n).then(|| (0..k).collect());
    std::iter::from_fn(move || {
        let out = current.clone()?;
        // advance to the next subset
        let mut next = out.clone();
        let mut i = k;
        loop {
            if i == 0 {
                current = None;
                break;
            }
            i -= 1;
            if next[i] < n - k + i {
                next[i] += 1;
                for j in i + 1..k {
                    next[j] = next[j - 1] + 1;
                }
                current = Some(next);
                break;
            }
        }
        Some(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;

    fn c(v: i64) -> Polynomial {
        Polynomial::constant(BigRational::from_integer(v.into()))
    }

    #[test]
    fn determinant_of_numeric_matrix() {
        let m = Matrix::new(vec![
            vec![c(2), c(0), c(1)],
            vec![c(1), c(3), c(2)],
            vec![c(1), c(1), c(1)],
        ]);
        // 2*(3-2) - 0 + 1*(1-3) = 0
        assert!(m.determinant().is_zero());

        let m = Matrix::new(vec![vec![c(4), c(7)], vec![c(2), c(6)]]);
        assert_eq!(m.determinant(), c(10));
    }

    #[test]
    fn symbolic_determinant() {
        let a = Polynomial::symbol("A");
        let b = Polynomial::symbol("B");
        let m = Matrix::new(vec![vec![a.clone(), b.clone()], vec![c(0), c(1)]]);
        assert_eq!(m.determinant(), a);
    }

    #[test]
    fn subsets_in_order() {
        let all: Vec<_> = combinations(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(combinations(2, 3).count(), 0);
        assert_eq!(combinations(3, 0).count(), 1);
    }
}
