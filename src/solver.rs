// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

//! PLU decomposition and mixed-precision iterative refinement for `A·x = b`.
//!
//! The system matrix is held at the `upper` precision. Iterative refinement factors it at the
//! `lower` precision, accumulates the solution at the `working` precision and computes residuals
//! at the `upper` precision, moving values between precisions only through casts.

use crate::error::{Error, Result};
use crate::float::FloatValue;
use crate::linalg;
use crate::precision::Precision;
use rand::Rng;
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::debug;

/// Parameters of a [`LinearSystem`].
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// bounds of the uniform distribution random matrices and vectors are drawn from
    pub random_range: (f64, f64),
    /// fraction of zero entries in random matrices
    pub sparsity_rate: f64,
    /// maximum number of refinement iterations
    pub max_iter: usize,
    /// precision of the system matrix and of residuals
    pub upper: Precision,
    /// precision the solution is accumulated in
    pub working: Precision,
    /// precision of the PLU factors
    pub lower: Precision,
    /// stop refining once the mean absolute residual is at most this
    pub expected_error: Option<f64>,
    /// stop refining once `A·x` agrees with `b` in at least this many bits on average
    pub expected_precision: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            random_range: (-10.0, 10.0),
            sparsity_rate: 0.0,
            max_iter: 10,
            upper: Precision::STANDARD_64,
            working: Precision::STANDARD_64,
            lower: Precision::STANDARD_64,
            expected_error: None,
            expected_precision: None,
        }
    }
}

/// Selects one of the matrices held by a [`LinearSystem`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Matrix {
    /// the system matrix
    A,
    /// the unit lower triangular factor
    L,
    /// the upper triangular factor
    U,
    /// the row permutation, as a 0/1 matrix
    P,
}

/// Measurements of the last call to [`LinearSystem::solve_iterative`].
///
/// The per-iteration error figures are only recorded when an expected result is set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evaluation {
    pub elapsed: Duration,
    pub iterations_needed: usize,
    /// mean relative error of the solution after each iteration
    pub relative_errors: Vec<f64>,
    pub relative_error_sum: f64,
    /// working mantissa width minus the mean bits of agreement with the expected result
    pub precision_errors: Vec<f64>,
    pub precision_error_sum: f64,
    pub absolute_error_sum: f64,
}

impl Evaluation {
    fn record(
        &mut self,
        x: &[FloatValue],
        x_upper: &[FloatValue],
        expected: &[FloatValue],
        working_mantissa_bits: usize,
    ) -> Result<()> {
        let len = x.len() as f64;
        let expected_f64 = linalg::to_f64_vec(expected);

        let relative_error = x
            .iter()
            .zip(&expected_f64)
            .map(|(x, &expected)| x.relative_error_f64(expected))
            .sum::<f64>()
            / len;
        self.relative_errors.push(relative_error);
        self.relative_error_sum += relative_error;

        let cap = working_mantissa_bits as f64;
        let mut agreement = 0.0;
        for (x, expected) in x_upper.iter().zip(expected) {
            agreement += (x.bits_of_agreement(expected)? as f64).min(cap);
        }
        let precision_error = cap - agreement / len;
        self.precision_errors.push(precision_error);
        self.precision_error_sum += precision_error;

        let absolute_error = x
            .iter()
            .zip(&expected_f64)
            .map(|(x, &expected)| x.absolute_error_f64(expected))
            .sum::<f64>()
            / len;
        self.absolute_error_sum += absolute_error;
        Ok(())
    }
}

fn check_nonempty(operation: &'static str, len: usize) -> Result<()> {
    if len == 0 {
        Err(Error::EmptyInput { operation })
    } else {
        Ok(())
    }
}

fn check_dimension(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { expected, found })
    }
}

fn identity(n: usize, precision: Precision) -> Vec<Vec<FloatValue>> {
    let one = FloatValue::from_f64_with_precision(1.0, precision, None);
    (0..n)
        .map(|row| {
            (0..n)
                .map(|column| {
                    if row == column {
                        one.clone()
                    } else {
                        FloatValue::positive_zero(precision)
                    }
                })
                .collect()
        })
        .collect()
}

fn swap_rows<T: Default>(matrix: &mut [Vec<T>], a: usize, b: usize, columns: Range<usize>) {
    for column in columns {
        let tmp = std::mem::take(&mut matrix[a][column]);
        matrix[a][column] = std::mem::replace(&mut matrix[b][column], tmp);
    }
}

/// the row in `column` at or below the diagonal with the strictly largest magnitude, first wins
fn pivot_row(u: &[Vec<FloatValue>], column: usize) -> Result<usize> {
    let mut pivot = column;
    let mut largest = u[column][column].abs();
    for (row, values) in u.iter().enumerate().skip(column + 1) {
        let candidate = values[column].abs();
        if candidate.greater_than(&largest)? {
            pivot = row;
            largest = candidate;
        }
    }
    Ok(pivot)
}

/// native results in the subnormal range are flushed to zero, matching `FloatValue`
fn flush_subnormal(value: f64) -> f64 {
    if value.abs() < f64::MIN_POSITIVE {
        0.0
    } else {
        value
    }
}

/// A square linear system `A·x = b` with its PLU factors.
#[derive(Clone, Debug)]
pub struct LinearSystem {
    n: usize,
    config: SolverConfig,
    a: Vec<Vec<FloatValue>>,
    l: Vec<Vec<FloatValue>>,
    u: Vec<Vec<FloatValue>>,
    p: Vec<usize>,
    expected_result: Option<Vec<FloatValue>>,
    evaluation: Evaluation,
}

impl LinearSystem {
    /// an `n` by `n` system whose matrix starts out as the identity
    pub fn new(n: usize, config: SolverConfig) -> Result<Self> {
        check_nonempty("LinearSystem::new", n)?;
        Ok(Self {
            n,
            a: identity(n, config.upper),
            config,
            l: Vec::new(),
            u: Vec::new(),
            p: Vec::new(),
            expected_result: None,
            evaluation: Evaluation::default(),
        })
    }
    pub fn dimension(&self) -> usize {
        self.n
    }
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
    /// replace the configuration; the system matrix and the expected result are cast to the
    /// new upper precision
    pub fn set_config(&mut self, config: SolverConfig) {
        if config.upper != self.config.upper {
            linalg::cast_matrix(&mut self.a, config.upper);
            if let Some(expected_result) = &mut self.expected_result {
                linalg::cast_vector(expected_result, config.upper);
            }
        }
        self.config = config;
    }
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }
    pub fn system_matrix(&self) -> &[Vec<FloatValue>] {
        &self.a
    }
    pub fn l_factor(&self) -> &[Vec<FloatValue>] {
        &self.l
    }
    pub fn u_factor(&self) -> &[Vec<FloatValue>] {
        &self.u
    }
    /// row `i` of `P·A` is row `permutation()[i]` of `A`
    pub fn permutation(&self) -> &[usize] {
        &self.p
    }
    pub fn expected_result(&self) -> Option<&[FloatValue]> {
        self.expected_result.as_deref()
    }

    fn matrix_from_row_major(&self, values: &[f64]) -> Result<Vec<Vec<FloatValue>>> {
        check_dimension(self.n * self.n, values.len())?;
        Ok(values
            .chunks(self.n)
            .map(|row| linalg::from_f64_slice(self.config.upper, row))
            .collect())
    }
    pub fn set_identity(&mut self) {
        self.a = identity(self.n, self.config.upper);
    }
    /// set the system matrix from `n * n` row-major values
    pub fn set_matrix(&mut self, values: &[f64]) -> Result<()> {
        self.a = self.matrix_from_row_major(values)?;
        Ok(())
    }
    pub fn set_random_matrix<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.a = linalg::random_matrix(
            rng,
            self.n,
            self.config.upper,
            self.config.random_range,
            self.config.sparsity_rate,
        );
    }
    /// overwrite the lower factor; normally it comes from `decompose_plu`
    pub fn set_l(&mut self, values: &[f64]) -> Result<()> {
        self.l = self.matrix_from_row_major(values)?;
        Ok(())
    }
    /// overwrite the upper factor; normally it comes from `decompose_plu`
    pub fn set_u(&mut self, values: &[f64]) -> Result<()> {
        self.u = self.matrix_from_row_major(values)?;
        Ok(())
    }
    pub fn element(&self, row: usize, column: usize) -> Result<&FloatValue> {
        if row >= self.n {
            return Err(Error::IndexOutOfRange {
                index: row,
                len: self.n,
            });
        }
        if column >= self.n {
            return Err(Error::IndexOutOfRange {
                index: column,
                len: self.n,
            });
        }
        Ok(&self.a[row][column])
    }
    /// the element at `index` in row-major order
    pub fn element_at(&self, index: usize) -> Result<&FloatValue> {
        if index >= self.n * self.n {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.n * self.n,
            });
        }
        Ok(&self.a[index / self.n][index % self.n])
    }
    /// all elements in row-major order, joined with `", "`
    pub fn matrix_to_string(&self, matrix: Matrix, fraction_digits: Option<u32>) -> Result<String> {
        let rows = match matrix {
            Matrix::A => &self.a,
            Matrix::L => &self.l,
            Matrix::U => &self.u,
            Matrix::P => {
                check_nonempty("matrix_to_string", self.p.len())?;
                let digits = fraction_digits.unwrap_or(crate::format::DEFAULT_FRACTION_DIGITS) as usize;
                let zero = format!("{:.*}", digits, 0.0);
                let one = format!("{:.*}", digits, 1.0);
                let (zero, one) = (zero.as_str(), one.as_str());
                let n = self.n;
                let elements: Vec<&str> = self
                    .p
                    .iter()
                    .flat_map(|&index| {
                        (0..n).map(move |column| if column == index { one } else { zero })
                    })
                    .collect();
                return Ok(elements.join(", "));
            }
        };
        check_nonempty("matrix_to_string", rows.len())?;
        let elements: Vec<String> = rows
            .iter()
            .flatten()
            .map(|value| value.to_string(fraction_digits))
            .collect();
        Ok(elements.join(", "))
    }

    /// the exact solution the per-iteration evaluation measures against
    pub fn set_expected_result(&mut self, mut expected_result: Vec<FloatValue>) -> Result<()> {
        check_dimension(self.n, expected_result.len())?;
        linalg::cast_vector(&mut expected_result, self.config.upper);
        self.expected_result = Some(expected_result);
        Ok(())
    }
    /// draw a random `x`, make it the expected result and return `A·x`
    pub fn generate_random_rhs<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<FloatValue>> {
        let x = linalg::random_vector(rng, self.n, self.config.upper, self.config.random_range);
        let b = self.multiply_with_system_matrix(&x)?;
        self.set_expected_result(x)?;
        Ok(b)
    }
    /// randomize the system matrix, then call `generate_random_rhs`
    pub fn generate_random_linear_system<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<FloatValue>> {
        self.set_random_matrix(rng);
        self.generate_random_rhs(rng)
    }
    pub fn multiply_with_system_matrix(&self, x: &[FloatValue]) -> Result<Vec<FloatValue>> {
        check_nonempty("multiply_with_system_matrix", x.len())?;
        check_dimension(self.n, x.len())?;
        linalg::mat_vec(&self.a, x)
    }
    /// mean of `bits_of_agreement` over corresponding elements
    pub fn mean_precision(&self, is: &[FloatValue], should: &[FloatValue]) -> Result<f64> {
        check_nonempty("mean_precision", is.len())?;
        check_nonempty("mean_precision", should.len())?;
        check_dimension(is.len(), should.len())?;
        let mut sum = 0.0;
        for (is, should) in is.iter().zip(should) {
            sum += is.bits_of_agreement(should)? as f64;
        }
        Ok(sum / is.len() as f64)
    }

    /// Factor `P·A = L·U` at `precision` with partial pivoting.
    pub fn decompose_plu(&mut self, precision: Precision) -> Result<()> {
        let n = self.n;
        debug!(n, ?precision, "starting PLU decomposition");
        let mut l = identity(n, precision);
        let mut p: Vec<usize> = (0..n).collect();
        let mut u = self.a.clone();
        linalg::cast_matrix(&mut u, precision);
        for k in 0..n {
            let pivot = pivot_row(&u, k)?;
            if pivot != k {
                swap_rows(&mut u, k, pivot, k..n);
                swap_rows(&mut l, k, pivot, 0..k);
                p.swap(k, pivot);
            }
            for j in k + 1..n {
                let factor = u[j][k].div(&u[k][k], None)?;
                for i in k..n {
                    let product = factor.mul(&u[k][i], None)?;
                    u[j][i] = u[j][i].sub(&product, None)?;
                }
                l[j][k] = factor;
            }
        }
        self.l = l;
        self.u = u;
        self.p = p;
        debug!(permutation = ?self.p, "finished PLU decomposition");
        Ok(())
    }

    /// solve `L·y = b` with the stored lower factor
    pub fn forward_substitution(&self, b: &[FloatValue]) -> Result<Vec<FloatValue>> {
        check_nonempty("forward_substitution", self.l.len())?;
        check_nonempty("forward_substitution", b.len())?;
        check_dimension(self.l.len(), b.len())?;
        let precision = self.l[0][0].precision();
        let mut x: Vec<FloatValue> = Vec::with_capacity(b.len());
        for (i, row) in self.l.iter().enumerate() {
            let mut sum = FloatValue::positive_zero(precision);
            for (element, x) in row[..i].iter().zip(&x) {
                sum = sum.add(&element.mul(x, None)?, None)?;
            }
            x.push(b[i].sub(&sum, None)?.div(&row[i], None)?);
        }
        Ok(x)
    }

    /// solve `U·x = y` with the stored upper factor
    pub fn backward_substitution(&self, b: &[FloatValue]) -> Result<Vec<FloatValue>> {
        check_nonempty("backward_substitution", self.u.len())?;
        check_nonempty("backward_substitution", b.len())?;
        let n = self.u.len();
        check_dimension(n, b.len())?;
        let precision = self.u[0][0].precision();
        let mut x = vec![FloatValue::positive_zero(precision); n];
        for i in (0..n).rev() {
            let row = &self.u[i];
            let mut sum = FloatValue::positive_zero(precision);
            for j in (i + 1..n).rev() {
                sum = sum.add(&row[j].mul(&x[j], None)?, None)?;
            }
            x[i] = b[i].sub(&sum, None)?.div(&row[i], None)?;
        }
        Ok(x)
    }

    /// cast `b` to `precision`, then permute and substitute with the stored factors
    fn solve_factored(&self, b: &[FloatValue], precision: Precision) -> Result<Vec<FloatValue>> {
        let mut b = b.to_vec();
        linalg::cast_vector(&mut b, precision);
        let y = linalg::permute(&self.p, &b)?;
        let y = self.forward_substitution(&y)?;
        self.backward_substitution(&y)
    }

    /// PLU solve entirely at the upper precision
    pub fn solve_direct(&mut self, b: &[FloatValue]) -> Result<Vec<FloatValue>> {
        check_nonempty("solve_direct", b.len())?;
        check_dimension(self.n, b.len())?;
        let upper = self.config.upper;
        self.decompose_plu(upper)?;
        self.solve_factored(b, upper)
    }

    /// Mixed-precision iterative refinement.
    ///
    /// Each iteration computes `r = b - A·x` at the upper precision, checks the configured
    /// convergence criteria, solves `A·d = r` with the lower precision factors and adds `d` to
    /// `x` at the working precision.
    pub fn solve_iterative(&mut self, b: &[FloatValue]) -> Result<Vec<FloatValue>> {
        check_nonempty("solve_iterative", b.len())?;
        check_dimension(self.n, b.len())?;
        let config = self.config.clone();
        let start = Instant::now();
        let mut evaluation = Evaluation {
            iterations_needed: config.max_iter,
            ..Evaluation::default()
        };
        let mut b_upper = b.to_vec();
        linalg::cast_vector(&mut b_upper, config.upper);

        self.decompose_plu(config.lower)?;
        let mut x = self.solve_factored(&b_upper, config.lower)?;
        linalg::cast_vector(&mut x, config.working);

        for iteration in 0..config.max_iter {
            let mut x_upper = x.clone();
            linalg::cast_vector(&mut x_upper, config.upper);
            let b_approx = linalg::mat_vec(&self.a, &x_upper)?;
            let residual = linalg::subtract(&b_upper, &b_approx)?;

            if let Some(expected_precision) = config.expected_precision {
                let mean_precision = self.mean_precision(&b_approx, &b_upper)?;
                debug!(iteration, mean_precision, "refinement step");
                if mean_precision >= expected_precision {
                    evaluation.iterations_needed = iteration + 1;
                    break;
                }
            }
            if let Some(expected_error) = config.expected_error {
                let mean_residual = linalg::vector_mean(&residual)?.to_f64();
                debug!(iteration, mean_residual, "refinement step");
                if mean_residual <= expected_error {
                    evaluation.iterations_needed = iteration + 1;
                    break;
                }
            }

            let mut correction = self.solve_factored(&residual, config.lower)?;
            linalg::cast_vector(&mut correction, config.working);
            x = linalg::add(&x, &correction)?;

            if let Some(expected_result) = &self.expected_result {
                evaluation.record(
                    &x,
                    &x_upper,
                    expected_result,
                    config.working.mantissa_bits(),
                )?;
            }
        }
        evaluation.elapsed = start.elapsed();
        debug!(
            iterations_needed = evaluation.iterations_needed,
            elapsed = ?evaluation.elapsed,
            "iterative refinement finished"
        );
        self.evaluation = evaluation;
        Ok(x)
    }

    /// PLU solve of the system matrix's `f64` values in native arithmetic, for reference
    pub fn solve_native(&self, b: &[f64]) -> Result<Vec<f64>> {
        check_nonempty("solve_native", b.len())?;
        let n = self.n;
        check_dimension(n, b.len())?;
        let mut u: Vec<Vec<f64>> = self.a.iter().map(|row| linalg::to_f64_vec(row)).collect();
        let mut l: Vec<Vec<f64>> = (0..n)
            .map(|row| (0..n).map(|column| if row == column { 1.0 } else { 0.0 }).collect())
            .collect();
        let mut p: Vec<usize> = (0..n).collect();
        for k in 0..n {
            let mut pivot = k;
            let mut largest = u[k][k].abs();
            for (row, values) in u.iter().enumerate().skip(k + 1) {
                if values[k].abs() > largest {
                    pivot = row;
                    largest = values[k].abs();
                }
            }
            if pivot != k {
                swap_rows(&mut u, k, pivot, k..n);
                swap_rows(&mut l, k, pivot, 0..k);
                p.swap(k, pivot);
            }
            for j in k + 1..n {
                let factor = flush_subnormal(u[j][k] / u[k][k]);
                for i in k..n {
                    u[j][i] = flush_subnormal(u[j][i] - flush_subnormal(factor * u[k][i]));
                }
                l[j][k] = factor;
            }
        }
        let mut y: Vec<f64> = Vec::with_capacity(n);
        for i in 0..n {
            let mut sum = 0.0;
            for j in 0..i {
                sum = flush_subnormal(sum + flush_subnormal(l[i][j] * y[j]));
            }
            y.push(flush_subnormal(flush_subnormal(b[p[i]] - sum) / l[i][i]));
        }
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = 0.0;
            for j in (i + 1..n).rev() {
                sum = flush_subnormal(sum + flush_subnormal(u[i][j] * x[j]));
            }
            x[i] = flush_subnormal(flush_subnormal(y[i] - sum) / u[i][i]);
        }
        Ok(x)
    }
}
