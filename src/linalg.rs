// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

//! Vector and matrix helpers over [`FloatValue`].
//!
//! Matrices are row-major `Vec<Vec<FloatValue>>`. Every element of an operand is expected to
//! have the same widths; arithmetic between mismatched widths fails with `PrecisionMismatch`.

use crate::error::{Error, Result};
use crate::float::FloatValue;
use crate::precision::Precision;
use rand::seq::SliceRandom;
use rand::Rng;

/// attempts at drawing a nonzero value for the guaranteed-nonzero entry of a sparse row
const MAX_NONZERO_DRAWS: usize = 64;

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

pub fn from_f64_slice(precision: Precision, values: &[f64]) -> Vec<FloatValue> {
    values
        .iter()
        .map(|&value| FloatValue::from_f64_with_precision(value, precision, None))
        .collect()
}

pub fn from_f64_matrix(precision: Precision, rows: &[Vec<f64>]) -> Vec<Vec<FloatValue>> {
    rows.iter()
        .map(|row| from_f64_slice(precision, row))
        .collect()
}

pub fn to_f64_vec(values: &[FloatValue]) -> Vec<f64> {
    values.iter().map(FloatValue::to_f64).collect()
}

pub fn to_f32_vec(values: &[FloatValue]) -> Vec<f32> {
    values.iter().map(FloatValue::to_f32).collect()
}

pub fn cast_vector(values: &mut [FloatValue], precision: Precision) {
    for value in values {
        value.cast_with_status(precision, None);
    }
}

pub fn cast_matrix(rows: &mut [Vec<FloatValue>], precision: Precision) {
    for row in rows {
        cast_vector(row, precision);
    }
}

fn elementwise(
    operation: &'static str,
    a: &[FloatValue],
    b: &[FloatValue],
    op: impl Fn(&FloatValue, &FloatValue) -> Result<FloatValue>,
) -> Result<Vec<FloatValue>> {
    check_nonempty(operation, a.len())?;
    check_nonempty(operation, b.len())?;
    check_dimension(a.len(), b.len())?;
    a.iter().zip(b).map(|(a, b)| op(a, b)).collect()
}

/// `a + b`, element by element
pub fn add(a: &[FloatValue], b: &[FloatValue]) -> Result<Vec<FloatValue>> {
    elementwise("add", a, b, |a, b| a.add(b, None))
}

/// `a - b`, element by element
pub fn subtract(a: &[FloatValue], b: &[FloatValue]) -> Result<Vec<FloatValue>> {
    elementwise("subtract", a, b, |a, b| a.sub(b, None))
}

/// `sum(row[j] * x[j])`, accumulated left to right from positive zero
fn dot(row: &[FloatValue], x: &[FloatValue]) -> Result<FloatValue> {
    check_dimension(x.len(), row.len())?;
    let mut sum = FloatValue::positive_zero(x[0].precision());
    for (x, element) in x.iter().zip(row) {
        sum = sum.add(&x.mul(element, None)?, None)?;
    }
    Ok(sum)
}

/// matrix times vector
pub fn mat_vec(matrix: &[Vec<FloatValue>], x: &[FloatValue]) -> Result<Vec<FloatValue>> {
    check_nonempty("mat_vec", matrix.len())?;
    check_nonempty("mat_vec", x.len())?;
    matrix.iter().map(|row| dot(row, x)).collect()
}

/// matrix times matrix
pub fn mat_mat(a: &[Vec<FloatValue>], b: &[Vec<FloatValue>]) -> Result<Vec<Vec<FloatValue>>> {
    check_nonempty("mat_mat", a.len())?;
    check_nonempty("mat_mat", b.len())?;
    let columns = b[0].len();
    check_nonempty("mat_mat", columns)?;
    for row in b {
        check_dimension(columns, row.len())?;
    }
    let precision = b[0][0].precision();
    a.iter()
        .map(|row| {
            check_dimension(b.len(), row.len())?;
            (0..columns)
                .map(|column| {
                    let mut sum = FloatValue::positive_zero(precision);
                    for (element, b_row) in row.iter().zip(b) {
                        sum = sum.add(&element.mul(&b_row[column], None)?, None)?;
                    }
                    Ok(sum)
                })
                .collect()
        })
        .collect()
}

/// `retval[i] = values[permutation[i]]`
pub fn permute(permutation: &[usize], values: &[FloatValue]) -> Result<Vec<FloatValue>> {
    check_dimension(permutation.len(), values.len())?;
    permutation
        .iter()
        .map(|&index| {
            values.get(index).cloned().ok_or(Error::IndexOutOfRange {
                index,
                len: values.len(),
            })
        })
        .collect()
}

/// sum of absolute values
pub fn norm_l1(values: &[FloatValue]) -> Result<FloatValue> {
    check_nonempty("norm_l1", values.len())?;
    let mut sum = values[0].abs();
    for value in &values[1..] {
        sum = sum.add(&value.abs(), None)?;
    }
    Ok(sum)
}

/// mean of the absolute values, divided at the elements' own widths
pub fn vector_mean(values: &[FloatValue]) -> Result<FloatValue> {
    check_nonempty("vector_mean", values.len())?;
    let precision = values[0].precision();
    let mut sum = FloatValue::positive_zero(precision);
    for value in values {
        sum = sum.add(&value.abs(), None)?;
    }
    let len = FloatValue::from_f64_with_precision(values.len() as f64, precision, None);
    sum.div(&len, None)
}

/// the elements' `to_string(fraction_digits)` joined with `", "`
pub fn vector_to_string(values: &[FloatValue], fraction_digits: Option<u32>) -> Result<String> {
    check_nonempty("vector_to_string", values.len())?;
    Ok(values
        .iter()
        .map(|value| value.to_string(fraction_digits))
        .collect::<Vec<_>>()
        .join(", "))
}

/// uniform in `[low, high)`; empty or unbounded ranges give `low`, reversed ones are swapped
pub(crate) fn sample_uniform<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    let (low, high) = if high < low { (high, low) } else { (low, high) };
    if low < high && (high - low).is_finite() {
        rng.random_range(low..high)
    } else {
        low
    }
}

pub fn random_vector<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    precision: Precision,
    range: (f64, f64),
) -> Vec<FloatValue> {
    (0..len)
        .map(|_| FloatValue::from_f64_with_precision(sample_uniform(rng, range), precision, None))
        .collect()
}

/// An `n` by `n` matrix of values drawn uniformly from `range`.
///
/// With a nonzero `sparsity_rate` every row gets one entry, in a column chosen by a random
/// permutation, that is redrawn until it's nonzero. The other entries are zero with
/// probability `sparsity_rate * n / (n - 1)`, so about `sparsity_rate` of the whole matrix is
/// zero.
pub fn random_matrix<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    precision: Precision,
    range: (f64, f64),
    sparsity_rate: f64,
) -> Vec<Vec<FloatValue>> {
    let draw = |rng: &mut R| {
        FloatValue::from_f64_with_precision(sample_uniform(rng, range), precision, None)
    };
    if sparsity_rate == 0.0 {
        return (0..n).map(|_| (0..n).map(|_| draw(rng)).collect()).collect();
    }
    let mut nonzero_columns: Vec<usize> = (0..n).collect();
    nonzero_columns.shuffle(rng);
    let adapted_rate = if n > 1 {
        sparsity_rate * n as f64 / (n - 1) as f64
    } else {
        sparsity_rate
    };
    nonzero_columns
        .iter()
        .map(|&nonzero_column| {
            (0..n)
                .map(|column| {
                    if column == nonzero_column {
                        let mut value = draw(rng);
                        for _ in 1..MAX_NONZERO_DRAWS {
                            if !value.is_zero() {
                                break;
                            }
                            value = draw(rng);
                        }
                        value
                    } else if rng.random::<f64>() < adapted_rate {
                        FloatValue::positive_zero(precision)
                    } else {
                        draw(rng)
                    }
                })
                .collect()
        })
        .collect()
}
