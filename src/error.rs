// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use thiserror::Error;

/// Errors returned by `FloatValue` operations and the vector/matrix helpers built on them.
///
/// Special floating-point conditions (NaN, infinity, overflow, division by zero) are never
/// errors; they are ordinary results.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// a mantissa narrower than 1 bit or an exponent outside `2..=62` bits was requested
    #[error("invalid precision: mantissa {mantissa_bits} bits, exponent {exponent_bits} bits")]
    InvalidPrecision {
        mantissa_bits: usize,
        exponent_bits: usize,
    },

    /// operand widths (or the length of a supplied bit sequence) don't match
    #[error("precision mismatch: expected {expected:?}, found {found:?}")]
    PrecisionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// vector or matrix operands whose lengths don't line up
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("{operation}: input is empty")]
    EmptyInput { operation: &'static str },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
