// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::error::{Error, Result};
use num_bigint::BigUint;
use num_traits::One;
use std::fmt;

/// the widest supported exponent field; unbiased exponents are tracked as `i64`
pub const MAX_EXPONENT_BITS: usize = 62;

/// The (mantissa, exponent) width pair of a `FloatValue`.
///
/// The layout is always sign bit, then exponent field, then mantissa field, with an implicit
/// leading mantissa bit and an exponent bias of `2^(exponent_bits - 1) - 1`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Precision {
    mantissa_bits: usize,
    exponent_bits: usize,
}

impl Precision {
    pub fn new(mantissa_bits: usize, exponent_bits: usize) -> Result<Self> {
        if mantissa_bits < 1 || exponent_bits < 2 || exponent_bits > MAX_EXPONENT_BITS {
            return Err(Error::InvalidPrecision {
                mantissa_bits,
                exponent_bits,
            });
        }
        Ok(Self {
            mantissa_bits,
            exponent_bits,
        })
    }
    /// `Precision` for standard [__binary32__ format](https://en.wikipedia.org/wiki/Single-precision_floating-point_format)
    pub const STANDARD_32: Self = Self {
        mantissa_bits: 23,
        exponent_bits: 8,
    };
    /// `Precision` for standard [__binary64__ format](https://en.wikipedia.org/wiki/Double-precision_floating-point_format)
    pub const STANDARD_64: Self = Self {
        mantissa_bits: 52,
        exponent_bits: 11,
    };
    /// construct `Precision` for the standard `width`-bit binary interchange format, if it exists
    pub fn standard(width: usize) -> Option<Self> {
        match width {
            16 => Some(Self {
                mantissa_bits: 10,
                exponent_bits: 5,
            }),
            32 => Some(Self::STANDARD_32),
            64 => Some(Self::STANDARD_64),
            128 => Some(Self {
                mantissa_bits: 112,
                exponent_bits: 15,
            }),
            _ => None,
        }
    }
    #[inline]
    pub fn is_standard(self) -> bool {
        Self::standard(self.total_bits()) == Some(self)
    }
    /// the number of bits in the mantissa field (excludes the implicit leading bit)
    #[inline]
    pub const fn mantissa_bits(self) -> usize {
        self.mantissa_bits
    }
    /// the number of bits in the exponent field
    #[inline]
    pub const fn exponent_bits(self) -> usize {
        self.exponent_bits
    }
    #[inline]
    pub const fn total_bits(self) -> usize {
        1 + self.exponent_bits + self.mantissa_bits
    }
    #[inline]
    pub const fn as_tuple(self) -> (usize, usize) {
        (self.mantissa_bits, self.exponent_bits)
    }
    /// fails with `PrecisionMismatch` unless `other` has the same widths
    pub fn check_matches(self, other: Self) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(Error::PrecisionMismatch {
                expected: self.as_tuple(),
                found: other.as_tuple(),
            })
        }
    }
    #[inline]
    pub const fn sign_field_shift(self) -> usize {
        self.exponent_bits + self.mantissa_bits
    }
    pub fn sign_field_mask(self) -> BigUint {
        BigUint::one() << self.sign_field_shift()
    }
    #[inline]
    pub const fn exponent_field_shift(self) -> usize {
        self.mantissa_bits
    }
    pub fn exponent_field_mask(self) -> BigUint {
        BigUint::from(self.exponent_inf_nan()) << self.exponent_field_shift()
    }
    pub fn mantissa_field_mask(self) -> BigUint {
        (BigUint::one() << self.mantissa_bits) - BigUint::one()
    }
    pub fn mantissa_field_msb_mask(self) -> BigUint {
        BigUint::one() << (self.mantissa_bits - 1)
    }
    /// the implicit leading one, as it sits directly above the mantissa field
    pub fn implicit_bit(self) -> BigUint {
        BigUint::one() << self.mantissa_bits
    }
    pub fn overall_mask(self) -> BigUint {
        (BigUint::one() << self.total_bits()) - BigUint::one()
    }
    #[inline]
    pub fn exponent_bias(self) -> i64 {
        (1i64 << (self.exponent_bits - 1)) - 1
    }
    #[inline]
    pub fn exponent_inf_nan(self) -> u64 {
        (1u64 << self.exponent_bits) - 1
    }
    #[inline]
    pub fn exponent_max_normal(self) -> u64 {
        self.exponent_inf_nan() - 1
    }
    /// largest unbiased exponent of a finite value
    #[inline]
    pub fn max_exponent(self) -> i64 {
        self.exponent_max_normal() as i64 - self.exponent_bias()
    }
    /// smallest unbiased exponent of a nonzero value; there are no subnormals
    #[inline]
    pub fn min_exponent(self) -> i64 {
        1 - self.exponent_bias()
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::STANDARD_64
    }
}

impl fmt::Debug for Precision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let is_standard = self.is_standard();
        if !f.alternate() && is_standard {
            match self.total_bits() {
                32 => f.write_str("Precision::STANDARD_32"),
                64 => f.write_str("Precision::STANDARD_64"),
                width => write!(f, "Precision::standard({})", width),
            }
        } else {
            f.debug_struct("Precision")
                .field("mantissa_bits", &self.mantissa_bits())
                .field("exponent_bits", &self.exponent_bits())
                .field("total_bits", &self.total_bits())
                .field("is_standard", &is_standard)
                .finish()
        }
    }
}
