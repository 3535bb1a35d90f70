// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

//! Measures of how close a computed value is to a reference value.

use crate::error::Result;
use crate::float::FloatValue;
use num_bigint::BigUint;
use num_traits::Zero;
use std::cmp::{min, Ordering};
use tracing::warn;

/// returned by `bits_of_agreement` when exactly one side is NaN or infinite
pub const DEGENERATE_AGREEMENT: i64 = -i64::MAX;

fn abs_difference(a: BigUint, b: BigUint) -> BigUint {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

impl FloatValue {
    /// Roughly the number of leading mantissa bits `self` and `other` have in common.
    ///
    /// For equal exponent fields this is `mantissa_bits - bitlen(|ma - mb|)`. Exponent fields
    /// one apart are compared after aligning the smaller value by one bit. For larger gaps the
    /// result is `0` when `other` is the larger value, otherwise the negated gap, one lower
    /// still if any of the leading `gap` mantissa bits of `self` is set. Values of opposite
    /// sign give `-mantissa_bits`.
    ///
    /// NaN or infinity against anything but itself warns and returns [`DEGENERATE_AGREEMENT`].
    pub fn bits_of_agreement(&self, other: &Self) -> Result<i64> {
        let precision = self.precision();
        precision.check_matches(other.precision())?;
        let mantissa_bits = precision.mantissa_bits() as i64;
        let self_class = self.class();
        let other_class = other.class();
        if self_class.is_nan() || other_class.is_nan() {
            if self_class.is_nan() && other_class.is_nan() {
                return Ok(mantissa_bits);
            }
            warn!("bits_of_agreement: one value is NaN, returning the most negative agreement");
            return Ok(DEGENERATE_AGREEMENT);
        }
        if self_class.is_infinity() || other_class.is_infinity() {
            if self_class == other_class {
                return Ok(mantissa_bits);
            }
            warn!("bits_of_agreement: one value is infinite, returning the most negative agreement");
            return Ok(DEGENERATE_AGREEMENT);
        }
        if self_class.is_zero() && other_class.is_zero() {
            return Ok(mantissa_bits);
        }
        if !self_class.is_zero() && !other_class.is_zero() && self.sign() != other.sign() {
            return Ok(-mantissa_bits);
        }
        let self_exponent = self.exponent_field();
        let other_exponent = other.exponent_field();
        let implicit_bit = precision.implicit_bit();
        let difference = match self_exponent.cmp(&other_exponent) {
            Ordering::Equal => {
                let self_mantissa = self.mantissa_field();
                let other_mantissa = other.mantissa_field();
                if self_mantissa == other_mantissa {
                    return Ok(mantissa_bits);
                }
                abs_difference(self_mantissa, other_mantissa)
            }
            Ordering::Greater if self_exponent - other_exponent == 1 => abs_difference(
                self.mantissa_field() | &implicit_bit,
                (other.mantissa_field() | implicit_bit) >> 1usize,
            ),
            Ordering::Less if other_exponent - self_exponent == 1 => abs_difference(
                (self.mantissa_field() | &implicit_bit) >> 1usize,
                other.mantissa_field() | implicit_bit,
            ),
            Ordering::Less => return Ok(0),
            Ordering::Greater => {
                let gap = self_exponent - other_exponent;
                let checked = min(gap, mantissa_bits as u64) as usize;
                let leading = self.mantissa_field() >> (mantissa_bits as usize - checked);
                let penalty = if leading.is_zero() { 0 } else { 1 };
                return Ok(-(gap as i64) - penalty);
            }
        };
        Ok(mantissa_bits - difference.bits() as i64)
    }

    /// `true` if `self` agrees with `reference` in at least `bits` leading mantissa bits
    pub fn within_precision(&self, reference: &Self, bits: u32) -> Result<bool> {
        let agreement = self.bits_of_agreement(reference)?;
        if reference.exponent_field() < u64::from(bits) + 1 {
            warn!(
                "within_precision: value too small to check precision properly (exponent field {}, {} bits)",
                reference.exponent_field(),
                bits
            );
        }
        Ok(agreement >= i64::from(bits))
    }

    /// `|reference - self|`
    pub fn absolute_error(&self, reference: &Self) -> Result<Self> {
        Ok(reference.sub(self, None)?.abs())
    }

    /// `|(reference - self) / reference|`
    pub fn relative_error(&self, reference: &Self) -> Result<Self> {
        Ok(self.absolute_error(reference)?.div(reference, None)?.abs())
    }

    pub fn absolute_error_f64(&self, reference: f64) -> f64 {
        (self.to_f64() - reference).abs()
    }

    pub fn relative_error_f64(&self, reference: f64) -> f64 {
        (self.to_f64() - reference).abs() / reference.abs()
    }
}
