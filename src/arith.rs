// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::error::Result;
use crate::float::FloatValue;
use crate::{FloatClass, Sign, StatusFlags};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// extra quotient bits computed past the mantissa so the round bit and a guard bit are exact
const DIVISION_GUARD_BITS: usize = 3;

impl FloatValue {
    fn add_or_sub(
        &self,
        rhs: &Self,
        status_flags: Option<&mut StatusFlags>,
        is_sub: bool,
    ) -> Result<Self> {
        let precision = self.precision();
        precision.check_matches(rhs.precision())?;
        let mut default_status_flags = StatusFlags::default();
        let status_flags = status_flags.unwrap_or(&mut default_status_flags);
        let self_class = self.class();
        let mut rhs_class = rhs.class();
        let mut rhs_sign = rhs.sign();
        if is_sub {
            rhs_class = -rhs_class;
            rhs_sign = -rhs_sign;
        }
        Ok(match (self_class, rhs_class) {
            (FloatClass::NaN, _) | (_, FloatClass::NaN) => Self::nan(precision),
            (FloatClass::NegativeInfinity, FloatClass::PositiveInfinity)
            | (FloatClass::PositiveInfinity, FloatClass::NegativeInfinity) => {
                *status_flags |= StatusFlags::INVALID_OPERATION;
                Self::nan(precision)
            }
            (FloatClass::PositiveInfinity, _) | (_, FloatClass::PositiveInfinity) => {
                Self::signed_infinity(Sign::Positive, precision)
            }
            (FloatClass::NegativeInfinity, _) | (_, FloatClass::NegativeInfinity) => {
                Self::signed_infinity(Sign::Negative, precision)
            }
            (FloatClass::NegativeZero, FloatClass::NegativeZero) => {
                Self::signed_zero(Sign::Negative, precision)
            }
            (FloatClass::PositiveZero, FloatClass::PositiveZero)
            | (FloatClass::PositiveZero, FloatClass::NegativeZero)
            | (FloatClass::NegativeZero, FloatClass::PositiveZero) => {
                Self::positive_zero(precision)
            }
            (_, FloatClass::PositiveZero) | (_, FloatClass::NegativeZero) => self.clone(),
            (FloatClass::PositiveZero, _) | (FloatClass::NegativeZero, _) => {
                let mut retval = rhs.clone();
                retval.set_sign(rhs_sign == Sign::Negative);
                retval
            }
            _ => self.add_normal(rhs, rhs_sign, status_flags),
        })
    }
    /// both operands normal; `rhs_sign` overrides the sign stored in `rhs`
    fn add_normal(&self, rhs: &Self, rhs_sign: Sign, status_flags: &mut StatusFlags) -> Self {
        let precision = self.precision();
        let (lhs_significand, lhs_exponent) = self.unpack_normal();
        let (rhs_significand, rhs_exponent) = rhs.unpack_normal();
        let ((big, big_exponent, big_sign), (small, small_exponent, small_sign)) =
            if lhs_exponent >= rhs_exponent {
                (
                    (lhs_significand, lhs_exponent, self.sign()),
                    (rhs_significand, rhs_exponent, rhs_sign),
                )
            } else {
                (
                    (rhs_significand, rhs_exponent, rhs_sign),
                    (lhs_significand, lhs_exponent, self.sign()),
                )
            };
        let alignment_limit = precision.mantissa_bits() + 3;
        let gap = (big_exponent - small_exponent) as u64;
        let (big, small, exponent) = if gap > alignment_limit as u64 {
            // the smaller operand is below a quarter ulp of any possible result; any nonzero
            // stand-in below that point rounds the same way. A gap past mantissa_bits + 1 would
            // do; the two extra bits keep round and guard bits above the stand-in after a
            // one-bit normalization shift in subtraction
            (
                big << alignment_limit,
                BigUint::one(),
                big_exponent - alignment_limit as i64,
            )
        } else {
            (big << gap as usize, small, small_exponent)
        };
        let (sign, significand) = if big_sign == small_sign {
            (big_sign, big + small)
        } else {
            match big.cmp(&small) {
                Ordering::Greater => (big_sign, big - small),
                Ordering::Less => (small_sign, small - big),
                Ordering::Equal => return Self::positive_zero(precision),
            }
        };
        Self::round_and_pack(
            precision,
            sign,
            significand,
            exponent,
            false,
            Some(status_flags),
        )
    }
    pub fn add(&self, rhs: &Self, status_flags: Option<&mut StatusFlags>) -> Result<Self> {
        self.add_or_sub(rhs, status_flags, false)
    }
    /// `self + (-rhs)`, special values included
    pub fn sub(&self, rhs: &Self, status_flags: Option<&mut StatusFlags>) -> Result<Self> {
        self.add_or_sub(rhs, status_flags, true)
    }
    pub fn mul(&self, rhs: &Self, status_flags: Option<&mut StatusFlags>) -> Result<Self> {
        let precision = self.precision();
        precision.check_matches(rhs.precision())?;
        let mut default_status_flags = StatusFlags::default();
        let status_flags = status_flags.unwrap_or(&mut default_status_flags);
        let self_class = self.class();
        let rhs_class = rhs.class();
        let result_sign = self.sign() * rhs.sign();
        Ok(if self_class.is_nan() || rhs_class.is_nan() {
            Self::nan(precision)
        } else if (self_class.is_infinity() && rhs_class.is_zero())
            || (self_class.is_zero() && rhs_class.is_infinity())
        {
            *status_flags |= StatusFlags::INVALID_OPERATION;
            Self::nan(precision)
        } else if self_class.is_zero() || rhs_class.is_zero() {
            Self::signed_zero(result_sign, precision)
        } else if self_class.is_infinity() || rhs_class.is_infinity() {
            Self::signed_infinity(result_sign, precision)
        } else {
            let (lhs_significand, lhs_exponent) = self.unpack_normal();
            let (rhs_significand, rhs_exponent) = rhs.unpack_normal();
            Self::round_and_pack(
                precision,
                result_sign,
                lhs_significand * rhs_significand,
                lhs_exponent + rhs_exponent,
                false,
                Some(status_flags),
            )
        })
    }
    pub fn div(&self, rhs: &Self, status_flags: Option<&mut StatusFlags>) -> Result<Self> {
        let precision = self.precision();
        precision.check_matches(rhs.precision())?;
        let mut default_status_flags = StatusFlags::default();
        let status_flags = status_flags.unwrap_or(&mut default_status_flags);
        let self_class = self.class();
        let rhs_class = rhs.class();
        let result_sign = self.sign() * rhs.sign();
        Ok(if self_class.is_nan() || rhs_class.is_nan() {
            Self::nan(precision)
        } else if (self_class.is_infinity() && rhs_class.is_infinity())
            || (self_class.is_zero() && rhs_class.is_zero())
        {
            *status_flags |= StatusFlags::INVALID_OPERATION;
            Self::nan(precision)
        } else if self_class.is_zero() || rhs_class.is_infinity() {
            Self::signed_zero(result_sign, precision)
        } else if self_class.is_infinity() {
            Self::signed_infinity(result_sign, precision)
        } else if rhs_class.is_zero() {
            *status_flags |= StatusFlags::DIVISION_BY_ZERO;
            Self::signed_infinity(result_sign, precision)
        } else {
            let (lhs_significand, lhs_exponent) = self.unpack_normal();
            let (rhs_significand, rhs_exponent) = rhs.unpack_normal();
            let shift = precision.mantissa_bits() + DIVISION_GUARD_BITS;
            let (quotient, remainder) = (lhs_significand << shift).div_rem(&rhs_significand);
            Self::round_and_pack(
                precision,
                result_sign,
                quotient,
                lhs_exponent - rhs_exponent - shift as i64,
                !remainder.is_zero(),
                Some(status_flags),
            )
        })
    }
}

macro_rules! impl_binary_operator {
    ($op_trait:ident, $op:ident) => {
        impl<'a, 'b> $op_trait<&'b FloatValue> for &'a FloatValue {
            type Output = Result<FloatValue>;
            fn $op(self, rhs: &'b FloatValue) -> Result<FloatValue> {
                FloatValue::$op(self, rhs, None)
            }
        }
    };
}

impl_binary_operator!(Add, add);
impl_binary_operator!(Sub, sub);
impl_binary_operator!(Mul, mul);
impl_binary_operator!(Div, div);

impl<'a> Neg for &'a FloatValue {
    type Output = FloatValue;
    fn neg(self) -> FloatValue {
        FloatValue::neg(self)
    }
}

impl Neg for FloatValue {
    type Output = FloatValue;
    fn neg(self) -> FloatValue {
        FloatValue::neg(&self)
    }
}
