// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::error::{Error, Result};
use crate::precision::Precision;
use crate::{FloatClass, Sign, StatusFlags};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::Ratio;
use num_traits::{One, Zero};
use std::fmt;

pub(crate) fn bit_is_set(value: &BigUint, index: usize) -> bool {
    !((value >> index) & BigUint::one()).is_zero()
}

/// true if any of the `count` least significant bits of `value` are set
pub(crate) fn low_bits_nonzero(value: &BigUint, count: usize) -> bool {
    if count == 0 {
        return false;
    }
    let mask = (BigUint::one() << count) - BigUint::one();
    !(mask & value).is_zero()
}

fn bits_from_slice(bits: &[bool]) -> BigUint {
    bits.iter().fold(BigUint::zero(), |acc, &bit| {
        let acc = acc << 1usize;
        if bit {
            acc + BigUint::one()
        } else {
            acc
        }
    })
}

fn bits_to_vec(value: &BigUint, width: usize) -> Vec<bool> {
    (0..width).rev().map(|i| bit_is_set(value, i)).collect()
}

/// the low 64 bits of `value`
fn low_u64(value: &BigUint) -> u64 {
    value
        .to_bytes_le()
        .iter()
        .take(8)
        .rev()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// largest distance, in binary places, of a value's least significant bit from the point for
/// which `to_ratio` builds the exact value
pub const MAX_EXACT_EXPONENT: i64 = 1 << 14;

/// A floating-point value with a runtime-chosen mantissa and exponent width.
///
/// The sign, exponent and mantissa fields are packed MSB-first into a single
/// `1 + exponent_bits + mantissa_bits` wide integer, matching the IEEE 754 interchange layout
/// for the standard widths. Nonzero finite values carry an implicit leading one; there are no
/// subnormals, an all-zero exponent field always encodes zero.
#[derive(Clone)]
pub struct FloatValue {
    precision: Precision,
    bits: BigUint,
}

impl Default for FloatValue {
    fn default() -> Self {
        Self::positive_zero(Precision::default())
    }
}

impl FloatValue {
    /// the encoded zero at the given widths
    pub fn new(mantissa_bits: usize, exponent_bits: usize) -> Result<Self> {
        Ok(Self::positive_zero(Precision::new(
            mantissa_bits,
            exponent_bits,
        )?))
    }
    pub fn from_value(mantissa_bits: usize, exponent_bits: usize, value: f64) -> Result<Self> {
        Ok(Self::from_f64_with_precision(
            value,
            Precision::new(mantissa_bits, exponent_bits)?,
            None,
        ))
    }
    /// encode `value`, rounding to nearest with ties to even
    pub fn from_f64_with_precision(
        value: f64,
        precision: Precision,
        status_flags: Option<&mut StatusFlags>,
    ) -> Self {
        let sign = if value.is_sign_negative() {
            Sign::Negative
        } else {
            Sign::Positive
        };
        if value.is_nan() {
            let mut retval = Self::nan(precision);
            retval.set_sign(sign == Sign::Negative);
            return retval;
        }
        if value.is_infinite() {
            return Self::signed_infinity(sign, precision);
        }
        if value == 0.0 {
            return Self::signed_zero(sign, precision);
        }
        let bits = value.to_bits();
        let exponent_field = ((bits >> 52) & 0x7FF) as i64;
        let fraction = bits & ((1u64 << 52) - 1);
        let (significand, exponent) = if exponent_field == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), exponent_field - 1075)
        };
        Self::round_and_pack(
            precision,
            sign,
            BigUint::from(significand),
            exponent,
            false,
            status_flags,
        )
    }
    pub(crate) fn from_fields(
        precision: Precision,
        sign: Sign,
        exponent_field: u64,
        mantissa_field: BigUint,
    ) -> Self {
        let mut retval = Self::positive_zero(precision);
        retval.set_sign(sign == Sign::Negative);
        retval.set_exponent_field(exponent_field);
        retval.set_mantissa_field(mantissa_field);
        retval
    }
    pub fn positive_zero(precision: Precision) -> Self {
        Self {
            precision,
            bits: BigUint::zero(),
        }
    }
    pub fn signed_zero(sign: Sign, precision: Precision) -> Self {
        let mut retval = Self::positive_zero(precision);
        retval.set_sign(sign == Sign::Negative);
        retval
    }
    pub fn signed_infinity(sign: Sign, precision: Precision) -> Self {
        let mut retval = Self::signed_zero(sign, precision);
        retval.set_exponent_field(precision.exponent_inf_nan());
        retval
    }
    /// the canonical NaN: positive, all-ones exponent, only the mantissa MSB set
    pub fn nan(precision: Precision) -> Self {
        let mut retval = Self::signed_infinity(Sign::Positive, precision);
        retval.set_mantissa_field(precision.mantissa_field_msb_mask());
        retval
    }

    /// Round `(-1)^sign * significand * 2^exponent` to `precision`.
    ///
    /// `sticky` stands for nonzero bits below the least significant bit of `significand`.
    /// The significand may be any width: it is normalized first, then rounded to nearest with
    /// ties to even on the bit after the kept `mantissa_bits + 1` bits. A carry out of the
    /// mantissa bumps the exponent. Exponents above the format range saturate to signed
    /// infinity, exponents below it flush to signed zero.
    pub(crate) fn round_and_pack(
        precision: Precision,
        sign: Sign,
        significand: BigUint,
        exponent: i64,
        mut sticky: bool,
        status_flags: Option<&mut StatusFlags>,
    ) -> Self {
        let mut default_status_flags = StatusFlags::default();
        let status_flags = status_flags.unwrap_or(&mut default_status_flags);
        if significand.is_zero() {
            if sticky {
                *status_flags |= StatusFlags::INEXACT | StatusFlags::UNDERFLOW;
            }
            return Self::signed_zero(sign, precision);
        }
        let kept_width = precision.mantissa_bits() + 1;
        let length = significand.bits();
        let mut exponent = exponent + (length as i64 - 1);
        let significand = if length > kept_width {
            let shift = length - kept_width;
            let round_bit = bit_is_set(&significand, shift - 1);
            sticky |= low_bits_nonzero(&significand, shift - 1);
            let mut kept = significand >> shift;
            if round_bit || sticky {
                *status_flags |= StatusFlags::INEXACT;
            }
            if round_bit && (sticky || kept.is_odd()) {
                kept += BigUint::one();
                if kept.bits() > kept_width {
                    kept >>= 1usize;
                    exponent += 1;
                }
            }
            kept
        } else {
            if sticky {
                *status_flags |= StatusFlags::INEXACT;
            }
            significand << (kept_width - length)
        };
        if exponent > precision.max_exponent() {
            *status_flags |= StatusFlags::OVERFLOW | StatusFlags::INEXACT;
            return Self::signed_infinity(sign, precision);
        }
        if exponent < precision.min_exponent() {
            *status_flags |= StatusFlags::UNDERFLOW | StatusFlags::INEXACT;
            return Self::signed_zero(sign, precision);
        }
        let exponent_field = (exponent + precision.exponent_bias()) as u64;
        Self::from_fields(
            precision,
            sign,
            exponent_field,
            significand - precision.implicit_bit(),
        )
    }

    /// significand including the implicit one, and the exponent of its least significant bit
    ///
    /// only meaningful for normal values
    pub(crate) fn unpack_normal(&self) -> (BigUint, i64) {
        let precision = self.precision;
        let significand = self.mantissa_field() | precision.implicit_bit();
        let exponent = self.exponent_field() as i64
            - precision.exponent_bias()
            - precision.mantissa_bits() as i64;
        (significand, exponent)
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }
    pub fn mantissa_bits(&self) -> usize {
        self.precision.mantissa_bits()
    }
    pub fn exponent_bits(&self) -> usize {
        self.precision.exponent_bits()
    }
    pub fn total_bits(&self) -> usize {
        self.precision.total_bits()
    }
    pub fn bits(&self) -> &BigUint {
        &self.bits
    }
    pub fn sign(&self) -> Sign {
        if bit_is_set(&self.bits, self.precision.sign_field_shift()) {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }
    fn or_bits(&mut self, bits: BigUint) {
        self.bits |= bits;
    }
    fn and_not_bits(&mut self, bits: BigUint) {
        self.bits |= &bits;
        self.bits ^= bits;
    }
    pub fn set_sign(&mut self, negative: bool) {
        let mask = self.precision.sign_field_mask();
        if negative {
            self.or_bits(mask);
        } else {
            self.and_not_bits(mask);
        }
    }
    pub fn toggle_sign(&mut self) {
        self.bits ^= self.precision.sign_field_mask();
    }
    pub fn exponent_field(&self) -> u64 {
        low_u64(&((self.precision.exponent_field_mask() & &self.bits)
            >> self.precision.exponent_field_shift()))
    }
    /// `exponent` must fit in the exponent field
    pub(crate) fn set_exponent_field(&mut self, exponent: u64) {
        let precision = self.precision;
        debug_assert!(exponent <= precision.exponent_inf_nan(), "exponent out of range");
        self.and_not_bits(precision.exponent_field_mask());
        self.or_bits(BigUint::from(exponent) << precision.exponent_field_shift());
    }
    pub fn mantissa_field(&self) -> BigUint {
        self.precision.mantissa_field_mask() & &self.bits
    }
    /// `mantissa` must fit in the mantissa field
    pub(crate) fn set_mantissa_field(&mut self, mantissa: BigUint) {
        let mask = self.precision.mantissa_field_mask();
        debug_assert!(mask.clone() & &mantissa == mantissa, "mantissa out of range");
        self.and_not_bits(mask);
        self.or_bits(mantissa);
    }
    /// the mantissa field, most significant bit first
    pub fn mantissa_bit_vec(&self) -> Vec<bool> {
        bits_to_vec(&self.mantissa_field(), self.mantissa_bits())
    }
    /// the exponent field, most significant bit first
    pub fn exponent_bit_vec(&self) -> Vec<bool> {
        bits_to_vec(&BigUint::from(self.exponent_field()), self.exponent_bits())
    }
    /// sign, then exponent, then mantissa, each most significant bit first
    pub fn to_bits(&self) -> Vec<bool> {
        bits_to_vec(&self.bits, self.total_bits())
    }
    pub fn set_mantissa_bits(&mut self, mantissa: &[bool]) -> Result<()> {
        if mantissa.len() != self.mantissa_bits() {
            return Err(Error::PrecisionMismatch {
                expected: self.precision.as_tuple(),
                found: (mantissa.len(), self.exponent_bits()),
            });
        }
        self.set_mantissa_field(bits_from_slice(mantissa));
        Ok(())
    }
    pub fn set_exponent_bits(&mut self, exponent: &[bool]) -> Result<()> {
        if exponent.len() != self.exponent_bits() {
            return Err(Error::PrecisionMismatch {
                expected: self.precision.as_tuple(),
                found: (self.mantissa_bits(), exponent.len()),
            });
        }
        self.set_exponent_field(low_u64(&bits_from_slice(exponent)));
        Ok(())
    }
    /// positive zero
    pub fn set_zero(&mut self) {
        *self = Self::positive_zero(self.precision);
    }
    pub fn set_infinity(&mut self, negative: bool) {
        let sign = if negative {
            Sign::Negative
        } else {
            Sign::Positive
        };
        *self = Self::signed_infinity(sign, self.precision);
    }
    pub fn set_nan(&mut self) {
        *self = Self::nan(self.precision);
    }
    /// copy `other` bit for bit; both must have the same widths
    pub fn assign(&mut self, other: &Self) -> Result<()> {
        self.precision.check_matches(other.precision)?;
        self.bits = other.bits.clone();
        Ok(())
    }
    /// re-encode `value` at this value's widths
    pub fn assign_value(&mut self, value: f64) {
        *self = Self::from_f64_with_precision(value, self.precision, None);
    }

    pub fn class(&self) -> FloatClass {
        let exponent_field = self.exponent_field();
        let retval = if exponent_field == 0 {
            FloatClass::PositiveZero
        } else if exponent_field == self.precision.exponent_inf_nan() {
            if self.mantissa_field().is_zero() {
                FloatClass::PositiveInfinity
            } else {
                return FloatClass::NaN;
            }
        } else {
            FloatClass::PositiveNormal
        };
        match self.sign() {
            Sign::Positive => retval,
            Sign::Negative => -retval,
        }
    }
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.class().is_zero()
    }
    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.class().is_infinity()
    }
    #[inline]
    pub fn is_nan(&self) -> bool {
        self.class().is_nan()
    }
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.class().is_finite()
    }
    #[inline]
    pub fn is_normal(&self) -> bool {
        self.class().is_normal()
    }
    /// the sign bit is clear; NaNs and zeros included
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.sign() == Sign::Positive
    }

    /// move to another width pair, rounding to nearest with ties to even
    pub fn cast(&mut self, mantissa_bits: usize, exponent_bits: usize) -> Result<()> {
        let target = Precision::new(mantissa_bits, exponent_bits)?;
        self.cast_with_status(target, None);
        Ok(())
    }
    pub fn cast_with_status(&mut self, target: Precision, status_flags: Option<&mut StatusFlags>) {
        if target != self.precision {
            *self = self.to_precision(target, status_flags);
        }
    }
    pub fn to_precision(&self, target: Precision, status_flags: Option<&mut StatusFlags>) -> Self {
        let class = self.class();
        if class.is_nan() {
            let mut retval = Self::nan(target);
            retval.set_sign(self.sign() == Sign::Negative);
            retval
        } else if class.is_infinity() {
            Self::signed_infinity(self.sign(), target)
        } else if class.is_zero() {
            Self::signed_zero(self.sign(), target)
        } else {
            let (significand, exponent) = self.unpack_normal();
            Self::round_and_pack(
                target,
                self.sign(),
                significand,
                exponent,
                false,
                status_flags,
            )
        }
    }

    /// zero encodings with leftover mantissa bits give a signed zero, not a native subnormal
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return if self.is_positive() { 0.0 } else { -0.0 };
        }
        if self.precision == Precision::STANDARD_64 {
            f64::from_bits(low_u64(&self.bits))
        } else {
            self.to_precision(Precision::STANDARD_64, None).to_f64()
        }
    }
    pub fn to_f32(&self) -> f32 {
        if self.is_zero() {
            return if self.is_positive() { 0.0 } else { -0.0 };
        }
        if self.precision == Precision::STANDARD_32 {
            f32::from_bits(low_u64(&self.bits) as u32)
        } else {
            self.to_precision(Precision::STANDARD_32, None).to_f32()
        }
    }
    /// The exact value.
    ///
    /// `None` for infinities and NaN, and for values whose least significant bit lies more than
    /// [`MAX_EXACT_EXPONENT`] binary places from the point, where the ratio would need that many
    /// bits.
    pub fn to_ratio(&self) -> Option<Ratio<BigInt>> {
        let class = self.class();
        if !class.is_finite() {
            return None;
        }
        if class.is_zero() {
            return Some(Ratio::from_integer(BigInt::zero()));
        }
        let (_, exponent) = self.unpack_normal();
        if exponent.abs() > MAX_EXACT_EXPONENT {
            return None;
        }
        Some(self.exact_ratio())
    }
    /// exact value of a normal value; the size of the result grows with `|exponent|`, so callers
    /// bound the exponent first
    pub(crate) fn exact_ratio(&self) -> Ratio<BigInt> {
        let (significand, exponent) = self.unpack_normal();
        let mantissa = BigInt::from(significand);
        let retval = if exponent < 0 {
            Ratio::new(mantissa, BigInt::one() << (-exponent) as usize)
        } else {
            Ratio::from_integer(mantissa << exponent as usize)
        };
        match self.sign() {
            Sign::Positive => retval,
            Sign::Negative => -retval,
        }
    }

    pub fn neg(&self) -> Self {
        let mut retval = self.clone();
        retval.toggle_sign();
        retval
    }
    pub fn abs(&self) -> Self {
        let mut retval = self.clone();
        retval.set_sign(false);
        retval
    }
}

impl fmt::Debug for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let precision = self.precision;
        let mut debug_struct = f.debug_struct("FloatValue");
        debug_struct.field("precision", &precision);
        debug_struct.field(
            "bits",
            &format_args!(
                "0x{value:0width$X}",
                value = self.bits(),
                width = (precision.total_bits() + 3) / 4
            ),
        );
        debug_struct.field("sign", &self.sign());
        debug_struct.field(
            "exponent_field",
            &format_args!(
                "0x{value:0width$X}",
                value = self.exponent_field(),
                width = (precision.exponent_bits() + 3) / 4
            ),
        );
        debug_struct.field(
            "mantissa_field",
            &format_args!(
                "0x{value:0width$X}",
                value = self.mantissa_field(),
                width = (precision.mantissa_bits() + 3) / 4
            ),
        );
        debug_struct.field("class", &self.class());
        debug_struct.finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use proptest::prelude::*;

    fn native_bits(raw: u64, width: usize) -> Vec<bool> {
        (0..width).rev().map(|i| (raw >> i) & 1 != 0).collect()
    }

    fn f32_value(v: f32) -> FloatValue {
        FloatValue::from_value(23, 8, f64::from(v)).unwrap()
    }

    #[test]
    fn test_new() {
        let v = FloatValue::new(23, 8).unwrap();
        assert!(v.is_zero());
        assert!(v.is_positive());
        assert_eq!(v.to_bits(), vec![false; 32]);
        assert_eq!(v.total_bits(), 32);
        assert_eq!(
            FloatValue::new(0, 8).unwrap_err(),
            Error::InvalidPrecision {
                mantissa_bits: 0,
                exponent_bits: 8
            }
        );
        assert_eq!(
            FloatValue::from_value(4, 1, 1.0).unwrap_err(),
            Error::InvalidPrecision {
                mantissa_bits: 4,
                exponent_bits: 1
            }
        );
    }

    #[test]
    fn test_debug() {
        assert_eq!(
            &format!("{:?}", f32_value(1.0)),
            "FloatValue { precision: Precision::STANDARD_32, bits: 0x3F800000, sign: Positive, \
             exponent_field: 0x7F, mantissa_field: 0x000000, class: PositiveNormal }",
        );
        assert_eq!(
            &format!("{:?}", f32_value(f32::NEG_INFINITY)),
            "FloatValue { precision: Precision::STANDARD_32, bits: 0xFF800000, sign: Negative, \
             exponent_field: 0xFF, mantissa_field: 0x000000, class: NegativeInfinity }",
        );
        assert_eq!(
            &format!("{:?}", FloatValue::nan(Precision::STANDARD_32)),
            "FloatValue { precision: Precision::STANDARD_32, bits: 0x7FC00000, sign: Positive, \
             exponent_field: 0xFF, mantissa_field: 0x400000, class: NaN }",
        );
    }

    #[test]
    fn test_special_values() {
        macro_rules! test_case {
            ($value:expr, $nan:expr, $infinite:expr, $zero:expr, $positive:expr) => {
                let value: f64 = $value;
                let v = FloatValue::from_value(52, 11, value).unwrap();
                println!("value: {:?}", value);
                println!("v: {:?}", v);
                assert_eq!(v.is_nan(), $nan);
                assert_eq!(v.is_infinite(), $infinite);
                assert_eq!(v.is_zero(), $zero);
                assert_eq!(v.is_positive(), $positive);
            };
        }
        test_case!(f64::NAN, true, false, false, true);
        test_case!(-f64::NAN, true, false, false, false);
        test_case!(f64::INFINITY, false, true, false, true);
        test_case!(f64::NEG_INFINITY, false, true, false, false);
        test_case!(0.0, false, false, true, true);
        test_case!(-0.0, false, false, true, false);
        test_case!(-2.5, false, false, false, false);
    }

    #[test]
    fn test_nan_encoding_matches_native() {
        let v = FloatValue::from_value(52, 11, f64::NAN).unwrap();
        assert_eq!(v.to_bits(), native_bits(f64::NAN.to_bits(), 64));
        assert!(v.to_f64().is_nan());
    }

    #[test]
    fn test_rounding_ties_to_even() {
        macro_rules! test_case {
            ($value:expr, $expected:expr) => {
                let value: f64 = $value;
                let expected: f32 = $expected;
                let v = FloatValue::from_value(23, 8, value).unwrap();
                println!("value: {:e} v: {:?}", value, v);
                assert_eq!(v.to_f32().to_bits(), expected.to_bits());
                assert_eq!(v.to_f32().to_bits(), (value as f32).to_bits());
            };
        }
        let ulp = 2f64.powi(-23);
        // exactly halfway, even below: round down
        test_case!(1.0 + ulp / 2.0, 1.0);
        // exactly halfway, odd below: round up
        test_case!(1.0 + 1.5 * ulp, 1.0 + 2.0 * ulp as f32);
        // just above halfway
        test_case!(1.0 + ulp / 2.0 + ulp / 1024.0, 1.0 + ulp as f32);
        // carry out of the mantissa
        test_case!(2.0 - ulp / 4.0, 2.0);
        test_case!(-(2.0 - ulp / 4.0), -2.0);
        test_case!(0.1, 0.1);
        test_case!(f64::from(f32::MAX), f32::MAX);
    }

    #[test]
    fn test_overflow_and_underflow() {
        let mut status_flags = StatusFlags::empty();
        let v = FloatValue::from_f64_with_precision(
            1e39,
            Precision::STANDARD_32,
            Some(&mut status_flags),
        );
        assert!(v.is_infinite() && v.is_positive());
        assert_eq!(status_flags, StatusFlags::OVERFLOW | StatusFlags::INEXACT);

        // rounds up past the largest finite value
        let v = FloatValue::from_value(23, 8, f64::from(f32::MAX) * (1.0 + 2f64.powi(-24))).unwrap();
        assert!(v.is_infinite());

        let mut status_flags = StatusFlags::empty();
        let v = FloatValue::from_f64_with_precision(
            -1e-39,
            Precision::STANDARD_32,
            Some(&mut status_flags),
        );
        assert!(v.is_zero());
        assert!(!v.is_positive());
        assert_eq!(status_flags, StatusFlags::UNDERFLOW | StatusFlags::INEXACT);

        let mut status_flags = StatusFlags::empty();
        let v = FloatValue::from_f64_with_precision(
            0.5,
            Precision::STANDARD_32,
            Some(&mut status_flags),
        );
        assert_eq!(v.to_f64(), 0.5);
        assert_eq!(status_flags, StatusFlags::empty());
    }

    #[test]
    fn test_tiny_formats() {
        // 1 mantissa bit, 2 exponent bits: bias 1, finite values are +-{1, 1.5, 2, 3}
        macro_rules! test_case {
            ($value:expr, $expected:expr) => {
                let v = FloatValue::from_value(1, 2, $value).unwrap();
                println!("{} -> {:?}", $value, v);
                assert_eq!(v.to_f64(), $expected);
            };
        }
        test_case!(1.0, 1.0);
        test_case!(1.25, 1.0);
        test_case!(1.3, 1.5);
        test_case!(1.75, 2.0);
        test_case!(2.5, 2.0);
        test_case!(3.0, 3.0);
        test_case!(3.5, f64::INFINITY);
        test_case!(0.75, 0.0);
        test_case!(-1.5, -1.5);
    }

    #[test]
    fn test_setters() {
        let mut v = FloatValue::from_value(6, 4, 3.14).unwrap();
        assert_eq!(v.exponent_bit_vec(), vec![true, false, false, false]);
        v.set_mantissa_bits(&[true, true, true, true, true, false])
            .unwrap();
        assert_eq!(v.mantissa_field(), BigUint::from(0b111110u32));
        assert_eq!(v.to_f64(), 2.0 * (1.0 + 62.0 / 64.0));
        v.set_exponent_bits(&[false, true, true, true]).unwrap();
        assert_eq!(v.to_f64(), 1.0 + 62.0 / 64.0);
        assert_eq!(
            v.set_mantissa_bits(&[true; 5]),
            Err(Error::PrecisionMismatch {
                expected: (6, 4),
                found: (5, 4)
            })
        );
        assert_eq!(
            v.set_exponent_bits(&[true; 5]),
            Err(Error::PrecisionMismatch {
                expected: (6, 4),
                found: (6, 5)
            })
        );
        assert_eq!(v.to_f64(), 1.0 + 62.0 / 64.0);
        v.set_sign(true);
        assert_eq!(v.to_f64(), -(1.0 + 62.0 / 64.0));
        v.toggle_sign();
        assert!(v.is_positive());
        v.set_infinity(true);
        assert_eq!(v.to_f64(), f64::NEG_INFINITY);
        v.set_nan();
        assert!(v.is_nan());
        assert_eq!(v.mantissa_bit_vec(), vec![true, false, false, false, false, false]);
        v.set_zero();
        assert!(v.is_zero() && v.is_positive());
        v.assign_value(-0.375);
        assert_eq!(v.to_f64(), -0.375);
        assert_eq!(v.precision(), Precision::new(6, 4).unwrap());
    }

    #[test]
    fn test_assign() {
        let mut a = f32_value(1.5);
        a.assign(&f32_value(-7.25)).unwrap();
        assert_eq!(a.to_f64(), -7.25);
        let b = FloatValue::from_value(52, 11, 3.0).unwrap();
        assert_eq!(
            a.assign(&b),
            Err(Error::PrecisionMismatch {
                expected: (23, 8),
                found: (52, 11)
            })
        );
        assert_eq!(a.to_f64(), -7.25);
    }

    #[test]
    fn test_cast() {
        let mut v = FloatValue::from_value(52, 11, 1.0 / 3.0).unwrap();
        v.cast(23, 8).unwrap();
        assert_eq!(v.to_f32(), 1.0f32 / 3.0);
        assert_eq!(
            v.cast(23, 1),
            Err(Error::InvalidPrecision {
                mantissa_bits: 23,
                exponent_bits: 1
            })
        );
        assert_eq!(v.precision(), Precision::STANDARD_32);

        let mut v = FloatValue::from_value(52, 11, 1e300).unwrap();
        v.cast(23, 8).unwrap();
        assert!(v.is_infinite() && v.is_positive());

        let mut v = FloatValue::from_value(52, 11, -1e-300).unwrap();
        v.cast(23, 8).unwrap();
        assert!(v.is_zero() && !v.is_positive());

        let mut v = FloatValue::from_value(23, 8, -f64::INFINITY).unwrap();
        v.cast(5, 3).unwrap();
        assert!(v.is_infinite() && !v.is_positive());

        let mut v = FloatValue::nan(Precision::STANDARD_64);
        v.cast(23, 8).unwrap();
        assert_eq!(v.to_f32().to_bits(), 0x7FC0_0000);

        // a value whose exponent is outside the narrower exponent range
        let mut v = FloatValue::from_value(10, 8, 300.0).unwrap();
        v.cast(10, 4).unwrap();
        assert!(v.is_infinite());
    }

    #[test]
    fn test_dirty_zero_conversions() {
        macro_rules! test_case {
            ($mantissa_bits:expr, $exponent_bits:expr, $negative:expr) => {
                let mut v = FloatValue::new($mantissa_bits, $exponent_bits).unwrap();
                v.set_sign($negative);
                v.set_mantissa_bits(&[true; $mantissa_bits]).unwrap();
                println!("{:?}", v);
                assert!(v.is_zero());
                assert_eq!(v.to_f64(), 0.0);
                assert_eq!(v.to_f64().is_sign_negative(), $negative);
                assert_eq!(v.to_f32(), 0.0);
                assert_eq!(v.to_f32().is_sign_negative(), $negative);
            };
        }
        test_case!(52, 11, false);
        test_case!(52, 11, true);
        test_case!(23, 8, false);
        test_case!(23, 8, true);
        test_case!(10, 5, true);
    }

    #[test]
    fn test_to_ratio() {
        let r = |n: i64, d: i64| Some(Ratio::new(BigInt::from(n), BigInt::from(d)));
        assert_eq!(f32_value(0.0).to_ratio(), r(0, 1));
        assert_eq!(f32_value(-0.0).to_ratio(), r(0, 1));
        assert_eq!(f32_value(1.0).to_ratio(), r(1, 1));
        assert_eq!(f32_value(-0.375).to_ratio(), r(-3, 8));
        assert_eq!(f32_value(65504.0).to_ratio(), r(65504, 1));
        assert_eq!(f32_value(f32::INFINITY).to_ratio(), None);
        assert_eq!(FloatValue::nan(Precision::STANDARD_32).to_ratio(), None);
        let smallest_f64 = FloatValue::from_value(52, 11, f64::MIN_POSITIVE).unwrap();
        assert_eq!(
            smallest_f64.to_ratio(),
            Some(Ratio::new(BigInt::one(), BigInt::one() << 1022usize))
        );
    }

    #[test]
    fn test_to_ratio_wide_exponent() {
        let precision = Precision::new(4, 62).unwrap();
        let mut smallest = FloatValue::positive_zero(precision);
        smallest.set_exponent_field(1);
        assert_eq!(smallest.to_ratio(), None);
        let mut largest = FloatValue::positive_zero(precision);
        largest.set_exponent_field(precision.exponent_max_normal());
        assert_eq!(largest.to_ratio(), None);
        let v = FloatValue::from_f64_with_precision(-0.375, precision, None);
        assert_eq!(v.to_ratio(), Some(Ratio::new(BigInt::from(-3), BigInt::from(8))));
    }

    proptest! {
        #[test]
        fn round_trip_f64(value in any::<f64>().prop_filter("normal or zero", |v| v.is_normal() || *v == 0.0)) {
            let v = FloatValue::from_value(52, 11, value).unwrap();
            prop_assert_eq!(v.to_f64().to_bits(), value.to_bits());
            prop_assert_eq!(v.to_bits(), native_bits(value.to_bits(), 64));
        }

        #[test]
        fn round_trip_f32(value in any::<f32>().prop_filter("normal or zero", |v| v.is_normal() || *v == 0.0)) {
            let v = f32_value(value);
            prop_assert_eq!(v.to_f32().to_bits(), value.to_bits());
            prop_assert_eq!(v.to_bits(), native_bits(u64::from(value.to_bits()), 32));
        }

        #[test]
        fn from_f64_rounds_like_native_f32(
            base in any::<f32>().prop_filter("normal", |v| v.is_normal()),
            low_bits in 0u64..(1 << 29),
        ) {
            // fill the bits an f32 drops, so every rounding case near `base` is reachable
            let value = f64::from_bits(f64::from(base).to_bits() | low_bits);
            let native = value as f32;
            let v = FloatValue::from_value(23, 8, value).unwrap();
            prop_assert_eq!(v.to_f32().to_bits(), native.to_bits());
        }

        #[test]
        fn cast_to_own_width_is_noop(value in any::<f64>(), mantissa_bits in 1usize..60, exponent_bits in 2usize..12) {
            let v = FloatValue::from_value(mantissa_bits, exponent_bits, value).unwrap();
            let mut cast = v.clone();
            cast.cast(mantissa_bits, exponent_bits).unwrap();
            prop_assert_eq!(cast.bits(), v.bits());
        }

        #[test]
        fn widen_then_narrow(value in any::<f32>().prop_filter("normal or zero", |v| v.is_normal() || *v == 0.0)) {
            let v = f32_value(value);
            let mut round_trip = v.clone();
            round_trip.cast(52, 11).unwrap();
            prop_assert_eq!(round_trip.to_f64(), f64::from(value));
            round_trip.cast(23, 8).unwrap();
            prop_assert_eq!(round_trip.bits(), v.bits());
        }
    }
}
