// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::error::Result;
use crate::float::FloatValue;
use crate::Sign;
use num_bigint::BigUint;
use num_traits::Zero;
use std::cmp::Ordering;

impl FloatValue {
    /// the encoding without its sign bit; zero for every zero encoding
    fn magnitude_bits(&self) -> BigUint {
        if self.is_zero() {
            BigUint::zero()
        } else {
            self.bits() & (self.precision().overall_mask() >> 1usize)
        }
    }
    /// IEEE 754 ordering: `None` if either side is NaN, and zeros compare equal
    /// whatever their signs
    pub fn compare(&self, rhs: &Self) -> Result<Option<Ordering>> {
        self.precision().check_matches(rhs.precision())?;
        if self.is_nan() || rhs.is_nan() {
            return Ok(None);
        }
        if self.is_zero() && rhs.is_zero() {
            return Ok(Some(Ordering::Equal));
        }
        Ok(Some(match (self.sign(), rhs.sign()) {
            (Sign::Positive, Sign::Negative) => Ordering::Greater,
            (Sign::Negative, Sign::Positive) => Ordering::Less,
            (Sign::Positive, Sign::Positive) => self.magnitude_bits().cmp(&rhs.magnitude_bits()),
            (Sign::Negative, Sign::Negative) => rhs.magnitude_bits().cmp(&self.magnitude_bits()),
        }))
    }
    pub fn equals(&self, rhs: &Self) -> Result<bool> {
        Ok(self.compare(rhs)? == Some(Ordering::Equal))
    }
    /// `true` when either side is NaN
    pub fn not_equals(&self, rhs: &Self) -> Result<bool> {
        Ok(self.compare(rhs)? != Some(Ordering::Equal))
    }
    pub fn less_than(&self, rhs: &Self) -> Result<bool> {
        Ok(self.compare(rhs)? == Some(Ordering::Less))
    }
    pub fn less_or_equal(&self, rhs: &Self) -> Result<bool> {
        Ok(match self.compare(rhs)? {
            Some(Ordering::Less) | Some(Ordering::Equal) => true,
            _ => false,
        })
    }
    pub fn greater_than(&self, rhs: &Self) -> Result<bool> {
        Ok(self.compare(rhs)? == Some(Ordering::Greater))
    }
    pub fn greater_or_equal(&self, rhs: &Self) -> Result<bool> {
        Ok(match self.compare(rhs)? {
            Some(Ordering::Greater) | Some(Ordering::Equal) => true,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;

    fn f64_value(v: f64) -> FloatValue {
        FloatValue::from_value(52, 11, v).unwrap()
    }

    #[test]
    fn test_compare() {
        macro_rules! test_case {
            ($lhs:expr, $rhs:expr, $expected:expr) => {
                let lhs = f64_value($lhs);
                let rhs = f64_value($rhs);
                let expected: Option<Ordering> = $expected;
                println!("lhs: {:?}\nrhs: {:?}", lhs, rhs);
                assert_eq!(lhs.compare(&rhs).unwrap(), expected);
                assert_eq!(lhs.equals(&rhs).unwrap(), expected == Some(Ordering::Equal));
                assert_eq!(lhs.not_equals(&rhs).unwrap(), expected != Some(Ordering::Equal));
                assert_eq!(lhs.less_than(&rhs).unwrap(), expected == Some(Ordering::Less));
                assert_eq!(lhs.greater_than(&rhs).unwrap(), expected == Some(Ordering::Greater));
                assert_eq!(
                    lhs.less_or_equal(&rhs).unwrap(),
                    expected.map_or(false, |v| v != Ordering::Greater)
                );
                assert_eq!(
                    lhs.greater_or_equal(&rhs).unwrap(),
                    expected.map_or(false, |v| v != Ordering::Less)
                );
            };
        }
        test_case!(1.0, 1.0, Some(Ordering::Equal));
        test_case!(1.0, 2.0, Some(Ordering::Less));
        test_case!(2.0, 1.0, Some(Ordering::Greater));
        test_case!(-1.0, -2.0, Some(Ordering::Greater));
        test_case!(-2.0, 1.0, Some(Ordering::Less));
        test_case!(0.0, -0.0, Some(Ordering::Equal));
        test_case!(-0.0, 0.0, Some(Ordering::Equal));
        test_case!(-0.0, 1e-300, Some(Ordering::Less));
        test_case!(-0.0, -1e-300, Some(Ordering::Greater));
        test_case!(0.0, -1e-300, Some(Ordering::Greater));
        test_case!(f64::INFINITY, f64::MAX, Some(Ordering::Greater));
        test_case!(f64::NEG_INFINITY, -f64::MAX, Some(Ordering::Less));
        test_case!(f64::INFINITY, f64::INFINITY, Some(Ordering::Equal));
        test_case!(f64::NAN, f64::NAN, None);
        test_case!(f64::NAN, 1.0, None);
        test_case!(0.0, f64::NAN, None);
        test_case!(f64::INFINITY, -f64::NAN, None);
    }

    #[test]
    fn test_dirty_zero() {
        // zeros with mantissa bits left over still compare as zero
        let mut dirty = f64_value(-0.0);
        dirty.set_mantissa_bits(&[true; 52]).unwrap();
        assert!(dirty.equals(&f64_value(0.0)).unwrap());
        assert!(dirty.less_than(&f64_value(1e-300)).unwrap());
        assert!(dirty.greater_than(&f64_value(-1e-300)).unwrap());
    }

    #[test]
    fn test_precision_mismatch() {
        let a = FloatValue::from_value(23, 8, 1.0).unwrap();
        let b = f64_value(1.0);
        let expected = Error::PrecisionMismatch {
            expected: (23, 8),
            found: (52, 11),
        };
        assert_eq!(a.compare(&b), Err(expected.clone()));
        assert_eq!(a.equals(&b), Err(expected.clone()));
        assert_eq!(a.not_equals(&b), Err(expected.clone()));
        assert_eq!(a.less_than(&b), Err(expected.clone()));
        assert_eq!(a.less_or_equal(&b), Err(expected.clone()));
        assert_eq!(a.greater_than(&b), Err(expected.clone()));
        assert_eq!(a.greater_or_equal(&b), Err(expected));
    }

    proptest! {
        #[test]
        fn compare_matches_native(a in any::<f64>(), b in any::<f64>()) {
            prop_assume!(!a.is_subnormal() && !b.is_subnormal());
            prop_assert_eq!(f64_value(a).compare(&f64_value(b)).unwrap(), a.partial_cmp(&b));
        }
    }
}
