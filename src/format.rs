// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::float::{FloatValue, MAX_EXACT_EXPONENT};
use crate::Sign;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::Ratio;
use num_traits::{pow, One, Signed, Zero};
use std::fmt;

/// fractional digits printed when no precision is requested
pub const DEFAULT_FRACTION_DIGITS: u32 = 6;

fn bit_char(bit: bool) -> char {
    if bit {
        '1'
    } else {
        '0'
    }
}

impl FloatValue {
    /// Decimal rendering of the exact encoded value with `fraction_digits` digits after the
    /// point (6 when `None`), rounding halfway cases away from zero.
    ///
    /// Infinities print as `inf`/`-inf` and NaNs as `nan`/`-nan`. The sign is kept for zeros
    /// and for negative values that round to zero. Values with a least significant bit above
    /// 2^[`MAX_EXACT_EXPONENT`] are far outside the `f64` range and print as their `f64`
    /// conversion does.
    pub fn to_string(&self, fraction_digits: Option<u32>) -> String {
        let fraction_digits = fraction_digits.unwrap_or(DEFAULT_FRACTION_DIGITS);
        let sign = match self.sign() {
            Sign::Positive => "",
            Sign::Negative => "-",
        };
        let class = self.class();
        if class.is_nan() {
            return format!("{}nan", sign);
        }
        if class.is_infinity() {
            return format!("{}inf", sign);
        }
        let value = if class.is_zero() {
            Ratio::from_integer(BigInt::zero())
        } else {
            let (_, exponent) = self.unpack_normal();
            // the magnitude is below 2^magnitude_exponent
            let magnitude_exponent = exponent + self.mantissa_bits() as i64 + 1;
            // 2^(-4 * digits - 2) is below half a unit in the last printed digit
            if magnitude_exponent < -(4 * i64::from(fraction_digits) + 1) {
                Ratio::from_integer(BigInt::zero())
            } else if exponent > MAX_EXACT_EXPONENT {
                return format!(
                    "{}{:.*}",
                    sign,
                    fraction_digits as usize,
                    self.to_f64().abs()
                );
            } else {
                self.exact_ratio().abs()
            }
        };
        let fraction_digits = fraction_digits as usize;
        let scale = pow(BigInt::from(10u32), fraction_digits);
        let half = Ratio::new(BigInt::one(), BigInt::from(2u32));
        let scaled = (value * Ratio::from_integer(scale.clone()) + half)
            .floor()
            .to_integer();
        if fraction_digits == 0 {
            return format!("{}{}", sign, scaled);
        }
        let (integer_part, fraction_part) = scaled.div_rem(&scale);
        format!(
            "{}{}.{:0width$}",
            sign,
            integer_part,
            fraction_part,
            width = fraction_digits
        )
    }

    /// the encoding as `"s eeee mmmm"`: sign bit, exponent field and mantissa field
    pub fn print(&self) -> String {
        let mut retval = String::with_capacity(self.total_bits() + 2);
        retval.push(bit_char(self.sign() == Sign::Negative));
        retval.push(' ');
        retval.extend(self.exponent_bit_vec().into_iter().map(bit_char));
        retval.push(' ');
        retval.extend(self.mantissa_bit_vec().into_iter().map(bit_char));
        retval
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_string(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::Precision;
    use num_bigint::BigUint;

    #[test]
    fn test_to_string() {
        macro_rules! test_case {
            ($mantissa_bits:expr, $exponent_bits:expr, $value:expr, $digits:expr, $expected:expr) => {
                let v = FloatValue::from_value($mantissa_bits, $exponent_bits, $value).unwrap();
                println!("{:?}", v);
                assert_eq!(v.to_string($digits), $expected);
            };
        }
        test_case!(52, 11, 1.0, None, "1.000000");
        test_case!(52, 11, -2.5, None, "-2.500000");
        test_case!(52, 11, 1e20, None, "100000000000000000000.000000");
        test_case!(52, 11, 0.0, None, "0.000000");
        test_case!(52, 11, -0.0, None, "-0.000000");
        test_case!(52, 11, -1e-9, None, "-0.000000");
        test_case!(52, 11, 1.0 / 3.0, Some(17), "0.33333333333333331");
        test_case!(52, 11, 0.1, Some(20), "0.10000000000000000555");
        test_case!(52, 11, 2.5, Some(0), "3");
        test_case!(52, 11, -2.5, Some(0), "-3");
        test_case!(52, 11, 0.125, Some(2), "0.13");
        test_case!(52, 11, 0.123, Some(2), "0.12");
        test_case!(52, 11, 9.999, Some(2), "10.00");
        test_case!(23, 8, 0.1, Some(10), "0.1000000015");
        // 3.14 is stored as 3.125 with 6 mantissa bits
        test_case!(6, 4, 3.14, None, "3.125000");
        test_case!(6, 4, 3.14, Some(2), "3.13");
        test_case!(52, 11, f64::INFINITY, None, "inf");
        test_case!(52, 11, f64::NEG_INFINITY, Some(3), "-inf");
        test_case!(52, 11, f64::NAN, None, "nan");
        test_case!(52, 11, -f64::NAN, None, "-nan");
    }

    #[test]
    fn test_to_string_wide_exponent() {
        let precision = Precision::new(4, 62).unwrap();
        let mut smallest = FloatValue::positive_zero(precision);
        smallest.set_exponent_field(1);
        smallest.set_mantissa_field(BigUint::from(0b1010u32));
        println!("{:?}", smallest);
        assert_eq!(smallest.to_string(Some(2)), "0.00");
        assert_eq!(smallest.to_string(Some(0)), "0");
        assert_eq!((-&smallest).to_string(None), "-0.000000");

        let mut largest = FloatValue::positive_zero(precision);
        largest.set_exponent_field(precision.exponent_max_normal());
        largest.set_mantissa_field(BigUint::from(0b1111u32));
        println!("{:?}", largest);
        assert_eq!(largest.to_string(Some(2)), "inf");
        assert_eq!((-&largest).to_string(None), "-inf");

        macro_rules! test_case {
            ($value:expr, $digits:expr, $expected:expr) => {
                let v = FloatValue::from_f64_with_precision($value, precision, None);
                println!("{:?}", v);
                assert_eq!(v.to_string($digits), $expected);
            };
        }
        test_case!(1.5, Some(2), "1.50");
        test_case!(1e-300, Some(2), "0.00");
        test_case!(-1e-300, None, "-0.000000");
        test_case!(2f64.powi(1000), Some(0), "10715086071862673209484250490600018105614048117055336074437503883703510511249361224931983788156958581275946729175531468251871452856923140435984577574698574803934567774824230985421074605062371141877954182153046474983581941267398767559165543946077062914571196477686542167660429831652624386837205668069376");
        // 2^-10 is within reach of 3 digits but not of 2
        test_case!(2f64.powi(-10), Some(3), "0.001");
        test_case!(2f64.powi(-10), Some(2), "0.00");
        test_case!(-2f64.powi(-10), Some(2), "-0.00");
    }

    #[test]
    fn test_display() {
        let v = FloatValue::from_value(23, 8, -0.75).unwrap();
        assert_eq!(format!("{}", v), "-0.750000");
        assert_eq!(
            format!("{}", FloatValue::nan(Precision::STANDARD_32)),
            "nan"
        );
    }

    #[test]
    fn test_print() {
        macro_rules! test_case {
            ($mantissa_bits:expr, $exponent_bits:expr, $value:expr, $expected:expr) => {
                let v = FloatValue::from_value($mantissa_bits, $exponent_bits, $value).unwrap();
                println!("{:?}", v);
                assert_eq!(v.print(), $expected);
            };
        }
        test_case!(6, 4, 3.14, "0 1000 100100");
        test_case!(6, 4, -0.0, "1 0000 000000");
        test_case!(6, 4, f64::INFINITY, "0 1111 000000");
        test_case!(6, 4, f64::NAN, "0 1111 100000");
        test_case!(
            23,
            8,
            1.0,
            "0 01111111 00000000000000000000000"
        );
        test_case!(
            23,
            8,
            -1.5,
            "1 01111111 10000000000000000000000"
        );
    }
}
