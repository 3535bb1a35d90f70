// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

//! Bit-level simulation of floating-point arithmetic at arbitrary mantissa and exponent widths,
//! and a mixed-precision iterative-refinement linear solver built on it.

use bitflags::bitflags;
use std::ops::Mul;
use std::ops::MulAssign;
use std::ops::Neg;

pub mod agreement;
pub mod arith;
pub mod compare;
pub mod error;
pub mod float;
pub mod format;
pub mod linalg;
pub mod precision;
pub mod solver;

pub use error::{Error, Result};
pub use float::FloatValue;
pub use precision::Precision;
pub use solver::{Evaluation, LinearSystem, Matrix, SolverConfig};

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Sign {
    Positive = 0,
    Negative = 1,
}

impl Neg for Sign {
    type Output = Self;
    fn neg(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

impl Mul for Sign {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        match self {
            Self::Positive => rhs,
            Self::Negative => -rhs,
        }
    }
}

impl MulAssign for Sign {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

bitflags! {
    /// IEEE 754 exception conditions raised by a rounding operation
    pub struct StatusFlags: u32 {
        const INVALID_OPERATION = 0b00001;
        const DIVISION_BY_ZERO = 0b00010;
        const OVERFLOW = 0b00100;
        const UNDERFLOW = 0b01000;
        const INEXACT = 0b10000;
    }
}

impl Default for StatusFlags {
    fn default() -> Self {
        StatusFlags::empty()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FloatClass {
    NegativeInfinity,
    NegativeNormal,
    NegativeZero,
    PositiveInfinity,
    PositiveNormal,
    PositiveZero,
    NaN,
}

impl FloatClass {
    #[inline]
    pub fn sign(self) -> Option<Sign> {
        match self {
            FloatClass::NegativeInfinity | FloatClass::NegativeNormal | FloatClass::NegativeZero => {
                Some(Sign::Negative)
            }
            FloatClass::PositiveInfinity | FloatClass::PositiveNormal | FloatClass::PositiveZero => {
                Some(Sign::Positive)
            }
            FloatClass::NaN => None,
        }
    }
    #[inline]
    pub fn abs(self) -> Self {
        match self {
            FloatClass::NegativeInfinity => FloatClass::PositiveInfinity,
            FloatClass::NegativeNormal => FloatClass::PositiveNormal,
            FloatClass::NegativeZero => FloatClass::PositiveZero,
            _ => self,
        }
    }
    #[inline]
    pub fn is_negative_infinity(self) -> bool {
        self == FloatClass::NegativeInfinity
    }
    #[inline]
    pub fn is_positive_infinity(self) -> bool {
        self == FloatClass::PositiveInfinity
    }
    #[inline]
    pub fn is_infinity(self) -> bool {
        self == FloatClass::NegativeInfinity || self == FloatClass::PositiveInfinity
    }
    #[inline]
    pub fn is_normal(self) -> bool {
        self == FloatClass::NegativeNormal || self == FloatClass::PositiveNormal
    }
    #[inline]
    pub fn is_zero(self) -> bool {
        self == FloatClass::NegativeZero || self == FloatClass::PositiveZero
    }
    #[inline]
    pub fn is_nan(self) -> bool {
        self == FloatClass::NaN
    }
    #[inline]
    pub fn is_finite(self) -> bool {
        self.is_zero() || self.is_normal()
    }
}

impl Neg for FloatClass {
    type Output = Self;
    fn neg(self) -> Self {
        use FloatClass::*;
        match self {
            NegativeInfinity => PositiveInfinity,
            NegativeNormal => PositiveNormal,
            NegativeZero => PositiveZero,
            PositiveInfinity => NegativeInfinity,
            PositiveNormal => NegativeNormal,
            PositiveZero => NegativeZero,
            NaN => NaN,
        }
    }
}


macro_rules! doctest {
    ($x:expr) => {
        #[doc = $x]
        extern "C" {}
    };
}

doctest!(include_str!("../README.md"));
