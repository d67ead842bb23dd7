use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, Sub, SubAssign};

use fixed::types::I48F16;
use serde::{Deserialize, Serialize};

use crate::game::error::MathError;

/// Number of fractional bits in a [`FixedNum`].
pub const FRACTIONAL_BITS: u32 = 16;

/// Newton-Raphson steps performed by [`isqrt`]. Fixed so that every platform
/// executes the exact same sequence of integer operations.
pub const SQRT_ITERATIONS: usize = 10;

const ROUNDING_BIAS: i128 = 1 << (FRACTIONAL_BITS - 1);

/// Deterministic 48.16 fixed-point scalar.
///
/// Storage is `fixed::types::I48F16`, but every arithmetic operation below is
/// written against the raw `i64` so rounding and overflow behaviour are pinned
/// down independently of build profile:
///
/// - `+`, `-`, unary `-` saturate at the representable range
/// - `*` widens to 128 bits and rounds to nearest
/// - `/` widens to 128 bits, rounds to nearest and saturates
/// - `/` and `%` by zero panic; use [`FixedNum::checked_div`],
///   [`FixedNum::try_div`] or [`FixedNum::checked_rem`] when the divisor is
///   data-dependent
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedNum(I48F16);

impl FixedNum {
    pub const ZERO: Self = Self::from_raw(0);
    pub const ONE: Self = Self::from_raw(1 << FRACTIONAL_BITS);
    pub const HALF: Self = Self::from_raw(1 << (FRACTIONAL_BITS - 1));
    /// Smallest positive value (one raw unit).
    pub const EPSILON: Self = Self::from_raw(1);
    pub const MIN: Self = Self::from_raw(i64::MIN);
    pub const MAX: Self = Self::from_raw(i64::MAX);

    /// π rounded to the nearest raw unit.
    pub const PI: Self = Self::from_raw(205_887);
    pub const HALF_PI: Self = Self::from_raw(102_944);
    pub const TAU: Self = Self::from_raw(411_775);

    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(I48F16::from_bits(raw))
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0.to_bits()
    }

    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self::from_raw((value as i64) << FRACTIONAL_BITS)
    }

    /// `numerator / denominator` rounded to nearest. Intended for constants
    /// such as `from_ratio(3, 2)`; panics on a zero denominator.
    pub fn from_ratio(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "FixedNum::from_ratio with zero denominator");
        Self::from_raw(saturate(div_round((numerator as i128) << FRACTIONAL_BITS, denominator as i128)))
    }

    /// Boundary conversion for authored (float) data. NaN maps to zero and
    /// out-of-range values saturate. Never call this inside the tick path.
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(value as f64)
    }

    /// See [`FixedNum::from_f32`].
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(I48F16::saturating_from_num(value))
    }

    /// Integer part, rounded toward negative infinity.
    #[inline]
    pub const fn to_int(self) -> i64 {
        self.raw() >> FRACTIONAL_BITS
    }

    /// Presentation-only conversion.
    pub fn to_f64(self) -> f64 {
        self.0.to_num::<f64>()
    }

    /// Presentation-only conversion.
    pub fn to_f32(self) -> f32 {
        self.0.to_num::<f32>()
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.raw() == 0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.raw() < 0
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self::from_raw(self.raw().saturating_abs())
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        if other < self { other } else { self }
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        if other > self { other } else { self }
    }

    /// Clamp into `[lo, hi]`. When `lo > hi` the result is `lo`.
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        self.min(hi).max(lo)
    }

    /// Linear interpolation with `t` clamped into `[0, 1]`.
    pub fn lerp(self, other: Self, t: Self) -> Self {
        let t = t.clamp(Self::ZERO, Self::ONE);
        self + (other - self) * t
    }

    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        let numerator = (self.raw() as i128) << FRACTIONAL_BITS;
        Some(Self::from_raw(saturate(div_round(numerator, rhs.raw() as i128))))
    }

    pub fn try_div(self, rhs: Self) -> Result<Self, MathError> {
        self.checked_div(rhs).ok_or(MathError::DivisionByZero)
    }

    /// Divide by a plain integer, rounding to nearest.
    pub fn checked_div_int(self, rhs: i64) -> Option<Self> {
        if rhs == 0 {
            return None;
        }
        Some(Self::from_raw(saturate(div_round(self.raw() as i128, rhs as i128))))
    }

    /// Remainder with the sign of the dividend, `None` for a zero divisor.
    pub fn checked_rem(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        // i64::MIN % -1 is the only overflowing case and its remainder is 0.
        Some(Self::from_raw(self.raw().checked_rem(rhs.raw()).unwrap_or(0)))
    }

    /// Square root via [`isqrt`] on the raw value shifted up by the
    /// fractional bits, so the result keeps full precision.
    pub fn try_sqrt(self) -> Result<Self, MathError> {
        if self.is_negative() {
            return Err(MathError::NegativeSqrt);
        }
        let root = isqrt((self.raw() as u128) << FRACTIONAL_BITS);
        Ok(Self::from_raw(root as i64))
    }

    /// Panics on negative input; see [`FixedNum::try_sqrt`].
    pub fn sqrt(self) -> Self {
        match self.try_sqrt() {
            Ok(root) => root,
            Err(_) => panic!("FixedNum::sqrt of negative value {self}"),
        }
    }
}

/// Deterministic integer square root (floor) using a fixed number of
/// Newton-Raphson iterations.
///
/// The initial guess `2^ceil(bits/2)` is never below the true root and at most
/// twice it, so [`SQRT_ITERATIONS`] steps always converge for 128-bit input.
/// Steps are never skipped: once converged, `min` keeps the estimate stable.
pub fn isqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let bits = 128 - n.leading_zeros();
    let mut y: u128 = 1 << ((bits + 1) / 2);
    for _ in 0..SQRT_ITERATIONS {
        let next = (y + n / y) >> 1;
        y = y.min(next);
    }
    y
}

#[inline]
pub(crate) fn saturate(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Signed division rounding half away from zero.
#[inline]
pub(crate) fn div_round(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if 2 * remainder.abs() >= denominator.abs() {
        if (numerator < 0) == (denominator < 0) {
            quotient + 1
        } else {
            quotient - 1
        }
    } else {
        quotient
    }
}

// ============================================================================
// Operators
// ============================================================================

impl Add for FixedNum {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::from_raw(self.raw().saturating_add(rhs.raw()))
    }
}

impl Sub for FixedNum {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(self.raw().saturating_sub(rhs.raw()))
    }
}

impl Neg for FixedNum {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::from_raw(self.raw().saturating_neg())
    }
}

impl Mul for FixedNum {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let product = self.raw() as i128 * rhs.raw() as i128;
        Self::from_raw(saturate((product + ROUNDING_BIAS) >> FRACTIONAL_BITS))
    }
}

impl Div for FixedNum {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(rhs) {
            Some(quotient) => quotient,
            None => panic!("FixedNum division by zero ({self} / 0)"),
        }
    }
}

impl Rem for FixedNum {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        match self.checked_rem(rhs) {
            Some(remainder) => remainder,
            None => panic!("FixedNum remainder by zero ({self} % 0)"),
        }
    }
}

impl AddAssign for FixedNum {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for FixedNum {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for FixedNum {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for FixedNum {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Sum for FixedNum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, value| acc + value)
    }
}

impl From<i32> for FixedNum {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl fmt::Display for FixedNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}

impl fmt::Debug for FixedNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedNum({:.4} / raw {})", self.to_f64(), self.raw())
    }
}
