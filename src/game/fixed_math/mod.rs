//! Deterministic fixed-point mathematics library.
//!
//! This module provides deterministic math types and operations using fixed-point
//! arithmetic to ensure identical behavior across different platforms and architectures.
//! Replays depend on it: two runs fed the same commands must produce bit-identical
//! state, so no floating point value ever enters the tick path.
//!
//! Floats appear only at the edges: [`FixedNum::from_f32`] for authored
//! configuration and [`FixedNum::to_f32`] for presentation.

pub use scalar::{isqrt, FixedNum, FRACTIONAL_BITS, SQRT_ITERATIONS};
pub use trig::{cos, sin};
pub use vec2::FixedVec2;
pub use vec3::FixedVec3;

mod scalar;
mod trig;
mod vec2;
mod vec3;

#[cfg(test)]
mod tests;

/// Maximum distance, in raw units, from exact unit length at which a vector is
/// considered already normalized.
pub const NORMALIZE_TOLERANCE: u128 = 4;

const ONE_RAW: u128 = 1 << FRACTIONAL_BITS;

/// Sum of squared raw components, exact in 128 bits for up to three components.
fn raw_length_squared(components: &[FixedNum]) -> u128 {
    components
        .iter()
        .map(|c| {
            let magnitude = c.raw().unsigned_abs() as u128;
            magnitude * magnitude
        })
        .sum()
}

/// Exact vector length from the 128-bit sum of raw squares.
pub(crate) fn exact_length(components: &[FixedNum]) -> FixedNum {
    let root = isqrt(raw_length_squared(components));
    FixedNum::from_raw(root.min(i64::MAX as u128) as i64)
}

/// Normalizes `components` in place.
///
/// The length is taken at 32 extra fractional bits whenever the squared sum
/// leaves room for it, so each output component is within about one raw unit
/// of the true quotient. Inputs already within [`NORMALIZE_TOLERANCE`] of unit
/// length are returned untouched, which makes normalization idempotent.
pub(crate) fn normalize_components<const N: usize>(components: [FixedNum; N]) -> [FixedNum; N] {
    let sum = raw_length_squared(&components);
    if sum == 0 {
        return components;
    }
    let length = isqrt(sum);
    if length.abs_diff(ONE_RAW) <= NORMALIZE_TOLERANCE {
        return components;
    }

    let (scaled_length, shift) = if sum < (1u128 << 95) {
        (isqrt(sum << 32), 32)
    } else {
        (length, FRACTIONAL_BITS)
    };

    components.map(|c| {
        let numerator = (c.raw() as i128) << shift;
        FixedNum::from_raw(scalar::saturate(scalar::div_round(numerator, scaled_length as i128)))
    })
}
