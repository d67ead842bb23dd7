use super::FixedNum;

/// Denominators turning the Taylor term `x^(2k+1)/(2k+1)!` into the next one.
const SIN_TERM_DIVISORS: [i64; 4] = [2 * 3, 4 * 5, 6 * 7, 8 * 9];

/// Deterministic sine.
///
/// Reduces the angle into `[-π/2, π/2]` using the fixed-point π constants, then
/// evaluates the odd Taylor series through `x^9` in a fixed order. Maximum
/// error is a handful of raw units, which is plenty for spawn rings and
/// projectile spread.
pub fn sin(angle: FixedNum) -> FixedNum {
    let tau = FixedNum::TAU.raw();
    let mut x = FixedNum::from_raw(angle.raw().rem_euclid(tau));
    if x > FixedNum::PI {
        x = x - FixedNum::TAU;
    }
    if x > FixedNum::HALF_PI {
        x = FixedNum::PI - x;
    } else if x < -FixedNum::HALF_PI {
        x = -FixedNum::PI - x;
    }

    let x_squared = x * x;
    let mut term = x;
    let mut sum = x;
    for divisor in SIN_TERM_DIVISORS {
        term = -(term * x_squared);
        term = term.checked_div_int(divisor).unwrap_or(FixedNum::ZERO);
        sum += term;
    }
    sum.clamp(-FixedNum::ONE, FixedNum::ONE)
}

/// Deterministic cosine, `sin(angle + π/2)`.
pub fn cos(angle: FixedNum) -> FixedNum {
    sin(angle + FixedNum::HALF_PI)
}
