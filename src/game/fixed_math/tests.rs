use super::*;
use crate::game::error::MathError;

fn approx(actual: FixedNum, expected: FixedNum, tolerance_raw: i64) -> bool {
    (actual.raw() - expected.raw()).abs() <= tolerance_raw
}

#[test]
fn test_integer_round_trip() {
    for value in [-1000, -1, 0, 1, 7, 30, 1_000_000] {
        let fixed = FixedNum::from_int(value);
        assert_eq!(fixed.to_int(), value as i64);
        assert_eq!(fixed.raw(), (value as i64) << FRACTIONAL_BITS);
    }
}

#[test]
fn test_to_int_floors() {
    assert_eq!(FixedNum::from_ratio(3, 2).to_int(), 1);
    assert_eq!(FixedNum::from_ratio(-3, 2).to_int(), -2, "to_int rounds toward negative infinity");
}

#[test]
fn test_mul_rounds_to_nearest() {
    assert_eq!(FixedNum::from_ratio(3, 2) * FixedNum::from_int(2), FixedNum::from_int(3));
    assert_eq!(FixedNum::HALF * FixedNum::HALF, FixedNum::from_raw(16_384));
    // 1 raw * 0.5 = 0.5 raw, rounds up
    assert_eq!(FixedNum::EPSILON * FixedNum::HALF, FixedNum::EPSILON);
}

#[test]
fn test_div_rounds_to_nearest() {
    assert_eq!((FixedNum::ONE / FixedNum::from_int(3)).raw(), 21_845);
    assert_eq!((FixedNum::from_int(2) / FixedNum::from_int(3)).raw(), 43_691);
    assert_eq!((-FixedNum::from_int(2) / FixedNum::from_int(3)).raw(), -43_691);
}

#[test]
fn test_checked_division_by_zero() {
    assert_eq!(FixedNum::ONE.checked_div(FixedNum::ZERO), None);
    assert_eq!(FixedNum::ONE.try_div(FixedNum::ZERO), Err(MathError::DivisionByZero));
    assert_eq!(FixedNum::ONE.checked_rem(FixedNum::ZERO), None);
    assert_eq!(FixedNum::ONE.checked_div_int(0), None);
}

#[test]
#[should_panic(expected = "division by zero")]
fn test_div_operator_panics_on_zero() {
    let _ = FixedNum::from_int(5) / FixedNum::ZERO;
}

#[test]
#[should_panic(expected = "remainder by zero")]
fn test_rem_operator_panics_on_zero() {
    let _ = FixedNum::from_int(5) % FixedNum::ZERO;
}

#[test]
fn test_rem() {
    assert_eq!(FixedNum::from_int(7) % FixedNum::from_int(3), FixedNum::ONE);
    assert_eq!(FixedNum::from_int(-7) % FixedNum::from_int(3), -FixedNum::ONE);
}

#[test]
fn test_saturation() {
    assert_eq!(FixedNum::MAX + FixedNum::ONE, FixedNum::MAX);
    assert_eq!(FixedNum::MIN - FixedNum::ONE, FixedNum::MIN);
    assert_eq!(-FixedNum::MIN, FixedNum::MAX);
    assert_eq!(FixedNum::MAX * FixedNum::from_int(2), FixedNum::MAX);
    assert_eq!(FixedNum::MAX / FixedNum::EPSILON, FixedNum::MAX);
}

#[test]
fn test_min_max_clamp_abs() {
    let a = FixedNum::from_int(-3);
    let b = FixedNum::from_int(4);
    assert_eq!(a.min(b), a);
    assert_eq!(a.max(b), b);
    assert_eq!(a.abs(), FixedNum::from_int(3));
    assert_eq!(FixedNum::from_int(10).clamp(a, b), b);
    assert_eq!(FixedNum::from_int(-10).clamp(a, b), a);
}

#[test]
fn test_lerp_clamps_t() {
    let from = FixedNum::ZERO;
    let to = FixedNum::from_int(10);
    assert_eq!(from.lerp(to, FixedNum::HALF), FixedNum::from_int(5));
    assert_eq!(from.lerp(to, FixedNum::from_int(2)), to);
    assert_eq!(from.lerp(to, -FixedNum::ONE), from);
}

#[test]
fn test_sqrt() {
    assert_eq!(FixedNum::from_int(4).sqrt(), FixedNum::from_int(2));
    assert_eq!(FixedNum::ZERO.sqrt(), FixedNum::ZERO);
    // floor(sqrt(2) * 65536)
    assert_eq!(FixedNum::from_int(2).sqrt().raw(), 92_681);
    assert_eq!(FixedNum::from_int(-1).try_sqrt(), Err(MathError::NegativeSqrt));
}

#[test]
#[should_panic(expected = "negative")]
fn test_sqrt_panics_on_negative() {
    let _ = FixedNum::from_int(-4).sqrt();
}

#[test]
fn test_isqrt_is_floor_root() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let mut samples: Vec<u128> = (0..2_000).map(|_| rng.u128(..)).collect();
    samples.extend((0..2_000).map(|_| rng.u64(..) as u128));
    samples.extend([0, 1, 2, 3, 4, 15, 16, 17, u64::MAX as u128, u128::MAX]);

    for n in samples {
        let root = isqrt(n);
        assert!(root * root <= n, "isqrt({n}) = {root} is too large");
        let next = root + 1;
        assert!(
            next.checked_mul(next).map_or(true, |sq| n < sq),
            "isqrt({n}) = {root} is too small"
        );
    }
}

#[test]
fn test_from_float_boundary() {
    assert_eq!(FixedNum::from_f32(1.5).raw(), 98_304);
    assert_eq!(FixedNum::from_f32(-0.25), -FixedNum::from_ratio(1, 4));
    assert_eq!(FixedNum::from_f32(f32::NAN), FixedNum::ZERO);
    assert_eq!(FixedNum::from_f64(1e300), FixedNum::MAX);
}

#[test]
fn test_trig_reference_points() {
    assert_eq!(sin(FixedNum::ZERO), FixedNum::ZERO);
    assert!(approx(sin(FixedNum::HALF_PI), FixedNum::ONE, 8));
    assert!(approx(sin(-FixedNum::HALF_PI), -FixedNum::ONE, 8));
    assert!(approx(sin(FixedNum::PI), FixedNum::ZERO, 8));
    assert!(approx(cos(FixedNum::ZERO), FixedNum::ONE, 8));
    assert!(approx(cos(FixedNum::PI), -FixedNum::ONE, 8));
    // sin(π/6) = 0.5
    let sixth = FixedNum::PI.checked_div_int(6).unwrap();
    assert!(approx(sin(sixth), FixedNum::HALF, 8));
    // Periodicity
    assert!(approx(sin(sixth + FixedNum::TAU * FixedNum::from_int(3)), FixedNum::HALF, 16));
}

#[test]
fn test_vec2_length_exact() {
    let v = FixedVec2::from_int(3, 4);
    assert_eq!(v.length(), FixedNum::from_int(5));
    assert_eq!(v.length_squared(), FixedNum::from_int(25));
    assert_eq!(FixedVec2::ZERO.distance(v), FixedNum::from_int(5));
    assert_eq!(FixedVec2::ZERO.distance_squared(v), FixedNum::from_int(25));
}

#[test]
fn test_vec2_normalize() {
    let n = FixedVec2::from_int(3, 4).normalize();
    // 0.6 and 0.8 rounded to nearest raw unit
    assert_eq!(n.x.raw(), 39_322);
    assert_eq!(n.y.raw(), 52_429);
    assert_eq!(FixedVec2::ZERO.normalize(), FixedVec2::ZERO);
    assert_eq!(FixedVec2::X.normalize(), FixedVec2::X);
}

#[test]
fn test_normalize_is_idempotent() {
    let mut rng = fastrand::Rng::with_seed(42);
    let span = 1i64 << 40;
    for _ in 0..5_000 {
        let v = FixedVec2::new(
            FixedNum::from_raw(rng.i64(-span..span)),
            FixedNum::from_raw(rng.i64(-span..span)),
        );
        let once = v.normalize();
        assert_eq!(once.normalize(), once, "normalize not idempotent for {v:?}");

        let w = FixedVec3::new(
            FixedNum::from_raw(rng.i64(-span..span)),
            FixedNum::from_raw(rng.i64(-span..span)),
            FixedNum::from_raw(rng.i64(-span..span)),
        );
        let once = w.normalize();
        assert_eq!(once.normalize(), once, "normalize not idempotent for {w:?}");
    }
}

#[test]
fn test_normalize_tiny_vectors() {
    let v = FixedVec2::new(FixedNum::EPSILON, FixedNum::EPSILON).normalize();
    assert!(v.length().raw().abs_diff(FixedNum::ONE.raw()) <= NORMALIZE_TOLERANCE as u64);
}

#[test]
fn test_vec3_cross_and_dot() {
    let x = FixedVec3::from_int(1, 0, 0);
    let y = FixedVec3::from_int(0, 1, 0);
    assert_eq!(x.cross(y), FixedVec3::from_int(0, 0, 1));
    assert_eq!(x.dot(y), FixedNum::ZERO);
    assert_eq!(FixedVec3::from_int(2, 3, 6).length(), FixedNum::from_int(7));
}

#[test]
fn test_vec2_cross_is_signed_area() {
    assert_eq!(FixedVec2::X.cross(FixedVec2::Y), FixedNum::ONE);
    assert_eq!(FixedVec2::Y.cross(FixedVec2::X), -FixedNum::ONE);
}

#[test]
fn test_ground_plane_mapping() {
    let v = FixedVec2::from_int(3, -7);
    let lifted = v.to_3d(FixedNum::from_int(2));
    assert_eq!(lifted, FixedVec3::from_int(3, 2, -7));
    assert_eq!(lifted.to_ground(), v);
}

#[test]
fn test_vec_lerp() {
    let a = FixedVec2::ZERO;
    let b = FixedVec2::from_int(10, -10);
    assert_eq!(a.lerp(b, FixedNum::HALF), FixedVec2::from_int(5, -5));
    assert_eq!(a.lerp(b, FixedNum::from_int(3)), b);
}

#[test]
fn test_rotate_quarter_turn() {
    let rotated = FixedVec2::X.rotate(FixedNum::HALF_PI);
    assert!(approx(rotated.x, FixedNum::ZERO, 8));
    assert!(approx(rotated.y, FixedNum::ONE, 8));
}

#[test]
fn test_closest_point_on_segment() {
    let a = FixedVec2::ZERO;
    let b = FixedVec2::from_int(2, 0);
    assert_eq!(FixedVec2::from_int(1, 1).closest_point_on_segment(a, b), FixedVec2::from_int(1, 0));
    assert_eq!(FixedVec2::from_int(-5, 1).closest_point_on_segment(a, b), a);
    assert_eq!(FixedVec2::from_int(9, 9).closest_point_on_segment(a, b), b);
    // Degenerate segment
    assert_eq!(FixedVec2::from_int(9, 9).closest_point_on_segment(a, a), a);
}
