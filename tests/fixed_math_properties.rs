use gauntlet::game::fixed_math::{cos, sin, FRACTIONAL_BITS};
use gauntlet::{FixedNum, FixedVec2, FixedVec3};

const SAMPLES: usize = 2000;

fn small(rng: &mut fastrand::Rng) -> FixedNum {
    // Well inside the range so sums never saturate
    FixedNum::from_raw(rng.i64(-(1 << 40)..(1 << 40)))
}

#[test]
fn test_integer_round_trip_over_full_range() {
    let mut rng = fastrand::Rng::with_seed(11);
    for n in [i32::MIN, -1, 0, 1, i32::MAX] {
        assert_eq!(FixedNum::from_int(n).to_int(), n as i64);
    }
    for _ in 0..SAMPLES {
        let n = rng.i32(..);
        assert_eq!(FixedNum::from_int(n).to_int(), n as i64);
    }
}

#[test]
fn test_addition_is_associative_and_commutative() {
    let mut rng = fastrand::Rng::with_seed(12);
    for _ in 0..SAMPLES {
        let (a, b, c) = (small(&mut rng), small(&mut rng), small(&mut rng));
        assert_eq!(a + b, b + a);
        assert_eq!((a + b) + c, a + (b + c));
        assert_eq!((a + b).raw(), a.raw() + b.raw());
    }
}

#[test]
fn test_division_then_multiplication_recovers_dividend() {
    // a / b rounds to within half a unit, and multiplying back by b scales
    // that error by |b|.
    let mut rng = fastrand::Rng::with_seed(13);
    for _ in 0..SAMPLES {
        let a = FixedNum::from_raw(rng.i64(-(1 << 36)..(1 << 36)));
        let b = FixedNum::from_raw(rng.i64(-(1 << 24)..(1 << 24)));
        if b.is_zero() {
            continue;
        }
        let back = a / b * b;
        let tolerance = (b.abs().raw() >> (FRACTIONAL_BITS + 1)) + 1;
        assert!(
            (back - a).abs().raw() <= tolerance,
            "{a:?} / {b:?} * {b:?} = {back:?} (tolerance {tolerance})"
        );
    }
}

#[test]
fn test_unit_divisor_round_trip_is_exact_within_one_unit() {
    let mut rng = fastrand::Rng::with_seed(14);
    for _ in 0..SAMPLES {
        let a = small(&mut rng);
        let b = FixedNum::from_raw(rng.i64(1..(1 << FRACTIONAL_BITS)));
        assert!((a / b * b - a).abs().raw() <= 1);
    }
}

#[test]
fn test_pythagorean_identity() {
    let mut rng = fastrand::Rng::with_seed(15);
    for _ in 0..SAMPLES {
        let angle = FixedNum::from_raw(rng.i64(-(FixedNum::TAU.raw() * 8)..(FixedNum::TAU.raw() * 8)));
        let (s, c) = (sin(angle), cos(angle));
        let one = s * s + c * c;
        assert!((one - FixedNum::ONE).abs().raw() <= 48, "sin²+cos² of {angle:?} = {one:?}");
    }
}

#[test]
fn test_distance_is_symmetric_and_matches_length() {
    let mut rng = fastrand::Rng::with_seed(16);
    for _ in 0..SAMPLES {
        let a = FixedVec2::from_int(rng.i32(-500..500), rng.i32(-500..500));
        let b = FixedVec2::from_int(rng.i32(-500..500), rng.i32(-500..500));
        assert_eq!(a.distance_squared(b), b.distance_squared(a));
        assert_eq!(a.distance(b), (a - b).length());
    }
}

#[test]
fn test_normalized_vectors_have_unit_length() {
    let mut rng = fastrand::Rng::with_seed(17);
    for _ in 0..SAMPLES {
        let v = FixedVec3::new(small(&mut rng), small(&mut rng), small(&mut rng));
        if v.length_squared().is_zero() {
            continue;
        }
        let n = v.normalize();
        assert!((n.length() - FixedNum::ONE).abs().raw() <= 8);
        assert_eq!(n.normalize(), n);
    }
}
