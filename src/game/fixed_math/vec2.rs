use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::{cos, exact_length, normalize_components, sin, FixedNum, FixedVec3};

/// Position or direction on the arena's ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: FixedNum,
    pub y: FixedNum,
}

impl FixedVec2 {
    pub const ZERO: Self = Self { x: FixedNum::ZERO, y: FixedNum::ZERO };
    pub const X: Self = Self { x: FixedNum::ONE, y: FixedNum::ZERO };
    pub const Y: Self = Self { x: FixedNum::ZERO, y: FixedNum::ONE };

    pub const fn new(x: FixedNum, y: FixedNum) -> Self {
        Self { x, y }
    }

    pub const fn from_int(x: i32, y: i32) -> Self {
        Self { x: FixedNum::from_int(x), y: FixedNum::from_int(y) }
    }

    /// Boundary conversion for authored data.
    pub fn from_f32(x: f32, y: f32) -> Self {
        Self { x: FixedNum::from_f32(x), y: FixedNum::from_f32(y) }
    }

    /// Presentation-only conversion.
    pub fn to_f32(self) -> (f32, f32) {
        (self.x.to_f32(), self.y.to_f32())
    }

    pub fn is_zero(self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    pub fn length_squared(self) -> FixedNum {
        self.x * self.x + self.y * self.y
    }

    /// Exact length (floor of the true root in raw units).
    pub fn length(self) -> FixedNum {
        exact_length(&[self.x, self.y])
    }

    /// Unit vector in the same direction; `ZERO` stays `ZERO`.
    pub fn normalize(self) -> Self {
        let [x, y] = normalize_components([self.x, self.y]);
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> FixedNum {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Self) -> FixedNum {
        self.x * other.y - self.y * other.x
    }

    pub fn distance(self, other: Self) -> FixedNum {
        (other - self).length()
    }

    pub fn distance_squared(self, other: Self) -> FixedNum {
        (other - self).length_squared()
    }

    /// Componentwise lerp with `t` clamped into `[0, 1]`.
    pub fn lerp(self, other: Self, t: FixedNum) -> Self {
        Self { x: self.x.lerp(other.x, t), y: self.y.lerp(other.y, t) }
    }

    /// Counter-clockwise rotation by `angle` radians.
    pub fn rotate(self, angle: FixedNum) -> Self {
        let (s, c) = (sin(angle), cos(angle));
        Self {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
        }
    }

    /// Point on segment `a..b` closest to `self`.
    pub fn closest_point_on_segment(self, a: Self, b: Self) -> Self {
        let ab = b - a;
        let t = (self - a).dot(ab).checked_div(ab.length_squared()).unwrap_or(FixedNum::ZERO);
        a + ab * t.clamp(FixedNum::ZERO, FixedNum::ONE)
    }

    /// Lift onto the ground plane at `height`: `(x, y)` becomes `(x, height, y)`.
    pub fn to_3d(self, height: FixedNum) -> FixedVec3 {
        FixedVec3::new(self.x, height, self.y)
    }

    pub fn clamp_length(self, max: FixedNum) -> Self {
        if self.length_squared() > max * max {
            self.normalize() * max
        } else {
            self
        }
    }
}

impl Add for FixedVec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Neg for FixedVec2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y }
    }
}

impl Mul<FixedNum> for FixedVec2 {
    type Output = Self;
    fn mul(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl Div<FixedNum> for FixedVec2 {
    type Output = Self;
    fn div(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x / rhs, y: self.y / rhs }
    }
}

impl AddAssign for FixedVec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for FixedVec2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
