use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::{exact_length, normalize_components, FixedNum, FixedVec2};

/// 3D vector; `y` is height above the ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec3 {
    pub x: FixedNum,
    pub y: FixedNum,
    pub z: FixedNum,
}

impl FixedVec3 {
    pub const ZERO: Self = Self { x: FixedNum::ZERO, y: FixedNum::ZERO, z: FixedNum::ZERO };
    pub const UP: Self = Self { x: FixedNum::ZERO, y: FixedNum::ONE, z: FixedNum::ZERO };

    pub const fn new(x: FixedNum, y: FixedNum, z: FixedNum) -> Self {
        Self { x, y, z }
    }

    pub const fn from_int(x: i32, y: i32, z: i32) -> Self {
        Self { x: FixedNum::from_int(x), y: FixedNum::from_int(y), z: FixedNum::from_int(z) }
    }

    pub fn from_f32(x: f32, y: f32, z: f32) -> Self {
        Self { x: FixedNum::from_f32(x), y: FixedNum::from_f32(y), z: FixedNum::from_f32(z) }
    }

    pub fn to_f32(self) -> (f32, f32, f32) {
        (self.x.to_f32(), self.y.to_f32(), self.z.to_f32())
    }

    pub fn length_squared(self) -> FixedNum {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(self) -> FixedNum {
        exact_length(&[self.x, self.y, self.z])
    }

    pub fn normalize(self) -> Self {
        let [x, y, z] = normalize_components([self.x, self.y, self.z]);
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> FixedNum {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn distance(self, other: Self) -> FixedNum {
        (other - self).length()
    }

    pub fn distance_squared(self, other: Self) -> FixedNum {
        (other - self).length_squared()
    }

    pub fn lerp(self, other: Self, t: FixedNum) -> Self {
        Self {
            x: self.x.lerp(other.x, t),
            y: self.y.lerp(other.y, t),
            z: self.z.lerp(other.z, t),
        }
    }

    /// Drop the height: `(x, y, z)` becomes ground-plane `(x, z)`.
    pub fn to_ground(self) -> FixedVec2 {
        FixedVec2::new(self.x, self.z)
    }
}

impl Add for FixedVec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl Sub for FixedVec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl Neg for FixedVec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

impl Mul<FixedNum> for FixedVec3 {
    type Output = Self;
    fn mul(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs, z: self.z * rhs }
    }
}

impl Div<FixedNum> for FixedVec3 {
    type Output = Self;
    fn div(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x / rhs, y: self.y / rhs, z: self.z / rhs }
    }
}

impl AddAssign for FixedVec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for FixedVec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
