use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::FixedNum;

/// 2D vector over [`FixedNum`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: FixedNum,
    pub y: FixedNum,
}

impl FixedVec2 {
    pub const ZERO: Self = Self { x: FixedNum::ZERO, y: FixedNum::ZERO };

    pub fn new(x: FixedNum, y: FixedNum) -> Self {
        Self { x, y }
    }

    pub fn from_f32(x: f32, y: f32) -> Self {
        Self {
            x: FixedNum::from_num(x),
            y: FixedNum::from_num(y),
        }
    }

    /// Vector from integer grid offsets, e.g. a flow direction.
    pub fn from_offset(dx: i32, dy: i32) -> Self {
        Self {
            x: FixedNum::from_num(dx),
            y: FixedNum::from_num(dy),
        }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x.to_num(), self.y.to_num())
    }

    pub fn length(self) -> FixedNum {
        let len_sq = self.length_squared();
        if len_sq == FixedNum::ZERO {
            return FixedNum::ZERO;
        }
        len_sq.sqrt()
    }

    pub fn length_squared(self) -> FixedNum {
        self.x * self.x + self.y * self.y
    }

    pub fn distance(self, other: Self) -> FixedNum {
        (self - other).length()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == FixedNum::ZERO {
            Self::ZERO
        } else {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        }
    }

    pub fn dot(self, other: Self) -> FixedNum {
        self.x * other.x + self.y * other.y
    }

    /// Scale down to `max` if longer; shorter vectors are returned as-is.
    pub fn clamp_length_max(self, max: FixedNum) -> Self {
        if max <= FixedNum::ZERO {
            return Self::ZERO;
        }
        if self.length_squared() <= max * max {
            return self;
        }
        let len = self.length();
        if len == FixedNum::ZERO {
            return Self::ZERO;
        }
        let scaled = Self {
            x: self.x * max / len,
            y: self.y * max / len,
        };
        // sqrt rounds down, so the scaled vector can land a few ulps long.
        if scaled.length_squared() > max * max {
            let shrink = FixedNum::DELTA * FixedNum::from_num(4);
            Self {
                x: scaled.x - scaled.x.signum() * shrink,
                y: scaled.y - scaled.y.signum() * shrink,
            }
        } else {
            scaled
        }
    }

    pub fn is_zero(self) -> bool {
        self.x == FixedNum::ZERO && self.y == FixedNum::ZERO
    }
}

impl std::ops::Add for FixedVec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::AddAssign for FixedVec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for FixedVec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<FixedNum> for FixedVec2 {
    type Output = Self;
    fn mul(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Div<FixedNum> for FixedVec2 {
    type Output = Self;
    fn div(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x / rhs, y: self.y / rhs }
    }
}

impl std::ops::Neg for FixedVec2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y }
    }
}
