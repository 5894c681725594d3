use core::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn magnitude_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance_sq(self, other: Vector) -> f32 {
        (self - other).magnitude_sq()
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Mean position of `points`.
///
/// # Panics
///
/// Panics when `points` is empty.
pub fn centroid<I>(points: I) -> Vector
where
    I: IntoIterator<Item = Vector>,
{
    let mut sum = Vector::ZERO;
    let mut count = 0usize;
    for point in points {
        sum = sum + point;
        count += 1;
    }
    assert!(count > 0, "centroid of an empty point set");
    sum.scale(1.0 / count as f32)
}
