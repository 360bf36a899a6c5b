use std::{fmt, ops};

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::Distance;

/// A point or a direction in 3D world-space, in meters. +y is up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt3D {
    x: f64,
    y: f64,
    z: f64,
}

impl Pt3D {
    pub const ZERO: Pt3D = Pt3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Pt3D = Pt3D {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Pt3D {
        if !x.is_finite() || !y.is_finite() || !z.is_finite() {
            panic!("Bad Pt3D {}, {}, {}", x, y, z);
        }

        Pt3D { x, y, z }
    }

    // Unchecked, for constants
    pub const fn new_const(x: f64, y: f64, z: f64) -> Pt3D {
        Pt3D { x, y, z }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn z(self) -> f64 {
        self.z
    }

    pub fn dot(self, other: Pt3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Pt3D) -> Pt3D {
        Pt3D::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dist_to(self, other: Pt3D) -> Distance {
        Distance::meters((other - self).length())
    }

    /// Scales to unit length. The zero vector stays zero.
    pub fn normalized(self) -> Pt3D {
        let len = self.length();
        if len == 0.0 {
            return self;
        }
        self / len
    }

    /// Moves along a unit `direction` by some distance.
    pub fn project_away(self, dist: Distance, direction: Pt3D) -> Pt3D {
        self + direction * dist.inner_meters()
    }

    pub fn lerp(self, other: Pt3D, pct: f64) -> Pt3D {
        self + (other - self) * pct
    }

    pub fn midpoint(self, other: Pt3D) -> Pt3D {
        (self + other) / 2.0
    }

    /// Rotates around a unit `axis` by `radians`, following the right-hand rule.
    pub fn rotate_around(self, axis: Pt3D, radians: f64) -> Pt3D {
        // Rodrigues' rotation formula
        let (sin, cos) = radians.sin_cos();
        self * cos + axis.cross(self) * sin + axis * (axis.dot(self) * (1.0 - cos))
    }

    pub fn approx_eq(self, other: Pt3D, threshold: Distance) -> bool {
        self.dist_to(other) <= threshold
    }
}

impl fmt::Display for Pt3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt3D({0}, {1}, {2})", self.x, self.y, self.z)
    }
}

impl ops::Add for Pt3D {
    type Output = Pt3D;

    fn add(self, other: Pt3D) -> Pt3D {
        Pt3D::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl ops::Sub for Pt3D {
    type Output = Pt3D;

    fn sub(self, other: Pt3D) -> Pt3D {
        Pt3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl ops::Neg for Pt3D {
    type Output = Pt3D;

    fn neg(self) -> Pt3D {
        Pt3D::new(-self.x, -self.y, -self.z)
    }
}

impl ops::Mul<f64> for Pt3D {
    type Output = Pt3D;

    fn mul(self, scalar: f64) -> Pt3D {
        Pt3D::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl ops::Div<f64> for Pt3D {
    type Output = Pt3D;

    fn div(self, scalar: f64) -> Pt3D {
        if scalar == 0.0 {
            panic!("Can't divide {} / {}", self, scalar);
        }
        Pt3D::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

/// Used to merge coincident vertices. Two points hash equally only if they're bit-for-bit equal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct HashablePt3D {
    x_nan: NotNan<f64>,
    y_nan: NotNan<f64>,
    z_nan: NotNan<f64>,
}

impl From<Pt3D> for HashablePt3D {
    fn from(pt: Pt3D) -> Self {
        // Pt3D is finite by construction
        HashablePt3D {
            x_nan: NotNan::new(pt.x).unwrap(),
            y_nan: NotNan::new(pt.y).unwrap(),
            z_nan: NotNan::new(pt.z).unwrap(),
        }
    }
}
