use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, Pt3D};

/// Orthonormal axes describing an orientation. `x` is lateral and points to the left of travel,
/// `y` is up, and `z` is forward, so that `x = y × z`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Basis {
    pub x: Pt3D,
    pub y: Pt3D,
    pub z: Pt3D,
}

impl Basis {
    pub const IDENTITY: Basis = Basis {
        x: Pt3D::new_const(1.0, 0.0, 0.0),
        y: Pt3D::UP,
        z: Pt3D::new_const(0.0, 0.0, 1.0),
    };

    /// A heading of zero points along +z and increases towards +x. A positive bank rolls the
    /// left edge upwards.
    pub fn from_heading_and_bank(heading: Angle, bank: Angle) -> Basis {
        let (sin, cos) = heading.inner_radians().sin_cos();
        let z = Pt3D::new(sin, 0.0, cos);
        let x = Pt3D::UP.cross(z);
        let b = bank.inner_radians();
        Basis {
            x: x.rotate_around(z, b),
            y: Pt3D::UP.rotate_around(z, b),
            z,
        }
    }

    /// The tilt around the forward axis. This is the road's bank.
    pub fn bank(&self) -> Angle {
        let horizontal = (self.x.x() * self.x.x() + self.x.z() * self.x.z()).sqrt();
        Angle::radians(self.x.y().atan2(horizontal))
    }
}

impl Default for Basis {
    fn default() -> Basis {
        Basis::IDENTITY
    }
}

/// A position and an orientation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub pos: Pt3D,
    pub basis: Basis,
}

impl Placement {
    pub fn new(pos: Pt3D, basis: Basis) -> Placement {
        Placement { pos, basis }
    }

    pub fn at(pos: Pt3D) -> Placement {
        Placement::new(pos, Basis::IDENTITY)
    }

    /// Moves sideways, positive distances towards `x` (the left).
    pub fn lateral_offset(&self, dist: Distance) -> Pt3D {
        self.pos.project_away(dist, self.basis.x)
    }

    /// Re-expresses the position relative to some origin, keeping the orientation.
    pub fn relative_to(&self, origin: Pt3D) -> Placement {
        Placement::new(self.pos - origin, self.basis)
    }
}
