//! Geometry primitives for building road meshes: distances, 3D points and orientations, a
//! two-point cubic spline sampled by arc length, and flat triangle meshes.

pub use crate::angle::Angle;
pub use crate::basis::{Basis, Placement};
pub use crate::distance::Distance;
pub use crate::mesh::{CollisionMesh, MaterialRef, MeshBuilder, Quad, Triangle, TriangleMesh, UV};
pub use crate::pt::{HashablePt3D, Pt3D};
pub use crate::spline::{BakedPt, ControlPoint, Spline};

mod angle;
mod basis;
mod distance;
mod mesh;
mod pt;
mod spline;

// About 0.1mm
pub const EPSILON_DIST: Distance = Distance::const_meters(0.0001);
