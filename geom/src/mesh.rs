use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{HashablePt3D, Pt3D};

/// A texture coordinate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UV {
    pub u: f64,
    pub v: f64,
}

impl UV {
    pub fn new(u: f64, v: f64) -> UV {
        UV { u, v }
    }
}

/// Names a material owned by the renderer. The mesh only carries the reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRef(pub String);

/// Four corners of a quad strip slice. "Near" is the start of the slice along the curve, "left"
/// is the side `Basis::x` points to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad<T> {
    pub near_left: T,
    pub near_right: T,
    pub far_left: T,
    pub far_right: T,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub pts: [Pt3D; 3],
    pub uvs: [UV; 3],
}

impl Triangle {
    /// Not normalized; the length is twice the area.
    pub fn face_normal(&self) -> Pt3D {
        let [a, b, c] = self.pts;
        (b - a).cross(c - a)
    }
}

/// Accumulates triangles, then produces a `TriangleMesh`.
#[derive(Default)]
pub struct MeshBuilder {
    positions: Vec<Pt3D>,
    uvs: Vec<UV>,
}

impl MeshBuilder {
    pub fn new() -> MeshBuilder {
        MeshBuilder::default()
    }

    pub fn add_triangle(&mut self, tri: Triangle) {
        self.positions.extend(tri.pts);
        self.uvs.extend(tri.uvs);
    }

    /// Splits along the near-left to far-right diagonal. Both triangles wind counter-clockwise
    /// when seen from above.
    pub fn add_quad(&mut self, pts: Quad<Pt3D>, uvs: Quad<UV>) {
        self.add_triangle(Triangle {
            pts: [pts.near_left, pts.near_right, pts.far_right],
            uvs: [uvs.near_left, uvs.near_right, uvs.far_right],
        });
        self.add_triangle(Triangle {
            pts: [pts.near_left, pts.far_right, pts.far_left],
            uvs: [uvs.near_left, uvs.far_right, uvs.far_left],
        });
    }

    pub fn num_triangles(&self) -> usize {
        self.positions.len() / 3
    }

    /// Generates smooth normals and packages everything up.
    pub fn build(self, material: Option<MaterialRef>) -> TriangleMesh {
        let normals = smooth_normals(&self.positions);
        TriangleMesh {
            positions: self.positions,
            uvs: self.uvs,
            normals,
            material,
        }
    }
}

// Vertices at the same position share a normal: the sum of the area-weighted normals of every
// face touching that position.
fn smooth_normals(positions: &[Pt3D]) -> Vec<Pt3D> {
    let mut sums: BTreeMap<HashablePt3D, Pt3D> = BTreeMap::new();
    for tri in positions.chunks_exact(3) {
        let face = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
        for pt in tri {
            let sum = sums.entry(HashablePt3D::from(*pt)).or_insert(Pt3D::ZERO);
            *sum = *sum + face;
        }
    }
    positions
        .iter()
        .map(|pt| {
            let normal = sums[&HashablePt3D::from(*pt)].normalized();
            // Only touched by degenerate faces
            if normal == Pt3D::ZERO {
                Pt3D::UP
            } else {
                normal
            }
        })
        .collect()
}

/// A flat list of triangles. Every 3 consecutive vertices form one triangle; nothing is indexed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    positions: Vec<Pt3D>,
    uvs: Vec<UV>,
    normals: Vec<Pt3D>,
    material: Option<MaterialRef>,
}

impl TriangleMesh {
    pub fn empty(material: Option<MaterialRef>) -> TriangleMesh {
        MeshBuilder::new().build(material)
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn num_triangles(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn positions(&self) -> &Vec<Pt3D> {
        &self.positions
    }

    pub fn uvs(&self) -> &Vec<UV> {
        &self.uvs
    }

    pub fn normals(&self) -> &Vec<Pt3D> {
        &self.normals
    }

    pub fn material(&self) -> Option<&MaterialRef> {
        self.material.as_ref()
    }

    pub fn set_material(&mut self, material: Option<MaterialRef>) {
        self.material = material;
    }

    pub fn triangles(&self) -> Vec<Triangle> {
        self.positions
            .chunks_exact(3)
            .zip(self.uvs.chunks_exact(3))
            .map(|(pts, uvs)| Triangle {
                pts: [pts[0], pts[1], pts[2]],
                uvs: [uvs[0], uvs[1], uvs[2]],
            })
            .collect()
    }

    /// Collision uses the exact same triangles as rendering.
    pub fn collision_mesh(&self) -> CollisionMesh {
        CollisionMesh {
            faces: self
                .positions
                .chunks_exact(3)
                .map(|pts| [pts[0], pts[1], pts[2]])
                .collect(),
        }
    }

    /// Renders as a Wavefront OBJ file. Nothing is deduplicated.
    pub fn to_obj(&self) -> String {
        let mut out = String::new();
        if let Some(MaterialRef(name)) = &self.material {
            writeln!(out, "usemtl {}", name).unwrap();
        }
        for pt in &self.positions {
            writeln!(out, "v {} {} {}", pt.x(), pt.y(), pt.z()).unwrap();
        }
        for uv in &self.uvs {
            writeln!(out, "vt {} {}", uv.u, uv.v).unwrap();
        }
        for n in &self.normals {
            writeln!(out, "vn {} {} {}", n.x(), n.y(), n.z()).unwrap();
        }
        for tri in 0..self.num_triangles() {
            // OBJ is 1-indexed
            let [a, b, c] = [3 * tri + 1, 3 * tri + 2, 3 * tri + 3];
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}").unwrap();
        }
        out
    }
}

/// Triangles for the physics engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionMesh {
    faces: Vec<[Pt3D; 3]>,
}

impl CollisionMesh {
    pub fn faces(&self) -> &Vec<[Pt3D; 3]> {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_quad(builder: &mut MeshBuilder, z1: f64, z2: f64) {
        builder.add_quad(
            Quad {
                near_left: Pt3D::new(1.0, 0.0, z1),
                near_right: Pt3D::new(-1.0, 0.0, z1),
                far_left: Pt3D::new(1.0, 0.0, z2),
                far_right: Pt3D::new(-1.0, 0.0, z2),
            },
            Quad {
                near_left: UV::new(0.0, z1),
                near_right: UV::new(1.0, z1),
                far_left: UV::new(0.0, z2),
                far_right: UV::new(1.0, z2),
            },
        );
    }

    #[test]
    fn quads_face_up() {
        let mut builder = MeshBuilder::new();
        flat_quad(&mut builder, 0.0, 1.0);
        flat_quad(&mut builder, 1.0, 2.0);
        assert_eq!(builder.num_triangles(), 4);

        let mesh = builder.build(Some(MaterialRef("road".to_string())));
        for tri in mesh.triangles() {
            assert!(tri.face_normal().y() > 0.0);
        }
        for n in mesh.normals() {
            assert_eq!(*n, Pt3D::UP);
        }
        assert_eq!(mesh.collision_mesh().faces().len(), 4);
        assert_eq!(mesh.material(), Some(&MaterialRef("road".to_string())));
    }

    #[test]
    fn shared_positions_share_normals() {
        let mut builder = MeshBuilder::new();
        // A roof: two quads meeting at a ridge along x = 0
        builder.add_quad(
            Quad {
                near_left: Pt3D::new(1.0, 0.0, 0.0),
                near_right: Pt3D::new(0.0, 1.0, 0.0),
                far_left: Pt3D::new(1.0, 0.0, 1.0),
                far_right: Pt3D::new(0.0, 1.0, 1.0),
            },
            Quad {
                near_left: UV::new(0.0, 0.0),
                near_right: UV::new(1.0, 0.0),
                far_left: UV::new(0.0, 1.0),
                far_right: UV::new(1.0, 1.0),
            },
        );
        builder.add_quad(
            Quad {
                near_left: Pt3D::new(0.0, 1.0, 0.0),
                near_right: Pt3D::new(-1.0, 0.0, 0.0),
                far_left: Pt3D::new(0.0, 1.0, 1.0),
                far_right: Pt3D::new(-1.0, 0.0, 1.0),
            },
            Quad {
                near_left: UV::new(0.0, 0.0),
                near_right: UV::new(1.0, 0.0),
                far_left: UV::new(0.0, 1.0),
                far_right: UV::new(1.0, 1.0),
            },
        );
        let mesh = builder.build(None);
        let mut ridge_normals: BTreeMap<HashablePt3D, Pt3D> = BTreeMap::new();
        for (pt, n) in mesh.positions().iter().zip(mesh.normals()) {
            if pt.x() == 0.0 {
                // Blended between both faces, so steeper than either one
                assert!(n.y() > std::f64::consts::FRAC_1_SQRT_2);
                let prev = ridge_normals.entry(HashablePt3D::from(*pt)).or_insert(*n);
                assert_eq!(*prev, *n);
            }
        }
        assert_eq!(ridge_normals.len(), 2);
    }

    #[test]
    fn empty_mesh() {
        let mesh = TriangleMesh::empty(None);
        assert!(mesh.is_empty());
        assert!(mesh.collision_mesh().is_empty());
        assert_eq!(mesh.to_obj(), "");
    }

    #[test]
    fn obj_output() {
        let mut builder = MeshBuilder::new();
        flat_quad(&mut builder, 0.0, 1.0);
        let obj = builder.build(None).to_obj();
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 6);
        assert!(obj.contains("f 4/4/4 5/5/5 6/6/6"));
    }
}
