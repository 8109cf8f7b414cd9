//! Decoded 3D asset types.

use serde::{Deserialize, Serialize};

/// Triangle mesh geometry.
///
/// Indices reference `positions`; `normals`, when present, is parallel to
/// `positions`. Clone is a deep copy, which is what the cache relies on for
/// its defensive-copy invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals, empty if the source format carried none.
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices, three per face.
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns true if the geometry holds no renderable triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.len() < 3
    }

    /// Computes area-weighted per-vertex normals, replacing any existing set.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![[0.0f32; 3]; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let a = self.positions[tri[0] as usize];
            let b = self.positions[tri[1] as usize];
            let c = self.positions[tri[2] as usize];

            let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            // Cross product magnitude is proportional to triangle area, so
            // accumulating unnormalized face normals weights by area.
            let face = [
                ab[1] * ac[2] - ab[2] * ac[1],
                ab[2] * ac[0] - ab[0] * ac[2],
                ab[0] * ac[1] - ab[1] * ac[0],
            ];

            for &index in tri {
                let n = &mut normals[index as usize];
                n[0] += face[0];
                n[1] += face[1];
                n[2] += face[2];
            }
        }

        for n in &mut normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if len > f32::EPSILON {
                n[0] /= len;
                n[1] /= len;
                n[2] /= len;
            }
        }

        self.normals = normals;
    }
}

/// Surface material parameter family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Classic specular shading.
    Phong {
        /// Specular exponent.
        shininess: f32,
    },
    /// Metallic-roughness shading.
    Standard { metalness: f32, roughness: f32 },
    /// Metallic-roughness with a clearcoat layer.
    Physical {
        metalness: f32,
        roughness: f32,
        clearcoat: f32,
    },
}

/// Surface material for a decoded or synthesized asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Base color as linear RGB in 0..=1.
    pub color: [f32; 3],
    /// Opacity in 0..=1.
    pub opacity: f32,
    /// Shading parameter family.
    pub kind: MaterialKind,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [0.8, 0.8, 0.8],
            opacity: 1.0,
            kind: MaterialKind::Standard {
                metalness: 0.0,
                roughness: 0.8,
            },
        }
    }
}

impl Material {
    /// Creates a material from a packed 0xRRGGBB color.
    #[must_use]
    pub fn from_rgb_hex(rgb: u32, kind: MaterialKind, opacity: f32) -> Self {
        Self {
            color: [
                ((rgb >> 16) & 0xff) as f32 / 255.0,
                ((rgb >> 8) & 0xff) as f32 / 255.0,
                (rgb & 0xff) as f32 / 255.0,
            ],
            opacity,
            kind,
        }
    }
}

/// A decoded geometry/material pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshAsset {
    pub geometry: Geometry,
    pub material: Material,
}

impl MeshAsset {
    #[must_use]
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self { geometry, material }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Geometry {
        Geometry {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn computed_normals_are_unit_length() {
        let mut geometry = unit_triangle();
        geometry.compute_vertex_normals();

        assert_eq!(geometry.normals.len(), 3);
        for n in &geometry.normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
        // Counter-clockwise triangle in the XY plane faces +Z.
        assert!(geometry.normals[0][2] > 0.99);
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let original = MeshAsset::new(unit_triangle(), Material::default());
        let mut copy = original.clone();
        copy.geometry.positions[0] = [9.0, 9.0, 9.0];
        assert_eq!(original.geometry.positions[0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn material_from_hex_unpacks_channels() {
        let material = Material::from_rgb_hex(
            0xff6b6b,
            MaterialKind::Phong { shininess: 100.0 },
            0.9,
        );
        assert!((material.color[0] - 1.0).abs() < 1e-6);
        assert!((material.color[1] - 107.0 / 255.0).abs() < 1e-6);
        assert!((material.color[2] - 107.0 / 255.0).abs() < 1e-6);
    }
}
