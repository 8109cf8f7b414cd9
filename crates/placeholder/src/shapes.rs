//! Procedural primitive generators.
//!
//! All generators emit indexed triangle lists. Lathe-based shapes leave
//! normals empty for the caller to compute; analytic shapes fill them in.

use core::f32::consts::{PI, TAU};

use generation_structs::Geometry;

/// Axis-aligned box with the given edge length, centered at the origin.
#[must_use]
pub fn box_geometry(size: f32) -> Geometry {
    let h = size * 0.5;
    // 4 vertices per face so each face keeps its flat normal.
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [1.0, 0.0, 0.0],
            [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]],
        ),
        (
            [-1.0, 0.0, 0.0],
            [[-h, -h, h], [-h, h, h], [-h, h, -h], [-h, -h, -h]],
        ),
        (
            [0.0, 1.0, 0.0],
            [[-h, h, -h], [-h, h, h], [h, h, h], [h, h, -h]],
        ),
        (
            [0.0, -1.0, 0.0],
            [[-h, -h, h], [-h, -h, -h], [h, -h, -h], [h, -h, h]],
        ),
        (
            [0.0, 0.0, 1.0],
            [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        ),
        (
            [0.0, 0.0, -1.0],
            [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
        ),
    ];

    let mut geometry = Geometry::default();
    for (normal, corners) in faces {
        let base = geometry.positions.len() as u32;
        geometry.positions.extend_from_slice(&corners);
        geometry.normals.extend([normal; 4]);
        geometry
            .indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    geometry
}

/// UV sphere with analytic normals.
#[must_use]
pub fn sphere(radius: f32, detail: u32) -> Geometry {
    let segments = detail.max(3);
    let mut geometry = Geometry::default();

    for v in 0..=segments {
        let phi = v as f32 / segments as f32 * PI;
        for u in 0..=segments {
            let theta = u as f32 / segments as f32 * TAU;
            let normal = [
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            ];
            geometry
                .positions
                .push([normal[0] * radius, normal[1] * radius, normal[2] * radius]);
            geometry.normals.push(normal);
        }
    }

    let stride = segments + 1;
    for v in 0..segments {
        for u in 0..segments {
            let a = v * stride + u;
            let b = a + stride;
            geometry.indices.extend([a, b, a + 1, b, b + 1, a + 1]);
        }
    }
    geometry
}

/// Torus with analytic normals.
#[must_use]
pub fn torus(radius: f32, tube: f32, radial: u32, tubular: u32) -> Geometry {
    let radial = radial.max(3);
    let tubular = tubular.max(3);
    let mut geometry = Geometry::default();

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let ring = radius + tube * v.cos();
            let position = [ring * u.cos(), ring * u.sin(), tube * v.sin()];
            let center = [radius * u.cos(), radius * u.sin(), 0.0];
            let mut normal = [
                position[0] - center[0],
                position[1] - center[1],
                position[2] - center[2],
            ];
            let len = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2])
                .sqrt()
                .max(f32::EPSILON);
            normal = [normal[0] / len, normal[1] / len, normal[2] / len];
            geometry.positions.push(position);
            geometry.normals.push(normal);
        }
    }

    let stride = tubular + 1;
    for j in 0..radial {
        for i in 0..tubular {
            let a = j * stride + i;
            let b = a + stride;
            geometry.indices.extend([a, b, a + 1, b, b + 1, a + 1]);
        }
    }
    geometry
}

/// Closed cone, apex up. Normals left for the caller to compute.
#[must_use]
pub fn cone(radius: f32, height: f32, segments: u32) -> Geometry {
    let h = height * 0.5;
    lathe(&[[0.0, -h], [radius, -h], [0.0, h]], segments)
}

/// Closed cylinder with independent top and bottom radii.
#[must_use]
pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Geometry {
    let h = height * 0.5;
    lathe(
        &[
            [0.0, -h],
            [radius_bottom, -h],
            [radius_top, h],
            [0.0, h],
        ],
        segments,
    )
}

/// Regular octahedron.
#[must_use]
pub fn octahedron(scale: f32) -> Geometry {
    let s = scale;
    Geometry {
        positions: vec![
            [s, 0.0, 0.0],
            [-s, 0.0, 0.0],
            [0.0, s, 0.0],
            [0.0, -s, 0.0],
            [0.0, 0.0, s],
            [0.0, 0.0, -s],
        ],
        normals: Vec::new(),
        indices: vec![
            0, 2, 4, 2, 1, 4, 1, 3, 4, 3, 0, 4, //
            2, 0, 5, 1, 2, 5, 3, 1, 5, 0, 3, 5,
        ],
    }
}

/// Regular dodecahedron, each pentagonal face split into three triangles.
#[must_use]
pub fn dodecahedron(scale: f32) -> Geometry {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let r = 1.0 / t;
    // Every vertex sits at distance sqrt(3) from the origin.
    let inv = scale / 3.0f32.sqrt();
    let (c, r, t) = (inv, r * inv, t * inv);

    Geometry {
        positions: vec![
            [-c, -c, -c],
            [-c, -c, c],
            [-c, c, -c],
            [-c, c, c],
            [c, -c, -c],
            [c, -c, c],
            [c, c, -c],
            [c, c, c],
            [0.0, -r, -t],
            [0.0, -r, t],
            [0.0, r, -t],
            [0.0, r, t],
            [-r, -t, 0.0],
            [-r, t, 0.0],
            [r, -t, 0.0],
            [r, t, 0.0],
            [-t, 0.0, -r],
            [t, 0.0, -r],
            [-t, 0.0, r],
            [t, 0.0, r],
        ],
        normals: Vec::new(),
        indices: vec![
            3, 11, 7, 3, 7, 15, 3, 15, 13, //
            7, 19, 17, 7, 17, 6, 7, 6, 15, //
            17, 4, 8, 17, 8, 10, 17, 10, 6, //
            8, 0, 16, 8, 16, 2, 8, 2, 10, //
            0, 12, 1, 0, 1, 18, 0, 18, 16, //
            6, 10, 2, 6, 2, 13, 6, 13, 15, //
            2, 16, 18, 2, 18, 3, 2, 3, 13, //
            18, 1, 9, 18, 9, 11, 18, 11, 3, //
            4, 14, 12, 4, 12, 0, 4, 0, 8, //
            11, 9, 5, 11, 5, 19, 11, 19, 7, //
            19, 5, 14, 19, 14, 4, 19, 4, 17, //
            1, 12, 14, 1, 14, 5, 1, 5, 9,
        ],
    }
}

/// Regular icosahedron.
#[must_use]
pub fn icosahedron(scale: f32) -> Geometry {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let inv = scale / (1.0 + t * t).sqrt();
    let (a, b) = (inv, t * inv);

    Geometry {
        positions: vec![
            [-a, b, 0.0],
            [a, b, 0.0],
            [-a, -b, 0.0],
            [a, -b, 0.0],
            [0.0, -a, b],
            [0.0, a, b],
            [0.0, -a, -b],
            [0.0, a, -b],
            [b, 0.0, -a],
            [b, 0.0, a],
            [-b, 0.0, -a],
            [-b, 0.0, a],
        ],
        normals: Vec::new(),
        indices: vec![
            0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, //
            1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8, //
            3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, //
            4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
        ],
    }
}

/// Revolves a 2D profile (radius, y) around the Y axis.
///
/// Profile points with zero radius collapse to a single pole vertex, which
/// closes the surface there.
fn lathe(profile: &[[f32; 2]], segments: u32) -> Geometry {
    let segments = segments.max(3) as usize;
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut rows: Vec<Vec<u32>> = Vec::with_capacity(profile.len());

    for point in profile {
        let (r, y) = (point[0], point[1]);
        if r.abs() < 1e-6 {
            let index = positions.len() as u32;
            positions.push([0.0, y, 0.0]);
            rows.push(vec![index; segments]);
        } else {
            let base = positions.len() as u32;
            for j in 0..segments {
                let theta = j as f32 / segments as f32 * TAU;
                positions.push([r * theta.cos(), y, r * theta.sin()]);
            }
            rows.push((base..base + segments as u32).collect());
        }
    }

    let mut indices = Vec::new();
    for pair in rows.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        for j in 0..segments {
            let jn = (j + 1) % segments;
            let (a0, a1) = (lower[j], lower[jn]);
            let (b0, b1) = (upper[j], upper[jn]);
            if a0 != a1 {
                indices.extend([a0, a1, b0]);
            }
            if b0 != b1 {
                indices.extend([a1, b1, b0]);
            }
        }
    }

    Geometry {
        positions,
        normals: Vec::new(),
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_six_flat_faces() {
        let geometry = box_geometry(2.0);
        assert_eq!(geometry.positions.len(), 24);
        assert_eq!(geometry.triangle_count(), 12);
        assert_eq!(geometry.normals.len(), 24);
    }

    #[test]
    fn sphere_vertices_lie_on_the_radius() {
        let geometry = sphere(1.5, 16);
        for p in &geometry.positions {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - 1.5).abs() < 1e-4);
        }
        assert!(!geometry.is_empty());
    }

    #[test]
    fn lathe_shapes_are_closed_and_indexed_in_bounds() {
        for geometry in [cone(1.0, 2.0, 12), cylinder(1.0, 0.8, 2.0, 12)] {
            assert!(!geometry.is_empty());
            let max = geometry.positions.len() as u32;
            assert!(geometry.indices.iter().all(|&i| i < max));
            // Every index triple forms a non-degenerate triangle reference.
            for tri in geometry.indices.chunks_exact(3) {
                assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2]);
            }
        }
    }

    #[test]
    fn torus_normals_are_unit_length() {
        let geometry = torus(1.0, 0.4, 12, 24);
        for n in &geometry.normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn platonic_solids_have_expected_face_counts() {
        assert_eq!(octahedron(1.0).triangle_count(), 8);
        assert_eq!(dodecahedron(1.0).triangle_count(), 36);
        assert_eq!(icosahedron(1.0).triangle_count(), 20);
    }

    #[test]
    fn dodecahedron_vertices_lie_on_the_radius() {
        let geometry = dodecahedron(1.0);
        assert_eq!(geometry.positions.len(), 20);
        for p in &geometry.positions {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
        let max = geometry.positions.len() as u32;
        assert!(geometry.indices.iter().all(|&i| i < max));
    }
}
