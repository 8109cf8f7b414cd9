//! OBJ and binary STL writers.

use std::fmt::Write as _;

use generation_structs::MeshAsset;

/// Serializes an asset as Wavefront OBJ text.
#[must_use]
pub fn export_obj(asset: &MeshAsset) -> String {
    let geometry = &asset.geometry;
    let mut out = String::new();

    for position in &geometry.positions {
        let _ = writeln!(out, "v {} {} {}", position[0], position[1], position[2]);
    }
    let has_normals = geometry.normals.len() == geometry.positions.len();
    if has_normals {
        for normal in &geometry.normals {
            let _ = writeln!(out, "vn {} {} {}", normal[0], normal[1], normal[2]);
        }
    }

    for triangle in geometry.indices.chunks_exact(3) {
        if has_normals {
            let _ = writeln!(
                out,
                "f {0}//{0} {1}//{1} {2}//{2}",
                triangle[0] + 1,
                triangle[1] + 1,
                triangle[2] + 1
            );
        } else {
            let _ = writeln!(
                out,
                "f {} {} {}",
                triangle[0] + 1,
                triangle[1] + 1,
                triangle[2] + 1
            );
        }
    }

    out
}

/// Serializes an asset as binary STL. Facet normals come from the face
/// winding, not the stored vertex normals.
#[must_use]
pub fn export_stl(asset: &MeshAsset, name: &str) -> Vec<u8> {
    let geometry = &asset.geometry;
    let triangle_count = geometry.triangle_count();
    let mut out = Vec::with_capacity(84 + triangle_count * 50);

    let mut header = [0u8; 80];
    let label = name.as_bytes();
    let len = label.len().min(header.len());
    header[..len].copy_from_slice(&label[..len]);
    out.extend_from_slice(&header);
    out.extend((triangle_count as u32).to_le_bytes());

    for triangle in geometry.indices.chunks_exact(3) {
        let a = geometry.positions[triangle[0] as usize];
        let b = geometry.positions[triangle[1] as usize];
        let c = geometry.positions[triangle[2] as usize];
        for value in face_normal(a, b, c) {
            out.extend(value.to_le_bytes());
        }
        for vertex in [a, b, c] {
            for value in vertex {
                out.extend(value.to_le_bytes());
            }
        }
        out.extend(0u16.to_le_bytes()); // attribute byte count
    }

    out
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let cross = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let length = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
    if length > f32::EPSILON {
        [cross[0] / length, cross[1] / length, cross[2] / length]
    } else {
        [0.0, 0.0, 0.0]
    }
}
