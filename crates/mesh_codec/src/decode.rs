//! Format dispatch and the raw-geometry decoders (OBJ, STL).

use std::collections::HashMap;

use generation_structs::{Geometry, Material, MeshAsset};

use crate::DecodeError;
use crate::glb;

/// Maximum accepted input size (50 MiB).
pub const MAX_INPUT_BYTES: usize = 50 * 1024 * 1024;

/// Decodes a model blob into an asset, dispatching on the filename hint's
/// extension.
///
/// # Errors
///
/// Returns [`DecodeError::UnsupportedFormat`] for unknown extensions,
/// [`DecodeError::TooLarge`] past the size limit, and format-specific
/// errors when the bytes do not parse.
pub fn decode(bytes: &[u8], filename_hint: &str) -> Result<MeshAsset, DecodeError> {
    if bytes.len() > MAX_INPUT_BYTES {
        return Err(DecodeError::TooLarge {
            size: bytes.len(),
            limit: MAX_INPUT_BYTES,
        });
    }

    let extension = filename_hint
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let mut asset = match extension.as_str() {
        "obj" => decode_obj(bytes),
        "stl" => decode_stl(bytes),
        "glb" => glb::decode_glb(bytes),
        other => Err(DecodeError::UnsupportedFormat(other.to_string())),
    }?;

    if asset.geometry.is_empty() {
        return Err(DecodeError::MissingGeometry);
    }
    if asset.geometry.normals.len() != asset.geometry.positions.len() {
        asset.geometry.compute_vertex_normals();
    }
    Ok(asset)
}

/// Wavefront OBJ. Faces are fan-triangulated; vertices are re-indexed per
/// unique (position, normal) pair so shared corners stay shared.
fn decode_obj(bytes: &[u8]) -> Result<MeshAsset, DecodeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| DecodeError::malformed("OBJ", "file is not valid UTF-8"))?;

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut geometry = Geometry::default();
    let mut vertex_map: HashMap<(usize, Option<usize>), u32> = HashMap::new();

    for (line_no, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => positions.push(parse_triplet(&mut tokens, "OBJ", line_no)?),
            Some("vn") => normals.push(parse_triplet(&mut tokens, "OBJ", line_no)?),
            Some("f") => {
                let mut corners = Vec::new();
                for token in tokens {
                    corners.push(parse_face_corner(
                        token,
                        positions.len(),
                        normals.len(),
                        line_no,
                    )?);
                }
                if corners.len() < 3 {
                    return Err(DecodeError::malformed(
                        "OBJ",
                        format!("face with fewer than 3 corners on line {}", line_no + 1),
                    ));
                }
                let resolved: Vec<u32> = corners
                    .into_iter()
                    .map(|corner| {
                        *vertex_map.entry(corner).or_insert_with(|| {
                            let index = geometry.positions.len() as u32;
                            geometry.positions.push(positions[corner.0]);
                            if let Some(n) = corner.1 {
                                geometry.normals.push(normals[n]);
                            }
                            index
                        })
                    })
                    .collect();
                for i in 1..resolved.len() - 1 {
                    geometry
                        .indices
                        .extend([resolved[0], resolved[i], resolved[i + 1]]);
                }
            }
            _ => {}
        }
    }

    // Mixed corners (some with vn, some without) leave the parallel-array
    // invariant broken; drop normals and let the caller recompute.
    if geometry.normals.len() != geometry.positions.len() {
        geometry.normals.clear();
    }

    Ok(MeshAsset::new(geometry, Material::default()))
}

fn parse_triplet<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    format: &'static str,
    line_no: usize,
) -> Result<[f32; 3], DecodeError> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        *slot = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| {
                DecodeError::malformed(
                    format,
                    format!("expected 3 coordinates on line {}", line_no + 1),
                )
            })?;
    }
    Ok(out)
}

/// Parses `v`, `v/vt`, `v//vn` or `v/vt/vn` (1-based indices).
fn parse_face_corner(
    token: &str,
    position_count: usize,
    normal_count: usize,
    line_no: usize,
) -> Result<(usize, Option<usize>), DecodeError> {
    let mut parts = token.split('/');
    let position = parts
        .next()
        .and_then(|p| p.parse::<usize>().ok())
        .and_then(|i| i.checked_sub(1))
        .filter(|&i| i < position_count)
        .ok_or_else(|| {
            DecodeError::malformed(
                "OBJ",
                format!("bad vertex reference '{token}' on line {}", line_no + 1),
            )
        })?;

    let _texture = parts.next();
    let normal = match parts.next() {
        Some(part) if !part.is_empty() => {
            let index = part
                .parse::<usize>()
                .ok()
                .and_then(|i| i.checked_sub(1))
                .filter(|&i| i < normal_count)
                .ok_or_else(|| {
                    DecodeError::malformed(
                        "OBJ",
                        format!("bad normal reference '{token}' on line {}", line_no + 1),
                    )
                })?;
            Some(index)
        }
        _ => None,
    };

    Ok((position, normal))
}

/// STL, both binary and ASCII. The ASCII variant is detected by its
/// `solid`/`facet` keywords; everything else is treated as binary.
fn decode_stl(bytes: &[u8]) -> Result<MeshAsset, DecodeError> {
    if looks_like_ascii_stl(bytes) {
        decode_ascii_stl(bytes)
    } else {
        decode_binary_stl(bytes)
    }
}

fn looks_like_ascii_stl(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    text.trim_start().starts_with("solid") && text.contains("facet")
}

fn decode_binary_stl(bytes: &[u8]) -> Result<MeshAsset, DecodeError> {
    if bytes.len() < 84 {
        return Err(DecodeError::malformed(
            "STL",
            format!("binary file truncated at {} bytes", bytes.len()),
        ));
    }

    let triangle_count =
        u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    let expected = 84 + triangle_count * 50;
    if bytes.len() < expected {
        return Err(DecodeError::malformed(
            "STL",
            format!(
                "expected {expected} bytes for {triangle_count} triangles, got {}",
                bytes.len()
            ),
        ));
    }

    let mut geometry = Geometry {
        positions: Vec::with_capacity(triangle_count * 3),
        normals: Vec::with_capacity(triangle_count * 3),
        indices: Vec::with_capacity(triangle_count * 3),
    };

    for tri in 0..triangle_count {
        let record = &bytes[84 + tri * 50..84 + tri * 50 + 50];
        let floats = read_f32s(&record[..48]);
        let normal = [floats[0], floats[1], floats[2]];
        for corner in 0..3 {
            let base = 3 + corner * 3;
            geometry.indices.push(geometry.positions.len() as u32);
            geometry
                .positions
                .push([floats[base], floats[base + 1], floats[base + 2]]);
            geometry.normals.push(normal);
        }
    }

    Ok(MeshAsset::new(geometry, Material::default()))
}

fn decode_ascii_stl(bytes: &[u8]) -> Result<MeshAsset, DecodeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| DecodeError::malformed("STL", "ASCII file is not valid UTF-8"))?;

    let mut geometry = Geometry::default();
    let mut facet_normal = [0.0f32; 3];

    for (line_no, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("facet") => {
                // "facet normal nx ny nz"
                let _normal_kw = tokens.next();
                facet_normal = parse_triplet(&mut tokens, "STL", line_no)?;
            }
            Some("vertex") => {
                geometry.indices.push(geometry.positions.len() as u32);
                geometry
                    .positions
                    .push(parse_triplet(&mut tokens, "STL", line_no)?);
                geometry.normals.push(facet_normal);
            }
            _ => {}
        }
    }

    if geometry.indices.len() % 3 != 0 {
        return Err(DecodeError::malformed(
            "STL",
            format!("vertex count {} is not a multiple of 3", geometry.indices.len()),
        ));
    }

    Ok(MeshAsset::new(geometry, Material::default()))
}

/// Reads packed little-endian f32s, zero-copy when alignment allows.
pub(crate) fn read_f32s(bytes: &[u8]) -> Vec<f32> {
    match bytemuck::try_cast_slice::<u8, f32>(bytes) {
        Ok(floats) => floats.to_vec(),
        Err(_) => bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{export_obj, export_stl};

    const TRIANGLE_OBJ: &str = "\
# simple triangle
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";

    #[test]
    fn obj_triangle_decodes() {
        let asset = decode(TRIANGLE_OBJ.as_bytes(), "model.obj").expect("OBJ should decode");
        assert_eq!(asset.geometry.vertex_count(), 3);
        assert_eq!(asset.geometry.triangle_count(), 1);
        // Normals were absent and get computed.
        assert_eq!(asset.geometry.normals.len(), 3);
    }

    #[test]
    fn obj_with_normals_keeps_them() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";
        let asset = decode(obj.as_bytes(), "model.obj").expect("OBJ should decode");
        assert_eq!(asset.geometry.normals, vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn obj_quad_is_fan_triangulated() {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let asset = decode(obj.as_bytes(), "quad.obj").expect("OBJ should decode");
        assert_eq!(asset.geometry.triangle_count(), 2);
        assert_eq!(asset.geometry.vertex_count(), 4);
    }

    #[test]
    fn obj_bad_face_reference_is_rejected() {
        let obj = "v 0 0 0\nf 1 2 3\n";
        let err = decode(obj.as_bytes(), "bad.obj").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { format: "OBJ", .. }));
    }

    #[test]
    fn binary_stl_round_trips_through_export() {
        let source = decode(TRIANGLE_OBJ.as_bytes(), "tri.obj").expect("OBJ should decode");
        let stl = export_stl(&source, "tri");
        let decoded = decode(&stl, "tri.stl").expect("STL should decode");
        assert_eq!(decoded.geometry.triangle_count(), 1);
        assert_eq!(decoded.geometry.positions[0], [0.0, 0.0, 0.0]);
        assert_eq!(decoded.geometry.positions[1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn ascii_stl_decodes() {
        let stl = "\
solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid tri
";
        let asset = decode(stl.as_bytes(), "tri.stl").expect("ASCII STL should decode");
        assert_eq!(asset.geometry.triangle_count(), 1);
        assert_eq!(asset.geometry.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn truncated_binary_stl_is_rejected() {
        let mut bytes = vec![0u8; 84];
        bytes[80..84].copy_from_slice(&10u32.to_le_bytes());
        let err = decode(&bytes, "broken.stl").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { format: "STL", .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = decode(b"whatever", "model.fbx").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(ext) if ext == "fbx"));
    }

    #[test]
    fn json_gltf_is_unsupported_not_misparsed() {
        // Only the binary container is handled; the JSON form must not be
        // routed to the GLB parser and fail with a magic-number error.
        let err = decode(b"{\"asset\":{\"version\":\"2.0\"}}", "scene.gltf").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(ext) if ext == "gltf"));
    }

    #[test]
    fn oversized_input_is_rejected() {
        let bytes = vec![0u8; MAX_INPUT_BYTES + 1];
        let err = decode(&bytes, "big.stl").unwrap_err();
        assert!(matches!(err, DecodeError::TooLarge { .. }));
    }

    #[test]
    fn obj_export_of_decoded_asset_parses_again() {
        let asset = decode(TRIANGLE_OBJ.as_bytes(), "tri.obj").expect("OBJ should decode");
        let exported = export_obj(&asset);
        let round = decode(exported.as_bytes(), "tri.obj").expect("exported OBJ should decode");
        assert_eq!(round.geometry.triangle_count(), 1);
    }
}
