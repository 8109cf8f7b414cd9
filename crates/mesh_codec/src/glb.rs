//! Binary glTF container and the subset of the glTF 2.0 document we read:
//! the first primitive's POSITION/NORMAL attributes, its indices and its
//! metallic-roughness material.

use generation_structs::{Geometry, Material, MaterialKind, MeshAsset};
use serde::Deserialize;

use crate::DecodeError;
use crate::decode::read_f32s;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const COMPONENT_U8: u32 = 5121;
const COMPONENT_U16: u32 = 5123;
const COMPONENT_U32: u32 = 5125;
const COMPONENT_F32: u32 = 5126;

#[derive(Debug, Deserialize)]
struct Gltf {
    #[serde(default)]
    meshes: Vec<GltfMesh>,
    #[serde(default)]
    accessors: Vec<Accessor>,
    #[serde(rename = "bufferViews", default)]
    buffer_views: Vec<BufferView>,
    #[serde(default)]
    materials: Vec<GltfMaterial>,
}

#[derive(Debug, Deserialize)]
struct GltfMesh {
    #[serde(default)]
    primitives: Vec<Primitive>,
}

#[derive(Debug, Deserialize)]
struct Primitive {
    attributes: PrimitiveAttributes,
    indices: Option<usize>,
    material: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PrimitiveAttributes {
    #[serde(rename = "POSITION")]
    position: Option<usize>,
    #[serde(rename = "NORMAL")]
    normal: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct Accessor {
    #[serde(rename = "bufferView")]
    buffer_view: Option<usize>,
    #[serde(rename = "byteOffset", default)]
    byte_offset: usize,
    #[serde(rename = "componentType")]
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct BufferView {
    #[serde(rename = "byteOffset", default)]
    byte_offset: usize,
    #[serde(rename = "byteLength")]
    byte_length: usize,
}

#[derive(Debug, Deserialize)]
struct GltfMaterial {
    #[serde(rename = "pbrMetallicRoughness")]
    pbr: Option<PbrMetallicRoughness>,
}

#[derive(Debug, Deserialize)]
struct PbrMetallicRoughness {
    #[serde(rename = "baseColorFactor")]
    base_color_factor: Option<[f32; 4]>,
    #[serde(rename = "metallicFactor")]
    metallic_factor: Option<f32>,
    #[serde(rename = "roughnessFactor")]
    roughness_factor: Option<f32>,
}

/// Decodes a `.glb` container: 12-byte header, a JSON chunk, then the
/// binary payload chunk.
pub(crate) fn decode_glb(bytes: &[u8]) -> Result<MeshAsset, DecodeError> {
    if bytes.len() < 12 {
        return Err(DecodeError::malformed("GLB", "file shorter than the header"));
    }
    if read_u32(bytes, 0) != GLB_MAGIC {
        return Err(DecodeError::malformed("GLB", "bad magic number"));
    }
    let version = read_u32(bytes, 4);
    if version != 2 {
        return Err(DecodeError::malformed(
            "GLB",
            format!("unsupported container version {version}"),
        ));
    }

    let mut json_chunk: Option<&[u8]> = None;
    let mut bin_chunk: &[u8] = &[];
    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let length = read_u32(bytes, offset) as usize;
        let kind = read_u32(bytes, offset + 4);
        let start = offset + 8;
        let end = start
            .checked_add(length)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| DecodeError::malformed("GLB", "chunk overruns the file"))?;
        match kind {
            CHUNK_JSON => json_chunk = Some(&bytes[start..end]),
            CHUNK_BIN => bin_chunk = &bytes[start..end],
            _ => {}
        }
        // Chunks are 4-byte aligned.
        offset = end + (4 - end % 4) % 4;
    }

    let json = json_chunk.ok_or_else(|| DecodeError::malformed("GLB", "missing JSON chunk"))?;
    let document: Gltf = serde_json::from_slice(json)?;
    build_asset(&document, bin_chunk)
}

fn build_asset(document: &Gltf, bin: &[u8]) -> Result<MeshAsset, DecodeError> {
    let primitive = document
        .meshes
        .iter()
        .flat_map(|mesh| mesh.primitives.iter())
        .next()
        .ok_or(DecodeError::MissingGeometry)?;

    let position_accessor = primitive
        .attributes
        .position
        .ok_or(DecodeError::MissingGeometry)?;

    let mut geometry = Geometry {
        positions: read_vec3_accessor(document, position_accessor, bin)?,
        ..Geometry::default()
    };
    if let Some(normal) = primitive.attributes.normal {
        geometry.normals = read_vec3_accessor(document, normal, bin)?;
    }
    geometry.indices = match primitive.indices {
        Some(accessor) => read_index_accessor(document, accessor, bin)?,
        None => (0..geometry.positions.len() as u32).collect(),
    };

    let material = primitive
        .material
        .and_then(|i| document.materials.get(i))
        .map_or_else(Material::default, material_from_gltf);

    Ok(MeshAsset::new(geometry, material))
}

fn material_from_gltf(source: &GltfMaterial) -> Material {
    let Some(pbr) = &source.pbr else {
        return Material::default();
    };
    let base = pbr.base_color_factor.unwrap_or([1.0, 1.0, 1.0, 1.0]);
    Material {
        color: [base[0], base[1], base[2]],
        opacity: base[3],
        kind: MaterialKind::Standard {
            metalness: pbr.metallic_factor.unwrap_or(1.0),
            roughness: pbr.roughness_factor.unwrap_or(1.0),
        },
    }
}

fn accessor_bytes<'a>(
    document: &Gltf,
    index: usize,
    bin: &'a [u8],
    element_size: usize,
) -> Result<(&'a [u8], usize), DecodeError> {
    let accessor = document
        .accessors
        .get(index)
        .ok_or_else(|| DecodeError::malformed("GLB", format!("accessor {index} out of range")))?;
    let view_index = accessor
        .buffer_view
        .ok_or_else(|| DecodeError::malformed("GLB", "accessor without a buffer view"))?;
    let view = document
        .buffer_views
        .get(view_index)
        .ok_or_else(|| DecodeError::malformed("GLB", format!("buffer view {view_index} out of range")))?;

    // Offsets and counts come straight from untrusted JSON; every step of
    // the arithmetic must be checked or a hostile file panics the decoder.
    let view_end = view
        .byte_offset
        .checked_add(view.byte_length)
        .filter(|&end| end <= bin.len())
        .ok_or_else(|| DecodeError::malformed("GLB", "buffer view overruns the payload"))?;
    let start = view
        .byte_offset
        .checked_add(accessor.byte_offset)
        .ok_or_else(|| DecodeError::malformed("GLB", "accessor offset overflows"))?;
    let end = accessor
        .count
        .checked_mul(element_size)
        .and_then(|len| start.checked_add(len))
        .filter(|&end| end <= view_end)
        .ok_or_else(|| DecodeError::malformed("GLB", "accessor overruns its buffer view"))?;
    Ok((&bin[start..end], accessor.count))
}

fn read_vec3_accessor(
    document: &Gltf,
    index: usize,
    bin: &[u8],
) -> Result<Vec<[f32; 3]>, DecodeError> {
    if let Some(accessor) = document.accessors.get(index)
        && (accessor.kind != "VEC3" || accessor.component_type != COMPONENT_F32)
    {
        return Err(DecodeError::malformed(
            "GLB",
            format!("accessor {index} is not a float VEC3"),
        ));
    }

    let (bytes, count) = accessor_bytes(document, index, bin, 12)?;
    let floats = read_f32s(bytes);
    Ok((0..count)
        .map(|i| [floats[i * 3], floats[i * 3 + 1], floats[i * 3 + 2]])
        .collect())
}

fn read_index_accessor(
    document: &Gltf,
    index: usize,
    bin: &[u8],
) -> Result<Vec<u32>, DecodeError> {
    let component_type = document
        .accessors
        .get(index)
        .map(|a| a.component_type)
        .ok_or_else(|| DecodeError::malformed("GLB", format!("accessor {index} out of range")))?;

    match component_type {
        COMPONENT_U8 => {
            let (bytes, _) = accessor_bytes(document, index, bin, 1)?;
            Ok(bytes.iter().map(|&b| u32::from(b)).collect())
        }
        COMPONENT_U16 => {
            let (bytes, _) = accessor_bytes(document, index, bin, 2)?;
            Ok(bytes
                .chunks_exact(2)
                .map(|c| u32::from(u16::from_le_bytes([c[0], c[1]])))
                .collect())
        }
        COMPONENT_U32 => {
            let (bytes, _) = accessor_bytes(document, index, bin, 4)?;
            Ok(bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect())
        }
        other => Err(DecodeError::malformed(
            "GLB",
            format!("unsupported index component type {other}"),
        )),
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    /// Assembles a GLB container from a JSON document and a binary payload.
    fn wrap_glb(json: &serde_json::Value, bin: &[u8]) -> Vec<u8> {
        let mut json_bytes = serde_json::to_vec(json).expect("document serializes");
        while json_bytes.len() % 4 != 0 {
            json_bytes.push(b' ');
        }

        let total = 12 + 8 + json_bytes.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend(GLB_MAGIC.to_le_bytes());
        out.extend(2u32.to_le_bytes());
        out.extend((total as u32).to_le_bytes());
        out.extend((json_bytes.len() as u32).to_le_bytes());
        out.extend(CHUNK_JSON.to_le_bytes());
        out.extend(&json_bytes);
        out.extend((bin.len() as u32).to_le_bytes());
        out.extend(CHUNK_BIN.to_le_bytes());
        out.extend(bin);
        out
    }

    fn triangle_payload() -> (Vec<u8>, usize) {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mut bin: Vec<u8> = positions.iter().flat_map(|f| f.to_le_bytes()).collect();
        let index_offset = bin.len();
        for index in [0u16, 1, 2] {
            bin.extend(index.to_le_bytes());
        }
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        (bin, index_offset)
    }

    /// Builds a one-triangle GLB with u16 indices and a standard material.
    fn triangle_glb() -> Vec<u8> {
        let (bin, index_offset) = triangle_payload();
        let json = serde_json::json!({
            "asset": {"version": "2.0"},
            "meshes": [{"primitives": [{
                "attributes": {"POSITION": 0},
                "indices": 1,
                "material": 0
            }]}],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
                {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
            ],
            "bufferViews": [
                {"buffer": 0, "byteOffset": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": index_offset, "byteLength": 6}
            ],
            "buffers": [{"byteLength": bin.len()}],
            "materials": [{"pbrMetallicRoughness": {
                "baseColorFactor": [0.8, 0.2, 0.1, 1.0],
                "metallicFactor": 0.5,
                "roughnessFactor": 0.3
            }}]
        });
        wrap_glb(&json, &bin)
    }

    #[test]
    fn glb_triangle_decodes() {
        let asset = decode(&triangle_glb(), "model.glb").expect("GLB should decode");
        assert_eq!(asset.geometry.vertex_count(), 3);
        assert_eq!(asset.geometry.indices, vec![0, 1, 2]);
        // No NORMAL attribute in the fixture, so normals get computed.
        assert_eq!(asset.geometry.normals.len(), 3);
    }

    #[test]
    fn glb_material_maps_to_standard() {
        let asset = decode(&triangle_glb(), "model.glb").expect("GLB should decode");
        assert_eq!(asset.material.color, [0.8, 0.2, 0.1]);
        assert!(matches!(
            asset.material.kind,
            MaterialKind::Standard { metalness, roughness }
                if (metalness - 0.5).abs() < 1e-6 && (roughness - 0.3).abs() < 1e-6
        ));
    }

    #[test]
    fn glb_bad_magic_is_rejected() {
        let mut bytes = triangle_glb();
        bytes[0] = b'X';
        let err = decode(&bytes, "model.glb").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { format: "GLB", .. }));
    }

    #[test]
    fn glb_huge_accessor_count_is_rejected() {
        // A count large enough that count * element_size wraps usize must
        // come back as a decode error, never an overflow or bad slice.
        let (bin, _) = triangle_payload();
        let json = serde_json::json!({
            "asset": {"version": "2.0"},
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "accessors": [{
                "bufferView": 0,
                "componentType": 5126,
                "count": 1_537_228_672_809_129_302u64,
                "type": "VEC3"
            }],
            "bufferViews": [{"buffer": 0, "byteOffset": 0, "byteLength": 36}],
            "buffers": [{"byteLength": bin.len()}]
        });
        let err = decode(&wrap_glb(&json, &bin), "model.glb").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { format: "GLB", .. }));
    }

    #[test]
    fn glb_overflowing_accessor_offset_is_rejected() {
        let (bin, _) = triangle_payload();
        let json = serde_json::json!({
            "asset": {"version": "2.0"},
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "accessors": [{
                "bufferView": 0,
                "byteOffset": usize::MAX,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3"
            }],
            "bufferViews": [{"buffer": 0, "byteOffset": 0, "byteLength": 36}],
            "buffers": [{"byteLength": bin.len()}]
        });
        let err = decode(&wrap_glb(&json, &bin), "model.glb").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { format: "GLB", .. }));
    }

    #[test]
    fn glb_wrong_version_is_rejected() {
        let mut bytes = triangle_glb();
        bytes[4..8].copy_from_slice(&1u32.to_le_bytes());
        let err = decode(&bytes, "model.glb").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { format: "GLB", .. }));
    }
}
