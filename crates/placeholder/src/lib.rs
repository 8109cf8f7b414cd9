//! Deterministic placeholder asset synthesis.
//!
//! When the remote pipeline is unavailable or its output cannot be decoded,
//! the user still gets a renderable result: a procedural primitive whose
//! shape, scale, detail and material are all derived from the input
//! fingerprint. Identical input always yields the identical asset.

mod shapes;

use generation_structs::{Fingerprint, Geometry, Material, MaterialKind, MeshAsset};

pub use shapes::{
    box_geometry, cone, cylinder, dodecahedron, icosahedron, octahedron, sphere, torus,
};

/// Shape family chosen for a placeholder asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    Box,
    Sphere,
    Torus,
    Cone,
    Cylinder,
    Octahedron,
    Dodecahedron,
    Icosahedron,
}

const SHAPE_FAMILIES: [ShapeFamily; 8] = [
    ShapeFamily::Box,
    ShapeFamily::Sphere,
    ShapeFamily::Torus,
    ShapeFamily::Cone,
    ShapeFamily::Cylinder,
    ShapeFamily::Octahedron,
    ShapeFamily::Dodecahedron,
    ShapeFamily::Icosahedron,
];

/// Three-tone color palettes, packed as 0xRRGGBB.
const COLOR_PALETTES: [[u32; 3]; 10] = [
    [0xff6b6b, 0xff8e8e, 0xffb3b3], // reds
    [0x4ecdc4, 0x6fe4dc, 0x95f1ea], // teals
    [0x45b7d1, 0x6bc5d8, 0x91d3df], // blues
    [0xf9ca24, 0xfad946, 0xfbe868], // yellows
    [0xf0932b, 0xf3a549, 0xf6b767], // oranges
    [0xeb4d4b, 0xef6b69, 0xf38987], // dark reds
    [0x6c5ce7, 0x8b7bea, 0xaa99ed], // purples
    [0xa29bfe, 0xb4affe, 0xc6c3fe], // lavenders
    [0x26de81, 0x4de393, 0x74e8a5], // greens
    [0xfd79a8, 0xfe92b8, 0xfeabc8], // pinks
];

/// 32-bit string hash (the classic 31-multiplier scheme).
///
/// Every derived parameter slices a different part of this value, so the
/// whole placeholder is a pure function of the input string.
#[must_use]
pub fn fingerprint_hash(input: &str) -> i32 {
    let mut hash: i32 = 0;
    for ch in input.chars() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(ch as i32);
    }
    hash
}

/// Synthesizes the deterministic placeholder asset for a fingerprint.
#[must_use]
pub fn synthesize(fingerprint: &Fingerprint) -> MeshAsset {
    let hash = fingerprint_hash(fingerprint.key());
    MeshAsset::new(placeholder_geometry(hash), placeholder_material(hash))
}

/// Shape family selected for a hash. Exposed so tests can assert stability.
#[must_use]
pub fn shape_family(hash: i32) -> ShapeFamily {
    SHAPE_FAMILIES[hash.unsigned_abs() as usize % SHAPE_FAMILIES.len()]
}

fn placeholder_geometry(hash: i32) -> Geometry {
    let scale = 0.8 + slice(hash, 1000) * 0.4; // 0.8..1.2
    let detail = ((hash % 64).unsigned_abs()).max(16) as u32;

    let mut geometry = match shape_family(hash) {
        ShapeFamily::Box => box_geometry(scale),
        ShapeFamily::Sphere => sphere(scale, detail),
        ShapeFamily::Torus => torus(scale, scale * 0.4, detail, detail * 2),
        ShapeFamily::Cone => cone(scale, scale * 2.0, detail),
        ShapeFamily::Cylinder => cylinder(scale, scale * 0.8, scale * 2.0, detail),
        ShapeFamily::Octahedron => octahedron(scale),
        ShapeFamily::Dodecahedron => dodecahedron(scale),
        ShapeFamily::Icosahedron => icosahedron(scale),
    };

    if geometry.normals.is_empty() {
        geometry.compute_vertex_normals();
    }
    geometry
}

fn placeholder_material(hash: i32) -> Material {
    let palette = COLOR_PALETTES[hash.unsigned_abs() as usize % COLOR_PALETTES.len()];
    // A different bit-slice picks the tone so shape and color vary
    // independently.
    let color = palette[(hash >> 8).unsigned_abs() as usize % palette.len()];
    let opacity = 0.85 + slice(hash, 100) * 0.15; // 0.85..1.0

    let kind = match (hash >> 16).unsigned_abs() % 3 {
        0 => MaterialKind::Standard {
            metalness: slice(hash, 50) * 0.3,
            roughness: 0.2 + slice(hash, 80) * 0.6,
        },
        1 => MaterialKind::Physical {
            metalness: slice(hash, 40) * 0.4,
            roughness: 0.1 + slice(hash, 70) * 0.7,
            clearcoat: slice(hash, 30) * 0.5,
        },
        _ => MaterialKind::Phong {
            shininess: 50.0 + (hash % 150).unsigned_abs() as f32,
        },
    };

    Material::from_rgb_hex(color, kind, opacity)
}

/// Maps `|hash % modulus| / modulus` into 0..1.
fn slice(hash: i32, modulus: i32) -> f32 {
    (hash % modulus).unsigned_abs() as f32 / modulus as f32
}
