//! CLI command implementations.

pub mod generate;
pub mod samples;

use std::path::Path;

use anyhow::{Context, Result, bail};
use generation_structs::MeshAsset;

/// Writes an asset to `path`, encoding by the path's extension.
pub fn write_asset(asset: &MeshAsset, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase();

    match extension.as_str() {
        "obj" => std::fs::write(path, mesh_codec::export_obj(asset)),
        "stl" => {
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("meshgen");
            std::fs::write(path, mesh_codec::export_stl(asset, name))
        }
        other => bail!("unsupported output format '{other}' (use .obj or .stl)"),
    }
    .with_context(|| format!("Failed to write {}", path.display()))
}
