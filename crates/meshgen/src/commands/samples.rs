//! Samples command - synthesizes the built-in gallery without the backend.

use std::path::Path;

use anyhow::{Context, Result};
use generation_api::service::JobService;
use model_registry::ModelRegistry;

/// Runs the samples command.
///
/// # Errors
///
/// Returns an error if exporting a sample fails.
pub fn run<S: JobService>(
    registry: &mut ModelRegistry<S>,
    out_dir: Option<&Path>,
) -> Result<()> {
    registry.seed_samples();

    println!("Sample gallery ({} models):", registry.list().len());
    for record in registry.list() {
        println!(
            "  {name}: {vertices} vertices, {triangles} triangles",
            name = record.name,
            vertices = record.asset.geometry.vertex_count(),
            triangles = record.asset.geometry.triangle_count(),
        );
    }

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for record in registry.list() {
            let file_name = format!("{}.obj", record.name.replace(' ', "_"));
            let path = dir.join(file_name);
            super::write_asset(&record.asset, &path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
