//! Generate commands - text and image submissions.

use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use generation_api::service::JobService;
use generation_structs::GenerationOptions;
use model_registry::ModelRegistry;

/// Runs the text generation command.
///
/// # Errors
///
/// Returns an error if generation fails or the output cannot be written.
pub async fn run<S: JobService>(
    registry: &mut ModelRegistry<S>,
    prompt: &str,
    options: GenerationOptions,
    out: Option<&Path>,
) -> Result<()> {
    println!("Generating model for prompt: {prompt}");

    let record = registry.generate_from_text(prompt, options).await?;
    report(record);

    if let Some(path) = out {
        super::write_asset(&record.asset, path)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Runs the image generation command.
///
/// # Errors
///
/// Returns an error if the image cannot be read, generation fails, or the
/// output cannot be written.
pub async fn run_image<S: JobService>(
    registry: &mut ModelRegistry<S>,
    file: &Path,
    options: GenerationOptions,
    out: Option<&Path>,
) -> Result<()> {
    println!("Generating model from image: {}", file.display());

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image.png");

    let record = registry
        .generate_from_image(file_name, Bytes::from(bytes), options)
        .await?;
    report(record);

    if let Some(path) = out {
        super::write_asset(&record.asset, path)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn report(record: &model_registry::ModelRecord) {
    let source = if record.is_fallback {
        "fallback"
    } else {
        "generated"
    };
    println!(
        "Model {id}: {vertices} vertices, {triangles} triangles ({source})",
        id = record.id,
        vertices = record.asset.geometry.vertex_count(),
        triangles = record.asset.geometry.triangle_count(),
    );
}
