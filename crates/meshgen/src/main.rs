//! meshgen - text and image driven 3D model generation
//!
//! Submits generation jobs to the remote backend, polls them to
//! completion, and keeps results in a fingerprint-keyed cache so repeated
//! prompts resolve locally.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::ASSET_STORE;
use generation_api::HttpJobService;
use generation_structs::{GenerateStyle, GenerationOptions};
use model_registry::{ModelRegistry, shared_cache, spawn_sweeper};
use tracing_subscriber::EnvFilter;

mod commands;

/// Text and image driven 3D model generation
#[derive(Parser)]
#[command(name = "meshgen")]
#[command(about = "Generates 3D models from text prompts or reference images")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a model from a text prompt
    Generate {
        /// The text prompt describing the model
        #[arg(short, long)]
        prompt: String,

        /// Request PBR textures (ignored for geometry style)
        #[arg(long)]
        enable_pbr: bool,

        /// Target face count (40000-500000)
        #[arg(short, long)]
        face_count: Option<i64>,

        /// Generation style: normal, lowpoly, geometry, or sketch
        #[arg(short, long, default_value = "normal")]
        style: GenerateStyle,

        /// Write the result to this path (.obj or .stl)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate a model from a reference image
    GenerateImage {
        /// Path to the reference image
        #[arg(short = 'i', long)]
        file: PathBuf,

        /// Request PBR textures (ignored for geometry style)
        #[arg(long)]
        enable_pbr: bool,

        /// Target face count (40000-500000)
        #[arg(short, long)]
        face_count: Option<i64>,

        /// Generation style: normal, lowpoly, geometry, or sketch
        #[arg(short, long, default_value = "normal")]
        style: GenerateStyle,

        /// Write the result to this path (.obj or .stl)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Synthesize the built-in sample gallery locally
    Samples {
        /// Export each sample into this directory as OBJ
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cache = shared_cache();
    let sweeper = spawn_sweeper(Arc::clone(&cache));

    let service = HttpJobService::new()?;
    let mut registry = ModelRegistry::new(service)
        .with_cache(cache)
        .with_store(Arc::clone(&ASSET_STORE));

    match cli.command {
        Commands::Generate {
            prompt,
            enable_pbr,
            face_count,
            style,
            out,
        } => {
            let options = GenerationOptions {
                enable_pbr,
                face_count,
                style,
            };
            commands::generate::run(&mut registry, &prompt, options, out.as_deref()).await?;
        }
        Commands::GenerateImage {
            file,
            enable_pbr,
            face_count,
            style,
            out,
        } => {
            let options = GenerationOptions {
                enable_pbr,
                face_count,
                style,
            };
            commands::generate::run_image(&mut registry, &file, options, out.as_deref()).await?;
        }
        Commands::Samples { out_dir } => {
            commands::samples::run(&mut registry, out_dir.as_deref())?;
        }
    }

    sweeper.abort();
    Ok(())
}
