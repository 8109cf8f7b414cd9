//! Configuration loading from environment variables.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use anyhow::Context;
use object_store::ObjectStore;
use object_store::local::LocalFileSystem;

/// Object store key of the bundled fallback asset.
pub const FALLBACK_ASSET_KEY: &str = "fallback/default.stl";

/// Object store prefix under which downloaded blobs are kept.
pub const DOWNLOADS_PREFIX: &str = "downloads";

/// Returns the base path for the local asset store.
#[must_use]
pub fn get_base_path() -> PathBuf {
    dotenvy::dotenv().ok();

    std::env::var("MESHGEN_ASSET_PATH")
        .map_or_else(|_| PathBuf::from("meshgen_assets"), PathBuf::from)
}

/// Global asset store instance, lazily initialized.
///
/// Holds downloaded model blobs and the bundled fallback asset.
pub static ASSET_STORE: LazyLock<Arc<dyn ObjectStore>> = LazyLock::new(|| {
    let base_path = get_base_path();

    std::fs::create_dir_all(&base_path).expect("Failed to create asset store directory");

    Arc::new(LocalFileSystem::new_with_prefix(&base_path).expect("Failed to create asset store"))
});

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::from_env().expect("Failed to create config"));

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the generation backend
    pub api_base_url: String,

    /// API key for the generation backend
    pub api_key: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `MESHGEN_API_KEY`: API key for the generation backend
    ///
    /// Optional environment variables:
    /// - `MESHGEN_API_BASE_URL`: Backend base URL (default: `http://localhost:5000`)
    /// - `MESHGEN_ASSET_PATH`: Base directory for downloaded blobs and the
    ///   bundled fallback asset (default: `meshgen_assets`)
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file
        dotenvy::dotenv().ok();

        let api_key = std::env::var("MESHGEN_API_KEY")
            .context("MESHGEN_API_KEY environment variable not set")?;

        let api_base_url = std::env::var("MESHGEN_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());

        Ok(Self {
            api_base_url,
            api_key,
        })
    }
}
