//! Fallback asset selection for submissions the backend turns away.

use std::sync::Arc;

use config::FALLBACK_ASSET_KEY;
use generation_structs::{Fingerprint, MeshAsset};
use object_store::ObjectStore;
use object_store::path::Path;
use tracing::{debug, warn};

/// Produces a stand-in asset when the backend is at capacity: the bundled
/// fallback model if the store has one, a synthesized placeholder shaped
/// by the fingerprint otherwise.
pub async fn fallback_asset(
    store: Option<&Arc<dyn ObjectStore>>,
    fingerprint: &Fingerprint,
) -> MeshAsset {
    if let Some(store) = store {
        match load_bundled(store).await {
            Ok(asset) => {
                debug!("Using bundled fallback asset");
                return asset;
            }
            Err(error) => {
                warn!(error = %error, "Bundled fallback unavailable, synthesizing placeholder");
            }
        }
    }
    placeholder::synthesize(fingerprint)
}

async fn load_bundled(store: &Arc<dyn ObjectStore>) -> anyhow::Result<MeshAsset> {
    let bytes = store
        .get(&Path::from(FALLBACK_ASSET_KEY))
        .await?
        .bytes()
        .await?;
    Ok(mesh_codec::decode(&bytes, FALLBACK_ASSET_KEY)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::local::LocalFileSystem;

    #[tokio::test]
    async fn without_a_store_the_placeholder_is_synthesized() {
        let fingerprint = Fingerprint::from_text("a red cube");
        let asset = fallback_asset(None, &fingerprint).await;
        assert_eq!(asset, placeholder::synthesize(&fingerprint));
    }

    #[tokio::test]
    async fn missing_bundled_asset_falls_through_to_placeholder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: Arc<dyn ObjectStore> =
            Arc::new(LocalFileSystem::new_with_prefix(dir.path()).expect("local store"));

        let fingerprint = Fingerprint::from_text("anything");
        let asset = fallback_asset(Some(&store), &fingerprint).await;
        assert_eq!(asset, placeholder::synthesize(&fingerprint));
    }

    #[tokio::test]
    async fn bundled_asset_wins_when_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: Arc<dyn ObjectStore> =
            Arc::new(LocalFileSystem::new_with_prefix(dir.path()).expect("local store"));

        let bundled = placeholder::synthesize(&Fingerprint::from_text("bundled"));
        let stl = mesh_codec::export_stl(&bundled, "fallback");
        store
            .put(&Path::from(FALLBACK_ASSET_KEY), stl.into())
            .await
            .expect("put fallback");

        let fingerprint = Fingerprint::from_text("a red cube");
        let asset = fallback_asset(Some(&store), &fingerprint).await;
        assert_ne!(asset, placeholder::synthesize(&fingerprint));
        assert_eq!(
            asset.geometry.triangle_count(),
            bundled.geometry.triangle_count()
        );
    }
}
