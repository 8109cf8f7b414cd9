//! The in-memory model registry: submits jobs, consults the cache, drives
//! the poller and keeps the resulting assets around for listing and export.

use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use config::DOWNLOADS_PREFIX;
use generation_api::error::SubmitError;
use generation_api::service::{GenerationRequest, JobService};
use generation_structs::{Fingerprint, GenerationKind, GenerationOptions, JobRecord, JobState};
use object_store::ObjectStore;
use object_store::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{SharedCache, shared_cache};
use crate::fallback::fallback_asset;
use crate::poller::{DriveOutcome, PollerConfig, drive};

/// One generated (or fallback) model held by the registry.
#[derive(Debug, Clone)]
pub struct ModelRecord {
    pub id: Uuid,
    /// Display name: the prompt for text jobs, the file name for image jobs.
    pub name: String,
    pub kind: GenerationKind,
    /// Fingerprint key the asset is cached under.
    pub source_key: String,
    pub asset: generation_structs::MeshAsset,
    pub created_at: SystemTime,
    pub is_fallback: bool,
}

/// Registry of generated models. Submissions go through the fingerprint
/// cache first; only misses reach the backend. Methods take `&mut self`,
/// so two generations for the same fingerprint cannot race.
pub struct ModelRegistry<S: JobService> {
    service: S,
    cache: SharedCache,
    poller: PollerConfig,
    store: Option<Arc<dyn ObjectStore>>,
    records: Vec<ModelRecord>,
}

impl<S: JobService> ModelRegistry<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            cache: shared_cache(),
            poller: PollerConfig::default(),
            store: None,
            records: Vec::new(),
        }
    }

    /// Shares an externally owned cache (e.g. one with a sweeper attached).
    #[must_use]
    pub fn with_cache(mut self, cache: SharedCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_poller(mut self, poller: PollerConfig) -> Self {
        self.poller = poller;
        self
    }

    /// Attaches the asset store used for the bundled fallback model and
    /// for persisting downloaded results.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Generates a model from a text prompt.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid options, a rejected submission, a
    /// remote failure, or an exhausted poll budget.
    pub async fn generate_from_text(
        &mut self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<&ModelRecord> {
        let options = options.validated().map_err(anyhow::Error::msg)?;
        let fingerprint = Fingerprint::from_text(prompt);
        let request = GenerationRequest::Text {
            prompt: prompt.to_string(),
            options,
        };
        self.generate(prompt.to_string(), fingerprint, GenerationKind::Text, request)
            .await
    }

    /// Generates a model from a reference image.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::generate_from_text`].
    pub async fn generate_from_image(
        &mut self,
        file_name: &str,
        bytes: Bytes,
        options: GenerationOptions,
    ) -> Result<&ModelRecord> {
        let options = options.validated().map_err(anyhow::Error::msg)?;
        let fingerprint = Fingerprint::from_file_bytes(&bytes);
        let request = GenerationRequest::Image {
            file_name: file_name.to_string(),
            bytes,
            options,
        };
        self.generate(
            file_name.to_string(),
            fingerprint,
            GenerationKind::Image,
            request,
        )
        .await
    }

    async fn generate(
        &mut self,
        name: String,
        fingerprint: Fingerprint,
        kind: GenerationKind,
        request: GenerationRequest,
    ) -> Result<&ModelRecord> {
        let key = fingerprint.key().to_string();

        let cached = self
            .cache
            .lock()
            .expect("cache lock poisoned")
            .get(&key);
        if let Some(entry) = cached {
            info!(key = %fingerprint, "Cache hit, skipping submission");
            return Ok(self.push_record(name, kind, key, entry.asset, entry.is_fallback));
        }

        let record = match self.service.submit(&request).await {
            Ok(job_id) => JobRecord::new(job_id, fingerprint.clone(), kind),
            Err(SubmitError::ResourceInsufficient { message }) => {
                warn!(message = %message, "Backend at capacity, resolving locally");
                let asset = fallback_asset(self.store.as_ref(), &fingerprint).await;
                self.cache
                    .lock()
                    .expect("cache lock poisoned")
                    .insert(key.clone(), asset.clone(), true);
                return Ok(self.push_record(name, kind, key, asset, true));
            }
            Err(error) => return Err(error).context("job submission failed"),
        };

        let DriveOutcome { record, download } =
            drive(&self.service, record, &self.poller).await;

        match record.state {
            JobState::Completed => {
                if let Some(saved) = download {
                    self.persist_download(&saved.name, saved.bytes).await;
                }
                let asset = record
                    .result_asset
                    .context("completed job carries no asset")?;
                self.cache
                    .lock()
                    .expect("cache lock poisoned")
                    .insert(key.clone(), asset.clone(), record.is_fallback);
                Ok(self.push_record(name, kind, key, asset, record.is_fallback))
            }
            JobState::Failed { message } => bail!("generation failed: {message}"),
            JobState::TimedOut => bail!(
                "generation timed out after {attempts} status checks",
                attempts = record.attempt
            ),
            // drive only returns terminal records
            other => bail!("poller returned non-terminal state {other:?}"),
        }
    }

    async fn persist_download(&self, name: &str, bytes: Bytes) {
        let Some(store) = &self.store else {
            return;
        };
        let path = Path::from(format!("{DOWNLOADS_PREFIX}/{name}"));
        match store.put(&path, bytes.into()).await {
            Ok(_) => info!(path = %path, "Persisted downloaded result"),
            Err(error) => warn!(path = %path, error = %error, "Failed to persist download"),
        }
    }

    fn push_record(
        &mut self,
        name: String,
        kind: GenerationKind,
        source_key: String,
        asset: generation_structs::MeshAsset,
        is_fallback: bool,
    ) -> &ModelRecord {
        self.records.push(ModelRecord {
            id: Uuid::new_v4(),
            name,
            kind,
            source_key,
            asset,
            created_at: SystemTime::now(),
            is_fallback,
        });
        self.records.last().expect("record was just pushed")
    }

    /// Seeds the gallery with locally synthesized sample models.
    pub fn seed_samples(&mut self) {
        for prompt in SAMPLE_PROMPTS {
            let fingerprint = Fingerprint::from_text(prompt);
            let asset = placeholder::synthesize(&fingerprint);
            let key = fingerprint.key().to_string();
            self.push_record(
                (*prompt).to_string(),
                GenerationKind::Text,
                key,
                asset,
                true,
            );
        }
        info!(count = SAMPLE_PROMPTS.len(), "Seeded sample models");
    }

    #[must_use]
    pub fn list(&self) -> &[ModelRecord] {
        &self.records
    }

    #[must_use]
    pub fn find(&self, id: Uuid) -> Option<&ModelRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn by_kind(&self, kind: GenerationKind) -> impl Iterator<Item = &ModelRecord> {
        self.records.iter().filter(move |record| record.kind == kind)
    }

    /// Removes a record by id, returning whether it existed. The cache
    /// entry stays; removal only affects the gallery.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() < before
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Prompts for the built-in sample gallery.
const SAMPLE_PROMPTS: &[&str] = &[
    "a red sports car",
    "a medieval castle",
    "a friendly robot",
    "a potted plant",
    "a wooden sailboat",
    "a crystal dragon",
];
