//! Job orchestration on top of the generation backend: a TTL cache keyed
//! by request fingerprint, a fixed-cadence status poller, fallback asset
//! synthesis and the in-memory model registry the CLI works with.

pub mod cache;
pub mod fallback;
pub mod poller;
pub mod registry;

pub use cache::{AssetCache, CacheEntry, SharedCache, shared_cache, spawn_sweeper};
pub use fallback::fallback_asset;
pub use poller::{DriveOutcome, PollerConfig, SavedFile, drive};
pub use registry::{ModelRecord, ModelRegistry};
