//! Job records tracking one asynchronous generation request.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{Fingerprint, MeshAsset};

/// Opaque job identifier issued by the remote system at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Which pipeline produced a job. Affects the download variant: text jobs
/// fetch the mesh-only encoding, image jobs prefer the textured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationKind {
    Text,
    Image,
}

/// Local lifecycle state of a generation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Accepted by the remote system, waiting to start.
    Queued,
    /// Remote pipeline is running.
    Running,
    /// Remote pipeline finished; fetching the result blob.
    Downloading,
    /// Terminal: a renderable asset is available.
    Completed,
    /// Terminal: the remote system reported failure.
    Failed {
        /// Remote error message, propagated verbatim.
        message: String,
    },
    /// Terminal: the poll attempt budget was exhausted.
    TimedOut,
}

impl JobState {
    /// Returns true once the record must no longer be mutated.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed { .. } | Self::TimedOut
        )
    }
}

/// One in-flight or completed generation request.
///
/// Created at submission; mutated only by the poller until a terminal state
/// is reached, after which it is read-only.
#[derive(Debug, Clone)]
pub struct JobRecord {
    /// Remote job identifier issued at submission.
    pub id: JobId,
    /// Cache fingerprint of the input.
    pub source_key: Fingerprint,
    /// Pipeline that produced the job.
    pub kind: GenerationKind,
    /// Current lifecycle state.
    pub state: JobState,
    /// Status-poll attempts made so far.
    pub attempt: u32,
    /// Decoded asset, present only once `state` is `Completed`.
    pub result_asset: Option<MeshAsset>,
    /// True when `result_asset` came from a local or synthesized source.
    pub is_fallback: bool,
}

impl JobRecord {
    /// Creates a record for a freshly accepted remote job.
    #[must_use]
    pub fn new(id: JobId, source_key: Fingerprint, kind: GenerationKind) -> Self {
        Self {
            id,
            source_key,
            kind,
            state: JobState::Queued,
            attempt: 0,
            result_asset: None,
            is_fallback: false,
        }
    }

    /// Marks the record completed with the given asset.
    pub fn complete(&mut self, asset: MeshAsset, is_fallback: bool) {
        self.result_asset = Some(asset);
        self.is_fallback = is_fallback;
        self.state = JobState::Completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_recognized() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::TimedOut.is_terminal());
        assert!(
            JobState::Failed {
                message: "boom".to_string()
            }
            .is_terminal()
        );
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(!JobState::Downloading.is_terminal());
    }

    #[test]
    fn complete_populates_asset_and_flag() {
        let mut record = JobRecord::new(
            JobId::from("job-1"),
            Fingerprint::from_text("a red cube"),
            GenerationKind::Text,
        );
        record.complete(
            MeshAsset::new(crate::Geometry::default(), crate::Material::default()),
            true,
        );
        assert_eq!(record.id, JobId::from("job-1"));
        assert_eq!(record.state, JobState::Completed);
        assert!(record.is_fallback);
        assert!(record.result_asset.is_some());
    }
}
