//! The backend abstraction the registry and poller are written against.

use core::future::Future;

use bytes::Bytes;
use generation_structs::{GenerationOptions, JobId};

use crate::error::{DownloadError, QueryError, SubmitError};
use crate::models::{RemoteState, ResultFile};

/// A generation job submission.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    /// Generate from a text prompt.
    Text {
        prompt: String,
        options: GenerationOptions,
    },

    /// Generate from a reference image.
    Image {
        file_name: String,
        bytes: Bytes,
        options: GenerationOptions,
    },
}

impl GenerationRequest {
    #[must_use]
    pub const fn options(&self) -> &GenerationOptions {
        match self {
            Self::Text { options, .. } | Self::Image { options, .. } => options,
        }
    }
}

/// Snapshot of a job's remote state.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub state: RemoteState,
    pub error_message: Option<String>,
    pub files: Vec<ResultFile>,
}

/// Interface to the remote generation backend.
///
/// [`crate::HttpJobService`] implements this against the real HTTP API;
/// tests script their own implementations.
pub trait JobService {
    /// Submits a job and returns the assigned id.
    fn submit(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<JobId, SubmitError>> + Send;

    /// Queries the current state of a previously submitted job.
    fn query_status(
        &self,
        job_id: &JobId,
    ) -> impl Future<Output = Result<JobStatus, QueryError>> + Send;

    /// Downloads one result file of a finished job by variant index.
    fn download(
        &self,
        job_id: &JobId,
        index: usize,
    ) -> impl Future<Output = Result<Bytes, DownloadError>> + Send;
}
