//! Client for the remote 3D generation backend: job submission, status
//! queries and result downloads.

pub mod client;
pub mod error;
pub mod models;
pub mod service;

pub use client::HttpJobService;
pub use error::{DownloadError, QueryError, SubmitError};
pub use models::{RemoteState, ResultFile, StatusResponse, SubmitResponse};
pub use service::{GenerationRequest, JobService, JobStatus};
