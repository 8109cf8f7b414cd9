//! Error taxonomy for the backend client. Submission, status queries and
//! downloads fail in different ways and the poller reacts differently to
//! each, so they get separate types.

use thiserror::Error;

/// Errors from job submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The backend is at its concurrency limit and cannot take the job.
    /// Callers fall back to a locally synthesized asset.
    #[error("backend at capacity: {message}")]
    ResourceInsufficient { message: String },

    /// The backend rejected the submission for any other reason.
    #[error("submission rejected: {message}")]
    Rejected { message: String },

    #[error("transport error during submit")]
    Transport(#[from] reqwest::Error),
}

/// Errors from a status query. All variants are treated as transient by
/// the poller except where noted.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The backend does not know the job id.
    #[error("unknown job id {0}")]
    UnknownJob(String),

    #[error("network error during status query")]
    Network(#[from] reqwest::Error),

    #[error("malformed status response: {0}")]
    Malformed(String),
}

/// Errors from downloading a result file.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error during download")]
    Transport(#[from] reqwest::Error),

    #[error("job produced no downloadable files")]
    NoFiles,
}

impl DownloadError {
    /// Whether a retry could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) => true,
            Self::NoFiles => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_server_errors_are_retryable() {
        assert!(
            DownloadError::Status {
                status: 429,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            DownloadError::Status {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(
            !DownloadError::Status {
                status: 404,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!DownloadError::NoFiles.is_retryable());
    }
}
