//! HTTP client for the generation backend.

use core::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use bytes::Bytes;
use config::CONFIG;
use generation_structs::JobId;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use crate::error::{DownloadError, QueryError, SubmitError};
use crate::models::{StatusResponse, SubmitResponse};
use crate::service::{GenerationRequest, JobService, JobStatus};

/// Backend error code meaning "all generation slots are busy".
const CONCURRENCY_LIMIT_ERROR: &str = "concurrency_limit";

/// Client for the generation backend API.
pub struct HttpJobService {
    client: Client,
    base_url: String,
}

impl HttpJobService {
    /// Creates a client against the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            base_url: CONFIG.api_base_url.clone(),
        })
    }

    /// Creates a client against an explicit base URL. Used by tests.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn submit_text(
        &self,
        prompt: &str,
        request: &GenerationRequest,
    ) -> Result<SubmitResponse, SubmitError> {
        let options = request.options();
        let body = json!({
            "prompt": prompt,
            "enable_pbr": options.enable_pbr,
            "face_count": options.face_count,
            "generate_type": options.style.as_api_string(),
        });

        let response = self
            .client
            .post(format!("{}/api/submit-text", self.base_url))
            .header("Authorization", &CONFIG.api_key)
            .json(&body)
            .send()
            .await?;

        Self::read_submit_response(response).await
    }

    async fn submit_image(
        &self,
        file_name: &str,
        bytes: &Bytes,
        request: &GenerationRequest,
    ) -> Result<SubmitResponse, SubmitError> {
        let options = request.options();
        let mut form = Form::new()
            .part(
                "file",
                Part::bytes(bytes.to_vec()).file_name(file_name.to_string()),
            )
            .text("enable_pbr", options.enable_pbr.to_string())
            .text("generate_type", options.style.as_api_string());
        if let Some(face_count) = options.face_count {
            form = form.text("face_count", face_count.to_string());
        }

        let response = self
            .client
            .post(format!("{}/api/submit-image", self.base_url))
            .header("Authorization", &CONFIG.api_key)
            .multipart(form)
            .send()
            .await?;

        Self::read_submit_response(response).await
    }

    fn download_url(&self, job_id: &JobId, index: usize) -> String {
        format!("{}/api/download/{job_id}/{index}", self.base_url)
    }

    async fn read_submit_response(
        response: reqwest::Response,
    ) -> Result<SubmitResponse, SubmitError> {
        let status = response.status();
        if status == StatusCode::CONFLICT {
            // 409 carries {"error": "concurrency_limit", "message": ...}.
            let body: SubmitResponse = response.json().await?;
            return Err(SubmitError::ResourceInsufficient {
                message: body.message.unwrap_or_else(|| "backend at capacity".into()),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmitError::Rejected {
                message: format!("status {status}: {body}"),
            });
        }
        Ok(response.json().await?)
    }
}

impl JobService for HttpJobService {
    async fn submit(&self, request: &GenerationRequest) -> Result<JobId, SubmitError> {
        let response = match request {
            GenerationRequest::Text { prompt, .. } => {
                info!(prompt_len = prompt.len(), "Submitting text job");
                self.submit_text(prompt, request).await?
            }
            GenerationRequest::Image {
                file_name, bytes, ..
            } => {
                info!(
                    file_name = %file_name,
                    bytes = bytes.len(),
                    "Submitting image job",
                );
                self.submit_image(file_name, bytes, request).await?
            }
        };

        if !response.ok {
            let message = response.message.unwrap_or_default();
            if response.error.as_deref() == Some(CONCURRENCY_LIMIT_ERROR) {
                return Err(SubmitError::ResourceInsufficient { message });
            }
            return Err(SubmitError::Rejected { message });
        }

        let job_id = response.job_id.ok_or_else(|| SubmitError::Rejected {
            message: "backend accepted the job but returned no job id".into(),
        })?;

        info!(job_id = %job_id, "Job accepted");
        Ok(JobId(job_id))
    }

    async fn query_status(&self, job_id: &JobId) -> Result<JobStatus, QueryError> {
        let response = self
            .client
            .get(format!("{}/api/status/{job_id}", self.base_url))
            .header("Authorization", &CONFIG.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(QueryError::UnknownJob(job_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Malformed(format!("status {status}: {body}")));
        }

        let data: StatusResponse = response
            .json()
            .await
            .map_err(|e| QueryError::Malformed(e.to_string()))?;

        Ok(JobStatus {
            state: data.status,
            error_message: data.error_message,
            files: data.files,
        })
    }

    async fn download(&self, job_id: &JobId, index: usize) -> Result<Bytes, DownloadError> {
        let client = &self.client;
        // Always fetch through the backend's proxy endpoint. Result URLs in
        // the status response may point at a third-party host, and the API
        // key must never travel there.
        let url = self.download_url(job_id, index);

        (|| async {
            info!(job_id = %job_id, url = %url, "Downloading result file");

            let response = client
                .get(&url)
                .header("Authorization", &CONFIG.api_key)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                if status == StatusCode::TOO_MANY_REQUESTS {
                    warn!(job_id = %job_id, "Rate limited (429), will retry");
                }
                return Err(DownloadError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = response.bytes().await?;
            info!(job_id = %job_id, bytes = bytes.len(), "Downloaded result file");
            Ok(bytes)
        })
        .retry(
            ExponentialBuilder::default()
                .with_max_times(3)
                .with_min_delay(Duration::from_secs(1))
                .with_max_delay(Duration::from_secs(8)),
        )
        .when(DownloadError::is_retryable)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downloads_go_through_the_backend_proxy() {
        let service = HttpJobService::with_base_url(Client::new(), "http://backend:5000");
        assert_eq!(
            service.download_url(&JobId::from("job-1"), 1),
            "http://backend:5000/api/download/job-1/1"
        );
    }
}
