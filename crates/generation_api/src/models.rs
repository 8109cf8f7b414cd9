//! Wire types for the generation backend API.

use serde::{Deserialize, Serialize};

/// Response from the submit endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitResponse {
    /// Whether the submission was accepted. Error bodies (e.g. the 409
    /// capacity response) omit the field entirely.
    #[serde(default)]
    pub ok: bool,

    /// Identifier of the queued job (present when accepted)
    pub job_id: Option<String>,

    /// The prompt the backend actually used, when it rewrites or augments
    /// the submitted one
    pub prompt_used: Option<String>,

    /// Machine-readable error code (e.g. "concurrency_limit")
    pub error: Option<String>,

    /// Human-readable error message
    pub message: Option<String>,
}

/// Response from GET /api/status/{job_id}.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusResponse {
    /// Whether the query itself succeeded
    pub ok: bool,

    /// Current job state on the backend
    pub status: RemoteState,

    /// Backend error code when the job failed
    pub error_code: Option<i64>,

    /// Backend error message when the job failed
    pub error_message: Option<String>,

    /// Result files, populated once the job is done
    #[serde(default)]
    pub files: Vec<ResultFile>,
}

/// Remote job lifecycle states as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RemoteState {
    /// Queued, not yet started
    #[serde(rename = "WAIT")]
    Wait,

    /// Generation in progress
    #[serde(rename = "RUN")]
    Run,

    /// Finished successfully, files available
    #[serde(rename = "DONE")]
    Done,

    /// Finished with an error
    #[serde(rename = "FAIL")]
    Fail,
}

/// One downloadable result file. The backend serializes these with
/// capitalized keys.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultFile {
    /// File kind, usually the output format (e.g. "glb", "obj")
    #[serde(rename = "Type")]
    pub kind: String,

    /// Download URL for the file
    #[serde(rename = "Url")]
    pub url: String,

    /// Optional rendered preview image
    #[serde(rename = "PreviewImageUrl")]
    pub preview_image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_deserializes() {
        let json = r#"{
            "ok": true,
            "status": "DONE",
            "error_code": null,
            "error_message": null,
            "files": [
                {"Type": "glb", "Url": "https://host/f.glb", "PreviewImageUrl": null}
            ]
        }"#;
        let status: StatusResponse = serde_json::from_str(json).expect("status should parse");
        assert_eq!(status.status, RemoteState::Done);
        assert_eq!(status.files.len(), 1);
        assert_eq!(status.files[0].kind, "glb");
    }

    #[test]
    fn missing_files_defaults_to_empty() {
        let json = r#"{"ok": true, "status": "WAIT", "error_code": null, "error_message": null}"#;
        let status: StatusResponse = serde_json::from_str(json).expect("status should parse");
        assert!(status.files.is_empty());
    }

    #[test]
    fn submit_rejection_carries_error_fields() {
        let json = r#"{"ok": false, "job_id": null, "error": "concurrency_limit", "message": "busy"}"#;
        let response: SubmitResponse = serde_json::from_str(json).expect("response should parse");
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("concurrency_limit"));
    }

    #[test]
    fn capacity_error_body_parses_without_ok() {
        let json = r#"{"error": "concurrency_limit", "message": "all slots busy"}"#;
        let response: SubmitResponse = serde_json::from_str(json).expect("body should parse");
        assert!(!response.ok);
        assert_eq!(response.message.as_deref(), Some("all slots busy"));
    }
}
