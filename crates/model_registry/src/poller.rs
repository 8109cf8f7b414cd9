//! Fixed-cadence status polling that drives a job record to a terminal
//! state.

use std::time::Duration;

use bytes::Bytes;
use generation_api::models::{RemoteState, ResultFile};
use generation_api::service::JobService;
use generation_structs::{GenerationKind, JobId, JobRecord, JobState};
use tracing::{debug, info, warn};

/// Polling cadence and budget. The interval is fixed; there is no backoff,
/// matching the backend's expectation of one status probe every 10 seconds.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 30,
        }
    }
}

/// What `drive` produced: the terminal record, plus the raw result bytes
/// when a remote download succeeded (for callers that persist them).
#[derive(Debug)]
pub struct DriveOutcome {
    pub record: JobRecord,
    pub download: Option<SavedFile>,
}

/// A downloaded result blob under its storage name, `{job}_{idx}.{ext}`.
#[derive(Debug)]
pub struct SavedFile {
    pub name: String,
    pub bytes: Bytes,
}

/// Polls the job until it completes, fails, or the attempt budget runs
/// out. Query errors count against the budget and polling continues; an
/// unreachable backend must not stall the caller forever.
///
/// Once the remote side reports success, download or decode problems no
/// longer fail the job: the record completes with a synthesized
/// placeholder and `is_fallback` set.
pub async fn drive<S: JobService>(
    service: &S,
    mut record: JobRecord,
    config: &PollerConfig,
) -> DriveOutcome {
    let job_id = record.id.clone();

    while record.attempt < config.max_attempts {
        tokio::time::sleep(config.interval).await;
        record.attempt += 1;

        let status = match service.query_status(&job_id).await {
            Ok(status) => status,
            Err(error) => {
                warn!(
                    job_id = %job_id,
                    attempt = record.attempt,
                    error = %error,
                    "Status query failed, continuing",
                );
                continue;
            }
        };

        match status.state {
            RemoteState::Wait => {
                debug!(job_id = %job_id, attempt = record.attempt, "Job queued");
                record.state = JobState::Queued;
            }
            RemoteState::Run => {
                debug!(job_id = %job_id, attempt = record.attempt, "Job running");
                record.state = JobState::Running;
            }
            RemoteState::Fail => {
                let message = status
                    .error_message
                    .unwrap_or_else(|| "generation failed".to_string());
                warn!(job_id = %job_id, message = %message, "Job failed remotely");
                record.state = JobState::Failed { message };
                return DriveOutcome {
                    record,
                    download: None,
                };
            }
            RemoteState::Done => {
                info!(
                    job_id = %job_id,
                    attempts = record.attempt,
                    files = status.files.len(),
                    "Job done, downloading result",
                );
                record.state = JobState::Downloading;
                return fetch_result(service, record, &job_id, &status.files).await;
            }
        }
    }

    warn!(
        job_id = %job_id,
        attempts = record.attempt,
        "Poll budget exhausted",
    );
    record.state = JobState::TimedOut;
    DriveOutcome {
        record,
        download: None,
    }
}

/// Text jobs take the first file (the mesh-only encoding); image jobs
/// prefer the second (textured) when the backend produced one.
fn pick_file(kind: GenerationKind, files: &[ResultFile]) -> Option<(usize, &ResultFile)> {
    let index = match kind {
        GenerationKind::Text => 0,
        GenerationKind::Image => usize::from(files.len() > 1),
    };
    files.get(index).map(|file| (index, file))
}

fn storage_name(job_id: &JobId, index: usize, file: &ResultFile) -> String {
    let extension = file
        .url
        .rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map_or_else(|| file.kind.to_lowercase(), |(_, ext)| ext.to_lowercase());
    format!("{job_id}_{index}.{extension}")
}

async fn fetch_result<S: JobService>(
    service: &S,
    mut record: JobRecord,
    job_id: &JobId,
    files: &[ResultFile],
) -> DriveOutcome {
    let Some((index, file)) = pick_file(record.kind, files) else {
        warn!(job_id = %job_id, "Job done but produced no files, using placeholder");
        let asset = placeholder::synthesize(&record.source_key);
        record.complete(asset, true);
        return DriveOutcome {
            record,
            download: None,
        };
    };

    let name = storage_name(job_id, index, file);
    let bytes = match service.download(job_id, index).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(
                job_id = %job_id,
                error = %error,
                "Download failed after remote success, using placeholder",
            );
            let asset = placeholder::synthesize(&record.source_key);
            record.complete(asset, true);
            return DriveOutcome {
                record,
                download: None,
            };
        }
    };

    match mesh_codec::decode(&bytes, &name) {
        Ok(asset) => {
            record.complete(asset, false);
            DriveOutcome {
                record,
                download: Some(SavedFile { name, bytes }),
            }
        }
        Err(error) => {
            warn!(
                job_id = %job_id,
                file = %name,
                error = %error,
                "Result failed to decode, using placeholder",
            );
            let asset = placeholder::synthesize(&record.source_key);
            record.complete(asset, true);
            DriveOutcome {
                record,
                download: None,
            }
        }
    }
}
