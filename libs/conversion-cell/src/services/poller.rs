use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use shared_database::ClientError;

use crate::models::{ConversionJob, JobResult, JobStatus, JobStatusResponse, PollSettings};

/// Receives human-readable progress lines while a job is polled.
pub type ProgressSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Where job status comes from. The conversion service answers it over
/// HTTP; tests substitute scripted fakes.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &str) -> Result<JobStatusResponse, ClientError>;
}

/// Polls `job_id` until it completes, fails, or the attempt budget runs out.
///
/// Each attempt waits `settings.interval` before asking, and attempts never
/// overlap. A failure to fetch the status ends the loop at once; so does an
/// `error` status. A `complete` status without a result payload is treated
/// as still running.
#[instrument(skip(settings, source, progress))]
pub async fn poll_job(
    job_id: &str,
    settings: &PollSettings,
    source: &dyn JobStatusSource,
    progress: Option<ProgressSink<'_>>,
) -> Result<JobResult, ClientError> {
    let mut job = ConversionJob::new(job_id);

    while job.attempts < settings.max_attempts {
        job.attempts += 1;

        if let Some(report) = progress {
            let elapsed = settings.interval * job.attempts;
            report(&format!("Converting document... ({}s elapsed)", elapsed.as_secs()));
        }

        sleep(settings.interval).await;

        let response = source.fetch_status(&job.id).await?;
        job.status = response.status;

        match response.status {
            JobStatus::Complete => match response.result {
                Some(result) => {
                    info!("Conversion job {} complete after {} polls", job.id, job.attempts);
                    return Ok(result);
                }
                None => warn!("Conversion job {} reported complete without a result", job.id),
            },
            JobStatus::Error => {
                let message = response
                    .error
                    .unwrap_or_else(|| "Conversion failed".to_string());
                warn!("Conversion job {} failed: {}", job.id, message);
                return Err(ClientError::ConversionFailed(message));
            }
            JobStatus::Processing | JobStatus::Unknown => {
                debug!("Conversion job {} still {:?} (attempt {})", job.id, job.status, job.attempts);
            }
        }
    }

    let seconds = settings.budget().as_secs();
    warn!("Conversion job {} gave up after {} attempts", job.id, job.attempts);
    Err(ClientError::ConversionTimeout { seconds })
}
