use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, info, instrument, warn};

use shared_database::{ClientError, SupabaseClient};

use crate::models::{
    ConversionRequest, ConversionResponse, ConversionSettings, ConvertedFile, JobStatusRequest,
    JobStatusResponse, SourceFile, FALLBACK_OUTPUT_MEDIA_TYPE, FALLBACK_SOURCE_MEDIA_TYPE,
};
use crate::services::detector::converted_filename;
use crate::services::poller::{poll_job, JobStatusSource, ProgressSink};

/// Turns OXPS/XPS uploads into PDFs through the conversion functions,
/// whether the backend answers inline or hands back a job to poll.
pub struct ConversionService {
    supabase: Arc<SupabaseClient>,
    settings: ConversionSettings,
    auth_token: Option<String>,
}

impl ConversionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            supabase,
            settings: ConversionSettings::default(),
            auth_token: None,
        }
    }

    pub fn with_settings(mut self, settings: ConversionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_auth_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    #[instrument(skip(self, content, progress), fields(file = %file.name))]
    pub async fn convert_if_needed(
        &self,
        file: &SourceFile,
        content: &str,
        progress: Option<ProgressSink<'_>>,
    ) -> Result<ConvertedFile, ClientError> {
        if !file.needs_conversion() {
            return Ok(ConvertedFile {
                content: content.to_string(),
                filename: file.name.clone(),
                media_type: file
                    .media_type
                    .clone()
                    .unwrap_or_else(|| FALLBACK_SOURCE_MEDIA_TYPE.to_string()),
                converted: false,
            });
        }

        let payload = normalize_payload(content);
        if BASE64.decode(&payload).is_err() {
            return Err(ClientError::ConversionFailed(
                "File content is not valid base64".to_string(),
            ));
        }

        info!("Submitting {} for conversion", file.name);

        let request = ConversionRequest {
            content: &payload,
            filename: &file.name,
        };
        let response: ConversionResponse = self
            .supabase
            .invoke_as(&self.settings.convert_function, &request, self.auth_token.as_deref())
            .await?;

        if response.is_async.unwrap_or(false) {
            let job_id = response.job_id.ok_or_else(|| {
                ClientError::ConversionFailed("Conversion was queued without a job id".to_string())
            })?;

            debug!("Conversion deferred to job {}", job_id);
            let result = poll_job(&job_id, &self.settings.poll, self, progress).await?;
            return Ok(finish(file, result.content, result.mime_type));
        }

        match (response.success.unwrap_or(false), response.content) {
            (true, Some(converted)) => Ok(finish(file, converted, response.mime_type)),
            _ => {
                let message = response
                    .error
                    .unwrap_or_else(|| "Conversion failed".to_string());
                warn!("Conversion of {} failed: {}", file.name, message);
                Err(ClientError::ConversionFailed(message))
            }
        }
    }
}

#[async_trait]
impl JobStatusSource for ConversionService {
    async fn fetch_status(&self, job_id: &str) -> Result<JobStatusResponse, ClientError> {
        self.supabase
            .invoke_as(
                &self.settings.status_function,
                &JobStatusRequest { job_id },
                self.auth_token.as_deref(),
            )
            .await
    }
}

fn finish(file: &SourceFile, content: String, media_type: Option<String>) -> ConvertedFile {
    ConvertedFile {
        content,
        filename: converted_filename(&file.name),
        media_type: media_type.unwrap_or_else(|| FALLBACK_OUTPUT_MEDIA_TYPE.to_string()),
        converted: true,
    }
}

/// Accepts both bare base64 and `data:<type>;base64,<payload>` strings.
fn strip_data_url(content: &str) -> &str {
    match content.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => content,
    }
}

/// Bare base64 with line breaks and padding spaces removed.
fn normalize_payload(content: &str) -> String {
    strip_data_url(content)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect()
}
