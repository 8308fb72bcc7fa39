use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Media type reported for pass-through files that declared none.
pub const FALLBACK_SOURCE_MEDIA_TYPE: &str = "application/octet-stream";
/// Media type reported for converted output when the server names none.
pub const FALLBACK_OUTPUT_MEDIA_TYPE: &str = "application/pdf";
pub const OUTPUT_EXTENSION: &str = ".pdf";

pub const DEFAULT_CONVERT_FUNCTION: &str = "convert-oxps";
pub const DEFAULT_STATUS_FUNCTION: &str = "convert-oxps-status";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;

/// Metadata of a file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub media_type: Option<String>,
}

impl SourceFile {
    pub fn new(name: &str, media_type: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            media_type: media_type.map(str::to_string),
        }
    }
}

/// Content ready for analysis, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub content: String,
    pub filename: String,
    pub media_type: String,
    /// False when the input was handed back untouched.
    pub converted: bool,
}

#[derive(Debug, Serialize)]
pub struct ConversionRequest<'a> {
    pub content: &'a str,
    pub filename: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConversionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(rename = "async", default)]
    pub is_async: Option<bool>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobStatusRequest<'a> {
    pub job_id: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Complete,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobResult {
    pub content: String,
    #[serde(rename = "mimeType", alias = "mime_type", default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<JobResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A server-side conversion in progress, as last observed by the poll loop
/// that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub id: String,
    pub status: JobStatus,
    pub attempts: u32,
}

impl ConversionJob {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            status: JobStatus::Processing,
            attempts: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    /// Wall-clock ceiling of one poll loop.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversionSettings {
    pub convert_function: String,
    pub status_function: String,
    pub poll: PollSettings,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            convert_function: DEFAULT_CONVERT_FUNCTION.to_string(),
            status_function: DEFAULT_STATUS_FUNCTION.to_string(),
            poll: PollSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_budget_is_ninety_seconds() {
        assert_eq!(PollSettings::default().budget(), Duration::from_secs(90));
    }

    #[test]
    fn test_status_parsing_tolerates_unknown_values() {
        let parsed: JobStatusResponse = serde_json::from_value(json!({"status": "queued"})).unwrap();
        assert_eq!(parsed.status, JobStatus::Unknown);

        let parsed: JobStatusResponse = serde_json::from_value(json!({
            "status": "complete",
            "result": {"content": "JVBERi0=", "mimeType": "application/pdf"}
        }))
        .unwrap();
        assert_eq!(parsed.status, JobStatus::Complete);
        assert_eq!(parsed.result.unwrap().mime_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn test_conversion_response_field_names() {
        let parsed: ConversionResponse = serde_json::from_value(json!({
            "async": true,
            "job_id": "J1",
            "convertedFilename": "a.pdf"
        }))
        .unwrap();
        assert_eq!(parsed.is_async, Some(true));
        assert_eq!(parsed.job_id.as_deref(), Some("J1"));
        assert_eq!(parsed.success, None);
    }
}
