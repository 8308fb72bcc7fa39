pub mod conversion;
pub mod detector;
pub mod poller;

pub use conversion::ConversionService;
pub use detector::{needs_conversion, TRIGGER_EXTENSIONS, TRIGGER_MEDIA_TYPES};
pub use poller::{poll_job, JobStatusSource, ProgressSink};
