pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AnalysisKind, AnalysisRequest, AnalysisResponse, Completion};
pub use router::analysis_routes;
