use crate::analysis::AnalysisClient;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: AnalysisClient,
    pub config: Config,
}
