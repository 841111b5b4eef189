use std::sync::Arc;

use crate::config::Config;
use crate::correction::TextCorrector;
use crate::layout::LayoutConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Page geometry, flow thresholds and page limit. Read-only after startup.
    pub layout: Arc<LayoutConfig>,
    /// Pluggable prose corrector. Default: PassthroughCorrector.
    pub corrector: Arc<dyn TextCorrector>,
}
