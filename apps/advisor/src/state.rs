use std::sync::Arc;

use crate::config::Config;
use crate::retrieval::source::ModuleSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable module source. Default: `CatalogModuleSource`.
    pub module_source: Arc<dyn ModuleSource>,
}
