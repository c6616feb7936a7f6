//! Shared state handed to every HTTP handler.

use std::sync::Arc;

use crate::application::background::BackgroundTasks;
use crate::application::services::UrlService;
use crate::domain::repositories::RecordStore;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::clicks::ClickEmitter;

/// Explicitly constructed dependencies owned by the composition root
/// ([`crate::server::build_state`]).
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    /// Direct store handle, used by the health check only.
    pub record_store: Arc<dyn RecordStore>,
    pub cache: Arc<dyn CacheService>,
    pub click_emitter: Arc<dyn ClickEmitter>,
    pub tasks: BackgroundTasks,
    /// Overrides the request `Host` when building short URLs.
    pub public_base_url: Option<String>,
    pub disabled_redirect_path: String,
}
