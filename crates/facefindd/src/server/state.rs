use std::sync::Arc;
use std::time::Duration;

use facefind_core::{PhotoStore, SearchParams};

use crate::config::Config;
use crate::engine::EngineHandle;

/// Shared per-process state handed to every request handler.
///
/// The store is read-only after load; concurrent queries need no locking.
pub struct AppState {
    pub store: PhotoStore,
    pub engine: EngineHandle,
    pub search: SearchParams,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(store: PhotoStore, engine: EngineHandle, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            store,
            engine,
            search: SearchParams {
                top_k: config.top_k,
                min_score: config.min_score,
            },
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }
}
