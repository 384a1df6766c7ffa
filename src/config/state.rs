// Application state module
// Immutable state shared by every connection

use super::types::Config;
use crate::api::CatalogService;

/// Application state
///
/// Built once before the listener starts and shared through an `Arc`; nothing
/// in it changes while the server runs, so no locking is involved.
pub struct AppState {
    pub config: Config,
    pub service: CatalogService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            service: CatalogService::new(),
        }
    }
}
