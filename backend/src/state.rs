use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::PropertyRepo;
use crate::storage::ObjectStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Arc<dyn PropertyRepo>,
    pub storage: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repo: Arc<dyn PropertyRepo>,
        storage: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repo,
            storage,
        }
    }
}
