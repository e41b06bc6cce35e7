use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::search::QueryExecutor;

pub struct AppState {
    pub executor: QueryExecutor,
    pub config: Arc<RwLock<AppConfig>>,
}

impl AppState {
    pub fn new(executor: QueryExecutor, config: Arc<RwLock<AppConfig>>) -> Self {
        Self { executor, config }
    }

    /// Page size used when a request has none / 默认每页数量
    pub fn default_limit(&self) -> u64 {
        self.config.read().directory.default_limit
    }
}
