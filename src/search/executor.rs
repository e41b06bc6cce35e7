use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::QueryBackendError;
use crate::models::{Criteria, ResultPage};
use crate::pagination::{self, PageRequest};

use super::filter::Filter;
use super::memory::MemorySource;
use super::source::{RecordSource, SharedSource, SourceKind};
use super::store::StoreSource;

/// Query executor over a record source / 查询执行器
///
/// Stateless and read-only per call; cheap to clone and safe to use from many
/// requests at once.
#[derive(Clone)]
pub struct QueryExecutor {
    source: SharedSource,
}

impl QueryExecutor {
    pub fn new(source: SharedSource) -> Self {
        Self { source }
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    pub fn source(&self) -> &SharedSource {
        &self.source
    }

    /// Run one query: build the filter once, then count and window with it / 执行查询
    pub async fn execute(&self, criteria: &Criteria) -> Result<ResultPage, QueryBackendError> {
        let filter = Filter::from_criteria(criteria);
        let window = PageRequest { page: criteria.page, limit: criteria.limit };

        let selection = self.source.select(&filter, window).await?;
        tracing::debug!(
            "Query on {} source: search={:?} categories={:?} page={} limit={} -> total={} returned={}",
            self.source.kind().as_str(),
            criteria.search_text,
            criteria.categories,
            criteria.page,
            criteria.limit,
            selection.total,
            selection.records.len()
        );

        Ok(ResultPage {
            records: selection.records,
            total: selection.total,
            page: criteria.page,
            limit: criteria.limit,
            total_pages: pagination::total_pages(selection.total, criteria.limit),
        })
    }
}

/// Pick the record source once at startup / 启动时选择数据源
///
/// A configured connection string selects the store; otherwise the static
/// seed dataset is served from memory.
pub async fn select_source(config: &AppConfig) -> anyhow::Result<SharedSource> {
    match config.database_url() {
        Some(url) => {
            let store = StoreSource::connect_lazy(&url)?;
            if let Err(e) = crate::db::run_migrations(store.pool()).await {
                tracing::error!("Store migrations failed, queries will report backend errors: {:#}", e);
            }
            tracing::info!("Using store-backed advocate source");
            Ok(Arc::new(store))
        }
        None => {
            let memory = MemorySource::from_seed();
            tracing::info!("No database configured, serving {} seed advocates from memory", memory.len());
            Ok(Arc::new(memory))
        }
    }
}
