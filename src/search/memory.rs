//! In-memory record source / 内存数据源
//!
//! Serves the static seed dataset when no store is configured. The records
//! are shared read-only; inserts are rejected.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::QueryBackendError;
use crate::models::{Advocate, NewAdvocate};
use crate::pagination::PageRequest;
use crate::seed;

use super::filter::Filter;
use super::source::{to_index, RecordSource, Selection, SourceKind};

pub struct MemorySource {
    records: Arc<[Advocate]>,
}

impl MemorySource {
    pub fn new(records: Arc<[Advocate]>) -> Self {
        Self { records }
    }

    /// Source over the built-in seed dataset / 基于内置种子数据
    pub fn from_seed() -> Self {
        Self::new(seed::with_sequential_ids(seed::seed_advocates()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Memory
    }

    async fn select(&self, filter: &Filter, window: PageRequest) -> Result<Selection, QueryBackendError> {
        let matched: Vec<&Advocate> = self.records.iter().filter(|a| filter.matches(a)).collect();
        let total = matched.len() as u64;
        let records = matched
            .into_iter()
            .skip(to_index(window.offset()))
            .take(to_index(window.limit))
            .cloned()
            .collect();
        Ok(Selection { total, records })
    }

    async fn insert(&self, _rows: &[NewAdvocate]) -> Result<Vec<Advocate>, QueryBackendError> {
        Err(QueryBackendError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_select_windows_in_order() {
        let source = MemorySource::from_seed();
        assert_eq!(source.len(), 15);

        let filter = Filter::new("", &[]);
        let page = source.select(&filter, PageRequest { page: 2, limit: 10 }).await.unwrap();
        assert_eq!(page.total, 15);
        let ids: Vec<i64> = page.records.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![11, 12, 13, 14, 15]);
    }

    #[tokio::test]
    async fn test_insert_is_rejected() {
        let source = MemorySource::from_seed();
        let err = source.insert(seed::seed_advocates()).await.unwrap_err();
        assert!(matches!(err, QueryBackendError::NotConfigured));
        assert_eq!(source.len(), 15);
    }
}
