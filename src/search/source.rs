use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::error::QueryBackendError;
use crate::models::{Advocate, NewAdvocate};
use crate::pagination::PageRequest;

use super::filter::Filter;

/// Matches for one query: full count plus the requested window / 查询结果（总数+窗口）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub total: u64,
    pub records: Vec<Advocate>,
}

/// Backend kind, reported by the health endpoint / 数据源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Store,
    Memory,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Memory => "memory",
        }
    }
}

/// Record source capability (store or in-memory) / 记录数据源接口
///
/// `select` must compute `total` and `records` from the same `filter` against
/// the same view of the data, in ascending id order.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Count all matches and fetch the `window` slice / 计数并取分页窗口
    async fn select(&self, filter: &Filter, window: PageRequest) -> Result<Selection, QueryBackendError>;

    /// Insert seed rows, returning them with assigned ids / 插入种子数据
    async fn insert(&self, rows: &[NewAdvocate]) -> Result<Vec<Advocate>, QueryBackendError>;
}

pub type SharedSource = Arc<dyn RecordSource>;

/// Convert a u64 window bound into a slice index / 转换为切片下标
pub(crate) fn to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
