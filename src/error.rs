//! Error taxonomy / 错误分类
//!
//! - `ValidationError`: malformed pagination input, recovered by defaulting
//! - `QueryBackendError`: store failures, surfaced as a generic message
//! - `FetchError`: client-side fetch failures (cancellation is not a failure)

use thiserror::Error;

/// Malformed pagination parameter / 分页参数无效
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is missing")]
    Missing { field: &'static str },
    #[error("{field} is not a number: {value:?}")]
    NotNumeric { field: &'static str, value: String },
    #[error("{field} must be at least {min}, got {value}")]
    OutOfRange { field: &'static str, value: i64, min: i64 },
}

/// Record source failure / 数据源错误
#[derive(Debug, Error)]
pub enum QueryBackendError {
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
    #[error("malformed specialties column for advocate {id}: {source}")]
    Decode {
        id: i64,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode specialties: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("no store configured")]
    NotConfigured,
}

impl QueryBackendError {
    /// Classify a sqlx error: pool/IO failures mean the store is unreachable / 区分连接错误与查询错误
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err)
            }
            other => Self::Query(other),
        }
    }
}

impl From<sqlx::Error> for QueryBackendError {
    fn from(err: sqlx::Error) -> Self {
        Self::from_sqlx(err)
    }
}

/// Client fetch failure / 客户端请求错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// Superseded by newer criteria; never shown to the user / 已被新请求取代
    #[error("request cancelled")]
    Cancelled,
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(String),
    /// Detail stays in the logs; the message is fixed / 详情只写日志
    #[error("Failed to fetch advocates")]
    Backend(#[source] QueryBackendError),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
