use async_trait::async_trait;
use std::time::Duration;

use crate::api::{AdvocatesResponse, ErrorBody};
use crate::error::FetchError;
use crate::models::{Criteria, ResultPage};
use crate::search::QueryExecutor;

/// Transport used by the query controller / 控制器使用的查询通道
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, criteria: &Criteria) -> Result<ResultPage, FetchError>;
}

/// Fetch pages from `GET /api/advocates` / 通过HTTP接口查询
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Query pairs for one request; empty search text is omitted / 构建查询参数
    pub fn query_pairs(criteria: &Criteria) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", criteria.page.to_string()),
            ("limit", criteria.limit.to_string()),
        ];
        if !criteria.search_text.is_empty() {
            pairs.push(("search", criteria.search_text.clone()));
        }
        for category in &criteria.categories {
            pairs.push(("specialty", category.clone()));
        }
        pairs
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, criteria: &Criteria) -> Result<ResultPage, FetchError> {
        let url = format!("{}/api/advocates", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&Self::query_pairs(criteria))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(FetchError::Status { status: status.as_u16(), message });
        }

        let body: AdvocatesResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(ResultPage::from_parts(body.data, body.pagination))
    }
}

/// In-process fetcher over a query executor / 进程内查询
#[derive(Clone)]
pub struct ExecutorFetcher {
    executor: QueryExecutor,
}

impl ExecutorFetcher {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Fetcher for ExecutorFetcher {
    async fn fetch(&self, criteria: &Criteria) -> Result<ResultPage, FetchError> {
        self.executor.execute(criteria).await.map_err(|e| {
            tracing::error!("Failed to fetch advocates: {:?}", e);
            FetchError::Backend(e)
        })
    }
}
