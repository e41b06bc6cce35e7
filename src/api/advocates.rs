use axum::{
    extract::{RawQuery, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::models::Criteria;
use crate::pagination;
use crate::seed;
use crate::state::AppState;

use super::{AdvocatesResponse, ApiError, SeedResponse};

/// Raw list parameters; `specialty` may repeat / 列表查询参数
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListParams {
    pub search: Option<String>,
    pub specialties: Vec<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    /// Parse an urlencoded query string; the first value wins for single keys / 解析查询字符串
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "search" if params.search.is_none() => params.search = Some(value.into_owned()),
                "specialty" => {
                    let value = value.trim();
                    if !value.is_empty() {
                        params.specialties.push(value.to_string());
                    }
                }
                "page" if params.page.is_none() => params.page = Some(value.into_owned()),
                "limit" if params.limit.is_none() => params.limit = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    pub fn into_criteria(self, default_limit: u64) -> Criteria {
        let request = pagination::normalize_with(self.page.as_deref(), self.limit.as_deref(), default_limit);
        Criteria::new(
            self.search.as_deref().unwrap_or(""),
            self.specialties,
            request.page,
            request.limit,
        )
    }
}

/// GET /api/advocates - 搜索并分页顾问列表
pub async fn list_advocates(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<AdvocatesResponse>, ApiError> {
    let params = ListParams::parse(query.as_deref().unwrap_or(""));
    let criteria = params.into_criteria(state.default_limit());

    let page = state
        .executor
        .execute(&criteria)
        .await
        .map_err(|e| ApiError::backend("Failed to fetch advocates", e))?;

    let pagination = page.pagination();
    Ok(Json(AdvocatesResponse { data: page.records, pagination }))
}

/// POST /api/seed - 将种子数据写入数据库（非幂等）
pub async fn seed_advocates(State(state): State<Arc<AppState>>) -> Result<Json<SeedResponse>, ApiError> {
    let advocates = state
        .executor
        .source()
        .insert(seed::seed_advocates())
        .await
        .map_err(|e| ApiError::backend("Failed to seed advocates", e))?;

    tracing::info!("Seeded {} advocates", advocates.len());
    Ok(Json(SeedResponse { advocates }))
}

#[derive(Debug, Serialize)]
pub struct SpecialtiesResponse {
    pub specialties: Vec<&'static str>,
}

/// GET /api/specialties - 可筛选的专长列表
pub async fn list_specialties() -> Json<SpecialtiesResponse> {
    Json(SpecialtiesResponse { specialties: seed::SPECIALTIES.to_vec() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_specialties() {
        let params = ListParams::parse("search=New+York&specialty=Bipolar&specialty=LGBTQ&specialty=&page=2&limit=5");
        assert_eq!(params.search.as_deref(), Some("New York"));
        assert_eq!(params.specialties, vec!["Bipolar", "LGBTQ"]);
        assert_eq!(params.page.as_deref(), Some("2"));
        assert_eq!(params.limit.as_deref(), Some("5"));
    }

    #[test]
    fn test_parse_decodes_reserved_characters() {
        let params = ListParams::parse("specialty=Trauma%20%26%20PTSD&search=%2550");
        assert_eq!(params.specialties, vec!["Trauma & PTSD"]);
        assert_eq!(params.search.as_deref(), Some("%50"));
    }

    #[test]
    fn test_into_criteria_defaults() {
        let criteria = ListParams::parse("page=abc&limit=-1&search=%20%20").into_criteria(10);
        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.limit, 10);
        assert!(criteria.is_unfiltered());
    }
}
