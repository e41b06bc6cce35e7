//! SQLite-backed record source / SQLite数据源
//!
//! Count and window queries run inside one read transaction so both see the
//! same snapshot of the table.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::db;
use crate::error::QueryBackendError;
use crate::models::{Advocate, NewAdvocate};
use crate::pagination::PageRequest;

use super::filter::Filter;
use super::source::{RecordSource, Selection, SourceKind};

#[derive(Debug, sqlx::FromRow)]
struct AdvocateRow {
    id: i64,
    first_name: String,
    last_name: String,
    city: String,
    degree: String,
    specialties: String,
    years_of_experience: i64,
    phone_number: i64,
}

impl TryFrom<AdvocateRow> for Advocate {
    type Error = QueryBackendError;

    fn try_from(row: AdvocateRow) -> Result<Self, Self::Error> {
        let specialties: Vec<String> = serde_json::from_str(&row.specialties)
            .map_err(|source| QueryBackendError::Decode { id: row.id, source })?;
        Ok(Advocate {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            city: row.city,
            degree: row.degree,
            specialties,
            years_of_experience: row.years_of_experience,
            phone_number: row.phone_number,
        })
    }
}

const COLUMNS: &str = "id, first_name, last_name, city, degree, specialties, years_of_experience, phone_number";

pub struct StoreSource {
    pool: SqlitePool,
}

impl StoreSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool lazily; the store is only contacted on first use / 延迟连接
    ///
    /// In-memory SQLite URLs get a single pinned connection, otherwise every
    /// pooled connection would see its own empty database.
    pub fn connect_lazy(url: &str) -> Result<Self, QueryBackendError> {
        let options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };
        let pool = options.connect_lazy(url).map_err(QueryBackendError::Unavailable)?;
        Ok(Self { pool })
    }

    /// Connect and apply migrations / 连接并初始化表结构
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let source = Self::connect_lazy(url)?;
        db::run_migrations(&source.pool).await?;
        Ok(source)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl RecordSource for StoreSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Store
    }

    async fn select(&self, filter: &Filter, window: PageRequest) -> Result<Selection, QueryBackendError> {
        let predicate = filter.to_sql();
        let mut tx = self.pool.begin().await?;

        let count_sql = format!("SELECT COUNT(*) FROM advocates WHERE {}", predicate.clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in &predicate.binds {
            count_query = count_query.bind(bind.clone());
        }
        let total = count_query.fetch_one(&mut *tx).await?;

        let fetch_sql = format!(
            "SELECT {} FROM advocates WHERE {} ORDER BY id LIMIT ? OFFSET ?",
            COLUMNS, predicate.clause
        );
        let mut fetch_query = sqlx::query_as::<_, AdvocateRow>(&fetch_sql);
        for bind in &predicate.binds {
            fetch_query = fetch_query.bind(bind.clone());
        }
        let rows = fetch_query
            .bind(to_sql_int(window.limit))
            .bind(to_sql_int(window.offset()))
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let records = rows
            .into_iter()
            .map(Advocate::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection { total: total.max(0) as u64, records })
    }

    async fn insert(&self, rows: &[NewAdvocate]) -> Result<Vec<Advocate>, QueryBackendError> {
        db::insert_advocates(&self.pool, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    async fn seeded_store() -> StoreSource {
        let store = StoreSource::connect("sqlite::memory:").await.unwrap();
        store.insert(seed::seed_advocates()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = StoreSource::connect("sqlite::memory:").await.unwrap();
        let inserted = store.insert(seed::seed_advocates()).await.unwrap();
        let ids: Vec<i64> = inserted.iter().map(|a| a.id).collect();
        assert_eq!(ids, (1..=15).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_reseeding_duplicates_rows() {
        let store = seeded_store().await;
        store.insert(seed::seed_advocates()).await.unwrap();
        let all = store.select(&Filter::new("", &[]), PageRequest { page: 1, limit: 100 }).await.unwrap();
        assert_eq!(all.total, 30);
    }

    #[tokio::test]
    async fn test_select_filters_and_windows() {
        let store = seeded_store().await;

        let page = store.select(&Filter::new("", &[]), PageRequest { page: 2, limit: 10 }).await.unwrap();
        assert_eq!(page.total, 15);
        assert_eq!(page.records.len(), 5);
        assert_eq!(page.records[0].id, 11);

        let smith = store.select(&Filter::new("SMITH", &[]), PageRequest::default()).await.unwrap();
        assert_eq!(smith.total, 1);
        assert_eq!(smith.records[0].last_name, "Smith");
        assert_eq!(smith.records[0].specialties, seed::seed_advocates()[1].specialties);
    }

    #[tokio::test]
    async fn test_select_specialty_text_and_category() {
        let store = seeded_store().await;

        let ptsd = store.select(&Filter::new("ptsd", &[]), PageRequest::default()).await.unwrap();
        let expected = seed::seed_advocates()
            .iter()
            .filter(|a| a.specialties.iter().any(|s| s.contains("PTSD")))
            .count() as u64;
        assert_eq!(ptsd.total, expected);

        let bipolar = store
            .select(&Filter::new("", &["Bipolar".to_string(), "Nonexistent".to_string()]), PageRequest::default())
            .await
            .unwrap();
        assert!(bipolar.total > 0);
        assert!(bipolar.records.iter().all(|a| a.specialties.contains(&"Bipolar".to_string())));
    }

    #[tokio::test]
    async fn test_select_folds_non_ascii_case() {
        let store = StoreSource::connect("sqlite::memory:").await.unwrap();
        let row = NewAdvocate {
            first_name: "Émile".to_string(),
            last_name: "Zola".to_string(),
            city: "Ünna".to_string(),
            degree: "MD".to_string(),
            specialties: vec!["Thérapie".to_string()],
            years_of_experience: 3,
            phone_number: 5551234567,
        };
        store.insert(&[row]).await.unwrap();

        for text in ["émile", "ÉMILE", "ü", "THÉRAPIE"] {
            let hit = store.select(&Filter::new(text, &[]), PageRequest::default()).await.unwrap();
            assert_eq!(hit.total, 1, "search {:?}", text);
            assert_eq!(hit.records[0].first_name, "Émile");
        }
        // Category filters stay exact
        let miss = store
            .select(&Filter::new("", &["thérapie".to_string()]), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(miss.total, 0);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let store = seeded_store().await;
        store.pool().close().await;
        let err = store.select(&Filter::new("", &[]), PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, QueryBackendError::Unavailable(_)));
    }
}
