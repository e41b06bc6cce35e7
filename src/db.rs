use anyhow::Result;
use sqlx::SqlitePool;

use crate::error::QueryBackendError;
use crate::models::{Advocate, NewAdvocate};
use crate::utils::fold_case;

/// Case-folded search columns kept beside the display columns / 搜索用小写列
const SEARCH_COLUMNS: &[(&str, &str)] = &[
    ("first_name_lower", "TEXT NOT NULL DEFAULT ''"),
    ("last_name_lower", "TEXT NOT NULL DEFAULT ''"),
    ("city_lower", "TEXT NOT NULL DEFAULT ''"),
    ("degree_lower", "TEXT NOT NULL DEFAULT ''"),
    ("specialties_lower", "TEXT NOT NULL DEFAULT '[]'"),
];

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS advocates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            city TEXT NOT NULL,
            degree TEXT NOT NULL,
            specialties TEXT NOT NULL DEFAULT '[]',
            years_of_experience INTEGER NOT NULL,
            phone_number INTEGER NOT NULL,
            first_name_lower TEXT NOT NULL DEFAULT '',
            last_name_lower TEXT NOT NULL DEFAULT '',
            city_lower TEXT NOT NULL DEFAULT '',
            degree_lower TEXT NOT NULL DEFAULT '',
            specialties_lower TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_advocates_last_name ON advocates(last_name)")
        .execute(pool)
        .await?;

    add_search_columns(pool).await?;

    tracing::debug!("Database migrations applied");
    Ok(())
}

/// Add and backfill the case-folded columns on tables created before they existed / 为旧表补充小写列
async fn add_search_columns(pool: &SqlitePool) -> Result<()> {
    let existing: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('advocates')")
        .fetch_all(pool)
        .await?;
    let missing: Vec<&(&str, &str)> = SEARCH_COLUMNS
        .iter()
        .filter(|(name, _)| !existing.iter().any(|e| e == name))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for (name, definition) in &missing {
        sqlx::query(&format!("ALTER TABLE advocates ADD COLUMN {} {}", name, definition))
            .execute(&mut *tx)
            .await?;
    }

    let rows: Vec<(i64, String, String, String, String, String)> = sqlx::query_as(
        "SELECT id, first_name, last_name, city, degree, specialties FROM advocates",
    )
    .fetch_all(&mut *tx)
    .await?;
    for (id, first_name, last_name, city, degree, specialties) in &rows {
        let specialties: Vec<String> = serde_json::from_str(specialties)?;
        sqlx::query(
            "UPDATE advocates SET first_name_lower = ?, last_name_lower = ?, city_lower = ?, \
             degree_lower = ?, specialties_lower = ? WHERE id = ?",
        )
        .bind(fold_case(first_name))
        .bind(fold_case(last_name))
        .bind(fold_case(city))
        .bind(fold_case(degree))
        .bind(serde_json::to_string(&fold_specialties(&specialties))?)
        .bind(*id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!("Added {} search columns, backfilled {} advocates", missing.len(), rows.len());
    Ok(())
}

fn fold_specialties(specialties: &[String]) -> Vec<String> {
    specialties.iter().map(|s| fold_case(s)).collect()
}

/// Insert advocates in one transaction, returning them with ids / 批量插入顾问
///
/// Not idempotent: calling twice duplicates every row.
pub async fn insert_advocates(pool: &SqlitePool, rows: &[NewAdvocate]) -> Result<Vec<Advocate>, QueryBackendError> {
    let mut tx = pool.begin().await?;
    let mut inserted = Vec::with_capacity(rows.len());

    for row in rows {
        let specialties = serde_json::to_string(&row.specialties).map_err(QueryBackendError::Encode)?;
        let specialties_lower =
            serde_json::to_string(&fold_specialties(&row.specialties)).map_err(QueryBackendError::Encode)?;
        let result = sqlx::query(
            "INSERT INTO advocates (first_name, last_name, city, degree, specialties, years_of_experience, phone_number, \
             first_name_lower, last_name_lower, city_lower, degree_lower, specialties_lower) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.city)
        .bind(&row.degree)
        .bind(specialties)
        .bind(row.years_of_experience)
        .bind(row.phone_number)
        .bind(fold_case(&row.first_name))
        .bind(fold_case(&row.last_name))
        .bind(fold_case(&row.city))
        .bind(fold_case(&row.degree))
        .bind(specialties_lower)
        .execute(&mut *tx)
        .await?;

        inserted.push(Advocate::from_new(result.last_insert_rowid(), row.clone()));
    }

    tx.commit().await?;
    tracing::info!("Inserted {} advocates", inserted.len());
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn single_connection_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_fills_folded_columns() {
        let pool = single_connection_pool().await;
        run_migrations(&pool).await.unwrap();
        let row = NewAdvocate {
            first_name: "Émile".to_string(),
            last_name: "Zola".to_string(),
            city: "Ünna".to_string(),
            degree: "MD".to_string(),
            specialties: vec!["Trauma & PTSD".to_string()],
            years_of_experience: 3,
            phone_number: 5551234567,
        };
        insert_advocates(&pool, &[row]).await.unwrap();

        let (first, city, specialties): (String, String, String) =
            sqlx::query_as("SELECT first_name_lower, city_lower, specialties_lower FROM advocates")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(first, "émile");
        assert_eq!(city, "ünna");
        assert_eq!(specialties, r#"["trauma & ptsd"]"#);
    }

    #[tokio::test]
    async fn test_migrations_backfill_older_table() {
        let pool = single_connection_pool().await;
        sqlx::query(
            "CREATE TABLE advocates (id INTEGER PRIMARY KEY AUTOINCREMENT, first_name TEXT NOT NULL, \
             last_name TEXT NOT NULL, city TEXT NOT NULL, degree TEXT NOT NULL, \
             specialties TEXT NOT NULL DEFAULT '[]', years_of_experience INTEGER NOT NULL, \
             phone_number INTEGER NOT NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO advocates (first_name, last_name, city, degree, specialties, years_of_experience, phone_number) \
             VALUES ('ÉLODIE', 'Brown', 'Houston', 'PhD', '[\"Bipolar\"]', 4, 5551234567)",
        )
        .execute(&pool)
        .await
        .unwrap();

        run_migrations(&pool).await.unwrap();
        // Second run finds every column present
        run_migrations(&pool).await.unwrap();

        let (first, specialties): (String, String) =
            sqlx::query_as("SELECT first_name_lower, specialties_lower FROM advocates")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(first, "élodie");
        assert_eq!(specialties, r#"["bipolar"]"#);
    }
}
