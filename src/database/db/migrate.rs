use std::future::Future;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::{Pool, Sqlite};
use tracing::warn;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

pub fn is_missing_table(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.message().contains("no such table"),
        _ => false,
    }
}

/// Runs a list query, creating the schema on demand when a table is missing.
///
/// The query is retried once after migrating. If the table is still missing
/// (or migrating fails) the caller gets an empty list.
pub async fn recover_missing_table<T, F, Fut>(
    pool: &Pool<Sqlite>,
    what: &str,
    query: F,
) -> Result<Vec<T>, sqlx::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<T>, sqlx::Error>>,
{
    match query().await {
        Err(err) if is_missing_table(&err) => {
            warn!(what, "table missing, applying migrations");
            if let Err(e) = run_migrations(pool).await {
                warn!(what, error = %e, "on-demand migration failed, returning empty list");
                return Ok(Vec::new());
            }
            match query().await {
                Err(err) if is_missing_table(&err) => {
                    warn!(what, "table still missing after migration, returning empty list");
                    Ok(Vec::new())
                }
                other => other,
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::connection::get_memory_pool;

    #[tokio::test]
    async fn missing_tables_are_created_on_demand() {
        let pool = get_memory_pool().await.unwrap();

        let rows: Vec<i64> = recover_missing_table(&pool, "bills", || async {
            sqlx::query_scalar::<_, i64>("SELECT id FROM bills")
                .fetch_all(&pool)
                .await
        })
        .await
        .unwrap();

        assert!(rows.is_empty());
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn other_errors_are_not_swallowed() {
        let pool = get_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let result: Result<Vec<i64>, _> = recover_missing_table(&pool, "bills", || async {
            sqlx::query_scalar::<_, i64>("SELECT no_such_column FROM bills")
                .fetch_all(&pool)
                .await
        })
        .await;

        assert!(result.is_err());
    }
}
