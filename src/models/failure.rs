use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A factory's report that it tried a request and could not render it.
/// While `created + failure_timeout >= now` the record keeps the
/// request out of the match pool (for everyone, or just for the
/// reporting factory, depending on the configured failure scope);
/// afterwards the request quietly becomes eligible again.
///
/// Like leases, failure rows have no foreign keys: a report that races
/// a purge lands as an inert row instead of an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FailureRecord {
    pub failure_id: i64,
    pub request_id: i64,
    pub factory_id: i64,
    /// Factory-reported error code, e.g. 404 for "page not found" or
    /// 500 for a renderer crash.
    pub code: i64,
    pub created: i64,
}

impl FailureRecord {
    pub async fn record(
        pool: &SqlitePool,
        request_id: i64,
        factory_id: i64,
        code: i64,
        now: i64,
    ) -> Result<FailureRecord, sqlx::Error> {
        sqlx::query_as::<_, FailureRecord>(
            r#"
            INSERT INTO failures (request_id, factory_id, code, created)
            VALUES (?, ?, ?, ?)
            RETURNING failure_id, request_id, factory_id, code, created
            "#,
        )
        .bind(request_id)
        .bind(factory_id)
        .bind(code)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Failure records still masking a request at `now`.
    pub async fn live_for_request(
        pool: &SqlitePool,
        request_id: i64,
        now: i64,
        failure_timeout_secs: i64,
    ) -> Result<Vec<FailureRecord>, sqlx::Error> {
        sqlx::query_as::<_, FailureRecord>(
            r#"
            SELECT failure_id, request_id, factory_id, code, created
            FROM failures
            WHERE request_id = ? AND created + ? >= ?
            ORDER BY created, failure_id
            "#,
        )
        .bind(request_id)
        .bind(failure_timeout_secs)
        .bind(now)
        .fetch_all(pool)
        .await
    }

    /// Housekeeping: drop records whose masking window lapsed before `now`.
    pub async fn purge_expired(
        pool: &SqlitePool,
        now: i64,
        failure_timeout_secs: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM failures WHERE created + ? < ?")
            .bind(failure_timeout_secs)
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
