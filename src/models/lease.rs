use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A soft exclusive claim: factory `factory_id` is working on request
/// `request_id` since `created`. A lease blocks other factories from
/// the same request only while `created + lock_timeout >= now`; after
/// that it is dead weight awaiting purge, and the request matches
/// again without any row being touched.
///
/// Leases deliberately carry no foreign keys, so inserting one for a
/// request that was purged in the meantime succeeds as a harmless
/// no-op record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lease {
    pub lease_id: i64,
    pub request_id: i64,
    pub factory_id: i64,
    pub created: i64,
}

impl Lease {
    /// Record that `factory_id` is taking `request_id` at `now`. This
    /// is advisory: it does not check for competing live leases. Use
    /// [`RequestMatcher::claim_next`] when the find-and-acquire pair
    /// must be atomic.
    ///
    /// [`RequestMatcher::claim_next`]: crate::dispatch::RequestMatcher::claim_next
    pub async fn acquire(
        pool: &SqlitePool,
        request_id: i64,
        factory_id: i64,
        now: i64,
    ) -> Result<Lease, sqlx::Error> {
        sqlx::query_as::<_, Lease>(
            r#"
            INSERT INTO leases (request_id, factory_id, created)
            VALUES (?, ?, ?)
            RETURNING lease_id, request_id, factory_id, created
            "#,
        )
        .bind(request_id)
        .bind(factory_id)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Leases on a request that still exclude it from matching at `now`.
    pub async fn live_for_request(
        pool: &SqlitePool,
        request_id: i64,
        now: i64,
        lock_timeout_secs: i64,
    ) -> Result<Vec<Lease>, sqlx::Error> {
        sqlx::query_as::<_, Lease>(
            r#"
            SELECT lease_id, request_id, factory_id, created
            FROM leases
            WHERE request_id = ? AND created + ? >= ?
            ORDER BY created, lease_id
            "#,
        )
        .bind(request_id)
        .bind(lock_timeout_secs)
        .bind(now)
        .fetch_all(pool)
        .await
    }

    /// Delete every lease for a request, live or not. Called when the
    /// request reaches a terminal success so the row count stays flat.
    pub async fn release_for_request(
        pool: &SqlitePool,
        request_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leases WHERE request_id = ?")
            .bind(request_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Housekeeping: drop leases whose exclusion window lapsed before
    /// `now`. Matching never requires this; it only bounds table growth.
    pub async fn purge_expired(
        pool: &SqlitePool,
        now: i64,
        lock_timeout_secs: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leases WHERE created + ? < ?")
            .bind(lock_timeout_secs)
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
