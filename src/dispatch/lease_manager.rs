//! # Lease Manager
//!
//! Bookkeeping for the two time-windowed exclusion sets that shape
//! matching: leases ("a factory is on it right now") and failure
//! records ("someone just tried and could not"). Neither is a hard
//! lock. Rows are inserted unconditionally and simply stop counting
//! once their window lapses, so a crashed factory's claim costs at
//! most `lock_timeout` of queue latency and needs no recovery step.

use sqlx::SqlitePool;
use tracing::{debug, info, instrument, warn};

use crate::config::QueueConfig;
use crate::error::Result;
use crate::models::{FailureRecord, Lease, Request};

/// Write-side companion to the matcher: acquires leases and applies
/// factory reports to the store.
pub struct LeaseManager {
    pool: SqlitePool,
    config: QueueConfig,
}

impl LeaseManager {
    pub fn new(pool: SqlitePool, config: QueueConfig) -> Self {
        Self { pool, config }
    }

    /// Record a claim on a request the caller just matched.
    ///
    /// This is the soft half of the find-then-acquire protocol: it does
    /// not verify that the request is still unleased, so a factory must
    /// call it immediately after a successful `find_next`. The insert
    /// itself always succeeds, even for a request id that no longer
    /// exists.
    #[instrument(skip(self))]
    pub async fn acquire(&self, request_id: i64, factory_id: i64, now: i64) -> Result<Lease> {
        let lease = Lease::acquire(&self.pool, request_id, factory_id, now).await?;
        debug!(request_id, factory_id, "Acquired lease");
        Ok(lease)
    }

    /// Apply a success report: mark the request completed and drop its
    /// lease rows. Returns false when the request id is unknown, which
    /// can happen when a report races housekeeping; the report is then
    /// a no-op.
    #[instrument(skip(self))]
    pub async fn release_success(&self, request_id: i64, factory_id: i64) -> Result<bool> {
        let completed = Request::mark_completed(&self.pool, request_id).await?;
        if completed {
            let released = Lease::release_for_request(&self.pool, request_id).await?;
            info!(request_id, factory_id, released, "Request completed");
        } else {
            warn!(
                request_id,
                factory_id, "Success report for unknown request, ignoring"
            );
        }
        Ok(completed)
    }

    /// Apply a failure report: insert a failure record opening a
    /// `failure_timeout` cooldown before the request can match again
    /// (for everyone or just this factory, per the configured scope).
    ///
    /// The lease the factory held is left to lapse on its own; the
    /// failure window outlives it anyway.
    #[instrument(skip(self))]
    pub async fn release_failure(
        &self,
        request_id: i64,
        factory_id: i64,
        code: i64,
        now: i64,
    ) -> Result<FailureRecord> {
        let failure = FailureRecord::record(&self.pool, request_id, factory_id, code, now).await?;
        info!(
            request_id,
            factory_id,
            code,
            scope = self.config.failure_scope.as_str(),
            "Recorded failure"
        );
        Ok(failure)
    }

    /// Housekeeping sweep: delete leases and failure records whose
    /// windows lapsed before `now`. Matching correctness never depends
    /// on this; it only keeps the tables from growing without bound.
    /// Returns `(leases_purged, failures_purged)`.
    #[instrument(skip(self))]
    pub async fn purge_expired(&self, now: i64) -> Result<(u64, u64)> {
        let leases = Lease::purge_expired(&self.pool, now, self.config.lock_timeout_secs).await?;
        let failures =
            FailureRecord::purge_expired(&self.pool, now, self.config.failure_timeout_secs).await?;
        if leases > 0 || failures > 0 {
            info!(leases, failures, "Purged expired exclusion rows");
        }
        Ok((leases, failures))
    }
}
