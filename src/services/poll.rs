//! # Poll Service
//!
//! The factory-facing surface of the queue: one call per poll cycle,
//! one call per outcome report. Transport (the original system spoke
//! XML-RPC) stays outside; this layer only cares that a known factory
//! is asking and that its liveness stamp and backlog estimate get
//! refreshed on every contact.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::config::QueueConfig;
use crate::dispatch::{LeaseManager, MatchPredicate, MatchedRequest, RequestMatcher};
use crate::error::{QueueError, Result};
use crate::models::Factory;

/// Everything a factory presents when it polls: who it is, which
/// browser it is offering, and its current backlog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub factory_id: i64,
    pub predicate: MatchPredicate,
    /// Self-reported seconds of queued work; `None` leaves the last
    /// reported value in place.
    pub queue_estimate: Option<i64>,
}

/// Outcome of a factory's attempt at a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportOutcome {
    Success,
    /// Failed with a factory-reported error code (404, 500, ...).
    Failure { code: i64 },
}

/// A factory's report after attempting a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkReport {
    pub request_id: i64,
    pub factory_id: i64,
    pub outcome: ReportOutcome,
}

/// Entry point a transport layer drives: wires the matcher and lease
/// manager together behind the two factory-facing operations.
pub struct PollService {
    pool: SqlitePool,
    matcher: RequestMatcher,
    leases: LeaseManager,
}

impl PollService {
    pub fn new(pool: SqlitePool, config: QueueConfig) -> Self {
        let matcher = RequestMatcher::new(pool.clone(), config.clone());
        let leases = LeaseManager::new(pool.clone(), config);
        Self {
            pool,
            matcher,
            leases,
        }
    }

    /// One poll: stamp the factory's liveness and backlog, then
    /// atomically claim the oldest request matching its predicate.
    /// An empty queue is a normal `Ok(None)`; an unknown factory id is
    /// an error, since accepting its poll would hand work to a machine
    /// the estimator cannot see.
    #[instrument(skip(self, profile), fields(factory_id = profile.factory_id))]
    pub async fn poll(
        &self,
        profile: &WorkerProfile,
        now: i64,
    ) -> Result<Option<MatchedRequest>> {
        let known =
            Factory::record_poll(&self.pool, profile.factory_id, now, profile.queue_estimate)
                .await?;
        if !known {
            return Err(QueueError::FactoryNotFound(profile.factory_id));
        }
        self.matcher
            .claim_next(&profile.predicate, profile.factory_id, now)
            .await
    }

    /// Apply an outcome report. Reports against unknown requests are
    /// tolerated as no-ops; see the lease manager for the per-outcome
    /// semantics.
    #[instrument(skip(self, report), fields(request_id = report.request_id, factory_id = report.factory_id))]
    pub async fn report(&self, report: &WorkReport, now: i64) -> Result<()> {
        match report.outcome {
            ReportOutcome::Success => {
                self.leases
                    .release_success(report.request_id, report.factory_id)
                    .await?;
            }
            ReportOutcome::Failure { code } => {
                self.leases
                    .release_failure(report.request_id, report.factory_id, code, now)
                    .await?;
            }
        }
        debug!("Applied work report");
        Ok(())
    }

    /// Soft-protocol variant of [`poll`](Self::poll): find without
    /// claiming, leaving the caller to acquire the lease itself. Kept
    /// for transports that must mirror the original find-then-acquire
    /// handshake.
    #[instrument(skip(self, profile), fields(factory_id = profile.factory_id))]
    pub async fn find_only(
        &self,
        profile: &WorkerProfile,
        now: i64,
    ) -> Result<Option<MatchedRequest>> {
        let known =
            Factory::record_poll(&self.pool, profile.factory_id, now, profile.queue_estimate)
                .await?;
        if !known {
            return Err(QueueError::FactoryNotFound(profile.factory_id));
        }
        self.matcher
            .find_next(&profile.predicate, profile.factory_id, now)
            .await
    }

    /// The lease manager behind this service, for callers driving the
    /// soft acquire step themselves.
    pub fn leases(&self) -> &LeaseManager {
        &self.leases
    }
}
