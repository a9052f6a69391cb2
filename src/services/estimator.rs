//! # Queue Estimator
//!
//! Heuristic wait-time estimates for pending requests, shown to the
//! submitting client while their screenshots trickle in.
//!
//! The estimate is deliberately naive: take the fastest active factory
//! that could serve the request (minimum self-reported backlog),
//! subtract the time the request has already waited, and never claim
//! less than [`MIN_ESTIMATE_SECS`]. Contention from other pending
//! requests on the same factory is ignored; this is a point estimate
//! for a progress page, not a scheduler.

use std::cmp;
use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::instrument;

use crate::config::QueueConfig;
use crate::constants::MIN_ESTIMATE_SECS;
use crate::error::{QueueError, Result};
use crate::models::{ActiveBrowser, Browser, Request, RequestGroup};

/// Displayable state of one request on the status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueEstimate {
    /// Expected remaining wait in seconds, floored at
    /// [`MIN_ESTIMATE_SECS`].
    Wait { seconds: i64 },
    /// No active factory offers a browser that serves this request.
    Unavailable,
    /// The request already completed; there is nothing to wait for.
    Done,
}

impl QueueEstimate {
    /// Whole minutes for display, rounding half a minute up; `None`
    /// when there is no wait to report.
    pub fn minutes(&self) -> Option<i64> {
        match self {
            QueueEstimate::Wait { seconds } => Some((seconds + 30) / 60),
            QueueEstimate::Unavailable | QueueEstimate::Done => None,
        }
    }
}

impl fmt::Display for QueueEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueEstimate::Wait { seconds } => write!(f, "{} min", (seconds + 30) / 60),
            QueueEstimate::Unavailable => write!(f, "unavailable"),
            QueueEstimate::Done => write!(f, "done"),
        }
    }
}

/// Estimate the remaining wait for `request` against a snapshot of
/// active browsers, given how long the request has already queued.
///
/// A factory that never reported a backlog counts as free capacity
/// (backlog zero), which still floors at the minimum dispatch latency.
pub fn estimate_wait(
    request: &Request,
    active: &[ActiveBrowser],
    queued_seconds: i64,
) -> QueueEstimate {
    let fastest = active
        .iter()
        .filter(|browser| {
            browser.serves(
                request.platform_id,
                request.browser_group_id,
                request.major,
                request.minor,
            )
        })
        .map(|browser| browser.queue_estimate.unwrap_or(0))
        .min();

    match fastest {
        None => QueueEstimate::Unavailable,
        Some(backlog) => QueueEstimate::Wait {
            seconds: cmp::max(MIN_ESTIMATE_SECS, backlog - queued_seconds),
        },
    }
}

/// One request and its displayable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub request: Request,
    pub estimate: QueueEstimate,
}

/// Client-facing status of a request group: the group itself plus an
/// entry per member request, completed ones included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStatus {
    pub group: RequestGroup,
    /// Seconds since the group was submitted, as of the status call.
    pub queued_seconds: i64,
    pub entries: Vec<StatusEntry>,
}

/// Read-only estimator service backing the status pages.
pub struct QueueEstimator {
    pool: SqlitePool,
    config: QueueConfig,
}

impl QueueEstimator {
    pub fn new(pool: SqlitePool, config: QueueConfig) -> Self {
        Self { pool, config }
    }

    /// Estimate for a single request at `now`, measuring queued time
    /// from the owning group's submission.
    #[instrument(skip(self, request), fields(request_id = request.request_id))]
    pub async fn estimate(&self, request: &Request, now: i64) -> Result<QueueEstimate> {
        let group = RequestGroup::find_by_id(&self.pool, request.request_group_id)
            .await?
            .ok_or(QueueError::RequestGroupNotFound(request.request_group_id))?;
        let snapshot =
            Browser::active_snapshot(&self.pool, now, self.config.factory_liveness_secs).await?;
        Ok(estimate_wait(request, &snapshot, now - group.submitted))
    }

    /// Status of a whole group, oldest first: completed requests show
    /// as done, the rest get a wait estimate. Unknown group ids are a
    /// client error.
    #[instrument(skip(self))]
    pub async fn group_status(&self, request_group_id: i64, now: i64) -> Result<GroupStatus> {
        let group = RequestGroup::find_by_id(&self.pool, request_group_id)
            .await?
            .ok_or(QueueError::RequestGroupNotFound(request_group_id))?;
        let members = Request::for_group(&self.pool, request_group_id).await?;
        let snapshot =
            Browser::active_snapshot(&self.pool, now, self.config.factory_liveness_secs).await?;

        let queued_seconds = now - group.submitted;
        let entries = members
            .into_iter()
            .map(|request| {
                let estimate = if request.completed {
                    QueueEstimate::Done
                } else {
                    estimate_wait(&request, &snapshot, queued_seconds)
                };
                StatusEntry { request, estimate }
            })
            .collect();

        Ok(GroupStatus {
            group,
            queued_seconds,
            entries,
        })
    }
}
