//! # Load Overview
//!
//! Capacity-vs-demand aggregation for administrators: how many
//! requests are waiting for each (platform, browser group, version)
//! key, next to the upload limits the active factories advertise for
//! that key. Pure read path; nothing here mutates the queue.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::instrument;

use crate::config::QueueConfig;
use crate::error::Result;
use crate::models::{ActiveBrowser, Browser};

/// One overview line: a demanded browser key, how many requests wait
/// for it, and the summed upload limits of active browsers serving
/// that key. The sums are `None` when nothing serves the key or no
/// serving browser declares a limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewRow {
    pub platform_id: i64,
    pub platform: String,
    pub browser_group_id: i64,
    pub browser_group: String,
    pub major: Option<i64>,
    pub minor: Option<i64>,
    pub pending_requests: i64,
    pub uploads_per_hour: Option<i64>,
    pub uploads_per_day: Option<i64>,
}

#[derive(Debug, FromRow)]
struct PendingKeyRow {
    platform_id: i64,
    platform: String,
    browser_group_id: i64,
    browser_group: String,
    major: Option<i64>,
    minor: Option<i64>,
    pending_requests: i64,
}

/// Read-only aggregation service for the admin overview page.
pub struct Overview {
    pool: SqlitePool,
    config: QueueConfig,
}

impl Overview {
    pub fn new(pool: SqlitePool, config: QueueConfig) -> Self {
        Self { pool, config }
    }

    /// Pending requests grouped by browser key, joined with active
    /// capacity. SQLite groups NULL version parts together, so "any
    /// Firefox" demand shows as one line. Expiry is strict here: a
    /// group lapsing exactly at `now` no longer counts as demand.
    #[instrument(skip(self))]
    pub async fn pending_by_browser(&self, now: i64) -> Result<Vec<OverviewRow>> {
        let keys = sqlx::query_as::<_, PendingKeyRow>(
            r#"
            SELECT r.platform_id, p.name AS platform,
                   r.browser_group_id, bg.name AS browser_group,
                   r.major, r.minor, COUNT(*) AS pending_requests
            FROM requests r
            INNER JOIN request_groups g ON g.request_group_id = r.request_group_id
            INNER JOIN platforms p ON p.platform_id = r.platform_id
            INNER JOIN browser_groups bg ON bg.browser_group_id = r.browser_group_id
            WHERE r.completed = 0 AND g.expire > ?
            GROUP BY r.platform_id, r.browser_group_id, r.major, r.minor
            ORDER BY p.name, bg.name, r.major, r.minor
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        let snapshot =
            Browser::active_snapshot(&self.pool, now, self.config.factory_liveness_secs).await?;

        let rows = keys
            .into_iter()
            .map(|key| {
                let serving: Vec<&ActiveBrowser> = snapshot
                    .iter()
                    .filter(|browser| {
                        browser.serves(
                            key.platform_id,
                            key.browser_group_id,
                            key.major,
                            key.minor,
                        )
                    })
                    .collect();
                OverviewRow {
                    platform_id: key.platform_id,
                    platform: key.platform,
                    browser_group_id: key.browser_group_id,
                    browser_group: key.browser_group,
                    major: key.major,
                    minor: key.minor,
                    pending_requests: key.pending_requests,
                    uploads_per_hour: sum_declared(
                        serving.iter().map(|browser| browser.uploads_per_hour),
                    ),
                    uploads_per_day: sum_declared(
                        serving.iter().map(|browser| browser.uploads_per_day),
                    ),
                }
            })
            .collect();
        Ok(rows)
    }
}

/// Sum the declared limits, ignoring browsers without one; `None` only
/// when no browser declares any limit at all.
fn sum_declared(limits: impl Iterator<Item = Option<i64>>) -> Option<i64> {
    let declared: Vec<i64> = limits.flatten().collect();
    if declared.is_empty() {
        None
    } else {
        Some(declared.into_iter().sum())
    }
}
