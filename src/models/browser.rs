use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A concrete browser installed on a factory: group plus version split
/// into numeric `major` / `minor` (Firefox 3.0 is major 3, minor 0).
///
/// `uploads_per_hour` / `uploads_per_day` are the factory operator's
/// self-imposed output limits and feed the load overview; `None` means
/// unlimited (and contributes nothing to capacity sums).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Browser {
    pub browser_id: i64,
    pub factory_id: i64,
    pub browser_group_id: i64,
    pub major: i64,
    pub minor: i64,
    pub uploads_per_hour: Option<i64>,
    pub uploads_per_day: Option<i64>,
    pub active: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBrowser {
    pub factory_id: i64,
    pub browser_group_id: i64,
    pub major: i64,
    pub minor: i64,
    pub uploads_per_hour: Option<i64>,
    pub uploads_per_day: Option<i64>,
}

/// One matchable browser on a live factory, joined with the factory's
/// platform and self-reported queue length. Snapshot rows are what the
/// wait-time estimator and the load overview work from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ActiveBrowser {
    pub browser_group_id: i64,
    pub major: i64,
    pub minor: i64,
    pub uploads_per_hour: Option<i64>,
    pub uploads_per_day: Option<i64>,
    pub platform_id: i64,
    pub queue_estimate: Option<i64>,
}

impl ActiveBrowser {
    /// Whether this browser can serve a request keyed by platform,
    /// group and optional version narrowing: each version part must be
    /// either unspecified on the request side or exactly equal.
    pub fn serves(
        &self,
        platform_id: i64,
        browser_group_id: i64,
        major: Option<i64>,
        minor: Option<i64>,
    ) -> bool {
        self.platform_id == platform_id
            && self.browser_group_id == browser_group_id
            && major.map_or(true, |major| major == self.major)
            && minor.map_or(true, |minor| minor == self.minor)
    }
}

impl Browser {
    pub async fn create(
        pool: &SqlitePool,
        new_browser: NewBrowser,
        now: i64,
    ) -> Result<Browser, sqlx::Error> {
        sqlx::query_as::<_, Browser>(
            r#"
            INSERT INTO browsers
                (factory_id, browser_group_id, major, minor,
                 uploads_per_hour, uploads_per_day, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING browser_id, factory_id, browser_group_id, major, minor,
                      uploads_per_hour, uploads_per_day, active, created_at
            "#,
        )
        .bind(new_browser.factory_id)
        .bind(new_browser.browser_group_id)
        .bind(new_browser.major)
        .bind(new_browser.minor)
        .bind(new_browser.uploads_per_hour)
        .bind(new_browser.uploads_per_day)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn for_factory(
        pool: &SqlitePool,
        factory_id: i64,
    ) -> Result<Vec<Browser>, sqlx::Error> {
        sqlx::query_as::<_, Browser>(
            r#"
            SELECT browser_id, factory_id, browser_group_id, major, minor,
                   uploads_per_hour, uploads_per_day, active, created_at
            FROM browsers
            WHERE factory_id = ?
            ORDER BY browser_group_id, major, minor
            "#,
        )
        .bind(factory_id)
        .fetch_all(pool)
        .await
    }

    /// Deactivate or reactivate a browser without losing its row; the
    /// estimator and overview only ever see `active = 1` entries.
    pub async fn set_active(
        pool: &SqlitePool,
        browser_id: i64,
        active: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE browsers SET active = ? WHERE browser_id = ?")
            .bind(active)
            .bind(browser_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active browsers on factories that polled within the liveness
    /// window. The factory join filters out dead workers: a browser
    /// row survives its factory going silent, but stops counting as
    /// available the moment `last_poll + liveness_secs < now`.
    pub async fn active_snapshot(
        pool: &SqlitePool,
        now: i64,
        liveness_secs: i64,
    ) -> Result<Vec<ActiveBrowser>, sqlx::Error> {
        sqlx::query_as::<_, ActiveBrowser>(
            r#"
            SELECT b.browser_group_id, b.major, b.minor,
                   b.uploads_per_hour, b.uploads_per_day,
                   f.platform_id, f.queue_estimate
            FROM browsers b
            INNER JOIN factories f ON f.factory_id = b.factory_id
            WHERE b.active = 1
              AND f.last_poll + ? >= ?
            "#,
        )
        .bind(liveness_secs)
        .bind(now)
        .fetch_all(pool)
        .await
    }
}
