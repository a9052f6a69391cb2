use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A registered screenshot factory: one worker machine that polls for
/// requests it can render.
///
/// `last_poll` and `queue_estimate` are written on every poll and drive
/// the wait-time estimator. A factory with no poll inside the liveness
/// window is invisible to clients asking "which browsers are available".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Factory {
    pub factory_id: i64,
    pub name: String,
    pub admin: String,
    pub platform_id: i64,
    /// Unix seconds of the most recent poll, `None` until the first one.
    pub last_poll: Option<i64>,
    /// Seconds of work queued on this factory, self-reported on poll.
    pub queue_estimate: Option<i64>,
    pub created_at: i64,
}

/// Registration payload for a new factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFactory {
    pub name: String,
    pub admin: String,
    pub platform_id: i64,
}

impl Factory {
    pub async fn create(
        pool: &SqlitePool,
        new_factory: NewFactory,
        now: i64,
    ) -> Result<Factory, sqlx::Error> {
        sqlx::query_as::<_, Factory>(
            r#"
            INSERT INTO factories (name, admin, platform_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING factory_id, name, admin, platform_id, last_poll, queue_estimate, created_at
            "#,
        )
        .bind(&new_factory.name)
        .bind(&new_factory.admin)
        .bind(new_factory.platform_id)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Factory>, sqlx::Error> {
        sqlx::query_as::<_, Factory>(
            r#"
            SELECT factory_id, name, admin, platform_id, last_poll, queue_estimate, created_at
            FROM factories
            WHERE factory_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_name(
        pool: &SqlitePool,
        name: &str,
    ) -> Result<Option<Factory>, sqlx::Error> {
        sqlx::query_as::<_, Factory>(
            r#"
            SELECT factory_id, name, admin, platform_id, last_poll, queue_estimate, created_at
            FROM factories
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Factories that have polled within the liveness window, i.e.
    /// `last_poll + liveness_secs >= now`.
    pub async fn list_active(
        pool: &SqlitePool,
        now: i64,
        liveness_secs: i64,
    ) -> Result<Vec<Factory>, sqlx::Error> {
        sqlx::query_as::<_, Factory>(
            r#"
            SELECT factory_id, name, admin, platform_id, last_poll, queue_estimate, created_at
            FROM factories
            WHERE last_poll + ? >= ?
            ORDER BY name
            "#,
        )
        .bind(liveness_secs)
        .bind(now)
        .fetch_all(pool)
        .await
    }

    /// Stamp a poll: refresh `last_poll` and, when the factory reported
    /// one, its queue estimate. Returns false for an unknown factory id.
    pub async fn record_poll(
        pool: &SqlitePool,
        factory_id: i64,
        now: i64,
        queue_estimate: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE factories
            SET last_poll = ?, queue_estimate = COALESCE(?, queue_estimate)
            WHERE factory_id = ?
            "#,
        )
        .bind(now)
        .bind(queue_estimate)
        .bind(factory_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether this factory counts as alive at `now`.
    pub fn is_active(&self, now: i64, liveness_secs: i64) -> bool {
        match self.last_poll {
            Some(last_poll) => last_poll + liveness_secs >= now,
            None => false,
        }
    }
}
