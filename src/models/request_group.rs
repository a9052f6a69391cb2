use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::error::{QueueError, Result};

/// One submission: a website plus the batch of per-browser requests
/// created for it. The group's `expire` timestamp is the deadline the
/// matcher honors; requests in a lapsed group are never handed out,
/// even though their rows remain until purged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RequestGroup {
    pub request_group_id: i64,
    pub website: String,
    /// Unix seconds when the group was submitted.
    pub submitted: i64,
    /// Unix seconds after which the group's requests stop matching.
    pub expire: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequestGroup {
    pub website: String,
}

impl RequestGroup {
    /// Insert a group submitted at `now`, expiring `grace_secs` later.
    pub async fn create(
        pool: &SqlitePool,
        new_group: NewRequestGroup,
        now: i64,
        grace_secs: i64,
    ) -> std::result::Result<RequestGroup, sqlx::Error> {
        sqlx::query_as::<_, RequestGroup>(
            r#"
            INSERT INTO request_groups (website, submitted, expire)
            VALUES (?, ?, ?)
            RETURNING request_group_id, website, submitted, expire
            "#,
        )
        .bind(&new_group.website)
        .bind(now)
        .bind(now + grace_secs)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: i64,
    ) -> std::result::Result<Option<RequestGroup>, sqlx::Error> {
        sqlx::query_as::<_, RequestGroup>(
            r#"
            SELECT request_group_id, website, submitted, expire
            FROM request_groups
            WHERE request_group_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Push the expiry out to `now + grace_secs`, keeping whatever is
    /// already later. Clients call this while they still care about the
    /// results; repeating it within the same second is a no-op. Unknown
    /// ids are a client error, not a silent success.
    pub async fn extend(
        pool: &SqlitePool,
        id: i64,
        now: i64,
        grace_secs: i64,
    ) -> Result<RequestGroup> {
        let updated = sqlx::query_as::<_, RequestGroup>(
            r#"
            UPDATE request_groups
            SET expire = MAX(expire, ?)
            WHERE request_group_id = ?
            RETURNING request_group_id, website, submitted, expire
            "#,
        )
        .bind(now + grace_secs)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        updated.ok_or(QueueError::RequestGroupNotFound(id))
    }

    /// Whether the group can still be matched at `now` (inclusive: a
    /// group expiring exactly now is still live).
    pub fn is_live(&self, now: i64) -> bool {
        self.expire >= now
    }
}
