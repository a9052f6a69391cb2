use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Operating-system platform a request targets (Linux, Windows, ...).
/// Maps to the `platforms` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Platform {
    pub platform_id: i64,
    pub name: String,
}

impl Platform {
    pub async fn create(pool: &SqlitePool, name: &str) -> Result<Platform, sqlx::Error> {
        sqlx::query_as::<_, Platform>(
            "INSERT INTO platforms (name) VALUES (?) RETURNING platform_id, name",
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Platform>, sqlx::Error> {
        sqlx::query_as::<_, Platform>(
            "SELECT platform_id, name FROM platforms WHERE platform_id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_name(
        pool: &SqlitePool,
        name: &str,
    ) -> Result<Option<Platform>, sqlx::Error> {
        sqlx::query_as::<_, Platform>("SELECT platform_id, name FROM platforms WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Platform>, sqlx::Error> {
        sqlx::query_as::<_, Platform>("SELECT platform_id, name FROM platforms ORDER BY name")
            .fetch_all(pool)
            .await
    }
}
