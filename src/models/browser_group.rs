use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Browser family (Firefox, Chrome, ...) independent of version.
/// Requests name a group; concrete versions live on `Browser`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BrowserGroup {
    pub browser_group_id: i64,
    pub name: String,
}

impl BrowserGroup {
    pub async fn create(pool: &SqlitePool, name: &str) -> Result<BrowserGroup, sqlx::Error> {
        sqlx::query_as::<_, BrowserGroup>(
            "INSERT INTO browser_groups (name) VALUES (?) RETURNING browser_group_id, name",
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<BrowserGroup>, sqlx::Error> {
        sqlx::query_as::<_, BrowserGroup>(
            "SELECT browser_group_id, name FROM browser_groups WHERE browser_group_id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_name(
        pool: &SqlitePool,
        name: &str,
    ) -> Result<Option<BrowserGroup>, sqlx::Error> {
        sqlx::query_as::<_, BrowserGroup>(
            "SELECT browser_group_id, name FROM browser_groups WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<BrowserGroup>, sqlx::Error> {
        sqlx::query_as::<_, BrowserGroup>(
            "SELECT browser_group_id, name FROM browser_groups ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }
}
