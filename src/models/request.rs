use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// One screenshot job: "render this group's website in a browser that
/// looks like this". The browser group is mandatory; `major`, `minor`,
/// `width` and `bpp` are optional narrowings, and the feature flags
/// (`js`, `java`, `flash`, `media`) mark capabilities the rendering
/// browser must have enabled.
///
/// `completed` flips to true when a factory reports success; completed
/// rows are history and never match again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Request {
    pub request_id: i64,
    pub request_group_id: i64,
    pub platform_id: i64,
    pub browser_group_id: i64,
    pub major: Option<i64>,
    pub minor: Option<i64>,
    pub width: Option<i64>,
    pub bpp: Option<i64>,
    pub js: bool,
    pub java: bool,
    pub flash: bool,
    pub media: bool,
    /// Unix seconds when the request entered the queue; the matcher's
    /// FIFO order key.
    pub created: i64,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub request_group_id: i64,
    pub platform_id: i64,
    pub browser_group_id: i64,
    pub major: Option<i64>,
    pub minor: Option<i64>,
    pub width: Option<i64>,
    pub bpp: Option<i64>,
    pub js: bool,
    pub java: bool,
    pub flash: bool,
    pub media: bool,
}

impl NewRequest {
    /// A request with no narrowing beyond platform and browser group.
    pub fn basic(request_group_id: i64, platform_id: i64, browser_group_id: i64) -> Self {
        NewRequest {
            request_group_id,
            platform_id,
            browser_group_id,
            major: None,
            minor: None,
            width: None,
            bpp: None,
            js: false,
            java: false,
            flash: false,
            media: false,
        }
    }
}

/// Listing row for "every job queued for this website": request flags
/// joined with the owning group's expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WebsiteRequest {
    pub request_id: i64,
    pub request_group_id: i64,
    pub bpp: Option<i64>,
    pub js: bool,
    pub java: bool,
    pub flash: bool,
    pub media: bool,
    pub created: i64,
    pub completed: bool,
    pub expire: i64,
}

impl Request {
    pub async fn create(
        pool: &SqlitePool,
        new_request: NewRequest,
        now: i64,
    ) -> Result<Request, sqlx::Error> {
        sqlx::query_as::<_, Request>(
            r#"
            INSERT INTO requests
                (request_group_id, platform_id, browser_group_id,
                 major, minor, width, bpp, js, java, flash, media, created)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING request_id, request_group_id, platform_id, browser_group_id,
                      major, minor, width, bpp, js, java, flash, media,
                      created, completed
            "#,
        )
        .bind(new_request.request_group_id)
        .bind(new_request.platform_id)
        .bind(new_request.browser_group_id)
        .bind(new_request.major)
        .bind(new_request.minor)
        .bind(new_request.width)
        .bind(new_request.bpp)
        .bind(new_request.js)
        .bind(new_request.java)
        .bind(new_request.flash)
        .bind(new_request.media)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Request>, sqlx::Error> {
        sqlx::query_as::<_, Request>(
            r#"
            SELECT request_id, request_group_id, platform_id, browser_group_id,
                   major, minor, width, bpp, js, java, flash, media,
                   created, completed
            FROM requests
            WHERE request_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Mark a request done. Returns false when the id is unknown, so
    /// late reports against purged rows stay harmless.
    pub async fn mark_completed(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE requests SET completed = 1 WHERE request_id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every request in a group, completed or not, oldest first.
    pub async fn for_group(
        pool: &SqlitePool,
        request_group_id: i64,
    ) -> Result<Vec<Request>, sqlx::Error> {
        sqlx::query_as::<_, Request>(
            r#"
            SELECT request_id, request_group_id, platform_id, browser_group_id,
                   major, minor, width, bpp, js, java, flash, media,
                   created, completed
            FROM requests
            WHERE request_group_id = ?
            ORDER BY created, request_id
            "#,
        )
        .bind(request_group_id)
        .fetch_all(pool)
        .await
    }

    /// Unfinished requests in a group, oldest first.
    pub async fn pending_for_group(
        pool: &SqlitePool,
        request_group_id: i64,
    ) -> Result<Vec<Request>, sqlx::Error> {
        sqlx::query_as::<_, Request>(
            r#"
            SELECT request_id, request_group_id, platform_id, browser_group_id,
                   major, minor, width, bpp, js, java, flash, media,
                   created, completed
            FROM requests
            WHERE request_group_id = ? AND completed = 0
            ORDER BY created, request_id
            "#,
        )
        .bind(request_group_id)
        .fetch_all(pool)
        .await
    }

    /// All requests ever queued for a website URL, across groups,
    /// oldest first.
    pub async fn for_website(
        pool: &SqlitePool,
        website: &str,
    ) -> Result<Vec<WebsiteRequest>, sqlx::Error> {
        sqlx::query_as::<_, WebsiteRequest>(
            r#"
            SELECT r.request_id, r.request_group_id, r.bpp,
                   r.js, r.java, r.flash, r.media,
                   r.created, r.completed, g.expire
            FROM requests r
            INNER JOIN request_groups g ON g.request_group_id = r.request_group_id
            WHERE g.website = ?
            ORDER BY r.created, r.request_id
            "#,
        )
        .bind(website)
        .fetch_all(pool)
        .await
    }
}
