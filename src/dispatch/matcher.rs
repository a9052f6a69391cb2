//! # Request Matcher
//!
//! Selects the next request for a polling factory: the oldest pending
//! request satisfying the factory's [`MatchPredicate`] whose group has
//! not expired and which is masked by neither a live lease nor a live
//! failure record. Both masks are evaluated lazily against `now` in
//! the query itself; nothing sweeps expired rows before matching.
//!
//! Two entry points share the same eligibility filter:
//!
//! - [`RequestMatcher::find_next`] is a pure read, leaving the claim to
//!   a separate [`LeaseManager::acquire`] call. The find-then-acquire
//!   pair is racy by construction: two factories can find the same
//!   request before either leases it.
//! - [`RequestMatcher::claim_next`] folds selection and lease insertion
//!   into one `INSERT .. SELECT` statement, so under SQLite's single
//!   writer exactly one factory can claim any given request within the
//!   lock window.
//!
//! ```rust
//! use shotqueue::config::QueueConfig;
//! use shotqueue::dispatch::{MatchPredicate, RequestMatcher};
//! use sqlx::SqlitePool;
//!
//! # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! let matcher = RequestMatcher::new(pool, QueueConfig::default());
//! let predicate = MatchPredicate::new(1, 1, 3, 5);
//! if let Some(claimed) = matcher.claim_next(&predicate, 42, 1_700_000_000).await? {
//!     println!("claimed request {} for {}", claimed.request_id, claimed.website);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`LeaseManager::acquire`]: crate::dispatch::LeaseManager::acquire

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, instrument};

use crate::config::{FailureScope, QueueConfig};
use crate::dispatch::predicate::MatchPredicate;
use crate::error::Result;

/// Work item descriptor handed to a factory: everything it needs to
/// render the screenshot, already joined with the target URL and the
/// browser group's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MatchedRequest {
    pub request_id: i64,
    pub request_group_id: i64,
    pub website: String,
    pub browser_group: String,
    pub major: Option<i64>,
    pub minor: Option<i64>,
    pub width: Option<i64>,
    pub bpp: Option<i64>,
    pub js: bool,
    pub java: bool,
    pub flash: bool,
    pub media: bool,
    pub created: i64,
}

const MATCHED_COLUMNS: &str = r#"
    SELECT r.request_id, r.request_group_id, g.website, bg.name AS browser_group,
           r.major, r.minor, r.width, r.bpp, r.js, r.java, r.flash, r.media, r.created
    FROM requests r
    INNER JOIN request_groups g ON g.request_group_id = r.request_group_id
    INNER JOIN browser_groups bg ON bg.browser_group_id = r.browser_group_id
"#;

/// Matching component shared by the poll path and the status pages.
pub struct RequestMatcher {
    pool: SqlitePool,
    config: QueueConfig,
}

impl RequestMatcher {
    pub fn new(pool: SqlitePool, config: QueueConfig) -> Self {
        Self { pool, config }
    }

    /// Oldest eligible request for this predicate, without claiming it.
    ///
    /// `factory_id` only narrows the failure mask when the configured
    /// failure scope is per-worker; the lease mask always applies to
    /// every factory, the caller included.
    #[instrument(skip(self))]
    pub async fn find_next(
        &self,
        predicate: &MatchPredicate,
        factory_id: i64,
        now: i64,
    ) -> Result<Option<MatchedRequest>> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(MATCHED_COLUMNS);
        self.push_eligibility(&mut builder, predicate, factory_id, now);
        builder.push(" ORDER BY r.created, r.request_id LIMIT 1");

        let matched = builder
            .build_query_as::<MatchedRequest>()
            .fetch_optional(&self.pool)
            .await?;

        match &matched {
            Some(request) => debug!(
                request_id = request.request_id,
                website = %request.website,
                "Matched pending request"
            ),
            None => debug!("No eligible request for predicate"),
        }
        Ok(matched)
    }

    /// Select and lease the oldest eligible request in one statement.
    ///
    /// The lease row is inserted by the same `INSERT .. SELECT` that
    /// picks the request, so no second factory can claim it before the
    /// lock window opens again. Returns `None` when nothing qualifies.
    /// The join set matches [`find_next`](Self::find_next), so a request
    /// whose browser group is missing from the catalog is invisible to
    /// both paths rather than claimable on one and unfetchable on the
    /// other.
    #[instrument(skip(self))]
    pub async fn claim_next(
        &self,
        predicate: &MatchPredicate,
        factory_id: i64,
        now: i64,
    ) -> Result<Option<MatchedRequest>> {
        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("INSERT INTO leases (request_id, factory_id, created) SELECT r.request_id, ");
        builder.push_bind(factory_id);
        builder.push(", ");
        builder.push_bind(now);
        builder.push(
            r#"
            FROM requests r
            INNER JOIN request_groups g ON g.request_group_id = r.request_group_id
            INNER JOIN browser_groups bg ON bg.browser_group_id = r.browser_group_id
            "#,
        );
        self.push_eligibility(&mut builder, predicate, factory_id, now);
        builder.push(" ORDER BY r.created, r.request_id LIMIT 1 RETURNING request_id");

        let claimed: Option<(i64,)> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await?;

        let Some((request_id,)) = claimed else {
            debug!("No eligible request to claim");
            return Ok(None);
        };

        info!(request_id, factory_id, "Claimed request");

        // The descriptor fetch is a separate read; if housekeeping purged
        // the request in between, the lease row is a harmless orphan and
        // the poll comes back empty.
        let mut descriptor: QueryBuilder<'_, Sqlite> = QueryBuilder::new(MATCHED_COLUMNS);
        descriptor.push(" WHERE r.request_id = ").push_bind(request_id);
        let matched = descriptor
            .build_query_as::<MatchedRequest>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(matched)
    }

    /// Shared eligibility filter: pending, unexpired, predicate-compatible,
    /// and masked by neither exclusion window.
    fn push_eligibility(
        &self,
        builder: &mut QueryBuilder<'_, Sqlite>,
        predicate: &MatchPredicate,
        factory_id: i64,
        now: i64,
    ) {
        builder.push(" WHERE r.completed = 0");
        builder.push(" AND g.expire >= ").push_bind(now);
        builder
            .push(" AND r.platform_id = ")
            .push_bind(predicate.platform_id);
        builder
            .push(" AND r.browser_group_id = ")
            .push_bind(predicate.browser_group_id);
        builder
            .push(" AND (r.major IS NULL OR r.major = ")
            .push_bind(predicate.major)
            .push(")");
        builder
            .push(" AND (r.minor IS NULL OR r.minor = ")
            .push_bind(predicate.minor)
            .push(")");
        builder
            .push(" AND (r.bpp IS NULL OR r.bpp <= ")
            .push_bind(predicate.capabilities.bpp)
            .push(")");
        builder
            .push(" AND (r.js = 0 OR ")
            .push_bind(predicate.capabilities.js)
            .push(" = 1)");
        builder
            .push(" AND (r.java = 0 OR ")
            .push_bind(predicate.capabilities.java)
            .push(" = 1)");
        builder
            .push(" AND (r.flash = 0 OR ")
            .push_bind(predicate.capabilities.flash)
            .push(" = 1)");
        builder
            .push(" AND (r.media = 0 OR ")
            .push_bind(predicate.capabilities.media)
            .push(" = 1)");
        builder
            .push(" AND NOT EXISTS (SELECT 1 FROM leases l WHERE l.request_id = r.request_id AND l.created + ")
            .push_bind(self.config.lock_timeout_secs)
            .push(" >= ")
            .push_bind(now)
            .push(")");
        builder.push(" AND NOT EXISTS (SELECT 1 FROM failures f WHERE f.request_id = r.request_id");
        if self.config.failure_scope == FailureScope::PerWorker {
            builder.push(" AND f.factory_id = ").push_bind(factory_id);
        }
        builder
            .push(" AND f.created + ")
            .push_bind(self.config.failure_timeout_secs)
            .push(" >= ")
            .push_bind(now)
            .push(")");
    }
}
