//! # Configuration
//!
//! Runtime configuration for the queue engine: the database location, the
//! three freshness windows (lease, failure cooldown, factory liveness), the
//! extension grace period, and the failure-cooldown scope. Values come from
//! built-in defaults overridden by `SHOTQUEUE_*` environment variables.

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EXTENSION_GRACE_SECS, DEFAULT_FACTORY_LIVENESS_SECS, DEFAULT_FAILURE_TIMEOUT_SECS,
    DEFAULT_LOCK_TIMEOUT_SECS,
};
use crate::error::{QueueError, Result};

/// Who a failure cooldown blocks from re-matching a request.
///
/// The original system keyed failures on the request/browser pairing, which
/// blocks every factory for the cooldown window; scoping per worker lets the
/// other factories keep trying while only the one that failed backs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureScope {
    /// A live failure record blocks the request for all factories.
    PerRequest,
    /// A live failure record blocks the request only for the factory
    /// that reported it.
    PerWorker,
}

impl FailureScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureScope::PerRequest => "per_request",
            FailureScope::PerWorker => "per_worker",
        }
    }
}

/// Queue engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Database location. The default keeps everything in memory, which is
    /// what the test suite wants; deployments point this at a file.
    pub database_url: String,
    /// Seconds a lease reserves a request before it lapses.
    pub lock_timeout_secs: i64,
    /// Seconds a failure record keeps a request in cooldown.
    pub failure_timeout_secs: i64,
    /// Seconds since its last poll within which a factory counts as active.
    pub factory_liveness_secs: i64,
    /// Seconds of expiry granted on submission and on every extend call.
    pub extension_grace_secs: i64,
    /// Scope of a failure cooldown (see [`FailureScope`]).
    pub failure_scope: FailureScope,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
            failure_timeout_secs: DEFAULT_FAILURE_TIMEOUT_SECS,
            factory_liveness_secs: DEFAULT_FACTORY_LIVENESS_SECS,
            extension_grace_secs: DEFAULT_EXTENSION_GRACE_SECS,
            failure_scope: FailureScope::PerRequest,
        }
    }
}

impl QueueConfig {
    /// Load configuration from defaults overridden by the environment.
    ///
    /// `SHOTQUEUE_LOCK_TIMEOUT_SECS=120` overrides `lock_timeout_secs`, and
    /// so on for every field; `SHOTQUEUE_FAILURE_SCOPE` accepts
    /// `per_request` or `per_worker`.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .map_err(|e| QueueError::configuration(e.to_string()))?;

        let config: Self = Config::builder()
            .add_source(defaults)
            .add_source(Environment::with_prefix("SHOTQUEUE").try_parsing(true))
            .build()
            .map_err(|e| QueueError::configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| QueueError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject windows that would make every exclusion set permanently empty
    /// or permanently full.
    pub fn validate(&self) -> Result<()> {
        if self.lock_timeout_secs <= 0 {
            return Err(QueueError::configuration("lock_timeout_secs must be positive"));
        }
        if self.failure_timeout_secs <= 0 {
            return Err(QueueError::configuration(
                "failure_timeout_secs must be positive",
            ));
        }
        if self.factory_liveness_secs <= 0 {
            return Err(QueueError::configuration(
                "factory_liveness_secs must be positive",
            ));
        }
        if self.extension_grace_secs <= 0 {
            return Err(QueueError::configuration(
                "extension_grace_secs must be positive",
            ));
        }
        Ok(())
    }
}
