//! # System Constants
//!
//! Default lengths for the time windows that drive matching, and the floor
//! applied to queue estimates. The windows themselves are configuration
//! (see [`crate::config::QueueConfig`]); these are the startup defaults.

/// How long a claimed-but-unreported request stays reserved, in seconds.
/// Covers a crashed or hung worker: once the window lapses the request
/// becomes matchable again without any cleanup.
pub const DEFAULT_LOCK_TIMEOUT_SECS: i64 = 300;

/// Cooldown after a failed attempt before the same request can match again,
/// in seconds. A flat window re-armed per failure; keeps a systematically
/// broken browser/site pairing from hot-looping.
pub const DEFAULT_FAILURE_TIMEOUT_SECS: i64 = 3600;

/// A factory counts as active while its last poll is within this window,
/// in seconds.
pub const DEFAULT_FACTORY_LIVENESS_SECS: i64 = 300;

/// Grace period granted to a request group on submission and on every
/// extend call, in seconds (30 minutes).
pub const DEFAULT_EXTENSION_GRACE_SECS: i64 = 1800;

/// Floor for queue estimates, in seconds. Dispatch latency means no
/// request completes faster than this.
pub const MIN_ESTIMATE_SECS: i64 = 60;
