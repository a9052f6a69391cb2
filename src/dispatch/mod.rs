//! Matching and leasing: the write path of the queue.
//!
//! A poll flows through here twice. First the matcher picks the oldest
//! eligible request for the factory's predicate, then the lease manager
//! records the claim and, later, the outcome report.

pub mod lease_manager;
pub mod matcher;
pub mod predicate;

pub use lease_manager::LeaseManager;
pub use matcher::{MatchedRequest, RequestMatcher};
pub use predicate::{Capabilities, MatchPredicate};
