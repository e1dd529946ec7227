//! The batch-system job snapshot: the adapter trait that queries it, the
//! per-resource-class aggregate it produces, and the time-bounded cache
//! that sits in front of both.

pub mod adapter;
pub mod cache;
pub mod record;
pub mod snapshot;

pub use adapter::{BatchSystemAdapter, CondorAdapter};
pub use cache::SnapshotCache;
pub use record::{JobCounts, JobRecord, JobStatus};
pub use snapshot::{JobSnapshot, StatusEntry};
