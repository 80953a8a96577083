//! PulseFit client data layer
//!
//! The relationship synchronizer keeps every locally cached view of a follow
//! relationship consistent across an asynchronous mutation: optimistic patch
//! first, then commit (stale-mark for refetch) on remote success or verbatim
//! rollback on failure.

pub mod config;
pub mod error;
pub mod remote;
pub mod sync;

pub use config::Config;
pub use error::{SyncError, SyncResult};
pub use remote::{HttpUserStore, UserStore};
pub use sync::{FollowAction, FollowOutcome, OptimisticWrite, RelationshipSynchronizer};
