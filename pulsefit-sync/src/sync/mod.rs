pub mod follow;
pub mod optimistic;

pub use follow::{FollowAction, FollowOutcome, RelationshipSynchronizer};
pub use optimistic::OptimisticWrite;
