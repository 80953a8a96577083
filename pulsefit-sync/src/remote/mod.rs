//! Remote user store
//!
//! The REST backend is the source of truth for follow relationships. The
//! synchronizer only ever talks to it through the [`UserStore`] seam so tests
//! can script success and failure without a network.

mod http;

pub use http::HttpUserStore;

use async_trait::async_trait;
use pulsefit_cache::user::CachedUser;
use uuid::Uuid;

use crate::error::SyncResult;

/// Source-of-truth operations on users.
///
/// The mutating calls return the updated target profile. They are
/// at-most-once per explicit user action; callers must not retry
/// automatically.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the viewer→target follow edge.
    async fn follow_user(&self, target_id: Uuid, viewer_id: Uuid) -> SyncResult<CachedUser>;

    /// Remove the viewer→target follow edge.
    async fn unfollow_user(&self, target_id: Uuid, viewer_id: Uuid) -> SyncResult<CachedUser>;

    /// Fetch a user profile; `None` if the user does not exist.
    async fn fetch_user(&self, user_id: Uuid) -> SyncResult<Option<CachedUser>>;
}
