//! Relationship cache synchronizer
//!
//! Keeps every cached view of a follow relationship consistent across the
//! mutate-then-confirm cycle: snapshot, optimistic patch, remote mutation,
//! then commit (mark stale for refetch) or verbatim rollback. The remote
//! store stays the source of truth; the cache only ever converges to it.

use std::sync::Arc;

use pulsefit_cache::registry::KeyAliasRegistry;
use pulsefit_cache::user::{CachedUser, UserCache};
use pulsefit_cache::{CacheResult, ViewCache};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{SyncError, SyncResult};
use crate::remote::{HttpUserStore, UserStore};
use crate::sync::optimistic::OptimisticWrite;

/// Which direction a toggle resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowAction {
    Followed,
    Unfollowed,
}

/// Result of a settled toggle.
#[derive(Debug, Clone)]
pub struct FollowOutcome {
    pub action: FollowAction,
    /// Updated target profile as the server returned it.
    pub target: CachedUser,
}

/// Synchronizes follow-relationship views across the cache and the remote
/// user store.
#[derive(Clone)]
pub struct RelationshipSynchronizer {
    users: UserCache,
    store: Arc<dyn UserStore>,
}

impl RelationshipSynchronizer {
    pub fn new(users: UserCache, store: Arc<dyn UserStore>) -> Self {
        Self { users, store }
    }

    /// Build the full client data layer from configuration: a fresh view
    /// cache with the default alias registry and the HTTP-backed store.
    pub fn from_config(config: &Config) -> SyncResult<Self> {
        let users = UserCache::new(ViewCache::new(), KeyAliasRegistry::new())
            .with_ttls(config.cache.user_ttl_secs, config.cache.list_ttl_secs);
        let store = HttpUserStore::new(&config.api)?;
        Ok(Self::new(users, Arc::new(store)))
    }

    pub fn users(&self) -> &UserCache {
        &self.users
    }

    /// Toggle the viewer→target follow relationship.
    ///
    /// The viewer identity must already be resolved; there is no fallback.
    /// The observed cached state decides the direction: currently following
    /// means unfollow, anything else (including an uncached viewer) means
    /// follow. Between the optimistic patch and the remote settle, every
    /// cached view of both users reflects the new relationship; on failure
    /// all of them are restored exactly as snapshotted.
    ///
    /// Re-entrancy for the same (viewer, target) pair is the caller's
    /// responsibility (a pending flag on the interaction); overlapping
    /// in-flight toggles for the same pair are last-write-wins on the cache.
    pub async fn toggle_follow(
        &self,
        viewer_id: Option<Uuid>,
        target_id: Uuid,
    ) -> SyncResult<FollowOutcome> {
        let viewer_id = viewer_id.ok_or(SyncError::UnresolvedViewer)?;
        if viewer_id == target_id {
            return Err(SyncError::SelfFollow);
        }

        // Observed relationship state decides the direction of the toggle.
        let currently_following = self
            .users
            .get_user(viewer_id)?
            .map(|u| u.is_following(target_id))
            .unwrap_or(false);

        // Snapshot before the first patch: every alias of both users plus
        // every directory list that may embed either profile.
        let keys = self.users.registry().keys_for_pair(viewer_id, target_id);
        let tx = OptimisticWrite::begin(self.users.cache(), &keys);

        if let Err(e) = self.apply_patch(viewer_id, target_id, currently_following) {
            tx.rollback();
            return Err(e.into());
        }

        let result = if currently_following {
            self.store.unfollow_user(target_id, viewer_id).await
        } else {
            self.store.follow_user(target_id, viewer_id).await
        };

        match result {
            Ok(target) => {
                // The server owns the final shape of both users; every
                // covered key goes stale and converges on the next read.
                tx.commit();

                let action = if currently_following {
                    FollowAction::Unfollowed
                } else {
                    FollowAction::Followed
                };
                info!(
                    viewer = %viewer_id,
                    target = %target_id,
                    action = ?action,
                    "Follow toggle settled"
                );
                Ok(FollowOutcome { action, target })
            }
            Err(e) => {
                warn!(
                    viewer = %viewer_id,
                    target = %target_id,
                    error = %e,
                    "Follow toggle failed, rolling back"
                );
                tx.rollback();
                Err(e)
            }
        }
    }

    /// Patch every cached copy of both users: the viewer's `following` and
    /// the target's `followers`, under direct alias keys and inside cached
    /// directory lists.
    fn apply_patch(
        &self,
        viewer_id: Uuid,
        target_id: Uuid,
        currently_following: bool,
    ) -> CacheResult<()> {
        if currently_following {
            self.users
                .patch_user(viewer_id, |u| u.remove_following(target_id))?;
            self.users
                .patch_user(target_id, |u| u.remove_follower(viewer_id))?;
            self.users
                .patch_user_in_lists(viewer_id, |u| u.remove_following(target_id))?;
            self.users
                .patch_user_in_lists(target_id, |u| u.remove_follower(viewer_id))?;
        } else {
            self.users
                .patch_user(viewer_id, |u| u.add_following(target_id))?;
            self.users
                .patch_user(target_id, |u| u.add_follower(viewer_id))?;
            self.users
                .patch_user_in_lists(viewer_id, |u| u.add_following(target_id))?;
            self.users
                .patch_user_in_lists(target_id, |u| u.add_follower(viewer_id))?;
        }
        Ok(())
    }

    /// Refetch a user from the store and refill every alias key - the
    /// refetch half of the invalidate-then-refetch convergence loop.
    pub async fn refresh_user(&self, user_id: Uuid) -> SyncResult<Option<CachedUser>> {
        match self.store.fetch_user(user_id).await? {
            Some(user) => {
                self.users.set_user(&user)?;
                Ok(Some(user))
            }
            None => {
                self.users.set_user_not_found(user_id);
                Ok(None)
            }
        }
    }
}
