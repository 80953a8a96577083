//! User caching module
//!
//! Typed access to cached user profiles and the cached user directory.
//! Every operation fans out over the alias registry so the schema-form and
//! path-form views of a profile never diverge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::KeyAliasRegistry;
use crate::{ttl, CacheOperations, CacheResult, ViewCache, CACHE_MISS_SENTINEL};

/// Cached user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedUser {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Ids this user follows, insertion order, no duplicates
    pub following: Vec<Uuid>,
    /// Ids following this user, insertion order, no duplicates
    pub followers: Vec<Uuid>,
    pub cached_at: DateTime<Utc>,
}

impl CachedUser {
    pub fn is_following(&self, user_id: Uuid) -> bool {
        self.following.contains(&user_id)
    }

    pub fn add_following(&mut self, user_id: Uuid) {
        if !self.following.contains(&user_id) {
            self.following.push(user_id);
        }
    }

    pub fn remove_following(&mut self, user_id: Uuid) {
        self.following.retain(|id| *id != user_id);
    }

    pub fn add_follower(&mut self, user_id: Uuid) {
        if !self.followers.contains(&user_id) {
            self.followers.push(user_id);
        }
    }

    pub fn remove_follower(&mut self, user_id: Uuid) {
        self.followers.retain(|id| *id != user_id);
    }
}

/// Cached user directory page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedUserList {
    pub users: Vec<CachedUser>,
    /// Total count (may be greater than users.len() for paginated results)
    pub total_count: i32,
    /// Whether there are more results
    pub has_more: bool,
    /// Cache timestamp
    pub cached_at: DateTime<Utc>,
}

/// User cache operations
#[derive(Clone)]
pub struct UserCache {
    cache: ViewCache,
    registry: KeyAliasRegistry,
    user_ttl: u64,
    list_ttl: u64,
}

impl UserCache {
    pub fn new(cache: ViewCache, registry: KeyAliasRegistry) -> Self {
        Self {
            cache,
            registry,
            user_ttl: ttl::USER,
            list_ttl: ttl::USER_LIST,
        }
    }

    pub fn with_ttls(mut self, user_ttl: u64, list_ttl: u64) -> Self {
        self.user_ttl = user_ttl;
        self.list_ttl = list_ttl;
        self
    }

    pub fn cache(&self) -> &ViewCache {
        &self.cache
    }

    pub fn registry(&self) -> &KeyAliasRegistry {
        &self.registry
    }

    /// Get cached user by ID, checking the canonical key first, then aliases.
    pub fn get_user(&self, user_id: Uuid) -> CacheResult<Option<CachedUser>> {
        for key in self.registry.user_keys(user_id) {
            match self.cache.get_raw(&key) {
                Some(v) if v == CACHE_MISS_SENTINEL => return Ok(None),
                Some(v) => match serde_json::from_str::<CachedUser>(&v) {
                    Ok(user) => return Ok(Some(user)),
                    Err(_) => {
                        // Corrupted alias, drop it and try the next one
                        let _ = self.cache.del(&key);
                    }
                },
                None => {}
            }
        }
        Ok(None)
    }

    /// Cache a user profile under every alias key.
    pub fn set_user(&self, user: &CachedUser) -> CacheResult<()> {
        for key in self.registry.user_keys(user.id) {
            self.cache.set(&key, user, self.user_ttl)?;
        }
        Ok(())
    }

    /// Set negative cache for a non-existent user under every alias key.
    pub fn set_user_not_found(&self, user_id: Uuid) {
        for key in self.registry.user_keys(user_id) {
            self.cache.set_negative(&key);
        }
    }

    /// Mark every alias of a user stale; returns the number of keys marked.
    pub fn mark_user_stale(&self, user_id: Uuid) -> usize {
        self.cache.mark_stale_many(&self.registry.user_keys(user_id))
    }

    /// Apply `patch` to every cached copy of a user held under a direct
    /// alias key; returns the number of entries rewritten.
    pub fn patch_user<F>(&self, user_id: Uuid, patch: F) -> CacheResult<usize>
    where
        F: Fn(&mut CachedUser),
    {
        let mut patched = 0;
        for key in self.registry.user_keys(user_id) {
            let raw = match self.cache.get_raw(&key) {
                Some(v) if v != CACHE_MISS_SENTINEL => v,
                _ => continue,
            };
            let mut user = match serde_json::from_str::<CachedUser>(&raw) {
                Ok(user) => user,
                Err(_) => continue,
            };
            patch(&mut user);
            self.cache.set(&key, &user, self.user_ttl)?;
            patched += 1;
        }
        Ok(patched)
    }

    /// Apply `patch` to a user's copy inside every cached directory list
    /// that embeds it (linear scan); returns the number of lists rewritten.
    pub fn patch_user_in_lists<F>(&self, user_id: Uuid, patch: F) -> CacheResult<usize>
    where
        F: Fn(&mut CachedUser),
    {
        let mut patched = 0;
        for key in self.registry.list_keys() {
            let mut list = match self.cache.get::<CachedUserList>(key)? {
                Some(list) => list,
                None => continue,
            };
            let mut touched = false;
            for user in list.users.iter_mut().filter(|u| u.id == user_id) {
                patch(user);
                touched = true;
            }
            if touched {
                self.cache.set(key, &list, self.list_ttl)?;
                patched += 1;
            }
        }
        Ok(patched)
    }

    /// Get a cached directory page.
    pub fn get_user_list(&self, key: &str) -> CacheResult<Option<CachedUserList>> {
        self.cache.get(key)
    }

    /// Cache a directory page.
    pub fn set_user_list(&self, key: &str, list: &CachedUserList) -> CacheResult<()> {
        self.cache.set(key, list, self.list_ttl)
    }
}
