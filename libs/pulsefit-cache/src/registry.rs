//! Key-alias registry
//!
//! The same logical user is cached under several concrete keys (schema form,
//! REST-path form, plus membership in cached directory lists). Mutation paths
//! must fan out to every alias, so the full set is enumerated here once
//! instead of ad hoc at each call site.

use uuid::Uuid;

use crate::CacheKey;

/// Placeholder substituted with the user id in alias templates.
const ID_PLACEHOLDER: &str = "{id}";

/// Registry of concrete cache keys per logical entity.
#[derive(Debug, Clone)]
pub struct KeyAliasRegistry {
    /// Per-user key templates; the first is the canonical key.
    user_templates: Vec<String>,
    /// Keys of cached user lists that may embed a user's profile.
    list_keys: Vec<String>,
}

impl Default for KeyAliasRegistry {
    fn default() -> Self {
        Self {
            user_templates: vec![
                CacheKey::user_template(),
                format!("/api/users/{}", ID_PLACEHOLDER),
            ],
            list_keys: vec![CacheKey::users(), CacheKey::users_path()],
        }
    }
}

impl KeyAliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an additional per-user alias template containing `{id}`.
    pub fn with_user_alias(mut self, template: impl Into<String>) -> Self {
        self.user_templates.push(template.into());
        self
    }

    /// Register an additional user-list key.
    pub fn with_list_key(mut self, key: impl Into<String>) -> Self {
        self.list_keys.push(key.into());
        self
    }

    /// The canonical (preferred) key for a user.
    pub fn canonical_user_key(&self, user_id: Uuid) -> String {
        self.user_templates[0].replace(ID_PLACEHOLDER, &user_id.to_string())
    }

    /// Every concrete per-user key for a user, canonical first.
    pub fn user_keys(&self, user_id: Uuid) -> Vec<String> {
        let id = user_id.to_string();
        self.user_templates
            .iter()
            .map(|t| t.replace(ID_PLACEHOLDER, &id))
            .collect()
    }

    /// Keys of cached lists that may hold a copy of any user.
    pub fn list_keys(&self) -> &[String] {
        &self.list_keys
    }

    /// Every key a mutation of the (a, b) relationship may touch:
    /// all aliases of both users plus every list key.
    pub fn keys_for_pair(&self, a: Uuid, b: Uuid) -> Vec<String> {
        let mut keys = self.user_keys(a);
        keys.extend(self.user_keys(b));
        keys.extend(self.list_keys.iter().cloned());
        keys
    }
}
