//! Unified cache key schema
//!
//! Every view of a resource must be addressed through these generators.
//! Two key families exist for the same logical user: the versioned schema
//! form (`v{VERSION}:user:{id}`) and the REST-path form (`/api/users/{id}`)
//! that mirrors the endpoint the view was fetched from.

use uuid::Uuid;

/// Cache schema version - increment when changing key formats
pub const CACHE_VERSION: u32 = 1;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    // ============= User Keys =============

    /// User profile cache, schema form
    /// Format: v1:user:{user_id}
    pub fn user(user_id: Uuid) -> String {
        format!("v{}:user:{}", CACHE_VERSION, user_id)
    }

    /// User profile cache, REST-path form
    /// Format: /api/users/{user_id}
    pub fn user_path(user_id: Uuid) -> String {
        format!("/api/users/{}", user_id)
    }

    /// Template form of the canonical user key (`{id}` placeholder),
    /// used by the alias registry
    pub fn user_template() -> String {
        format!("v{}:user:{{id}}", CACHE_VERSION)
    }

    // ============= User Directory Keys =============

    /// User directory (list of profiles), schema form
    /// Format: v1:users
    pub fn users() -> String {
        format!("v{}:users", CACHE_VERSION)
    }

    /// User directory, REST-path form
    pub fn users_path() -> String {
        "/api/users".to_string()
    }

    // ============= Utility =============

    /// Extract entity type from a key of either family
    pub fn entity_type(key: &str) -> Option<&str> {
        if let Some(rest) = key.strip_prefix("/api/") {
            // Path form: /api/{entity}[/...]
            return rest.split('/').next().filter(|s| !s.is_empty());
        }
        // Schema form: v{N}:{entity}[:...]
        let mut parts = key.split(':');
        let version = parts.next()?;
        if !version.starts_with('v') {
            return None;
        }
        parts.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key() {
        let user_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let key = CacheKey::user(user_id);
        assert_eq!(key, "v1:user:550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_user_path_key() {
        let user_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let key = CacheKey::user_path(user_id);
        assert_eq!(key, "/api/users/550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_directory_keys() {
        assert_eq!(CacheKey::users(), "v1:users");
        assert_eq!(CacheKey::users_path(), "/api/users");
    }

    #[test]
    fn test_entity_type() {
        assert_eq!(CacheKey::entity_type("v1:user:123"), Some("user"));
        assert_eq!(CacheKey::entity_type("v1:users"), Some("users"));
        assert_eq!(CacheKey::entity_type("/api/users/123"), Some("users"));
        assert_eq!(CacheKey::entity_type("/api/users"), Some("users"));
        assert_eq!(CacheKey::entity_type("invalid"), None);
    }
}
