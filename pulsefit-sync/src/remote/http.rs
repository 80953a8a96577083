//! HTTP implementation of the user store

use async_trait::async_trait;
use chrono::Utc;
use pulsefit_cache::user::CachedUser;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::{SyncError, SyncResult};
use crate::remote::UserStore;

/// User payload as the REST backend returns it
#[derive(Debug, Deserialize)]
struct ApiUser {
    id: Uuid,
    username: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    #[serde(default)]
    following: Vec<Uuid>,
    #[serde(default)]
    followers: Vec<Uuid>,
}

impl From<ApiUser> for CachedUser {
    fn from(user: ApiUser) -> Self {
        CachedUser {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            following: user.following,
            followers: user.followers,
            cached_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FollowRequest {
    viewer_id: Uuid,
}

/// User store backed by the PulseFit REST API
#[derive(Clone)]
pub struct HttpUserStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserStore {
    pub fn new(config: &ApiConfig) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn user_url(&self, user_id: Uuid) -> String {
        format!("{}/api/users/{}", self.base_url, user_id)
    }

    fn mutation_url(&self, target_id: Uuid, action: &str) -> String {
        format!("{}/api/users/{}/{}", self.base_url, target_id, action)
    }

    async fn mutate(
        &self,
        target_id: Uuid,
        viewer_id: Uuid,
        action: &str,
    ) -> SyncResult<CachedUser> {
        let url = self.mutation_url(target_id, action);
        let response = self
            .client
            .post(&url)
            .json(&FollowRequest { viewer_id })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Remote {
                status: Some(status.as_u16()),
                message,
            });
        }

        let user: ApiUser = response.json().await?;
        debug!(target = %target_id, viewer = %viewer_id, action = %action, "Remote mutation succeeded");
        Ok(user.into())
    }
}

#[async_trait]
impl UserStore for HttpUserStore {
    async fn follow_user(&self, target_id: Uuid, viewer_id: Uuid) -> SyncResult<CachedUser> {
        self.mutate(target_id, viewer_id, "follow").await
    }

    async fn unfollow_user(&self, target_id: Uuid, viewer_id: Uuid) -> SyncResult<CachedUser> {
        self.mutate(target_id, viewer_id, "unfollow").await
    }

    async fn fetch_user(&self, user_id: Uuid) -> SyncResult<Option<CachedUser>> {
        let response = self.client.get(self.user_url(user_id)).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Remote {
                status: Some(status.as_u16()),
                message,
            });
        }

        let user: ApiUser = response.json().await?;
        Ok(Some(user.into()))
    }
}
