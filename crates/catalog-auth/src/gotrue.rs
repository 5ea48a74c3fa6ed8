//! Supabase GoTrue REST client.
//!
//! Concrete [`IdentityProvider`] against the hosted auth endpoints
//! (`/auth/v1/token`, `/auth/v1/user`, `/auth/v1/logout`). Sessions are
//! persisted through a [`SessionStore`] so they survive between CLI
//! invocations, and every state-changing call notifies subscribers.

use crate::provider::{
    IdentityProvider, Session, SessionChangeCallback, SessionSubscription, SubscriberRegistry,
};
use crate::store::SessionStore;
use crate::{AuthError, AuthResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// GoTrue token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// GoTrue user verification response.
#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
}

/// Supabase GoTrue client.
pub struct GotrueClient {
    http_client: reqwest::Client,
    supabase_url: String,
    publishable_key: String,
    store: Arc<dyn SessionStore>,
    subscribers: SubscriberRegistry,
}

impl GotrueClient {
    /// Create a new GoTrue client.
    ///
    /// # Arguments
    /// * `supabase_url` - The Supabase project URL (e.g., `https://xyz.supabase.co`)
    /// * `publishable_key` - The Supabase publishable API key
    /// * `store` - Session persistence backend
    pub fn new(
        supabase_url: impl Into<String>,
        publishable_key: impl Into<String>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            supabase_url: supabase_url.into(),
            publishable_key: publishable_key.into(),
            store,
            subscribers: SubscriberRegistry::new(),
        }
    }

    /// Build the auth API URL for an endpoint.
    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.supabase_url, endpoint)
    }

    /// Verify the session is valid by calling the `/auth/v1/user` endpoint.
    ///
    /// This ensures the session hasn't been revoked server-side.
    async fn verify_with_server(&self, access_token: &str) -> AuthResult<String> {
        let url = self.auth_url("user");

        debug!(url = %url, "Verifying session with identity provider");

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Session verification failed");
            return Err(AuthError::SessionInvalid(format!(
                "Server rejected session: HTTP {}: {}",
                status, body
            )));
        }

        let user: UserResponse = response.json().await?;
        debug!(user_id = %user.id, "Session verified with server");

        Ok(user.id)
    }
}

#[async_trait]
impl IdentityProvider for GotrueClient {
    /// Query the current session.
    ///
    /// Loads the persisted session and verifies it with the server. A
    /// server-rejected session is cleared and reported as absent; transport
    /// failures propagate so the caller can decide (the session manager
    /// treats them as absent without clearing the stored tokens).
    async fn current_session(&self) -> AuthResult<Option<Session>> {
        let session = match self.store.load()? {
            Some(session) => session,
            None => {
                debug!("No persisted session found");
                return Ok(None);
            }
        };

        match self.verify_with_server(&session.access_token).await {
            Ok(user_id) => {
                debug!(user_id = %user_id, "Existing session is valid");
                Ok(Some(session))
            }
            Err(AuthError::SessionInvalid(reason)) => {
                warn!(reason = %reason, "Stored session rejected, clearing");
                self.store.clear()?;
                self.subscribers.notify(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Session> {
        let url = format!("{}?grant_type=password", self.auth_url("token"));

        debug!(url = %url, email = %email, "Attempting email/password sign-in");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Sign-in failed");
            return Err(AuthError::InvalidCredentials(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let data: TokenResponse = response.json().await?;
        let expires_at = Utc::now() + Duration::seconds(data.expires_in);

        let session = Session {
            access_token: data.access_token,
            user_id: data.user.id,
            email: data.user.email,
            expires_at: expires_at.to_rfc3339(),
        };

        self.store.save(&session)?;
        self.subscribers.notify(Some(session.clone()));

        info!(user_id = %session.user_id, "Signed in");

        Ok(session)
    }

    /// Sign out by invalidating the session server-side.
    ///
    /// The persisted session is cleared only after the provider accepts the
    /// sign-out; on failure it is left untouched.
    async fn sign_out(&self) -> AuthResult<()> {
        let session = match self.store.load()? {
            Some(session) => session,
            None => {
                debug!("Sign-out requested with no session present");
                return Ok(());
            }
        };

        let url = self.auth_url("logout");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Sign-out rejected by provider");
            return Err(AuthError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        self.store.clear()?;
        self.subscribers.notify(None);

        info!("Signed out");
        Ok(())
    }

    fn on_session_change(&self, callback: SessionChangeCallback) -> SessionSubscription {
        self.subscribers.subscribe(callback)
    }
}

impl std::fmt::Debug for GotrueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GotrueClient")
            .field("supabase_url", &self.supabase_url)
            .finish_non_exhaustive()
    }
}
