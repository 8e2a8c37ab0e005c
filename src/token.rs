//! The Token Cache (§4.2): at most one cached `AuthToken`, refreshed with single-flight
//! semantics. The whole discipline boils down to one rule: every caller that needs a
//! fresh token must go through the *same* `await` on the *same* mutex, so a refresh that
//! is already in flight is observed by latecomers instead of triggering a second one.

use chrono::Duration;
use chrono::Utc;
use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use tokio::sync::Mutex;

use crate::domain::AuthToken;
use crate::errors::TokenError;

/// Credentials used to obtain a token via HTTP basic auth against the login endpoint.
pub struct TokenCredentials {
    pub username: String,
    pub password: Secret<String>,
}

pub struct TokenCache {
    client: Client,
    login_url: String,
    credentials: TokenCredentials,
    epsilon: Duration,
    /// Holding this lock across the refresh `await` is what makes the refresh
    /// single-flight: a second caller arriving while a refresh is in progress blocks on
    /// the lock and then reads back the token the first caller just installed, instead
    /// of starting its own request.
    cached: Mutex<Option<AuthToken>>,
}

impl TokenCache {
    pub fn new(client: Client, login_url: String, credentials: TokenCredentials, epsilon: Duration) -> Self {
        Self { client, login_url, credentials, epsilon, cached: Mutex::new(None) }
    }

    async fn fetch_token(&self) -> Result<AuthToken, TokenError> {
        let response = self
            .client
            .post(&self.login_url)
            .basic_auth(&self.credentials.username, Some(self.credentials.password.expose_secret()))
            .send()
            .await
            .map_err(|e| TokenError::Refresh(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| TokenError::Refresh(e.to_string()))?;

        response
            .json::<AuthToken>()
            .await
            .map_err(|e| TokenError::Refresh(e.to_string()))
    }

    /// `get_token()` (§4.2). A failed refresh leaves the cache empty (the `None` is left
    /// in place, not replaced with a stale value) so the very next caller retries rather
    /// than being stuck behind a permanently-poisoned cache.
    pub async fn get_token(&self) -> Result<AuthToken, TokenError> {
        let mut guard = self.cached.lock().await;
        let needs_refresh = match guard.as_ref() {
            Some(token) => token.has_expired(Utc::now(), self.epsilon),
            None => true,
        };
        if needs_refresh {
            let fresh = self.fetch_token().await?;
            *guard = Some(fresh);
        }
        Ok(guard.as_ref().expect("just populated above").clone())
    }
}
