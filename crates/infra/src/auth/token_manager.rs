//! Bearer token lifecycle
//!
//! Tokens are renewed by principal id, never by presenting the old token:
//! the refresh endpoint is tried first and the regenerate endpoint is the
//! fallback. Concurrent callers share one in-flight renewal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use pawsit_core::{EndpointResolver, SessionStore, TokenRefresher};
use pawsit_domain::{ClientConfig, PawsitError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::api::join_url;
use crate::http::HttpClient;

type RenewalFuture = Shared<BoxFuture<'static, Result<String>>>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    user_id: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    success: bool,
    token: Option<String>,
}

/// Refreshes or regenerates the session token, one renewal at a time
pub struct TokenLifecycleManager {
    client: Arc<TokenClient>,
    inflight: Mutex<Option<(u64, RenewalFuture)>>,
    flights: AtomicU64,
}

struct TokenClient {
    http: HttpClient,
    resolver: Arc<dyn EndpointResolver>,
    sessions: Arc<SessionStore>,
    refresh_path: String,
    regenerate_path: String,
    timeout: Duration,
}

impl TokenLifecycleManager {
    /// Create a manager that renews tokens against the resolved endpoint
    #[must_use]
    pub fn new(
        http: HttpClient,
        resolver: Arc<dyn EndpointResolver>,
        sessions: Arc<SessionStore>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            client: Arc::new(TokenClient {
                http,
                resolver,
                sessions,
                refresh_path: config.refresh_path.clone(),
                regenerate_path: config.regenerate_path.clone(),
                timeout: config.request_timeout,
            }),
            inflight: Mutex::new(None),
            flights: AtomicU64::new(0),
        }
    }

    /// Obtain a new token, joining a renewal already in flight
    ///
    /// Falls back to regeneration when refresh fails; if both fail the
    /// refresh error is returned.
    ///
    /// # Errors
    /// `NotAuthenticated` without a session, otherwise the refresh failure.
    pub async fn refresh(&self) -> Result<String> {
        let (flight, renewal) = {
            let mut slot = self.inflight.lock();
            match slot.as_ref() {
                Some((flight, renewal)) if renewal.peek().is_none() => {
                    debug!(flight, "Joining in-flight token renewal");
                    (*flight, renewal.clone())
                }
                _ => {
                    let flight = self.flights.fetch_add(1, Ordering::AcqRel) + 1;
                    let client = Arc::clone(&self.client);
                    let renewal = async move { client.renew().await }.boxed().shared();
                    *slot = Some((flight, renewal.clone()));
                    (flight, renewal)
                }
            }
        };

        let result = renewal.await;

        let mut slot = self.inflight.lock();
        if slot.as_ref().is_some_and(|(current, _)| *current == flight) {
            *slot = None;
        }
        result
    }

    /// Ask the server to issue a brand new token for the current principal
    ///
    /// # Errors
    /// `NotAuthenticated` without a session, otherwise the request failure.
    pub async fn regenerate(&self) -> Result<String> {
        let path = self.client.regenerate_path.clone();
        self.client.renew_with(&path).await
    }

    /// Number of renewals started so far
    #[must_use]
    pub fn renewals_started(&self) -> u64 {
        self.flights.load(Ordering::Acquire)
    }
}

impl TokenClient {
    #[instrument(name = "token_renewal", skip(self))]
    async fn renew(&self) -> Result<String> {
        match self.renew_with(&self.refresh_path).await {
            Ok(token) => Ok(token),
            Err(PawsitError::NotAuthenticated) => Err(PawsitError::NotAuthenticated),
            Err(refresh_err) => {
                warn!(error = %refresh_err, "Token refresh failed, trying regeneration");
                match self.renew_with(&self.regenerate_path).await {
                    Ok(token) => Ok(token),
                    Err(regen_err) => {
                        warn!(error = %regen_err, "Token regeneration failed");
                        Err(refresh_err)
                    }
                }
            }
        }
    }

    async fn renew_with(&self, path: &str) -> Result<String> {
        let session = self.sessions.snapshot().await?.ok_or(PawsitError::NotAuthenticated)?;
        if session.id.is_empty() {
            return Err(PawsitError::NotAuthenticated);
        }

        let token = self.request_token(path, &session.id).await?;

        let updated = self
            .sessions
            .update(|current| current.token = Some(token.clone()))
            .await?;
        if updated.is_none() {
            // Logged out while the request was in flight.
            return Err(PawsitError::NotAuthenticated);
        }

        info!(user_id = %session.id, path, "Session token renewed");
        Ok(token)
    }

    async fn request_token(&self, path: &str, user_id: &str) -> Result<String> {
        let base_url = self.resolver.resolve().await;
        let url = join_url(&base_url, path);

        let request = self
            .http
            .request(Method::POST, &url)
            .timeout(self.timeout)
            .json(&TokenRequest { user_id });
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PawsitError::AuthenticationExpired(format!(
                "{path} returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PawsitError::Network(format!("failed to read token response: {e}")))?;
        let parsed: TokenResponse = serde_json::from_str(&body)?;

        match parsed.token {
            Some(token) if parsed.success && !token.is_empty() => Ok(token),
            _ => Err(PawsitError::AuthenticationExpired(format!("{path} declined to issue a token"))),
        }
    }
}

#[async_trait]
impl TokenRefresher for TokenLifecycleManager {
    async fn refresh(&self) -> Result<String> {
        TokenLifecycleManager::refresh(self).await
    }
}
