//! Request executor
//!
//! Sends one logical request with a bounded retry policy:
//! - non-auth calls short-circuit with a local 403 after logout
//! - a bearer token is attached from the session
//! - a suspended/banned 403 runs the notify-then-logout sequence once
//! - an auth rejection triggers one token refresh and a resend
//! - any other failure re-resolves the endpoint and resends once
//!
//! Every send races the caller's cancellation token and the request timeout.

use std::sync::Arc;
use std::time::Instant;

use pawsit_core::request::{decide_response, decide_transport_failure};
use pawsit_core::{
    EndpointResolver, RequestAttempt, ResponseDecision, SessionStore, SuspensionGuard,
    SuspensionHandler,
};
use pawsit_domain::{ClientConfig, PawsitError, Result, SuspensionNotice};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn, Span};
use uuid::Uuid;

use super::request::{join_url, ApiResponse, RequestOptions};
use crate::auth::TokenLifecycleManager;
use crate::http::HttpClient;
use crate::observability::logging::log_request_outcome;

/// Executes API calls against the resolved endpoint
pub struct RequestExecutor {
    http: HttpClient,
    resolver: Arc<dyn EndpointResolver>,
    sessions: Arc<SessionStore>,
    tokens: Arc<TokenLifecycleManager>,
    guard: Arc<SuspensionGuard>,
    handler: Arc<dyn SuspensionHandler>,
    config: ClientConfig,
}

impl RequestExecutor {
    /// Wire an executor over shared client services
    #[must_use]
    pub fn new(
        http: HttpClient,
        resolver: Arc<dyn EndpointResolver>,
        sessions: Arc<SessionStore>,
        tokens: Arc<TokenLifecycleManager>,
        guard: Arc<SuspensionGuard>,
        handler: Arc<dyn SuspensionHandler>,
        config: &ClientConfig,
    ) -> Self {
        Self { http, resolver, sessions, tokens, guard, handler, config: config.clone() }
    }

    /// Execute a request with fresh retry budgets
    ///
    /// Non-2xx responses are returned as values.
    ///
    /// # Errors
    /// - `Network` / `Timeout` after the single network retry is spent
    /// - `AuthenticationExpired` when the token could not be renewed
    /// - `Cancelled` when the caller's token fires
    /// - `Storage` if the session cannot be read
    pub async fn execute(&self, endpoint: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.execute_attempt(endpoint, options, RequestAttempt::new()).await
    }

    /// Execute a request continuing from an existing attempt state
    ///
    /// # Errors
    /// See [`RequestExecutor::execute`].
    #[instrument(
        name = "api_request",
        skip_all,
        fields(request_id = %Uuid::new_v4(), endpoint = %endpoint, method = %options.method, sends = tracing::field::Empty)
    )]
    pub async fn execute_attempt(
        &self,
        endpoint: &str,
        options: RequestOptions,
        attempt: RequestAttempt,
    ) -> Result<ApiResponse> {
        let started = Instant::now();
        let mut sends = 0;

        let outcome = self.run(endpoint, &options, attempt, &mut sends).await;

        Span::current().record("sends", sends);
        log_request_outcome(
            endpoint,
            outcome.as_ref().map(|response| response.status),
            sends,
            started.elapsed(),
        );
        outcome
    }

    async fn run(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        mut attempt: RequestAttempt,
        sends: &mut u32,
    ) -> Result<ApiResponse> {
        let is_auth = self.config.is_auth_endpoint(endpoint);

        if !is_auth && self.sessions.is_logged_out().await? {
            info!("Logged out, answering locally");
            return Ok(ApiResponse::logged_out());
        }

        let cancel = options.cancel.clone().unwrap_or_default();
        let mut headers = base_headers(is_auth, &options.headers);
        if !is_auth && !headers.contains_key(AUTHORIZATION) {
            attempt = self.attach_session_token(&mut headers, attempt, &cancel).await?;
        }

        loop {
            if cancel.is_cancelled() {
                return Err(PawsitError::Cancelled);
            }

            let base_url = self.resolver.resolve().await;
            let url = join_url(&base_url, endpoint);
            *sends += 1;
            debug!(send = *sends, %url, "Sending request");

            let response = match self.send_once(&url, options, &headers, &cancel).await {
                Ok(response) => response,
                Err(err) => match decide_transport_failure(attempt, &err) {
                    Some(next) => {
                        warn!(error = %err, "Transport failure, re-resolving endpoint");
                        self.resolver.force_reresolve().await;
                        attempt = next;
                        continue;
                    }
                    None => return Err(err),
                },
            };

            match decide_response(attempt, response.status, &response.body) {
                ResponseDecision::Return => return Ok(response),
                ResponseDecision::Suspend(notice) => {
                    self.handle_suspension(notice);
                    return Ok(response);
                }
                ResponseDecision::RefreshAndRetry(_) if is_auth => {
                    debug!(status = response.status, "Auth endpoint rejected credentials");
                    return Ok(response);
                }
                ResponseDecision::RefreshAndRetry(next) => {
                    info!(status = response.status, "Token rejected, refreshing");
                    let token = self.refresh_token(&cancel).await?;
                    headers.insert(AUTHORIZATION, bearer(&token)?);
                    attempt = next;
                }
                ResponseDecision::RetryNetwork(next) => {
                    warn!(status = response.status, "Request failed, re-resolving endpoint");
                    self.resolver.force_reresolve().await;
                    attempt = next;
                }
            }
        }
    }

    /// Attach the session bearer, renewing a missing token first
    ///
    /// A renewal here spends the request's refresh budget, so a later 401
    /// on the same logical request is not refreshed again.
    async fn attach_session_token(
        &self,
        headers: &mut HeaderMap,
        attempt: RequestAttempt,
        cancel: &CancellationToken,
    ) -> Result<RequestAttempt> {
        let Some(session) = self.sessions.snapshot().await? else {
            debug!("No session, sending unauthenticated");
            return Ok(attempt);
        };

        if let Some(token) = session.token.filter(|token| !token.is_empty()) {
            headers.insert(AUTHORIZATION, bearer(&token)?);
            return Ok(attempt);
        }

        let Some(next) = attempt.token_refresh() else {
            debug!(user_id = %session.id, "Session has no token and refresh is spent");
            return Ok(attempt);
        };

        info!(user_id = %session.id, "Session has no token, refreshing before send");
        let token = self.refresh_token(cancel).await?;
        headers.insert(AUTHORIZATION, bearer(&token)?);
        Ok(next)
    }

    async fn send_once(
        &self,
        url: &str,
        options: &RequestOptions,
        headers: &HeaderMap,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        let timeout = self.config.request_timeout;

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(PawsitError::Cancelled),
            () = tokio::time::sleep(timeout) => {
                warn!(?timeout, "Request timed out");
                Err(PawsitError::Timeout(timeout))
            }
            result = self.transmit(url, options, headers) => result,
        }
    }

    async fn transmit(
        &self,
        url: &str,
        options: &RequestOptions,
        headers: &HeaderMap,
    ) -> Result<ApiResponse> {
        let mut builder = self.http.request(options.method.clone(), url).headers(headers.clone());
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = self.http.send(builder).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| PawsitError::Network(format!("failed to read response body: {e}")))?;

        Ok(ApiResponse { status, headers, body, synthetic: false })
    }

    async fn refresh_token(&self, cancel: &CancellationToken) -> Result<String> {
        let renewed = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PawsitError::Cancelled),
            renewed = self.tokens.refresh() => renewed,
        };

        renewed.map_err(|err| match err {
            PawsitError::Cancelled
            | PawsitError::NotAuthenticated
            | PawsitError::AuthenticationExpired(_) => err,
            other => PawsitError::AuthenticationExpired(other.to_string()),
        })
    }

    /// Run notify, logout and delayed release once per latch window
    fn handle_suspension(&self, notice: SuspensionNotice) {
        if !self.guard.try_enter() {
            debug!(status = notice.status.as_str(), "Suspension already being handled");
            return;
        }

        warn!(status = notice.status.as_str(), "Account locked, logging out");
        let handler = Arc::clone(&self.handler);
        let sessions = Arc::clone(&self.sessions);
        let guard = Arc::clone(&self.guard);
        let delay = self.config.suspension_release;

        tokio::spawn(async move {
            handler.notify(&notice).await;
            if let Err(err) = sessions.clear().await {
                error!(error = %err, "Failed to clear session after suspension");
            }
            let _release = guard.release_after(delay);
        });
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn EndpointResolver> {
        &self.resolver
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }
}

/// JSON headers plus caller overrides; auth endpoints never carry a bearer
fn base_headers(is_auth: bool, extra: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        headers.insert(name.clone(), value.clone());
    }

    if is_auth {
        headers.remove(AUTHORIZATION);
    }
    headers
}

fn bearer(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| PawsitError::Internal("session token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_is_sensitive() {
        let value = bearer("abc").unwrap();
        assert_eq!(value, "Bearer abc");
        assert!(value.is_sensitive());
    }

    #[test]
    fn bearer_rejects_control_characters() {
        assert!(matches!(bearer("a\nb"), Err(PawsitError::Internal(_))));
    }
}
