//! Wiring of the client components
//!
//! One context per process: the resolver strategy is chosen from the
//! deployment mode, and the token manager is attached to the session store
//! as its refresher.

use std::sync::Arc;

use pawsit_core::{
    EndpointResolver, KeyValueStore, SessionStore, SuspensionGuard, SuspensionHandler,
    TokenRefresher,
};
use pawsit_domain::{ClientConfig, Result, Session};
use tracing::info;

use crate::api::{ApiResponse, LoggingSuspensionHandler, RequestExecutor, RequestOptions};
use crate::auth::TokenLifecycleManager;
use crate::endpoint::build_resolver;
use crate::http::HttpClient;
use crate::storage::build_store;

/// Fully wired API client
pub struct ClientContext {
    config: ClientConfig,
    resolver: Arc<dyn EndpointResolver>,
    sessions: Arc<SessionStore>,
    tokens: Arc<TokenLifecycleManager>,
    guard: Arc<SuspensionGuard>,
    executor: RequestExecutor,
}

impl ClientContext {
    /// Build a context over an explicit storage backend and lockout handler
    ///
    /// # Errors
    /// Returns `PawsitError::Config` if the configuration is invalid or the
    /// HTTP client cannot be created.
    pub fn build(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        handler: Arc<dyn SuspensionHandler>,
    ) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::new()?;
        let resolver = build_resolver(&config, http.clone());
        let sessions = Arc::new(SessionStore::new(store));
        let tokens = Arc::new(TokenLifecycleManager::new(
            http.clone(),
            Arc::clone(&resolver),
            Arc::clone(&sessions),
            &config,
        ));

        let refresher: Arc<dyn TokenRefresher> = tokens.clone();
        sessions.attach_refresher(Arc::downgrade(&refresher));

        let guard = Arc::new(SuspensionGuard::new());
        let executor = RequestExecutor::new(
            http,
            Arc::clone(&resolver),
            Arc::clone(&sessions),
            Arc::clone(&tokens),
            Arc::clone(&guard),
            handler,
            &config,
        );

        info!(mode = ?config.mode, "Client context ready");
        Ok(Self { config, resolver, sessions, tokens, guard, executor })
    }

    /// Build with the configured storage backend and the logging handler
    ///
    /// # Errors
    /// See [`ClientContext::build`].
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let store = build_store(&config.storage);
        Self::build(config, store, Arc::new(LoggingSuspensionHandler))
    }

    /// Execute an API call; see [`RequestExecutor::execute`]
    ///
    /// # Errors
    /// Transport, authentication and cancellation failures.
    pub async fn execute(&self, endpoint: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.executor.execute(endpoint, options).await
    }

    /// Store the session returned by a successful login
    ///
    /// # Errors
    /// Returns a storage error if the session cannot be persisted.
    pub async fn sign_in(&self, session: Session) -> Result<()> {
        self.sessions.sign_in(session).await
    }

    /// Log out locally
    ///
    /// # Errors
    /// Returns a storage error if durable state cannot be updated.
    pub async fn logout(&self) -> Result<()> {
        self.sessions.clear().await
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn EndpointResolver> {
        &self.resolver
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenLifecycleManager> {
        &self.tokens
    }

    #[must_use]
    pub fn suspension_guard(&self) -> &Arc<SuspensionGuard> {
        &self.guard
    }

    #[must_use]
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }
}
