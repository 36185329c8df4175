//! Endpoint discovery for development servers
//!
//! Probes a short priority list concurrently and a longer fallback list
//! sequentially, caching the first reachable base URL. Reachability is all
//! that is tested: any non-5xx answer (even 404) counts. When nothing
//! answers, the configured default host is used and the resolver reports
//! itself disconnected instead of failing.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use futures::FutureExt;
use parking_lot::RwLock;
use pawsit_core::EndpointResolver;
use pawsit_domain::{ClientConfig, EndpointCandidate, ResolvedEndpoint};
use reqwest::Method;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::http::HttpClient;

/// Resolver that discovers a reachable host among configured candidates
pub struct DiscoveredEndpoint {
    http: HttpClient,
    config: ClientConfig,
    slot: RwLock<Option<ResolvedEndpoint>>,
    gate: Mutex<()>,
    generation: AtomicU64,
}

impl DiscoveredEndpoint {
    #[must_use]
    pub fn new(http: HttpClient, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            slot: RwLock::new(None),
            gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the cached endpoint, if any
    #[must_use]
    pub fn resolved(&self) -> Option<ResolvedEndpoint> {
        self.slot.read().clone()
    }

    /// Drop the cached endpoint without probing
    pub fn invalidate(&self) {
        self.slot.write().take();
    }

    fn fresh(&self) -> Option<String> {
        self.slot
            .read()
            .as_ref()
            .filter(|resolved| !resolved.is_expired(self.config.endpoint_ttl))
            .map(|resolved| resolved.base_url.clone())
    }

    #[instrument(skip(self), fields(priority = self.config.priority_candidates.len(), fallback = self.config.fallback_candidates.len()))]
    async fn discover(&self) -> String {
        let resolved = if let Some(candidate) = self.probe_priority().await {
            self.resolved_for(candidate)
        } else if let Some(candidate) = self.probe_fallback().await {
            self.resolved_for(candidate)
        } else {
            let base_url = self.config.default_base_url();
            warn!(%base_url, "No candidate reachable, using default endpoint");
            ResolvedEndpoint::new(base_url, None, false)
        };

        let base_url = resolved.base_url.clone();
        *self.slot.write() = Some(resolved);
        self.generation.fetch_add(1, Ordering::AcqRel);
        base_url
    }

    fn resolved_for(&self, candidate: &EndpointCandidate) -> ResolvedEndpoint {
        let base_url = self.config.base_url_for(&candidate.authority(self.config.port));
        info!(%base_url, network = candidate.network.as_str(), "Resolved API endpoint");
        ResolvedEndpoint::new(base_url, Some(candidate.clone()), true)
    }

    /// All priority candidates at once; first success wins, list order
    /// breaks ties among probes that finished together.
    async fn probe_priority(&self) -> Option<&EndpointCandidate> {
        let candidates = &self.config.priority_candidates;
        let mut pending: FuturesUnordered<_> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| self.probe(candidate).map(move |ok| (index, ok)))
            .collect();

        first_reachable(&mut pending).await.and_then(|winner| candidates.get(winner))
    }

    /// Fallback candidates one at a time to bound total latency
    async fn probe_fallback(&self) -> Option<&EndpointCandidate> {
        for candidate in &self.config.fallback_candidates {
            if self.probe(candidate).await {
                return Some(candidate);
            }
        }
        None
    }

    async fn probe(&self, candidate: &EndpointCandidate) -> bool {
        let url = self.config.probe_url_for(&candidate.authority(self.config.port));
        let request = self.http.request(Method::GET, &url).timeout(self.config.probe_timeout);

        match self.http.send(request).await {
            Ok(response) => {
                let status = response.status();
                let reachable = !status.is_server_error();
                debug!(%url, %status, reachable, network = candidate.network.as_str(), "Probe answered");
                reachable
            }
            Err(err) => {
                debug!(%url, error = %err, network = candidate.network.as_str(), "Probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl EndpointResolver for DiscoveredEndpoint {
    async fn resolve(&self) -> String {
        if let Some(base_url) = self.fresh() {
            return base_url;
        }

        let _guard = self.gate.lock().await;
        // Another caller may have resolved while we waited on the gate.
        if let Some(base_url) = self.fresh() {
            return base_url;
        }
        self.discover().await
    }

    async fn force_reresolve(&self) -> String {
        let observed = self.generation.load(Ordering::Acquire);
        let _guard = self.gate.lock().await;

        if self.generation.load(Ordering::Acquire) != observed {
            if let Some(base_url) = self.fresh() {
                debug!(%base_url, "Re-resolution already completed by another caller");
                return base_url;
            }
        }

        self.invalidate();
        self.discover().await
    }

    fn current(&self) -> String {
        self.slot
            .read()
            .as_ref()
            .map_or_else(|| self.config.default_base_url(), |resolved| resolved.base_url.clone())
    }

    fn is_connected(&self) -> bool {
        self.slot.read().as_ref().is_some_and(|resolved| resolved.connected)
    }
}

/// Index of the first reachable probe result
///
/// Results already available when the first success arrives are drained,
/// and the lowest index among them wins.
async fn first_reachable<S>(results: &mut S) -> Option<usize>
where
    S: Stream<Item = (usize, bool)> + Unpin,
{
    while let Some((index, reachable)) = results.next().await {
        if !reachable {
            continue;
        }

        let mut winner = index;
        while let Some(Some((other, ok))) = results.next().now_or_never() {
            if ok && other < winner {
                winner = other;
            }
        }
        return Some(winner);
    }

    None
}
