//! Shared fixtures for infra integration tests

use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pawsit_core::SuspensionHandler;
use pawsit_domain::{ClientConfig, EndpointCandidate, NetworkType, Session, SuspensionNotice};
use pawsit_infra::{ClientContext, MemoryStore};
use wiremock::MockServer;

/// Suspension handler that records every notice it receives
#[derive(Default)]
pub struct RecordingHandler {
    calls: AtomicUsize,
    notices: Mutex<Vec<SuspensionNotice>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn notices(&self) -> Vec<SuspensionNotice> {
        self.notices.lock().clone()
    }
}

#[async_trait]
impl SuspensionHandler for RecordingHandler {
    async fn notify(&self, notice: &SuspensionNotice) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.notices.lock().push(notice.clone());
    }
}

/// API base URL served by a mock server
pub fn api_base(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

/// Production-mode config pointed at a mock server with short timeouts
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        request_timeout: Duration::from_millis(300),
        suspension_release: Duration::from_secs(5),
        ..ClientConfig::production(api_base(server))
    }
}

/// Context over in-memory storage with a recording suspension handler
pub fn context_with(config: ClientConfig) -> (ClientContext, Arc<RecordingHandler>) {
    let handler = Arc::new(RecordingHandler::default());
    let context = ClientContext::build(config, Arc::new(MemoryStore::new()), handler.clone())
        .expect("client context should build");
    (context, handler)
}

pub async fn signed_in(config: ClientConfig, token: &str) -> (ClientContext, Arc<RecordingHandler>) {
    let (context, handler) = context_with(config);
    context
        .sign_in(Session::new("user-1").with_token(token))
        .await
        .expect("sign in should persist");
    (context, handler)
}

/// Candidate for a mock server (host:port, so no port is appended)
pub fn candidate_for(server: &MockServer) -> EndpointCandidate {
    let host = server.uri().trim_start_matches("http://").to_string();
    EndpointCandidate::new(host, NetworkType::Wifi)
}

/// Candidate whose port refuses connections
pub fn dead_candidate() -> EndpointCandidate {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    EndpointCandidate::new(addr.to_string(), NetworkType::MobileData)
}

/// Poll `condition` until it holds or two seconds pass
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
