//! Integration tests for endpoint discovery
//!
//! Down hosts are simulated with closed ports; live hosts are WireMock
//! servers answering the liveness probe.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pawsit_core::EndpointResolver;
use pawsit_domain::ClientConfig;
use pawsit_infra::{DiscoveredEndpoint, HttpClient, RequestOptions};
use support::{candidate_for, context_with, dead_candidate};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn discovery_config(
    priority: Vec<pawsit_domain::EndpointCandidate>,
    fallback: Vec<pawsit_domain::EndpointCandidate>,
) -> ClientConfig {
    ClientConfig {
        probe_timeout: Duration::from_millis(500),
        request_timeout: Duration::from_secs(2),
        ..ClientConfig::development(priority, fallback)
    }
}

async fn live_server(expected_probes: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(expected_probes)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn live_priority_host_wins_and_fallback_is_never_probed() {
    let b = live_server(1).await;
    let c = live_server(0).await;

    let config = discovery_config(vec![dead_candidate(), candidate_for(&b)], vec![candidate_for(&c)]);
    let resolver = DiscoveredEndpoint::new(HttpClient::new().unwrap(), config);

    assert_eq!(resolver.resolve().await, format!("{}/api", b.uri()));
    assert!(resolver.is_connected());
    assert_eq!(resolver.resolved().unwrap().candidate, Some(candidate_for(&b)));
}

#[tokio::test]
async fn concurrent_resolves_agree_and_probe_once() {
    let server = live_server(1).await;

    let config = discovery_config(vec![candidate_for(&server)], Vec::new());
    let resolver = Arc::new(DiscoveredEndpoint::new(HttpClient::new().unwrap(), config));

    let resolutions = join_all((0..10).map(|_| {
        let resolver = Arc::clone(&resolver);
        async move { resolver.resolve().await }
    }))
    .await;

    let expected = format!("{}/api", server.uri());
    assert!(resolutions.iter().all(|url| *url == expected));
}

#[tokio::test]
async fn concurrent_force_reresolve_collapses_into_one_probe() {
    // One probe for the initial resolve, one shared by every re-resolve that
    // started before it completed.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(2)
        .mount(&server)
        .await;

    let config = discovery_config(vec![candidate_for(&server)], Vec::new());
    let resolver = Arc::new(DiscoveredEndpoint::new(HttpClient::new().unwrap(), config));
    resolver.resolve().await;

    let urls = join_all((0..5).map(|_| {
        let resolver = Arc::clone(&resolver);
        async move { resolver.force_reresolve().await }
    }))
    .await;
    assert!(urls.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn nothing_reachable_uses_default_and_reports_disconnected() {
    let config = ClientConfig {
        default_host: "127.0.0.1".into(),
        port: Some(9),
        ..discovery_config(vec![dead_candidate()], vec![dead_candidate(), dead_candidate()])
    };
    let resolver = DiscoveredEndpoint::new(HttpClient::new().unwrap(), config);

    assert_eq!(resolver.resolve().await, "http://127.0.0.1:9/api");
    assert!(!resolver.is_connected());
}

#[tokio::test]
async fn expired_endpoint_is_probed_again() {
    let server = live_server(2).await;

    let config = ClientConfig {
        endpoint_ttl: Duration::from_millis(50),
        ..discovery_config(vec![candidate_for(&server)], Vec::new())
    };
    let resolver = DiscoveredEndpoint::new(HttpClient::new().unwrap(), config);

    resolver.resolve().await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    resolver.resolve().await;
}

#[tokio::test]
async fn executor_sends_to_discovered_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/auth/verify-otp"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = discovery_config(vec![dead_candidate()], vec![candidate_for(&server)]);
    let (context, _) = context_with(config);

    let response = context.execute("/auth/verify-otp", RequestOptions::get()).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(context.resolver().is_connected());
}
