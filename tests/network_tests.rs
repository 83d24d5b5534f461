// Tests for the resilient HTTP client: retry/backoff classification,
// offline queueing, and replay on reconnect. The transport is scripted so
// no real network is involved; delays run on tokio's paused clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nutrivoice::network::{
    ConnectivityMonitor, HttpRequest, HttpResponse, HttpTransport, NetworkError,
    ResilientHttpClient, TransportFailure,
};

/// Transport returning a scripted sequence of outcomes
struct ScriptedTransport {
    script: tokio::sync::Mutex<VecDeque<Result<HttpResponse, TransportFailure>>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<HttpResponse, TransportFailure>>) -> Arc<Self> {
        Arc::new(Self {
            script: tokio::sync::Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(TransportFailure::Connection(
                "script exhausted".to_string(),
            )))
    }
}

fn status(code: u16) -> Result<HttpResponse, TransportFailure> {
    Ok(HttpResponse {
        status: code,
        body: Vec::new(),
    })
}

fn ok_body(body: &[u8]) -> Result<HttpResponse, TransportFailure> {
    Ok(HttpResponse {
        status: 200,
        body: body.to_vec(),
    })
}

#[tokio::test]
async fn test_success_returns_body() {
    let transport = ScriptedTransport::new(vec![ok_body(b"hello")]);
    let client = ResilientHttpClient::new(transport.clone(), ConnectivityMonitor::new(true));

    let body = client
        .execute(HttpRequest::get("https://api.test/ok"))
        .await
        .unwrap();

    assert_eq!(body, b"hello");
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_server_errors_make_three_attempts_with_backoff() {
    let transport = ScriptedTransport::new(vec![status(500), status(503), status(500)]);
    let client = ResilientHttpClient::new(transport.clone(), ConnectivityMonitor::new(true));

    let started = tokio::time::Instant::now();
    let error = client
        .execute(HttpRequest::get("https://api.test/flaky"))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 3);
    assert!(matches!(error, NetworkError::Http { status: 500, .. }));

    // Backoff between attempts: 1s then 2s
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_retries_then_succeeds() {
    let transport = ScriptedTransport::new(vec![status(429), ok_body(b"late")]);
    let client = ResilientHttpClient::new(transport.clone(), ConnectivityMonitor::new(true));

    let body = client
        .execute(HttpRequest::get("https://api.test/limited"))
        .await
        .unwrap();

    assert_eq!(body, b"late");
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_not_found_fails_after_single_attempt() {
    let transport = ScriptedTransport::new(vec![status(404)]);
    let client = ResilientHttpClient::new(transport.clone(), ConnectivityMonitor::new(true));

    let error = client
        .execute(HttpRequest::get("https://api.test/missing"))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 1);
    assert!(matches!(error, NetworkError::Http { status: 404, .. }));
}

#[tokio::test]
async fn test_unauthorized_fails_without_retry() {
    let transport = ScriptedTransport::new(vec![status(401)]);
    let client = ResilientHttpClient::new(transport.clone(), ConnectivityMonitor::new(true));

    let error = client
        .execute(HttpRequest::get("https://api.test/private"))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 1);
    assert!(matches!(error, NetworkError::Http { status: 401, .. }));
}

#[tokio::test]
async fn test_timeout_fails_without_retry() {
    let transport = ScriptedTransport::new(vec![Err(TransportFailure::Timeout)]);
    let client = ResilientHttpClient::new(transport.clone(), ConnectivityMonitor::new(true));

    let error = client
        .execute(HttpRequest::get("https://api.test/slow"))
        .await
        .unwrap_err();

    assert_eq!(transport.calls(), 1);
    assert_eq!(error, NetworkError::Timeout);
}

#[tokio::test(start_paused = true)]
async fn test_offline_queues_and_fails_immediately() {
    let transport = ScriptedTransport::new(vec![]);
    let monitor = ConnectivityMonitor::new(false);
    let client = ResilientHttpClient::new(transport.clone(), monitor);

    let error = client
        .execute(HttpRequest::post("https://api.test/log", b"x".to_vec()))
        .await
        .unwrap_err();

    assert_eq!(error, NetworkError::Offline);
    assert_eq!(client.pending_count().await, 1);
    // No network attempt was made for the failing caller
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_drains_queue_exactly_once() {
    let transport = ScriptedTransport::new(vec![ok_body(b"")]);
    let monitor = ConnectivityMonitor::new(false);
    let client = ResilientHttpClient::new(transport.clone(), monitor.clone());

    let _ = client
        .execute(HttpRequest::post("https://api.test/log", b"x".to_vec()))
        .await;
    assert_eq!(client.pending_count().await, 1);

    monitor.set_connected(true);

    // Give the drain task a chance to run
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if client.pending_count().await == 0 {
            break;
        }
    }

    assert_eq!(client.pending_count().await, 0);
    assert_eq!(transport.calls(), 1, "replay attempts each request exactly once");
}

#[tokio::test(start_paused = true)]
async fn test_failed_replay_reenqueues_at_tail() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportFailure::Connection("still down".to_string())),
        status(500), // any HTTP status counts as attempted
    ]);
    let monitor = ConnectivityMonitor::new(false);
    let client = ResilientHttpClient::new(transport.clone(), monitor.clone());

    let _ = client
        .execute(HttpRequest::post("https://api.test/a", b"a".to_vec()))
        .await;
    let _ = client
        .execute(HttpRequest::post("https://api.test/b", b"b".to_vec()))
        .await;
    assert_eq!(client.pending_count().await, 2);

    monitor.set_connected(true);

    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if client.pending_count().await == 1 {
            break;
        }
    }

    // First request hit a transport failure and went back to the tail; the
    // second got a status code and left the queue.
    assert_eq!(client.pending_count().await, 1);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_queue_preserves_fifo_order() {
    let transport = ScriptedTransport::new(vec![]);
    let monitor = ConnectivityMonitor::new(false);
    let client = ResilientHttpClient::new(transport, monitor);

    for i in 0..5 {
        let _ = client
            .execute(HttpRequest::get(format!("https://api.test/{i}")))
            .await;
    }

    assert_eq!(client.pending_count().await, 5);
}
