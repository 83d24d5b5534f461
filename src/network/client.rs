use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::monitor::ConnectivityMonitor;
use super::transport::{HttpRequest, HttpResponse, HttpTransport, TransportFailure};

/// Maximum total attempts for a retryable request (429 / 5xx)
const MAX_ATTEMPTS: u32 = 3;

/// Errors surfaced by [`ResilientHttpClient`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("network is unavailable")]
    Offline,

    #[error("request timeout")]
    Timeout,

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// A request captured while offline, awaiting replay on reconnect
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request: HttpRequest,
    pub enqueued_at: DateTime<Utc>,
}

/// Connectivity-aware HTTP client with retry, backoff, and an offline queue.
///
/// Requests issued while disconnected are queued and fail the caller
/// immediately; the queued copy is replayed fire-and-forget once
/// connectivity returns. Retryable statuses (429, 5xx) are attempted up to
/// three times with exponential backoff between attempts.
pub struct ResilientHttpClient {
    transport: Arc<dyn HttpTransport>,
    monitor: ConnectivityMonitor,
    offline_queue: Arc<RwLock<VecDeque<PendingRequest>>>,
    drain_task: JoinHandle<()>,
}

impl ResilientHttpClient {
    pub fn new(transport: Arc<dyn HttpTransport>, monitor: ConnectivityMonitor) -> Self {
        let offline_queue = Arc::new(RwLock::new(VecDeque::new()));

        let drain_task = tokio::spawn(Self::drain_on_reconnect(
            Arc::clone(&transport),
            monitor.subscribe(),
            Arc::clone(&offline_queue),
        ));

        Self {
            transport,
            monitor,
            offline_queue,
            drain_task,
        }
    }

    /// Execute a request, applying the offline and retry policies.
    ///
    /// Returns the raw response body on 2xx; the caller decodes it.
    pub async fn execute(&self, request: HttpRequest) -> Result<Vec<u8>, NetworkError> {
        if !self.monitor.is_connected() {
            let mut queue = self.offline_queue.write().await;
            queue.push_back(PendingRequest {
                request,
                enqueued_at: Utc::now(),
            });
            warn!("Offline: request queued ({} pending)", queue.len());
            return Err(NetworkError::Offline);
        }

        let mut attempt = 1;
        loop {
            let response = match self.transport.send(&request).await {
                Ok(response) => response,
                Err(TransportFailure::Timeout) => return Err(NetworkError::Timeout),
                Err(TransportFailure::Connection(detail)) => {
                    return Err(NetworkError::Transport(detail))
                }
            };

            match Self::classify(&response) {
                Disposition::Success => return Ok(response.body),
                Disposition::Fail(error) => return Err(error),
                Disposition::Retry(error) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(error);
                    }
                    let delay = Duration::from_secs(1 << (attempt - 1));
                    warn!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, MAX_ATTEMPTS, error, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// POST a JSON payload and decode a JSON response
    pub async fn post_json<B, T>(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &B,
    ) -> Result<T, NetworkError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let payload =
            serde_json::to_vec(body).map_err(|e| NetworkError::Decode(e.to_string()))?;

        let mut request = HttpRequest::post(url, payload);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let bytes = self.execute(request).await?;
        serde_json::from_slice(&bytes).map_err(|e| NetworkError::Decode(e.to_string()))
    }

    /// GET and decode a JSON response
    pub async fn get_json<T>(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<T, NetworkError>
    where
        T: DeserializeOwned,
    {
        let mut request = HttpRequest::get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let bytes = self.execute(request).await?;
        serde_json::from_slice(&bytes).map_err(|e| NetworkError::Decode(e.to_string()))
    }

    /// Current reachability status
    pub fn is_connected(&self) -> bool {
        self.monitor.is_connected()
    }

    /// Number of requests waiting for replay
    pub async fn pending_count(&self) -> usize {
        self.offline_queue.read().await.len()
    }

    fn classify(response: &HttpResponse) -> Disposition {
        match response.status {
            _ if response.is_success() => Disposition::Success,
            401 => Disposition::Fail(NetworkError::Http {
                status: 401,
                message: "Unauthorized".to_string(),
            }),
            429 => Disposition::Retry(NetworkError::Http {
                status: 429,
                message: "Rate limited".to_string(),
            }),
            s if (500..600).contains(&s) => Disposition::Retry(NetworkError::Http {
                status: s,
                message: "Server error".to_string(),
            }),
            s => Disposition::Fail(NetworkError::Http {
                status: s,
                message: "HTTP error".to_string(),
            }),
        }
    }

    /// Replay queued requests each time connectivity returns.
    ///
    /// Each draining pass takes a FIFO snapshot of the queue, attempts every
    /// request exactly once, and re-enqueues failures at the tail. A request
    /// counts as attempted once any HTTP status comes back; only transport
    /// failures re-enqueue.
    async fn drain_on_reconnect(
        transport: Arc<dyn HttpTransport>,
        mut connectivity: tokio::sync::watch::Receiver<bool>,
        queue: Arc<RwLock<VecDeque<PendingRequest>>>,
    ) {
        while connectivity.changed().await.is_ok() {
            if !*connectivity.borrow() {
                continue;
            }

            let snapshot: Vec<PendingRequest> = {
                let mut guard = queue.write().await;
                guard.drain(..).collect()
            };

            if snapshot.is_empty() {
                continue;
            }

            info!("Connectivity restored: replaying {} queued requests", snapshot.len());

            for pending in snapshot {
                match transport.send(&pending.request).await {
                    Ok(response) => {
                        info!(
                            "Replayed queued {} {} (status {})",
                            pending.request.method.as_str(),
                            pending.request.url,
                            response.status
                        );
                    }
                    Err(failure) => {
                        warn!(
                            "Replay of queued {} {} failed: {}",
                            pending.request.method.as_str(),
                            pending.request.url,
                            failure
                        );
                        queue.write().await.push_back(pending);
                    }
                }
            }
        }
    }
}

impl Drop for ResilientHttpClient {
    fn drop(&mut self) {
        self.drain_task.abort();
    }
}

enum Disposition {
    Success,
    Fail(NetworkError),
    Retry(NetworkError),
}
