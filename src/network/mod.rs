pub mod client;
pub mod monitor;
pub mod transport;

pub use client::{NetworkError, PendingRequest, ResilientHttpClient};
pub use monitor::ConnectivityMonitor;
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportFailure,
};
