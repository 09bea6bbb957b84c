pub mod compatible;
pub mod response;
pub mod traits;

pub use compatible::CompatibleProvider;
pub use response::{ContentBlock, MessageRole, ProviderMessage, ProviderResponse, StopReason};
pub use traits::Provider;

use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client for chat backends, tuned for long completions over a
/// warm connection pool.
pub fn build_provider_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
