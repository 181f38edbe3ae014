use std::sync::LazyLock;
use std::time::Duration;

/// User-Agent sent with every outbound request
pub const USER_AGENT: &str = concat!("warehouse-rs/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client, built on first access and reused for connection pooling.
///
/// Per-request timeouts can still be tightened with `RequestBuilder::timeout`.
///
/// # Example
/// ```ignore
/// use crate::external::client::HTTP_CLIENT;
///
/// let response = HTTP_CLIENT
///     .get("https://api.example.com/data")
///     .send()
///     .await?;
/// ```
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to build HTTP client")
});
