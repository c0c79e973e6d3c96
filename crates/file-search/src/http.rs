// crates/file-search/src/http.rs
// Shared HTTP client for all network operations

use std::time::Duration;

/// Default request timeout (uploads of large files and generateContent calls)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for a whole completion lookup, including name resolution.
/// Much shorter than any real request so a slow backend never stalls the shell.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(2);

/// Create the shared HTTP client with appropriate defaults.
///
/// Created once per process and handed to the gateway. Uses connection
/// pooling internally.
pub fn create_shared_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(10)
        .user_agent(concat!("file-search/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_shared_client() {
        let client = create_shared_client();
        drop(client);
    }

    #[test]
    fn test_completion_timeout_is_short() {
        assert_eq!(COMPLETION_TIMEOUT, Duration::from_secs(2));
        assert!(COMPLETION_TIMEOUT < CONNECT_TIMEOUT);
        assert!(COMPLETION_TIMEOUT < DEFAULT_TIMEOUT);
    }
}
