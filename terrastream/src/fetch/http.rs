//! HTTP transport built on reqwest and a tokio runtime.

use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use super::{FetchCompletion, FetchError, Fetcher};
use crate::config::DownloadConfig;

/// Asynchronous HTTP GET, abstracted for testing.
pub trait AsyncHttpClient: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Async HTTP client using reqwest.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a client with the configured timeout, user agent and
    /// Accept-Language header.
    pub fn new(config: &DownloadConfig) -> Result<Self, FetchError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let language = reqwest::header::HeaderValue::from_str(config.accept_language())
            .map_err(|e| FetchError::Http(format!("invalid Accept-Language: {}", e)))?;
        headers.insert(reqwest::header::ACCEPT_LANGUAGE, language);

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .default_headers(headers)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(FetchError::Http(e.to_string()));
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(url = url, status = status, "HTTP error status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(FetchError::Body(e.to_string()))
            }
        }
    }
}

/// Reports `Dropped` if the task is torn down before it completes, so the
/// cache never waits forever on an outstanding slot.
struct CompletionGuard {
    name: String,
    completion: Option<FetchCompletion>,
}

impl CompletionGuard {
    fn finish(mut self, result: Result<Vec<u8>, FetchError>) {
        if let Some(completion) = self.completion.take() {
            completion.complete(&self.name, result);
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(completion) = self.completion.take() {
            completion.complete(&self.name, Err(FetchError::Dropped));
        }
    }
}

/// [`Fetcher`] that runs each request as a task on a tokio runtime.
pub struct HttpFetcher<C> {
    client: Arc<C>,
    runtime: Handle,
}

impl<C: AsyncHttpClient + 'static> HttpFetcher<C> {
    pub fn new(client: C, runtime: Handle) -> Self {
        Self {
            client: Arc::new(client),
            runtime,
        }
    }
}

impl<C: AsyncHttpClient + 'static> Fetcher for HttpFetcher<C> {
    fn fetch(&self, name: &str, completion: FetchCompletion) {
        let client = Arc::clone(&self.client);
        let guard = CompletionGuard {
            name: name.to_string(),
            completion: Some(completion),
        };

        self.runtime.spawn(async move {
            let result = client.get(&guard.name).await;
            guard.finish(result);
        });
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::fetch::completion_channel;
    use std::time::Duration;

    /// Mock async HTTP client for testing
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        pub response: Result<Vec<u8>, FetchError>,
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn test_mock_async_client_success() {
        let client = MockAsyncHttpClient {
            response: Ok(vec![1, 2, 3]),
        };
        assert_eq!(client.get("https://h/a").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_mock_async_client_failure() {
        let client = MockAsyncHttpClient {
            response: Err(FetchError::Status {
                url: "https://h/a".to_string(),
                status: 503,
            }),
        };
        assert!(matches!(
            client.get("https://h/a").await,
            Err(FetchError::Status { status: 503, .. })
        ));
    }

    #[test]
    fn test_http_fetcher_reports_through_completion() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let fetcher = HttpFetcher::new(
            MockAsyncHttpClient {
                response: Ok(b"payload".to_vec()),
            },
            runtime.handle().clone(),
        );
        let (completion, rx) = completion_channel();

        fetcher.fetch("https://h/tile.bin", completion);

        let reply = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(reply.name, "https://h/tile.bin");
        assert_eq!(&reply.result.unwrap()[..], b"payload");
    }

    #[test]
    fn test_http_fetcher_reports_failure() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let fetcher = HttpFetcher::new(
            MockAsyncHttpClient {
                response: Err(FetchError::Http("connection refused".to_string())),
            },
            runtime.handle().clone(),
        );
        let (completion, rx) = completion_channel();

        fetcher.fetch("https://h/x", completion);

        let reply = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(
            reply.result.unwrap_err(),
            FetchError::Http("connection refused".to_string())
        );
    }

    #[test]
    fn test_guard_reports_dropped() {
        let (completion, rx) = completion_channel();
        let guard = CompletionGuard {
            name: "https://h/y".to_string(),
            completion: Some(completion),
        };
        drop(guard);

        let reply = rx.try_recv().unwrap();
        assert_eq!(reply.result.unwrap_err(), FetchError::Dropped);
    }

    #[test]
    fn test_reqwest_client_builds_from_config() {
        assert!(ReqwestHttpClient::new(&DownloadConfig::default()).is_ok());
    }

    #[test]
    fn test_reqwest_client_rejects_bad_header() {
        let config = DownloadConfig::default().with_accept_language("bad\nvalue");
        assert!(ReqwestHttpClient::new(&config).is_err());
    }
}
