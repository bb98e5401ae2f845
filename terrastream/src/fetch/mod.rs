//! Fetch transport seam between the cache and the network.
//!
//! The cache owns the receiving half of a completion channel and hands a
//! [`FetchCompletion`] to the transport with every request. Workers only
//! send replies; the cache applies them on its own thread the next time it
//! is read or pumped, so state transitions never race with `read`.

mod http;

pub use http::{AsyncHttpClient, HttpFetcher, ReqwestHttpClient};

use bytes::Bytes;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

/// Transport-level failure reported through a completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Request could not be sent or timed out.
    #[error("request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The worker was dropped before it reported a result.
    #[error("fetch abandoned before completion")]
    Dropped,
}

/// One finished fetch, as received by the cache.
#[derive(Debug, Clone)]
pub struct FetchReply {
    pub name: String,
    pub result: Result<Bytes, FetchError>,
}

/// Sending half of the completion channel, cloned into every fetch.
#[derive(Debug, Clone)]
pub struct FetchCompletion {
    tx: Sender<FetchReply>,
}

impl FetchCompletion {
    /// Report the outcome of fetching `name`.
    ///
    /// Silently ignored if the owning cache has been dropped.
    pub fn complete(&self, name: &str, result: Result<Vec<u8>, FetchError>) {
        let reply = FetchReply {
            name: name.to_string(),
            result: result.map(Bytes::from),
        };
        let _ = self.tx.send(reply);
    }
}

/// Create a completion channel.
pub fn completion_channel() -> (FetchCompletion, Receiver<FetchReply>) {
    let (tx, rx) = mpsc::channel();
    (FetchCompletion { tx }, rx)
}

/// Asynchronous transport for network resource names.
///
/// `fetch` must return promptly; the result is delivered later through
/// `completion`, exactly once per call.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, name: &str, completion: FetchCompletion);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_delivers_reply() {
        let (completion, rx) = completion_channel();
        completion.complete("https://h/a", Ok(vec![1, 2, 3]));

        let reply = rx.try_recv().unwrap();
        assert_eq!(reply.name, "https://h/a");
        assert_eq!(reply.result.unwrap(), Bytes::from_static(&[1, 2, 3]));
    }

    #[test]
    fn test_completion_after_receiver_dropped_is_ignored() {
        let (completion, rx) = completion_channel();
        drop(rx);
        completion.complete("https://h/a", Err(FetchError::Dropped));
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::Status {
            url: "https://h/a".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404 from https://h/a");
    }
}
