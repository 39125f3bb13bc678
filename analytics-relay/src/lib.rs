//! Query relay to the external OLAP engine
//!
//! The upstream protocol is line-delimited on the way in and
//! close-delimited on the way out: the relay writes a single query line,
//! then reads until the peer closes the connection. Each call owns its own
//! connection; there is no pooling, retrying, or multiplexing, and the
//! relay never interprets the response body — an OLAP-level error text is
//! a successful relay call.
//!
//! Two guards harden the close-delimited read against a misbehaving
//! upstream: the whole call runs under a deadline, and the accumulated
//! response is capped in size.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Relay failure, distinguishable from an error body returned by the
/// engine itself (which the relay passes through as a success).
#[derive(Error, Debug)]
pub enum RelayError {
    /// Engine unreachable, or the connection failed mid-call
    #[error("OLAP engine unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    /// Engine response was not valid UTF-8
    #[error("OLAP engine response is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// No end-of-stream within the configured deadline
    #[error("OLAP engine did not complete the response within {0:?}")]
    Timeout(Duration),

    /// Response exceeded the configured size cap before the peer closed
    #[error("OLAP engine response exceeded {0} bytes")]
    ResponseTooLarge(usize),
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
const READ_CHUNK: usize = 64 * 1024;

/// Stateless client for the OLAP engine
///
/// Cheap to clone; holds only configuration, never a connection.
#[derive(Debug, Clone)]
pub struct RelayClient {
    addr: SocketAddr,
    timeout: Duration,
    max_response_bytes: usize,
}

impl RelayClient {
    pub fn new(addr: SocketAddr) -> Self {
        RelayClient {
            addr,
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// Set the whole-call deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the response size cap
    pub fn with_max_response_bytes(mut self, max: usize) -> Self {
        self.max_response_bytes = max;
        self
    }

    /// Address of the upstream engine
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Forward one query and return the engine's raw text response.
    ///
    /// Opens a fresh connection, writes `query` terminated by `\r\n`, reads
    /// until the peer closes the connection, and decodes the bytes as
    /// UTF-8. End-of-stream is the only end-of-response signal.
    pub async fn relay(&self, query: &str) -> Result<String> {
        tokio::time::timeout(self.timeout, self.relay_inner(query))
            .await
            .map_err(|_| RelayError::Timeout(self.timeout))?
    }

    async fn relay_inner(&self, query: &str) -> Result<String> {
        debug!(addr = %self.addr, query_len = query.len(), "relaying query");

        let mut stream = TcpStream::connect(self.addr).await?;
        stream.write_all(query.as_bytes()).await?;
        stream.write_all(b"\r\n").await?;
        stream.flush().await?;

        let mut response = Vec::new();
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            if response.len() + n > self.max_response_bytes {
                return Err(RelayError::ResponseTooLarge(self.max_response_bytes));
            }
            response.extend_from_slice(&chunk[..n]);
        }

        debug!(response_len = response.len(), "relay response complete");
        Ok(String::from_utf8(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Stub OLAP engine: accepts one connection, reads the query line,
    /// writes `response`, then closes.
    async fn stub_engine(response: &'static [u8]) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            assert!(buf[..n].ends_with(b"\r\n"));
            socket.write_all(response).await.unwrap();
            // Dropping the socket closes the connection, which is the
            // end-of-response signal.
        });
        addr
    }

    #[tokio::test]
    async fn relays_query_and_returns_response_text() {
        let addr = stub_engine(b"{\"result\":[]}").await;
        let client = RelayClient::new(addr);

        let response = client.relay("SELECT * FROM cube").await.unwrap();
        assert_eq!(response, "{\"result\":[]}");
    }

    #[tokio::test]
    async fn response_split_across_writes_is_accumulated() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(b"{\"result\":").await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            socket.write_all(b"[1,2,3]}").await.unwrap();
        });

        let client = RelayClient::new(addr);
        let response = client.relay("q").await.unwrap();
        assert_eq!(response, "{\"result\":[1,2,3]}");
    }

    #[tokio::test]
    async fn connection_refused_is_unavailable() {
        // Bind then drop to get a port with no listener
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RelayClient::new(addr);
        assert!(matches!(
            client.relay("q").await,
            Err(RelayError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn invalid_utf8_is_decode_error() {
        let addr = stub_engine(&[0xff, 0xfe, 0xfd]).await;
        let client = RelayClient::new(addr);
        assert!(matches!(client.relay("q").await, Err(RelayError::Decode(_))));
    }

    #[tokio::test]
    async fn stalled_upstream_hits_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            // Never respond, never close
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let client = RelayClient::new(addr).with_timeout(Duration::from_millis(100));
        assert!(matches!(
            client.relay("q").await,
            Err(RelayError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn oversized_response_hits_cap() {
        let addr = stub_engine(&[b'x'; 4096]).await;
        let client = RelayClient::new(addr).with_max_response_bytes(1024);
        assert!(matches!(
            client.relay("q").await,
            Err(RelayError::ResponseTooLarge(1024))
        ));
    }
}
