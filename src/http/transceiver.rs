use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout};
use tokio_native_tls::TlsConnector;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{HttpError, TransportError};
use crate::metrics::{RequestResult, Ticket};

use super::response::{ResponseSummary, read_response};
use super::target::Target;
use super::tls::build_connector;

/// Performs one timed request/response exchange per ticket.
#[async_trait]
pub trait Transceiver: Send + Sync {
    async fn send(&self, ticket: Ticket) -> RequestResult;
}

/// Opens a fresh connection per request and bounds the whole exchange
/// (dial, handshake, write and read) by a single deadline. When the deadline
/// passes the in-flight exchange is dropped, which closes its socket.
pub struct HttpTransceiver {
    target: Arc<Target>,
    timeout: Duration,
    tls: Option<TlsConnector>,
    request: Vec<u8>,
}

impl HttpTransceiver {
    /// # Errors
    ///
    /// Returns `TlsConnector` when an https target needs a TLS connector
    /// that cannot be built.
    pub fn new(target: Arc<Target>, timeout: Duration) -> Result<Self, HttpError> {
        let tls = build_connector(&target)?;
        let request = render_request(&target);
        Ok(Self {
            target,
            timeout,
            tls,
            request,
        })
    }

    async fn exchange(&self) -> Result<ResponseSummary, TransportError> {
        let addr = self
            .address()
            .await
            .map_err(|source| TransportError::Connect { source })?;
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| TransportError::Connect { source })?;
        drop(stream.set_nodelay(true));

        match &self.tls {
            Some(connector) => {
                let stream = connector
                    .connect(self.target.host(), stream)
                    .await
                    .map_err(|err| TransportError::Connect {
                        source: std::io::Error::other(err),
                    })?;
                transceive(stream, &self.request).await
            }
            None => transceive(stream, &self.request).await,
        }
    }

    async fn address(&self) -> std::io::Result<SocketAddr> {
        if let Some(addr) = self.target.resolved() {
            return Ok(addr);
        }
        let mut addrs =
            tokio::net::lookup_host((self.target.host(), self.target.port())).await?;
        addrs.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no addresses resolved for {}", self.target.authority()),
            )
        })
    }
}

#[async_trait]
impl Transceiver for HttpTransceiver {
    async fn send(&self, ticket: Ticket) -> RequestResult {
        let start = Instant::now();
        match timeout(self.timeout, self.exchange()).await {
            Ok(Ok(response)) => {
                let elapsed = start.elapsed();
                tracing::trace!(
                    "ticket {} -> {} ({} body bytes) in {:?}",
                    ticket.index(),
                    response.status,
                    response.body_bytes,
                    elapsed
                );
                RequestResult::success(ticket, elapsed, response.status)
            }
            Ok(Err(err @ TransportError::Connect { .. })) => {
                tracing::debug!("ticket {}: {}", ticket.index(), err);
                RequestResult::failure(ticket, Duration::ZERO, err)
            }
            Ok(Err(err)) => {
                tracing::debug!("ticket {}: {}", ticket.index(), err);
                RequestResult::failure(ticket, start.elapsed(), err)
            }
            Err(_elapsed) => {
                tracing::debug!(
                    "ticket {}: timed out after {:?}",
                    ticket.index(),
                    self.timeout
                );
                RequestResult::timeout(ticket, start.elapsed())
            }
        }
    }
}

async fn transceive<S>(mut stream: S, request: &[u8]) -> Result<ResponseSummary, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(request)
        .await
        .map_err(|source| TransportError::Write { source })?;
    stream
        .flush()
        .await
        .map_err(|source| TransportError::Write { source })?;

    let mut reader = BufReader::new(stream);
    let response = read_response(&mut reader)
        .await
        .map_err(|source| TransportError::Read { source })?;

    let mut stream = reader.into_inner();
    drop(stream.shutdown().await);
    Ok(response)
}

pub(super) fn render_request(target: &Target) -> Vec<u8> {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nConnection: close\r\n\r\n",
        target.request_target(),
        target.authority(),
        DEFAULT_USER_AGENT
    )
    .into_bytes()
}
