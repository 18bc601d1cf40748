use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::response::{ResponseSummary, read_response};
use super::transceiver::render_request;
use super::*;
use crate::args::ResolveStrategy;
use crate::error::{AppError, AppResult, ResponseError, TransportError, ValidationError};
use crate::metrics::{Outcome, Ticket};

const TEST_TIMEOUT: Duration = Duration::from_secs(2);

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

enum MockReply {
    Bytes(&'static [u8]),
    Silent,
}

/// Accepts `connections` clients, reads each request head, then answers
/// according to `reply`. Returns the first request head seen.
async fn spawn_mock_server(
    connections: usize,
    reply: MockReply,
) -> AppResult<(SocketAddr, JoinHandle<AppResult<Vec<u8>>>)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| AppError::validation(format!("Failed to bind mock server: {}", err)))?;
    let addr = listener
        .local_addr()
        .map_err(|err| AppError::validation(format!("Failed to read mock addr: {}", err)))?;

    let task = tokio::spawn(async move {
        let mut first_request = Vec::new();
        let mut held = Vec::new();
        for index in 0..connections {
            let (mut stream, _) = timeout(TEST_TIMEOUT, listener.accept())
                .await
                .map_err(|_err| AppError::validation("Mock accept timed out"))?
                .map_err(|err| AppError::validation(format!("Mock accept failed: {}", err)))?;
            let mut request = Vec::with_capacity(1024);
            loop {
                let mut chunk = [0_u8; 1024];
                let read = timeout(TEST_TIMEOUT, stream.read(&mut chunk))
                    .await
                    .map_err(|_err| AppError::validation("Mock read timed out"))?
                    .map_err(|err| AppError::validation(format!("Mock read failed: {}", err)))?;
                if read == 0 {
                    break;
                }
                let prefix = chunk
                    .get(..read)
                    .ok_or_else(|| AppError::validation("Mock read buffer out of range"))?;
                request.extend_from_slice(prefix);
                if request.windows(4).any(|bytes| bytes == b"\r\n\r\n") {
                    break;
                }
            }
            if index == 0 {
                first_request = request;
            }

            match reply {
                MockReply::Bytes(response) => {
                    stream.write_all(response).await.map_err(|err| {
                        AppError::validation(format!("Mock write failed: {}", err))
                    })?;
                    drop(stream.shutdown().await);
                }
                MockReply::Silent => held.push(stream),
            }
        }
        if !held.is_empty() {
            tokio::time::sleep(TEST_TIMEOUT).await;
        }
        Ok(first_request)
    });
    Ok((addr, task))
}

async fn closed_port() -> AppResult<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| AppError::validation(format!("Failed to bind: {}", err)))?;
    let addr = listener
        .local_addr()
        .map_err(|err| AppError::validation(format!("Failed to read addr: {}", err)))?;
    drop(listener);
    Ok(addr)
}

fn transceiver_for(addr: SocketAddr, path: &str, timeout_ms: u64) -> AppResult<HttpTransceiver> {
    let target = Target::parse(&format!("http://{}{}", addr, path))?.with_resolved(addr);
    Ok(HttpTransceiver::new(
        Arc::new(target),
        Duration::from_millis(timeout_ms),
    )?)
}

async fn parse_bytes(raw: &[u8]) -> Result<ResponseSummary, ResponseError> {
    let mut reader = raw;
    read_response(&mut reader).await
}

#[test]
fn http_target_defaults_to_port_80() -> AppResult<()> {
    let target = Target::parse("http://example.com")?;
    if target.port() != 80 || target.scheme() != Scheme::Http {
        return Err(AppError::validation("Expected http on port 80"));
    }
    if target.authority() != "example.com" || target.request_target() != "/" {
        return Err(AppError::validation("Unexpected authority or path"));
    }
    if target.resolved().is_some() {
        return Err(AppError::validation("Parse must not resolve"));
    }
    Ok(())
}

#[test]
fn https_target_defaults_to_port_443() -> AppResult<()> {
    let target = Target::parse("https://example.com/status")?;
    if target.port() != 443 || target.scheme() != Scheme::Https {
        return Err(AppError::validation("Expected https on port 443"));
    }
    Ok(())
}

#[test]
fn explicit_port_is_kept_in_authority() -> AppResult<()> {
    let target = Target::parse("http://example.com:8080/api?x=1&y=2")?;
    if target.port() != 8080 {
        return Err(AppError::validation("Expected port 8080"));
    }
    if target.authority() != "example.com:8080" {
        return Err(AppError::validation(format!(
            "Unexpected authority {}",
            target.authority()
        )));
    }
    if target.request_target() != "/api?x=1&y=2" {
        return Err(AppError::validation(format!(
            "Unexpected request target {}",
            target.request_target()
        )));
    }
    Ok(())
}

#[test]
fn ipv6_host_is_bracketed_in_authority_only() -> AppResult<()> {
    let target = Target::parse("http://[::1]:3000/")?;
    if target.host() != "::1" || target.authority() != "[::1]:3000" {
        return Err(AppError::validation(format!(
            "Unexpected host/authority {} / {}",
            target.host(),
            target.authority()
        )));
    }
    Ok(())
}

#[test]
fn url_without_scheme_is_rejected() -> AppResult<()> {
    match Target::parse("example.com") {
        Err(ValidationError::InvalidUrl { .. } | ValidationError::UnsupportedScheme { .. }) => {}
        other => {
            return Err(AppError::validation(format!(
                "Expected InvalidUrl, got {:?}",
                other
            )));
        }
    }
    match Target::parse("localhost:8080") {
        Err(ValidationError::InvalidUrl { .. } | ValidationError::UnsupportedScheme { .. }) => {}
        other => {
            return Err(AppError::validation(format!(
                "Expected rejection, got {:?}",
                other
            )));
        }
    }
    Ok(())
}

#[test]
fn unsupported_scheme_is_rejected() -> AppResult<()> {
    match Target::parse("ftp://example.com/file") {
        Err(ValidationError::UnsupportedScheme { scheme }) if scheme == "ftp" => Ok(()),
        other => Err(AppError::validation(format!(
            "Expected UnsupportedScheme, got {:?}",
            other
        ))),
    }
}

#[test]
fn url_without_host_is_rejected() -> AppResult<()> {
    if Target::parse("http://").is_ok() {
        return Err(AppError::validation("Expected empty host to be rejected"));
    }
    Ok(())
}

#[test]
fn resolve_once_caches_address() -> AppResult<()> {
    let target = Target::resolve("http://127.0.0.1:9/", ResolveStrategy::Once)?;
    let expected: SocketAddr = "127.0.0.1:9"
        .parse()
        .map_err(|_err| AppError::validation("bad test addr"))?;
    if target.resolved() != Some(expected) {
        return Err(AppError::validation(format!(
            "Unexpected resolved address {:?}",
            target.resolved()
        )));
    }
    Ok(())
}

#[test]
fn resolve_per_request_defers_lookup() -> AppResult<()> {
    let target = Target::resolve("http://127.0.0.1:9/", ResolveStrategy::PerRequest)?;
    if target.resolved().is_some() {
        return Err(AppError::validation("Per-request strategy must not resolve"));
    }
    Ok(())
}

#[test]
fn resolve_failure_is_run_level() -> AppResult<()> {
    match Target::resolve("http://volley-test.invalid/", ResolveStrategy::Once) {
        Err(AppError::Http(_)) => Ok(()),
        other => Err(AppError::validation(format!(
            "Expected DNS failure, got {:?}",
            other
        ))),
    }
}

#[test]
fn request_has_request_line_and_host() -> AppResult<()> {
    let target = Target::parse("http://example.com:8080/a/b?c=d")?;
    let request = String::from_utf8(render_request(&target))
        .map_err(|err| AppError::validation(format!("Request not UTF-8: {}", err)))?;
    if !request.starts_with("GET /a/b?c=d HTTP/1.1\r\nHost: example.com:8080\r\n") {
        return Err(AppError::validation(format!("Unexpected request: {}", request)));
    }
    if !request.ends_with("\r\n\r\n") {
        return Err(AppError::validation("Request head not terminated"));
    }
    Ok(())
}

#[test]
fn response_with_content_length() -> AppResult<()> {
    run_async_test(async {
        let summary = parse_bytes(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello")
            .await
            .map_err(|err| AppError::validation(err.to_string()))?;
        if summary.status != StatusCode::OK || summary.body_bytes != 5 {
            return Err(AppError::validation(format!("Unexpected {:?}", summary)));
        }
        Ok(())
    })
}

#[test]
fn response_with_chunked_body() -> AppResult<()> {
    run_async_test(async {
        let raw = b"HTTP/1.1 500 Internal Server Error\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n6;ext=1\r\npedia \r\n0\r\nX-Trailer: yes\r\n\r\n";
        let summary = parse_bytes(raw)
            .await
            .map_err(|err| AppError::validation(err.to_string()))?;
        if summary.status != StatusCode::INTERNAL_SERVER_ERROR || summary.body_bytes != 10 {
            return Err(AppError::validation(format!("Unexpected {:?}", summary)));
        }
        Ok(())
    })
}

#[test]
fn response_body_until_eof() -> AppResult<()> {
    run_async_test(async {
        let summary = parse_bytes(b"HTTP/1.0 200 OK\r\nServer: test\r\n\r\nabcdef")
            .await
            .map_err(|err| AppError::validation(err.to_string()))?;
        if summary.body_bytes != 6 {
            return Err(AppError::validation(format!("Unexpected {:?}", summary)));
        }
        Ok(())
    })
}

#[test]
fn no_content_and_interim_responses() -> AppResult<()> {
    run_async_test(async {
        let raw = b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 204 No Content\r\nContent-Length: 10\r\n\r\n";
        let summary = parse_bytes(raw)
            .await
            .map_err(|err| AppError::validation(err.to_string()))?;
        if summary.status != StatusCode::NO_CONTENT || summary.body_bytes != 0 {
            return Err(AppError::validation(format!("Unexpected {:?}", summary)));
        }
        Ok(())
    })
}

#[test]
fn truncated_body_is_an_error() -> AppResult<()> {
    run_async_test(async {
        match parse_bytes(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort").await {
            Err(ResponseError::UnexpectedEof) => Ok(()),
            other => Err(AppError::validation(format!(
                "Expected UnexpectedEof, got {:?}",
                other
            ))),
        }
    })
}

#[test]
fn malformed_status_line_is_an_error() -> AppResult<()> {
    run_async_test(async {
        match parse_bytes(b"SSH-2.0-OpenSSH_9.0\r\n\r\n").await {
            Err(ResponseError::MalformedStatusLine { .. }) => {}
            other => {
                return Err(AppError::validation(format!(
                    "Expected MalformedStatusLine, got {:?}",
                    other
                )));
            }
        }
        match parse_bytes(b"").await {
            Err(ResponseError::UnexpectedEof) => Ok(()),
            other => Err(AppError::validation(format!(
                "Expected UnexpectedEof, got {:?}",
                other
            ))),
        }
    })
}

#[test]
fn transceiver_success_against_mock_server() -> AppResult<()> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server(
            1,
            MockReply::Bytes(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"),
        )
        .await?;
        let transceiver = transceiver_for(addr, "/ping", 1000)?;

        let result = transceiver.send(Ticket::new(7)).await;
        if !matches!(result.outcome, Outcome::Success { status } if status == StatusCode::OK) {
            return Err(AppError::validation(format!(
                "Expected success, got {:?}",
                result.outcome
            )));
        }
        if result.ticket != Ticket::new(7) {
            return Err(AppError::validation("Ticket not carried through"));
        }

        let request = server.await??;
        if !request.starts_with(b"GET /ping HTTP/1.1\r\n") {
            return Err(AppError::validation(format!(
                "Unexpected request: {}",
                String::from_utf8_lossy(&request)
            )));
        }
        Ok(())
    })
}

#[test]
fn silent_peer_times_out_near_deadline() -> AppResult<()> {
    run_async_test(async {
        let (addr, _server) = spawn_mock_server(1, MockReply::Silent).await?;
        let transceiver = transceiver_for(addr, "/", 150)?;

        let result = transceiver.send(Ticket::new(0)).await;
        if !matches!(result.outcome, Outcome::Timeout) {
            return Err(AppError::validation(format!(
                "Expected timeout, got {:?}",
                result.outcome
            )));
        }
        if result.elapsed < Duration::from_millis(150) || result.elapsed > Duration::from_secs(1)
        {
            return Err(AppError::validation(format!(
                "Elapsed {:?} not near the 150ms deadline",
                result.elapsed
            )));
        }
        Ok(())
    })
}

#[test]
fn timed_out_exchange_closes_its_connection() -> AppResult<()> {
    run_async_test(async {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| AppError::validation(format!("Failed to bind: {}", err)))?;
        let addr = listener
            .local_addr()
            .map_err(|err| AppError::validation(format!("Failed to read addr: {}", err)))?;

        // Never answers; keeps reading until the client side goes away.
        let server = tokio::spawn(async move {
            let (mut stream, _) = timeout(TEST_TIMEOUT, listener.accept())
                .await
                .map_err(|_err| AppError::validation("Accept timed out"))?
                .map_err(|err| AppError::validation(format!("Accept failed: {}", err)))?;
            let accepted = tokio::time::Instant::now();
            let mut chunk = [0_u8; 1024];
            loop {
                let read = timeout(TEST_TIMEOUT, stream.read(&mut chunk))
                    .await
                    .map_err(|_err| AppError::validation("Connection left open"))?
                    .map_err(|err| AppError::validation(format!("Read failed: {}", err)))?;
                if read == 0 {
                    return Ok::<Duration, AppError>(accepted.elapsed());
                }
            }
        });

        let transceiver = transceiver_for(addr, "/", 150)?;
        let result = transceiver.send(Ticket::new(0)).await;
        if !result.outcome.is_timeout() {
            return Err(AppError::validation(format!(
                "Expected timeout, got {:?}",
                result.outcome
            )));
        }

        let closed_after = server.await??;
        if closed_after < Duration::from_millis(100) || closed_after > Duration::from_secs(1) {
            return Err(AppError::validation(format!(
                "Peer saw EOF after {:?}, expected shortly after the 150ms deadline",
                closed_after
            )));
        }
        Ok(())
    })
}

#[test]
fn refused_connection_is_connect_failure_with_zero_elapsed() -> AppResult<()> {
    run_async_test(async {
        let addr = closed_port().await?;
        let transceiver = transceiver_for(addr, "/", 1000)?;

        let result = transceiver.send(Ticket::new(1)).await;
        if !matches!(
            result.outcome,
            Outcome::Failure(TransportError::Connect { .. })
        ) {
            return Err(AppError::validation(format!(
                "Expected connect failure, got {:?}",
                result.outcome
            )));
        }
        if result.elapsed != Duration::ZERO {
            return Err(AppError::validation("Connect failure must record zero elapsed"));
        }
        Ok(())
    })
}

#[test]
fn garbage_response_is_read_failure() -> AppResult<()> {
    run_async_test(async {
        let (addr, _server) =
            spawn_mock_server(1, MockReply::Bytes(b"not http at all\r\n\r\n")).await?;
        let transceiver = transceiver_for(addr, "/", 1000)?;

        let result = transceiver.send(Ticket::new(2)).await;
        if !matches!(result.outcome, Outcome::Failure(TransportError::Read { .. })) {
            return Err(AppError::validation(format!(
                "Expected read failure, got {:?}",
                result.outcome
            )));
        }
        Ok(())
    })
}

#[test]
fn per_request_resolution_reaches_server() -> AppResult<()> {
    run_async_test(async {
        let (addr, server) = spawn_mock_server(
            1,
            MockReply::Bytes(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n"),
        )
        .await?;
        let target = Target::resolve(&format!("http://{}/", addr), ResolveStrategy::PerRequest)?;
        let transceiver = HttpTransceiver::new(Arc::new(target), Duration::from_secs(1))?;

        let result = transceiver.send(Ticket::new(0)).await;
        if !result.outcome.is_success() {
            return Err(AppError::validation(format!(
                "Expected success, got {:?}",
                result.outcome
            )));
        }
        server.await??;
        Ok(())
    })
}
