use http::StatusCode;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::ResponseError;

const MAX_HEADER_LINES: usize = 100;
const MAX_LINE_BYTES: u64 = 16 * 1024;

/// What was learned from a fully consumed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResponseSummary {
    pub(crate) status: StatusCode,
    pub(crate) body_bytes: u64,
}

enum BodyFraming {
    Chunked,
    Length(u64),
    UntilEof,
}

/// Reads one complete HTTP/1.x response: status line, headers and body.
/// Interim 1xx responses are skipped.
pub(crate) async fn read_response<R>(reader: &mut R) -> Result<ResponseSummary, ResponseError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let status = read_status_line(reader).await?;
        let framing = read_headers(reader).await?;
        if status.is_informational() {
            continue;
        }

        let body_bytes = if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED
        {
            0
        } else {
            match framing {
                BodyFraming::Chunked => read_chunked_body(reader).await?,
                BodyFraming::Length(length) => discard_exact(reader, length).await?,
                BodyFraming::UntilEof => tokio::io::copy(reader, &mut tokio::io::sink()).await?,
            }
        };

        return Ok(ResponseSummary { status, body_bytes });
    }
}

async fn read_status_line<R>(reader: &mut R) -> Result<StatusCode, ResponseError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_line(reader).await?;
    let Some((version, rest)) = line.split_once(' ') else {
        return Err(ResponseError::MalformedStatusLine { line });
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ResponseError::MalformedStatusLine { line });
    }
    let code = rest.split(' ').next().unwrap_or_default();
    if code.len() != 3 {
        return Err(ResponseError::MalformedStatusLine { line });
    }
    StatusCode::from_bytes(code.as_bytes()).map_err(|source| ResponseError::InvalidStatusCode {
        line: line.clone(),
        source,
    })
}

async fn read_headers<R>(reader: &mut R) -> Result<BodyFraming, ResponseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut chunked = false;
    let mut content_length = None;

    for _ in 0..MAX_HEADER_LINES {
        let line = read_line(reader).await?;
        if line.is_empty() {
            if chunked {
                return Ok(BodyFraming::Chunked);
            }
            return Ok(content_length.map_or(BodyFraming::UntilEof, BodyFraming::Length));
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(ResponseError::MalformedHeader { line });
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            let length = value
                .parse::<u64>()
                .map_err(|source| ResponseError::InvalidContentLength {
                    value: value.to_owned(),
                    source,
                })?;
            content_length = Some(length);
        } else if name.eq_ignore_ascii_case("transfer-encoding")
            && value.to_ascii_lowercase().contains("chunked")
        {
            chunked = true;
        }
    }

    Err(ResponseError::TooManyHeaders {
        max: MAX_HEADER_LINES,
    })
}

async fn read_chunked_body<R>(reader: &mut R) -> Result<u64, ResponseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut total: u64 = 0;
    loop {
        let line = read_line(reader).await?;
        let size_text = line.split(';').next().unwrap_or_default().trim();
        let size = u64::from_str_radix(size_text, 16).map_err(|source| {
            ResponseError::InvalidChunkSize {
                line: line.clone(),
                source,
            }
        })?;

        if size == 0 {
            // trailers
            loop {
                if read_line(reader).await?.is_empty() {
                    return Ok(total);
                }
            }
        }

        total = total.saturating_add(discard_exact(reader, size).await?);
        let terminator = read_line(reader).await?;
        if !terminator.is_empty() {
            return Err(ResponseError::MalformedChunk { line: terminator });
        }
    }
}

async fn discard_exact<R>(reader: &mut R, length: u64) -> Result<u64, ResponseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut limited = (&mut *reader).take(length);
    let copied = tokio::io::copy(&mut limited, &mut tokio::io::sink()).await?;
    if copied < length {
        return Err(ResponseError::UnexpectedEof);
    }
    Ok(copied)
}

async fn read_line<R>(reader: &mut R) -> Result<String, ResponseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_BYTES)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Err(ResponseError::UnexpectedEof);
    }
    if buf.last() != Some(&b'\n') {
        if u64::try_from(read).unwrap_or(u64::MAX) >= MAX_LINE_BYTES {
            return Err(ResponseError::LineTooLong {
                max: MAX_LINE_BYTES,
            });
        }
        return Err(ResponseError::UnexpectedEof);
    }
    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
