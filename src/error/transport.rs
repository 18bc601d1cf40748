use thiserror::Error;

/// Per-request failure. Recorded on the request's result and counted in the
/// failure tally; it never aborts the worker pool.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {source}")]
    Connect {
        #[source]
        source: std::io::Error,
    },
    #[error("write failed: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },
    #[error("read failed: {source}")]
    Read {
        #[source]
        source: ResponseError,
    },
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("connection closed before the response was complete")]
    UnexpectedEof,
    #[error("malformed status line '{line}'")]
    MalformedStatusLine { line: String },
    #[error("invalid status code in '{line}': {source}")]
    InvalidStatusCode {
        line: String,
        #[source]
        source: http::status::InvalidStatusCode,
    },
    #[error("malformed header line '{line}'")]
    MalformedHeader { line: String },
    #[error("response line longer than {max} bytes")]
    LineTooLong { max: u64 },
    #[error("response has more than {max} header lines")]
    TooManyHeaders { max: usize },
    #[error("invalid Content-Length '{value}': {source}")]
    InvalidContentLength {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid chunk size line '{line}': {source}")]
    InvalidChunkSize {
        line: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("chunk data not followed by CRLF (got '{line}')")]
    MalformedChunk { line: String },
}
