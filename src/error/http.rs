use thiserror::Error;

/// Run-level network setup failures. Any of these aborts the run before a
/// single request is dispatched.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to resolve {host}:{port} ({source})")]
    ResolveHost {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("No addresses resolved for {host}.")]
    NoAddressesResolved { host: String },
    #[error("Failed to build TLS connector: {source}")]
    TlsConnector {
        #[source]
        source: tokio_native_tls::native_tls::Error,
    },
}
