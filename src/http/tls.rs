use tokio_native_tls::TlsConnector;
use tokio_native_tls::native_tls;

use crate::error::HttpError;

use super::target::{Scheme, Target};

/// Builds the run-wide TLS connector for https targets; plain http gets none.
pub(super) fn build_connector(target: &Target) -> Result<Option<TlsConnector>, HttpError> {
    match target.scheme() {
        Scheme::Http => Ok(None),
        Scheme::Https => {
            let connector = native_tls::TlsConnector::builder()
                .build()
                .map_err(|source| HttpError::TlsConnector { source })?;
            Ok(Some(TlsConnector::from(connector)))
        }
    }
}
