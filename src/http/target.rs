use std::net::{SocketAddr, ToSocketAddrs};

use url::{Host, Url};

use crate::args::ResolveStrategy;
use crate::error::{AppError, AppResult, HttpError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    fn from_url(url: &Url) -> Result<Self, ValidationError> {
        match url.scheme() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(ValidationError::UnsupportedScheme {
                scheme: other.to_owned(),
            }),
        }
    }
}

/// Dispatch-ready target. Immutable once resolved and shared read-only by
/// every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: Scheme,
    host: String,
    port: u16,
    authority: String,
    request_target: String,
    resolved: Option<SocketAddr>,
}

impl Target {
    /// Parses and normalizes a raw URL without touching the network.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl`/`UrlMissingHost` for malformed input and
    /// `UnsupportedScheme` for anything but http/https.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let url = Url::parse(raw.trim()).map_err(|source| ValidationError::InvalidUrl {
            url: raw.to_owned(),
            source,
        })?;
        let scheme = Scheme::from_url(&url)?;

        let (host, authority_host) = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => {
                (domain.to_owned(), domain.to_owned())
            }
            Some(Host::Ipv4(addr)) => (addr.to_string(), addr.to_string()),
            Some(Host::Ipv6(addr)) => (addr.to_string(), format!("[{}]", addr)),
            Some(Host::Domain(_)) | None => return Err(ValidationError::UrlMissingHost),
        };

        let port = url.port().unwrap_or_else(|| scheme.default_port());
        let authority = if port == scheme.default_port() {
            authority_host
        } else {
            format!("{}:{}", authority_host, port)
        };

        let request_target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_owned(),
        };

        Ok(Self {
            scheme,
            host,
            port,
            authority,
            request_target,
            resolved: None,
        })
    }

    /// Parses the URL and applies the DNS strategy. With
    /// [`ResolveStrategy::Once`] the host is looked up here, a single time,
    /// and every request reuses the cached address.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`Target::parse`] and `ResolveHost` /
    /// `NoAddressesResolved` when the one-time lookup fails.
    pub fn resolve(raw: &str, strategy: ResolveStrategy) -> AppResult<Self> {
        let target = Self::parse(raw).map_err(AppError::validation)?;
        match strategy {
            ResolveStrategy::Once => {
                let addr = lookup_host(&target.host, target.port).map_err(AppError::http)?;
                tracing::debug!("Resolved {} to {}", target.authority, addr);
                Ok(target.with_resolved(addr))
            }
            ResolveStrategy::PerRequest => Ok(target),
        }
    }

    #[must_use]
    pub const fn with_resolved(mut self, addr: SocketAddr) -> Self {
        self.resolved = Some(addr);
        self
    }

    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Value for the `Host` header; carries the port only when it differs
    /// from the scheme default.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Origin-form request target: path plus optional query.
    #[must_use]
    pub fn request_target(&self) -> &str {
        &self.request_target
    }

    #[must_use]
    pub const fn resolved(&self) -> Option<SocketAddr> {
        self.resolved
    }
}

fn lookup_host(host: &str, port: u16) -> Result<SocketAddr, HttpError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| HttpError::ResolveHost {
            host: host.to_owned(),
            port,
            source,
        })?;
    addrs.next().ok_or_else(|| HttpError::NoAddressesResolved {
        host: format!("{}:{}", host, port),
    })
}
