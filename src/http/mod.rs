//! Target resolution and the timed HTTP/1.x request/response exchange.
mod response;
mod target;
mod tls;
mod transceiver;

#[cfg(test)]
mod tests;

pub use target::{Scheme, Target};
pub use transceiver::{HttpTransceiver, Transceiver};
