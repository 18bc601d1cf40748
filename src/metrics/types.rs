use std::time::Duration;

use http::StatusCode;

use crate::error::TransportError;

/// Opaque index in `[0, N)` naming one request of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub enum Outcome {
    Success { status: StatusCode },
    Failure(TransportError),
    Timeout,
}

impl Outcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Outcome::Timeout)
    }
}

#[derive(Debug)]
pub struct RequestResult {
    pub ticket: Ticket,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

impl RequestResult {
    #[must_use]
    pub const fn success(ticket: Ticket, elapsed: Duration, status: StatusCode) -> Self {
        Self {
            ticket,
            elapsed,
            outcome: Outcome::Success { status },
        }
    }

    #[must_use]
    pub const fn failure(ticket: Ticket, elapsed: Duration, error: TransportError) -> Self {
        Self {
            ticket,
            elapsed,
            outcome: Outcome::Failure(error),
        }
    }

    #[must_use]
    pub const fn timeout(ticket: Ticket, elapsed: Duration) -> Self {
        Self {
            ticket,
            elapsed,
            outcome: Outcome::Timeout,
        }
    }
}

/// Results in arrival order. Complete once it holds one result per ticket.
#[derive(Debug, Default)]
pub struct ResultSet {
    results: Vec<RequestResult>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: RequestResult) {
        self.results.push(result);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RequestResult> {
        self.results.iter()
    }
}

impl From<Vec<RequestResult>> for ResultSet {
    fn from(results: Vec<RequestResult>) -> Self {
        Self { results }
    }
}

impl<'set> IntoIterator for &'set ResultSet {
    type Item = &'set RequestResult;
    type IntoIter = std::slice::Iter<'set, RequestResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
