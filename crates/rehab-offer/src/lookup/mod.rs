//! Boundary to the remote property data provider.

mod client;

pub use client::RealieClient;

use crate::property::{ComparableRecord, PropertyRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Suggestions are only requested once the user has typed this many characters.
pub const MIN_SUGGEST_PREFIX_LEN: usize = 3;

/// Address lookup, autocomplete and comparables search.
#[async_trait]
pub trait PropertyProvider: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<PropertyRecord, LookupError>;
    async fn suggest(&self, prefix: &str) -> Result<Vec<String>, LookupError>;
    async fn comparables(&self, address: &str) -> Result<Vec<ComparableRecord>, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("no property found for '{address}'")]
    NotFound { address: String },
    /// Network failure or non-success response; the message is shown to the user as-is.
    #[error("{message}")]
    Transport { message: String },
}

impl LookupError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// The three independent request streams a session can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Lookup,
    Suggest,
    Comparables,
}

impl RequestKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Lookup, Self::Suggest, Self::Comparables]
    }

    const fn index(self) -> usize {
        match self {
            Self::Lookup => 0,
            Self::Suggest => 1,
            Self::Comparables => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Lookup => "property lookup",
            Self::Suggest => "address suggestions",
            Self::Comparables => "comparables search",
        }
    }
}

/// Handle for one outstanding request; only the most recent ticket of a kind
/// may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub kind: RequestKind,
    pub sequence: u64,
}

/// Tracks the latest issued and latest settled ticket per request kind.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    issued: [u64; 3],
    settled: [u64; 3],
}

impl RequestTracker {
    pub fn issue(&mut self, kind: RequestKind) -> RequestTicket {
        let slot = &mut self.issued[kind.index()];
        *slot += 1;
        RequestTicket {
            kind,
            sequence: *slot,
        }
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.issued[ticket.kind.index()] == ticket.sequence
    }

    /// Marks the ticket settled; returns false when it was superseded.
    pub fn settle(&mut self, ticket: RequestTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.settled[ticket.kind.index()] = ticket.sequence;
        true
    }

    /// Drops whatever is in flight for `kind` without issuing a usable ticket.
    pub fn supersede(&mut self, kind: RequestKind) {
        let ticket = self.issue(kind);
        self.settled[kind.index()] = ticket.sequence;
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.issued[kind.index()] != self.settled[kind.index()]
    }

    pub fn pending(&self) -> Vec<RequestKind> {
        RequestKind::ordered()
            .into_iter()
            .filter(|kind| self.is_pending(*kind))
            .collect()
    }
}
