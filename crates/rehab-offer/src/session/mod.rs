//! Interactive offer sessions: inputs in, recomputed estimates and offers out.

pub mod repository;
pub mod router;
pub mod service;
mod snapshot;
mod state;

#[cfg(test)]
mod tests;

pub use repository::{RepositoryError, SessionRepository};
pub use router::session_router;
pub use service::{DeskError, OfferDesk};
pub use snapshot::{DisplayFigures, SelectionView, SessionSnapshot};
pub use state::{OfferSession, RehabMode, SessionError, SessionId, SessionInput, SessionPhase};
