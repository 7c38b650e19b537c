use super::state::{OfferSession, SessionId};

/// Storage abstraction so the desk can be exercised in isolation.
///
/// `modify` runs the closure while the implementation holds whatever guard
/// it uses, so a mutation and its recompute land together.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: OfferSession) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<OfferSession>, RepositoryError>;
    fn modify<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut OfferSession) -> T;
    fn remove(&self, id: &SessionId) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
