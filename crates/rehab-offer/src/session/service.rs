use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::repository::{RepositoryError, SessionRepository};
use super::snapshot::SessionSnapshot;
use super::state::{OfferSession, SessionError, SessionId, SessionInput};
use crate::estimation::{OfferRanges, RehabCatalog};
use crate::lookup::PropertyProvider;

/// Coordinates sessions, their storage, and the remote property provider.
///
/// Remote calls run without holding the session; results are applied through
/// the ticket issued when the call started, so late responses for superseded
/// requests are dropped.
pub struct OfferDesk<R, P> {
    repository: Arc<R>,
    provider: Arc<P>,
    catalog: Arc<RehabCatalog>,
    ranges: OfferRanges,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

impl<R, P> OfferDesk<R, P>
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    pub fn new(
        repository: Arc<R>,
        provider: Arc<P>,
        catalog: Arc<RehabCatalog>,
        ranges: OfferRanges,
    ) -> Self {
        Self {
            repository,
            provider,
            catalog,
            ranges,
        }
    }

    pub fn catalog(&self) -> &RehabCatalog {
        &self.catalog
    }

    pub fn default_ranges(&self) -> &OfferRanges {
        &self.ranges
    }

    pub fn open(&self) -> Result<SessionSnapshot, DeskError> {
        let session = OfferSession::new(next_session_id(), self.catalog.clone(), self.ranges);
        let snapshot = session.snapshot();
        self.repository.insert(session)?;
        info!(session = %snapshot.session_id, "opened offer session");
        Ok(snapshot)
    }

    pub fn get(&self, id: &SessionId) -> Result<SessionSnapshot, DeskError> {
        let session = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(session.snapshot())
    }

    pub fn close(&self, id: &SessionId) -> Result<(), DeskError> {
        self.repository.remove(id)?;
        info!(session = %id, "closed offer session");
        Ok(())
    }

    pub fn apply(&self, id: &SessionId, input: SessionInput) -> Result<SessionSnapshot, DeskError> {
        let snapshot = self.repository.modify(id, |session| {
            session.apply(input)?;
            Ok::<_, SessionError>(session.snapshot())
        })??;
        Ok(snapshot)
    }

    /// Looks up `address` and installs the result if no newer lookup started
    /// in the meantime. A blank address leaves the session untouched.
    pub async fn lookup(
        &self,
        id: &SessionId,
        address: &str,
    ) -> Result<SessionSnapshot, DeskError> {
        let address = address.trim().to_string();
        if address.is_empty() {
            return self.get(id);
        }

        let ticket = self
            .repository
            .modify(id, |session| session.begin_lookup(address.clone()))?;

        let result = self.provider.lookup(&address).await;
        if let Err(err) = &result {
            warn!(session = %id, %address, error = %err, "property lookup failed");
        }

        let snapshot = self.repository.modify(id, |session| {
            session.complete_lookup(ticket, result);
            session.snapshot()
        })?;
        Ok(snapshot)
    }

    /// Refreshes address suggestions; short prefixes clear them without a
    /// remote call.
    pub async fn suggest(
        &self,
        id: &SessionId,
        prefix: &str,
    ) -> Result<SessionSnapshot, DeskError> {
        let ticket = self
            .repository
            .modify(id, |session| session.begin_suggest(prefix))?;

        let Some(ticket) = ticket else {
            return self.get(id);
        };

        let result = self.provider.suggest(prefix.trim()).await;
        let snapshot = self.repository.modify(id, |session| {
            session.complete_suggest(ticket, result);
            session.snapshot()
        })?;
        Ok(snapshot)
    }

    pub async fn comparables(&self, id: &SessionId) -> Result<SessionSnapshot, DeskError> {
        let (ticket, address) = self
            .repository
            .modify(id, |session| session.begin_comparables())??;

        let result = self.provider.comparables(&address).await;
        if let Err(err) = &result {
            warn!(session = %id, %address, error = %err, "comparables search failed");
        }

        let snapshot = self.repository.modify(id, |session| {
            session.complete_comparables(ticket, result);
            session.snapshot()
        })?;
        Ok(snapshot)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
