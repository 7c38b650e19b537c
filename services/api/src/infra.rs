use metrics_exporter_prometheus::PrometheusHandle;
use rehab_offer::config::AppConfig;
use rehab_offer::error::AppError;
use rehab_offer::estimation::{OfferRanges, RehabCatalog, RehabLevel};
use rehab_offer::session::{OfferSession, RepositoryError, SessionId, SessionRepository};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<RehabCatalog>,
    pub(crate) offer_ranges: OfferRanges,
}

/// Sessions kept before the least recently touched one is evicted.
pub(crate) const DEFAULT_SESSION_CAPACITY: usize = 1_024;

/// Process-local session store. Sessions leave through `DELETE` or, once the
/// store is full, by evicting whichever was touched least recently.
#[derive(Clone)]
pub(crate) struct InMemorySessionRepository {
    store: Arc<Mutex<SessionStore>>,
    capacity: usize,
}

#[derive(Default)]
struct SessionStore {
    sessions: HashMap<SessionId, StoredSession>,
    clock: u64,
}

struct StoredSession {
    session: OfferSession,
    last_touched: u64,
}

impl SessionStore {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn touch(&mut self, id: &SessionId) -> Option<&mut OfferSession> {
        let now = self.tick();
        self.sessions.get_mut(id).map(|stored| {
            stored.last_touched = now;
            &mut stored.session
        })
    }

    fn evict_idlest(&mut self) {
        let idlest = self
            .sessions
            .iter()
            .min_by_key(|(_, stored)| stored.last_touched)
            .map(|(id, _)| id.clone());
        if let Some(id) = idlest {
            self.sessions.remove(&id);
            info!(session = %id, "evicted idle offer session");
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl InMemorySessionRepository {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionStore>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("session store poisoned".to_string()))
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: OfferSession) -> Result<(), RepositoryError> {
        let mut store = self.lock()?;
        if store.sessions.contains_key(session.id()) {
            return Err(RepositoryError::Conflict);
        }
        if store.sessions.len() >= self.capacity {
            store.evict_idlest();
        }
        let last_touched = store.tick();
        store.sessions.insert(
            session.id().clone(),
            StoredSession {
                session,
                last_touched,
            },
        );
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<OfferSession>, RepositoryError> {
        let mut store = self.lock()?;
        Ok(store.touch(id).cloned())
    }

    fn modify<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut OfferSession) -> T,
    {
        let mut store = self.lock()?;
        let session = store.touch(id).ok_or(RepositoryError::NotFound)?;
        Ok(apply(session))
    }

    fn remove(&self, id: &SessionId) -> Result<(), RepositoryError> {
        let mut store = self.lock()?;
        store
            .sessions
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Built-in catalog unless `REHAB_CATALOG_PATH` points at a CSV replacement.
pub(crate) fn load_catalog(config: &AppConfig) -> Result<RehabCatalog, AppError> {
    match &config.catalog_path {
        Some(path) => {
            let catalog = RehabCatalog::from_path(path)?;
            info!(path = %path.display(), items = catalog.len(), "loaded rehab catalog");
            Ok(catalog)
        }
        None => Ok(RehabCatalog::standard()),
    }
}

pub(crate) fn parse_level(raw: &str) -> Result<RehabLevel, String> {
    RehabLevel::parse(raw).ok_or_else(|| format!("unknown rehab level '{raw}' (light, mid, full)"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, String> {
    rehab_offer::input::parse_amount("amount", raw).map_err(|err| err.to_string())
}
