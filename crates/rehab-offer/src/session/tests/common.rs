use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::estimation::{OfferRanges, RehabCatalog};
use crate::lookup::{LookupError, PropertyProvider};
use crate::property::{ComparableRecord, PropertyRecord};
use crate::session::repository::{RepositoryError, SessionRepository};
use crate::session::{OfferDesk, OfferSession, SessionId};

pub(super) const MAIN_ST: &str = "123 Main St, Springfield, IL 62704";
pub(super) const OAK_AVE: &str = "456 Oak Ave, Springfield, IL 62704";

pub(super) fn main_street() -> PropertyRecord {
    PropertyRecord {
        formatted_address: MAIN_ST.to_string(),
        property_type: Some("Single Family".to_string()),
        bedrooms: Some(4),
        bathrooms: Some(3.0),
        square_footage: Some(2817),
        year_built: Some(1979),
        lot_square_footage: Some(7405),
    }
}

pub(super) fn oak_avenue() -> PropertyRecord {
    PropertyRecord {
        formatted_address: OAK_AVE.to_string(),
        property_type: Some("Single Family".to_string()),
        bedrooms: Some(3),
        bathrooms: Some(2.0),
        square_footage: Some(1450),
        year_built: Some(1998),
        lot_square_footage: None,
    }
}

pub(super) fn comparable(address: &str, price: f64) -> ComparableRecord {
    ComparableRecord {
        formatted_address: Some(address.to_string()),
        sale_price: Some(price),
        status: Some("Sold".to_string()),
        sale_date: Some("2026-08-14".to_string()),
        ..ComparableRecord::default()
    }
}

pub(super) fn catalog() -> Arc<RehabCatalog> {
    Arc::new(RehabCatalog::standard())
}

pub(super) fn session() -> OfferSession {
    OfferSession::new(
        SessionId("session-test".to_string()),
        catalog(),
        OfferRanges::default(),
    )
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    sessions: Mutex<HashMap<SessionId, OfferSession>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl SessionRepository for MemoryRepository {
    fn insert(&self, session: OfferSession) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().unwrap();
        if guard.contains_key(session.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id().clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<OfferSession>, RepositoryError> {
        Ok(self.sessions.lock().unwrap().get(id).cloned())
    }

    fn modify<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut OfferSession) -> T,
    {
        let mut guard = self.sessions.lock().unwrap();
        let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(apply(session))
    }

    fn remove(&self, id: &SessionId) -> Result<(), RepositoryError> {
        self.sessions
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert(&self, _session: OfferSession) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<OfferSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn modify<T, F>(&self, _id: &SessionId, _apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut OfferSession) -> T,
    {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance window".to_string()))
    }
}

/// Provider answering from fixed tables and recording every call.
#[derive(Default)]
pub(super) struct StaticProvider {
    properties: HashMap<String, PropertyRecord>,
    suggestions: Vec<String>,
    comparables: Vec<ComparableRecord>,
    failure: Option<String>,
    pub(super) calls: Mutex<Vec<String>>,
}

impl StaticProvider {
    pub(super) fn with_properties(records: Vec<PropertyRecord>) -> Self {
        Self {
            properties: records
                .into_iter()
                .map(|record| (record.formatted_address.clone(), record))
                .collect(),
            suggestions: vec![MAIN_ST.to_string(), "123 Maple Dr, Springfield, IL".to_string()],
            comparables: vec![
                comparable("118 Main St, Springfield, IL", 655_000.0),
                comparable("140 Main St, Springfield, IL", 690_000.0),
            ],
            ..Self::default()
        }
    }

    pub(super) fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), LookupError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(LookupError::transport(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PropertyProvider for StaticProvider {
    async fn lookup(&self, address: &str) -> Result<PropertyRecord, LookupError> {
        self.record(format!("lookup:{address}"))?;
        self.properties
            .get(address)
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                address: address.to_string(),
            })
    }

    async fn suggest(&self, prefix: &str) -> Result<Vec<String>, LookupError> {
        self.record(format!("suggest:{prefix}"))?;
        Ok(self.suggestions.clone())
    }

    async fn comparables(&self, address: &str) -> Result<Vec<ComparableRecord>, LookupError> {
        self.record(format!("comparables:{address}"))?;
        Ok(self.comparables.clone())
    }
}

type LookupReply = Result<PropertyRecord, LookupError>;

/// Provider whose lookups stay pending until the test releases them.
#[derive(Default)]
pub(super) struct ScriptedProvider {
    lookups: Mutex<HashMap<String, oneshot::Receiver<LookupReply>>>,
}

impl ScriptedProvider {
    pub(super) fn hold(&self, address: &str) -> oneshot::Sender<LookupReply> {
        let (sender, receiver) = oneshot::channel();
        self.lookups
            .lock()
            .unwrap()
            .insert(address.to_string(), receiver);
        sender
    }
}

#[async_trait]
impl PropertyProvider for ScriptedProvider {
    async fn lookup(&self, address: &str) -> Result<PropertyRecord, LookupError> {
        let receiver = self.lookups.lock().unwrap().remove(address);
        match receiver {
            Some(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(LookupError::transport("lookup abandoned"))),
            None => Err(LookupError::NotFound {
                address: address.to_string(),
            }),
        }
    }

    async fn suggest(&self, _prefix: &str) -> Result<Vec<String>, LookupError> {
        Ok(Vec::new())
    }

    async fn comparables(&self, _address: &str) -> Result<Vec<ComparableRecord>, LookupError> {
        Ok(Vec::new())
    }
}

pub(super) fn build_desk(
    provider: StaticProvider,
) -> (
    Arc<OfferDesk<MemoryRepository, StaticProvider>>,
    Arc<MemoryRepository>,
    Arc<StaticProvider>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let provider = Arc::new(provider);
    let desk = Arc::new(OfferDesk::new(
        repository.clone(),
        provider.clone(),
        catalog(),
        OfferRanges::default(),
    ));
    (desk, repository, provider)
}

pub(super) async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
