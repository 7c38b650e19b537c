use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::repository::{RepositoryError, SessionRepository};
use super::service::{DeskError, OfferDesk};
use super::state::{SessionError, SessionId, SessionInput};
use crate::lookup::PropertyProvider;

#[derive(Debug, Deserialize)]
pub(crate) struct LookupRequest {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestRequest {
    pub prefix: String,
}

/// Router builder exposing the interactive offer session endpoints.
pub fn session_router<R, P>(desk: Arc<OfferDesk<R, P>>) -> Router
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(open_handler::<R, P>))
        .route(
            "/api/v1/sessions/:session_id",
            get(snapshot_handler::<R, P>).delete(close_handler::<R, P>),
        )
        .route(
            "/api/v1/sessions/:session_id/inputs",
            post(input_handler::<R, P>),
        )
        .route(
            "/api/v1/sessions/:session_id/lookup",
            post(lookup_handler::<R, P>),
        )
        .route(
            "/api/v1/sessions/:session_id/suggestions",
            post(suggest_handler::<R, P>),
        )
        .route(
            "/api/v1/sessions/:session_id/comparables",
            post(comparables_handler::<R, P>),
        )
        .with_state(desk)
}

pub(crate) async fn open_handler<R, P>(State(desk): State<Arc<OfferDesk<R, P>>>) -> Response
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    match desk.open() {
        Ok(snapshot) => (StatusCode::CREATED, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn snapshot_handler<R, P>(
    State(desk): State<Arc<OfferDesk<R, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    match desk.get(&SessionId(session_id)) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn close_handler<R, P>(
    State(desk): State<Arc<OfferDesk<R, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    match desk.close(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn input_handler<R, P>(
    State(desk): State<Arc<OfferDesk<R, P>>>,
    Path(session_id): Path<String>,
    axum::Json(input): axum::Json<SessionInput>,
) -> Response
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    match desk.apply(&SessionId(session_id), input) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn lookup_handler<R, P>(
    State(desk): State<Arc<OfferDesk<R, P>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<LookupRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    match desk.lookup(&SessionId(session_id), &request.address).await {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn suggest_handler<R, P>(
    State(desk): State<Arc<OfferDesk<R, P>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SuggestRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    match desk.suggest(&SessionId(session_id), &request.prefix).await {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn comparables_handler<R, P>(
    State(desk): State<Arc<OfferDesk<R, P>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    match desk.comparables(&SessionId(session_id)).await {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: DeskError) -> Response {
    let status = match &err {
        DeskError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DeskError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        DeskError::Repository(RepositoryError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        DeskError::Session(SessionError::NoProperty) => StatusCode::CONFLICT,
        DeskError::Session(SessionError::UnknownItem(_) | SessionError::InvalidOfferRange(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
