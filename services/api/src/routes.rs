use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use rehab_offer::estimation::{
    quick_estimate, CalculatedOffers, OfferRanges, QuickEstimate, RehabItem, RehabLevel,
};
use rehab_offer::formatting::{format_currency, format_optional_currency, format_rate};
use rehab_offer::input::AmountInput;
use rehab_offer::lookup::PropertyProvider;
use rehab_offer::property::PropertyRecord;
use rehab_offer::session::{session_router, OfferDesk, SessionRepository};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct QuickEstimateRequest {
    pub(crate) property: PropertyRecord,
    #[serde(default)]
    pub(crate) arv: Option<AmountInput>,
    #[serde(default)]
    pub(crate) level: RehabLevel,
    #[serde(default)]
    pub(crate) offer_ranges: Option<OfferRanges>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuickEstimateResponse {
    pub(crate) estimated_arv: Option<f64>,
    pub(crate) quick_estimate: QuickEstimate,
    pub(crate) offer_ranges: OfferRanges,
    pub(crate) offers: CalculatedOffers,
    pub(crate) display: QuickEstimateDisplay,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuickEstimateDisplay {
    pub(crate) rehab_cost: String,
    pub(crate) adjusted_rate: String,
    pub(crate) max_suggested_offer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogCategory<'a> {
    pub(crate) name: &'a str,
    pub(crate) items: Vec<&'a RehabItem>,
}

pub(crate) fn with_session_routes<R, P>(desk: Arc<OfferDesk<R, P>>) -> axum::Router
where
    R: SessionRepository + 'static,
    P: PropertyProvider + 'static,
{
    session_router(desk)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/estimates/quick",
            axum::routing::post(quick_estimate_endpoint),
        )
        .route("/api/v1/catalog", axum::routing::get(catalog_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless quick estimate plus offers for a single property.
pub(crate) async fn quick_estimate_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<QuickEstimateRequest>,
) -> Response {
    let QuickEstimateRequest {
        property,
        arv,
        level,
        offer_ranges,
    } = request;

    let estimated_arv = match arv.filter(|input| !input.is_blank()) {
        Some(input) => match input.resolve("arv") {
            Ok(value) => Some(value).filter(|value| *value > 0.0),
            Err(err) => return unprocessable(err.to_string()),
        },
        None => None,
    };

    let offer_ranges = offer_ranges.unwrap_or(state.offer_ranges);
    if let Err(err) = offer_ranges.validate() {
        return unprocessable(err.to_string());
    }

    let estimate = quick_estimate(&property, estimated_arv, level);
    let offers = CalculatedOffers::compute(estimated_arv, estimate.cost as f64, &offer_ranges);
    let display = QuickEstimateDisplay {
        rehab_cost: format_currency(estimate.cost as f64),
        adjusted_rate: format!("${}/sqft", format_rate(estimate.adjusted_rate)),
        max_suggested_offer: format_optional_currency(
            offers.max_suggested_offer.map(|value| value as f64),
        ),
    };

    let body = QuickEstimateResponse {
        estimated_arv,
        quick_estimate: estimate,
        offer_ranges,
        offers,
        display,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn catalog_endpoint(Extension(state): Extension<AppState>) -> Response {
    let categories: Vec<CatalogCategory<'_>> = state
        .catalog
        .categories()
        .into_iter()
        .map(|name| CatalogCategory {
            name,
            items: state.catalog.items_in(name),
        })
        .collect();

    (StatusCode::OK, Json(json!({ "categories": categories }))).into_response()
}

fn unprocessable(message: String) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": message })),
    )
        .into_response()
}
