use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::estimation::OfferRanges;
use crate::session::{router, session_router, OfferDesk};

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn open_session(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(Request::post("/api/v1/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn open_route_returns_created_snapshot() {
    let (desk, _, _) = build_desk(StaticProvider::default());
    let app = session_router(desk);

    let response = app
        .oneshot(Request::post("/api/v1/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phase"], "no_property");
    assert_eq!(body["rehab_mode"], "detailed");
    assert_eq!(body["display"]["max_suggested_offer"], "N/A");
}

#[tokio::test]
async fn inputs_route_recomputes_offers() {
    let (desk, _, _) = build_desk(StaticProvider::with_properties(vec![main_street()]));
    let app = session_router(desk);
    let id = open_session(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/sessions/{id}/lookup"),
            json!({ "address": MAIN_ST }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for input in [
        json!({ "type": "set_mode", "mode": "quick" }),
        json!({ "type": "set_arv", "arv": "$675,000" }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(&format!("/api/v1/sessions/{id}/inputs"), input))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::get(format!("/api/v1/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "quick_mode");
    assert_eq!(body["total_rehab_cost"], 120_353.0);
    assert_eq!(body["offers"]["max_suggested_offer"], 352_147);
    assert_eq!(body["display"]["total_rehab_cost"], "$120,353");
}

#[tokio::test]
async fn invalid_offer_range_is_unprocessable() {
    let (desk, _, _) = build_desk(StaticProvider::default());
    let app = session_router(desk);
    let id = open_session(&app).await;

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/sessions/{id}/inputs"),
            json!({ "type": "set_offer_ranges", "low": -1.0, "top": 80.0, "fair_cash": 75.0 }),
        ))
        .await
        .unwrap();
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("offer range"));
}

#[tokio::test]
async fn comparables_without_property_conflicts() {
    let (desk, _, _) = build_desk(StaticProvider::default());
    let app = session_router(desk);
    let id = open_session(&app).await;

    let response = app
        .oneshot(
            Request::post(format!("/api/v1/sessions/{id}/comparables"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_route_closes_session() {
    let (desk, repository, _) = build_desk(StaticProvider::default());
    let app = session_router(desk);
    let id = open_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/api/v1/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(repository.len(), 0);

    let response = app
        .oneshot(
            Request::get(format!("/api/v1/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn suggestions_route_returns_candidates() {
    let (desk, _, _) = build_desk(StaticProvider::with_properties(vec![main_street()]));
    let app = session_router(desk);
    let id = open_session(&app).await;

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/sessions/{id}/suggestions"),
            json!({ "prefix": "123 Ma" }),
        ))
        .await
        .unwrap();
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"][0], MAIN_ST);
}

#[tokio::test]
async fn open_handler_reports_repository_outage() {
    let desk = Arc::new(OfferDesk::new(
        Arc::new(UnavailableRepository),
        Arc::new(StaticProvider::default()),
        catalog(),
        OfferRanges::default(),
    ));

    let response =
        router::open_handler::<UnavailableRepository, StaticProvider>(State(desk.clone())).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = router::snapshot_handler::<UnavailableRepository, StaticProvider>(
        State(desk),
        Path("session-000001".to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
