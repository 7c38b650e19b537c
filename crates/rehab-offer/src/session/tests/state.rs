use super::common::*;
use crate::estimation::{ArvTier, OfferRanges, RehabLevel};
use crate::input::AmountInput;
use crate::lookup::{LookupError, RequestKind};
use crate::session::{RehabMode, SessionError, SessionInput, SessionPhase};

#[test]
fn new_session_starts_without_property_in_detailed_mode() {
    let session = session();

    assert_eq!(session.phase(), SessionPhase::NoProperty);
    assert_eq!(session.mode(), RehabMode::Detailed);
    assert_eq!(session.level(), RehabLevel::Mid);
    assert_eq!(session.total_rehab_cost(), 0.0);
    assert!(!session.offers().is_computable());
    assert!(session.pending_requests().is_empty());
}

#[test]
fn quick_mode_reproduces_high_end_scenario() {
    let mut session = session();
    session.select_property(main_street());
    session.set_mode(RehabMode::Quick);
    session.set_arv_value(Some(675_000.0));

    assert_eq!(session.phase(), SessionPhase::QuickMode);
    assert_eq!(session.quick_estimate().tier, ArvTier::HighEnd);
    assert_eq!(session.total_rehab_cost(), 120_353.0);
    assert_eq!(session.offers().max_suggested_offer, Some(352_147));
    assert_eq!(session.offers().low_range, Some(438_750));
    assert_eq!(session.offers().top_range, Some(540_000));
    assert_eq!(session.offers().fair_cash_offer, Some(506_250));
    assert!(session.category_totals().is_empty());
}

#[test]
fn detailed_mode_sums_selected_items() {
    let mut session = session();
    session.select_property(main_street());
    session.set_arv_value(Some(675_000.0));
    session.toggle_item("interior_paint").unwrap();
    session.set_item_selected("systems_hvac", true).unwrap();

    assert_eq!(session.total_rehab_cost(), 15_542.5);
    assert_eq!(session.category_totals().get("Interior"), Some(&7_042.5));
    assert_eq!(session.category_totals().get("Systems"), Some(&8_500.0));
    assert_eq!(session.offers().max_suggested_offer, Some(456_958));
}

#[test]
fn every_mutation_recomputes_derived_figures() {
    let mut session = session();
    session.select_property(main_street());
    session.set_arv_value(Some(675_000.0));
    session.set_mode(RehabMode::Quick);
    let mid = session.total_rehab_cost();

    session.set_level(RehabLevel::Full);
    assert!(session.total_rehab_cost() > mid);

    session.set_mode(RehabMode::Detailed);
    assert_eq!(session.total_rehab_cost(), 0.0);
    assert_eq!(session.offers().max_suggested_offer, Some(472_500));

    session.set_item_quantity("kitchen_cabinets", &AmountInput::from("20")).unwrap();
    session.set_item_selected("kitchen_cabinets", true).unwrap();
    assert_eq!(session.total_rehab_cost(), 5_000.0);
    assert_eq!(session.offers().max_suggested_offer, Some(467_500));
}

#[test]
fn invalid_arv_text_disables_offers_and_records_message() {
    let mut session = session();
    session.select_property(main_street());
    session.set_arv(Some(AmountInput::from("$675,000")));
    assert_eq!(session.estimated_arv(), Some(675_000.0));

    session.set_arv(Some(AmountInput::from("lots")));
    assert_eq!(session.estimated_arv(), None);
    assert!(!session.offers().is_computable());
    assert!(session.validation_message().is_some());

    session.set_arv(Some(AmountInput::from("  ")));
    assert_eq!(session.validation_message(), None);
}

#[test]
fn zero_arv_is_treated_as_absent() {
    let mut session = session();
    session.select_property(main_street());
    session.set_arv_value(Some(0.0));

    assert_eq!(session.estimated_arv(), None);
    assert!(session.quick_estimate().provisional);
    assert!(!session.offers().is_computable());
}

#[test]
fn invalid_quantity_falls_back_to_default() {
    let mut session = session();
    session.select_property(main_street());
    session.set_item_selected("interior_lvp", true).unwrap();
    session
        .set_item_quantity("interior_lvp", &AmountInput::from("-40"))
        .unwrap();

    assert_eq!(session.selection("interior_lvp").unwrap().quantity, 0.0);
    assert_eq!(session.total_rehab_cost(), 14_085.0);
    assert!(session.validation_message().is_some());
}

#[test]
fn unknown_items_are_rejected() {
    let mut session = session();
    let err = session.toggle_item("pool_resurface").unwrap_err();
    assert_eq!(err, SessionError::UnknownItem("pool_resurface".to_string()));
}

#[test]
fn invalid_offer_ranges_keep_previous_values() {
    let mut session = session();
    session.set_arv_value(Some(400_000.0));

    let err = session
        .set_offer_ranges(65.0, 120.0, 75.0, None)
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidOfferRange(_)));
    assert_eq!(*session.offer_ranges(), OfferRanges::default());

    session.set_offer_ranges(60.0, 85.0, 70.0, Some(3.0)).unwrap();
    assert_eq!(session.offers().low_range, Some(240_000));
    assert_eq!(session.offers().top_range, Some(340_000));
    assert_eq!(session.offers().fair_cash_offer, Some(280_000));
    assert_eq!(session.offer_ranges().fee_percentage, 3.0);
}

#[test]
fn stale_lookup_result_is_discarded() {
    let mut session = session();
    let first = session.begin_lookup("123 Main St");
    let second = session.begin_lookup("456 Oak Ave");

    assert!(session.complete_lookup(second, Ok(oak_avenue())));
    assert!(!session.complete_lookup(first, Ok(main_street())));

    assert_eq!(session.property().unwrap().formatted_address, OAK_AVE);
    assert_eq!(session.address_input(), OAK_AVE);
    assert!(session.pending_requests().is_empty());
}

#[test]
fn new_lookup_clears_property_and_arv_but_keeps_selections() {
    let mut session = session();
    session.select_property(main_street());
    session.set_arv_value(Some(675_000.0));
    session.set_item_selected("systems_hvac", true).unwrap();

    let ticket = session.begin_lookup("456 Oak Ave");

    assert_eq!(session.phase(), SessionPhase::NoProperty);
    assert_eq!(session.estimated_arv(), None);
    assert!(session.selection("systems_hvac").unwrap().selected);
    assert_eq!(session.pending_requests(), vec![RequestKind::Lookup]);

    session.complete_lookup(ticket, Ok(oak_avenue()));
    assert_eq!(session.total_rehab_cost(), 8_500.0);
}

#[test]
fn lookup_not_found_keeps_typed_address() {
    let mut session = session();
    let ticket = session.begin_lookup("999 Nowhere Rd");
    session.complete_lookup(
        ticket,
        Err(LookupError::NotFound {
            address: "999 Nowhere Rd".to_string(),
        }),
    );

    assert_eq!(session.address_input(), "999 Nowhere Rd");
    assert!(session.property().is_none());
    assert_eq!(session.error_message(), None);
}

#[test]
fn transport_error_is_surfaced_and_cleared_on_retry() {
    let mut session = session();
    let ticket = session.begin_lookup("123 Main St");
    session.complete_lookup(ticket, Err(LookupError::transport("Rate limit exceeded")));
    assert_eq!(session.error_message(), Some("Rate limit exceeded"));

    session.begin_lookup("123 Main St");
    assert_eq!(session.error_message(), None);
}

#[test]
fn short_prefix_clears_suggestions_and_supersedes_request() {
    let mut session = session();
    let ticket = session.begin_suggest("123 Ma").unwrap();

    assert!(session.begin_suggest("12").is_none());
    assert!(!session.complete_suggest(ticket, Ok(vec![MAIN_ST.to_string()])));
    assert!(session.suggestions().is_empty());
    assert_eq!(session.address_input(), "12");
}

#[test]
fn suggestion_failures_degrade_to_empty_list() {
    let mut session = session();
    let ticket = session.begin_suggest("123 Main").unwrap();
    assert!(session.complete_suggest(ticket, Ok(vec![MAIN_ST.to_string()])));
    assert_eq!(session.suggestions().len(), 1);

    let ticket = session.begin_suggest("123 Main S").unwrap();
    session.complete_suggest(ticket, Err(LookupError::transport("boom")));
    assert!(session.suggestions().is_empty());
    assert_eq!(session.error_message(), None);
}

#[test]
fn comparables_require_a_property() {
    let mut session = session();
    assert_eq!(
        session.begin_comparables().unwrap_err(),
        SessionError::NoProperty
    );

    session.select_property(main_street());
    let (ticket, address) = session.begin_comparables().unwrap();
    assert_eq!(address, MAIN_ST);
    session.complete_comparables(ticket, Ok(vec![comparable("118 Main St", 655_000.0)]));
    assert_eq!(session.comparables().len(), 1);
}

#[test]
fn comparables_for_replaced_property_are_discarded() {
    let mut session = session();
    session.select_property(main_street());
    let (ticket, _) = session.begin_comparables().unwrap();

    session.select_property(oak_avenue());
    assert!(!session.complete_comparables(ticket, Ok(vec![comparable("118 Main St", 655_000.0)])));

    assert_eq!(session.property().unwrap().formatted_address, OAK_AVE);
    assert!(session.comparables().is_empty());
    assert!(session.pending_requests().is_empty());
}

#[test]
fn apply_dispatches_tagged_inputs() {
    let mut session = session();
    let inputs: Vec<SessionInput> = serde_json::from_value(serde_json::json!([
        {
            "type": "select_property",
            "property": {
                "formattedAddress": MAIN_ST,
                "squareFootage": "2817",
                "bathrooms": 3,
                "yearBuilt": 1979
            }
        },
        { "type": "set_arv", "arv": "675000" },
        { "type": "set_mode", "mode": "quick" },
        { "type": "set_level", "level": "mid" }
    ]))
    .unwrap();

    for input in inputs {
        session.apply(input).unwrap();
    }

    assert_eq!(session.total_rehab_cost(), 120_353.0);
    assert_eq!(session.offers().max_suggested_offer, Some(352_147));
}

#[test]
fn snapshot_carries_formatted_figures() {
    let mut session = session();
    session.select_property(main_street());
    session.set_mode(RehabMode::Quick);
    session.set_arv_value(Some(675_000.0));
    session.set_item_selected("systems_hvac", true).unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.display.total_rehab_cost, "$120,353");
    assert_eq!(snapshot.display.max_suggested_offer, "$352,147");
    assert_eq!(snapshot.display.adjusted_rate, "$36.00/sqft");
    assert_eq!(snapshot.display.fee_percentage, "4%");
    assert_eq!(snapshot.selections.len(), 1);
    assert_eq!(snapshot.selections[0].item_id, "systems_hvac");

    session.clear_property();
    session.set_arv_value(None);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.display.max_suggested_offer, "N/A");
    assert_eq!(snapshot.phase, SessionPhase::NoProperty);
}
