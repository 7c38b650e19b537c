use std::collections::BTreeMap;

use serde::Serialize;

use super::state::{OfferSession, RehabMode, SessionId, SessionPhase};
use crate::estimation::{CalculatedOffers, DetailedEstimate, OfferRanges, QuickEstimate, RehabLevel};
use crate::formatting::{format_currency, format_optional_currency, format_rate};
use crate::lookup::RequestKind;
use crate::property::{ComparableRecord, PropertyRecord};

/// Read-only view of a session returned to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub phase: SessionPhase,
    pub address_input: String,
    pub property: Option<PropertyRecord>,
    pub estimated_arv: Option<f64>,
    pub rehab_mode: RehabMode,
    pub rehab_level: RehabLevel,
    pub quick_estimate: QuickEstimate,
    pub detailed_estimate: DetailedEstimate,
    pub total_rehab_cost: f64,
    pub category_totals: BTreeMap<String, f64>,
    pub offer_ranges: OfferRanges,
    pub offers: CalculatedOffers,
    pub selections: Vec<SelectionView>,
    pub pending: Vec<RequestKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
    pub suggestions: Vec<String>,
    pub comparables: Vec<ComparableRecord>,
    pub display: DisplayFigures,
}

/// Catalog items the user has touched: selected, or given a quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionView {
    pub item_id: String,
    pub selected: bool,
    pub quantity: f64,
}

/// Pre-formatted figures for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFigures {
    pub estimated_arv: String,
    pub total_rehab_cost: String,
    pub adjusted_rate: String,
    pub max_suggested_offer: String,
    pub low_range: String,
    pub top_range: String,
    pub fair_cash_offer: String,
    pub fee_percentage: String,
}

impl DisplayFigures {
    fn from_session(session: &OfferSession) -> Self {
        let offers = session.offers();
        let as_amount = |value: Option<i64>| format_optional_currency(value.map(|v| v as f64));

        Self {
            estimated_arv: format_optional_currency(session.estimated_arv()),
            total_rehab_cost: format_currency(session.total_rehab_cost()),
            adjusted_rate: format!("${}/sqft", format_rate(session.quick_estimate().adjusted_rate)),
            max_suggested_offer: as_amount(offers.max_suggested_offer),
            low_range: as_amount(offers.low_range),
            top_range: as_amount(offers.top_range),
            fair_cash_offer: as_amount(offers.fair_cash_offer),
            fee_percentage: format!("{}%", session.offer_ranges().fee_percentage),
        }
    }
}

impl OfferSession {
    pub fn snapshot(&self) -> SessionSnapshot {
        let selections = self
            .catalog()
            .items()
            .iter()
            .zip(self.selections())
            .filter(|(_, selection)| selection.selected || selection.quantity > 0.0)
            .map(|(item, selection)| SelectionView {
                item_id: item.id.clone(),
                selected: selection.selected,
                quantity: selection.quantity,
            })
            .collect();

        SessionSnapshot {
            session_id: self.id().clone(),
            phase: self.phase(),
            address_input: self.address_input().to_string(),
            property: self.property().cloned(),
            estimated_arv: self.estimated_arv(),
            rehab_mode: self.mode(),
            rehab_level: self.level(),
            quick_estimate: self.quick_estimate().clone(),
            detailed_estimate: self.detailed_estimate().clone(),
            total_rehab_cost: self.total_rehab_cost(),
            category_totals: self.category_totals().clone(),
            offer_ranges: *self.offer_ranges(),
            offers: *self.offers(),
            selections,
            pending: self.pending_requests(),
            error_message: self.error_message().map(str::to_string),
            validation_message: self.validation_message().map(str::to_string),
            suggestions: self.suggestions().to_vec(),
            comparables: self.comparables().to_vec(),
            display: DisplayFigures::from_session(self),
        }
    }
}
