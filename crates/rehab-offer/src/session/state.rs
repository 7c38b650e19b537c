use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::estimation::{
    detailed_estimate, quick_estimate, CalculatedOffers, DetailedEstimate, ItemSelection,
    OfferRanges, QuickEstimate, RehabCatalog, RehabLevel,
};
use crate::input::{AmountInput, ValidationError};
use crate::lookup::{
    LookupError, RequestKind, RequestTicket, RequestTracker, MIN_SUGGEST_PREFIX_LEN,
};
use crate::property::{ComparableRecord, PropertyRecord};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RehabMode {
    Quick,
    #[default]
    Detailed,
}

impl RehabMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quick => "Quick Estimate",
            Self::Detailed => "Detailed Estimate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NoProperty,
    QuickMode,
    DetailedMode,
}

/// One user action against the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionInput {
    SetAddress {
        address: String,
    },
    SelectProperty {
        property: PropertyRecord,
    },
    ClearProperty,
    SetArv {
        #[serde(default)]
        arv: Option<AmountInput>,
    },
    SetMode {
        mode: RehabMode,
    },
    SetLevel {
        level: RehabLevel,
    },
    ToggleItem {
        item_id: String,
    },
    SetItemSelected {
        item_id: String,
        selected: bool,
    },
    SetItemQuantity {
        item_id: String,
        quantity: AmountInput,
    },
    SetOfferRanges {
        low: f64,
        top: f64,
        fair_cash: f64,
        #[serde(default)]
        fee_percentage: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown rehab item '{0}'")]
    UnknownItem(String),
    #[error("invalid offer range: {0}")]
    InvalidOfferRange(#[from] ValidationError),
    #[error("no subject property selected")]
    NoProperty,
}

#[derive(Debug, Clone)]
struct Derived {
    quick: QuickEstimate,
    detailed: DetailedEstimate,
    total_rehab_cost: f64,
    category_totals: BTreeMap<String, f64>,
    offers: CalculatedOffers,
}

/// Interactive offer analysis for one subject property.
///
/// Inputs are changed only through the mutators below, each of which ends by
/// recomputing every derived figure, so readers never observe a stale total
/// or offer.
#[derive(Debug, Clone)]
pub struct OfferSession {
    id: SessionId,
    catalog: Arc<RehabCatalog>,
    address_input: String,
    property: Option<PropertyRecord>,
    estimated_arv: Option<f64>,
    mode: RehabMode,
    level: RehabLevel,
    selections: Vec<ItemSelection>,
    ranges: OfferRanges,
    suggestions: Vec<String>,
    comparables: Vec<ComparableRecord>,
    error_message: Option<String>,
    validation_message: Option<String>,
    requests: RequestTracker,
    derived: Derived,
}

impl OfferSession {
    pub fn new(id: SessionId, catalog: Arc<RehabCatalog>, ranges: OfferRanges) -> Self {
        let selections = vec![ItemSelection::default(); catalog.len()];
        let level = RehabLevel::default();
        let empty = PropertyRecord::default();
        let derived = Derived {
            quick: quick_estimate(&empty, None, level),
            detailed: DetailedEstimate::default(),
            total_rehab_cost: 0.0,
            category_totals: BTreeMap::new(),
            offers: CalculatedOffers::default(),
        };

        let mut session = Self {
            id,
            catalog,
            address_input: String::new(),
            property: None,
            estimated_arv: None,
            mode: RehabMode::default(),
            level,
            selections,
            ranges,
            suggestions: Vec::new(),
            comparables: Vec::new(),
            error_message: None,
            validation_message: None,
            requests: RequestTracker::default(),
            derived,
        };
        session.recompute();
        session
    }

    pub fn apply(&mut self, input: SessionInput) -> Result<(), SessionError> {
        match input {
            SessionInput::SetAddress { address } => self.set_address_input(address),
            SessionInput::SelectProperty { property } => self.select_property(property),
            SessionInput::ClearProperty => self.clear_property(),
            SessionInput::SetArv { arv } => self.set_arv(arv),
            SessionInput::SetMode { mode } => self.set_mode(mode),
            SessionInput::SetLevel { level } => self.set_level(level),
            SessionInput::ToggleItem { item_id } => self.toggle_item(&item_id)?,
            SessionInput::SetItemSelected { item_id, selected } => {
                self.set_item_selected(&item_id, selected)?
            }
            SessionInput::SetItemQuantity { item_id, quantity } => {
                self.set_item_quantity(&item_id, &quantity)?
            }
            SessionInput::SetOfferRanges {
                low,
                top,
                fair_cash,
                fee_percentage,
            } => self.set_offer_ranges(low, top, fair_cash, fee_percentage)?,
        }
        Ok(())
    }

    /// Records typed address text. The current property stays until a new
    /// lookup starts.
    pub fn set_address_input(&mut self, address: impl Into<String>) {
        self.address_input = address.into();
    }

    /// Replaces the subject property wholesale, as a successful lookup does.
    /// Clears the ARV override; rehab selections are kept.
    pub fn select_property(&mut self, property: PropertyRecord) {
        self.requests.supersede(RequestKind::Lookup);
        self.install_property(property);
        self.recompute();
    }

    pub fn clear_property(&mut self) {
        self.requests.supersede(RequestKind::Lookup);
        self.requests.supersede(RequestKind::Comparables);
        self.property = None;
        self.estimated_arv = None;
        self.comparables.clear();
        self.recompute();
    }

    /// Sets the ARV override. Blank clears it; invalid text makes offers not
    /// computable and records a validation message.
    pub fn set_arv(&mut self, arv: Option<AmountInput>) {
        match arv.filter(|input| !input.is_blank()) {
            None => {
                self.estimated_arv = None;
                self.validation_message = None;
            }
            Some(input) => match input.resolve("ARV") {
                Ok(value) => {
                    self.estimated_arv = Some(value).filter(|value| *value > 0.0);
                    self.validation_message = None;
                }
                Err(err) => {
                    self.estimated_arv = None;
                    self.validation_message = Some(err.to_string());
                }
            },
        }
        self.recompute();
    }

    pub fn set_arv_value(&mut self, arv: Option<f64>) {
        self.set_arv(arv.map(AmountInput::Number));
    }

    pub fn set_mode(&mut self, mode: RehabMode) {
        self.mode = mode;
        self.recompute();
    }

    pub fn set_level(&mut self, level: RehabLevel) {
        self.level = level;
        self.recompute();
    }

    pub fn toggle_item(&mut self, item_id: &str) -> Result<(), SessionError> {
        let index = self.item_index(item_id)?;
        self.selections[index].selected = !self.selections[index].selected;
        self.recompute();
        Ok(())
    }

    pub fn set_item_selected(&mut self, item_id: &str, selected: bool) -> Result<(), SessionError> {
        let index = self.item_index(item_id)?;
        self.selections[index].selected = selected;
        self.recompute();
        Ok(())
    }

    /// Invalid quantities fall back to zero ("use the default quantity").
    pub fn set_item_quantity(
        &mut self,
        item_id: &str,
        quantity: &AmountInput,
    ) -> Result<(), SessionError> {
        let index = self.item_index(item_id)?;
        let quantity = if quantity.is_blank() {
            self.validation_message = None;
            0.0
        } else {
            match quantity.resolve("quantity") {
                Ok(value) => {
                    self.validation_message = None;
                    value
                }
                Err(err) => {
                    self.validation_message = Some(err.to_string());
                    0.0
                }
            }
        };
        self.selections[index].quantity = quantity;
        self.recompute();
        Ok(())
    }

    /// Rejects out-of-range percentages and keeps the previous ranges.
    pub fn set_offer_ranges(
        &mut self,
        low: f64,
        top: f64,
        fair_cash: f64,
        fee_percentage: Option<f64>,
    ) -> Result<(), SessionError> {
        let ranges = OfferRanges::new(low, top, fair_cash)?
            .with_fee_percentage(fee_percentage.unwrap_or(self.ranges.fee_percentage))?;
        self.ranges = ranges;
        self.recompute();
        Ok(())
    }

    /// Starts a property lookup. The previous property and ARV are cleared,
    /// the error message is reset, and any older lookup is superseded.
    pub fn begin_lookup(&mut self, address: impl Into<String>) -> RequestTicket {
        self.address_input = address.into();
        self.property = None;
        self.estimated_arv = None;
        self.error_message = None;
        self.comparables.clear();
        self.requests.supersede(RequestKind::Comparables);
        let ticket = self.requests.issue(RequestKind::Lookup);
        self.recompute();
        ticket
    }

    /// Applies a lookup result unless a newer lookup has been started since.
    /// Returns whether the result was applied.
    pub fn complete_lookup(
        &mut self,
        ticket: RequestTicket,
        result: Result<PropertyRecord, LookupError>,
    ) -> bool {
        if !self.requests.settle(ticket) {
            debug!(
                session = %self.id,
                sequence = ticket.sequence,
                "discarding superseded lookup result"
            );
            return false;
        }

        match result {
            Ok(property) => {
                info!(
                    session = %self.id,
                    address = %property.formatted_address,
                    "subject property selected"
                );
                self.install_property(property);
            }
            Err(LookupError::NotFound { address }) => {
                info!(session = %self.id, %address, "no property found, keeping typed address");
            }
            Err(err @ LookupError::Transport { .. }) => {
                self.error_message = Some(err.to_string());
            }
        }
        self.recompute();
        true
    }

    /// Records typed text and issues a suggestion ticket, or clears the
    /// suggestions when the prefix is too short to query.
    pub fn begin_suggest(&mut self, prefix: impl Into<String>) -> Option<RequestTicket> {
        let prefix = prefix.into();
        let long_enough = prefix.trim().chars().count() >= MIN_SUGGEST_PREFIX_LEN;
        self.address_input = prefix;

        if long_enough {
            Some(self.requests.issue(RequestKind::Suggest))
        } else {
            self.requests.supersede(RequestKind::Suggest);
            self.suggestions.clear();
            None
        }
    }

    /// Suggestion failures degrade to an empty list.
    pub fn complete_suggest(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<String>, LookupError>,
    ) -> bool {
        if !self.requests.settle(ticket) {
            debug!(session = %self.id, "discarding superseded suggestions");
            return false;
        }

        self.suggestions = match result {
            Ok(suggestions) => suggestions,
            Err(err) => {
                debug!(session = %self.id, error = %err, "suggestions unavailable");
                Vec::new()
            }
        };
        true
    }

    /// Issues a comparables ticket for the selected property's address.
    pub fn begin_comparables(&mut self) -> Result<(RequestTicket, String), SessionError> {
        let address = self
            .property
            .as_ref()
            .map(|property| property.formatted_address.clone())
            .ok_or(SessionError::NoProperty)?;
        self.error_message = None;
        Ok((self.requests.issue(RequestKind::Comparables), address))
    }

    pub fn complete_comparables(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<ComparableRecord>, LookupError>,
    ) -> bool {
        if !self.requests.settle(ticket) {
            debug!(session = %self.id, "discarding superseded comparables");
            return false;
        }

        match result {
            Ok(comparables) => self.comparables = comparables,
            Err(err) => self.error_message = Some(err.to_string()),
        }
        true
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn catalog(&self) -> &RehabCatalog {
        &self.catalog
    }

    pub fn address_input(&self) -> &str {
        &self.address_input
    }

    pub fn property(&self) -> Option<&PropertyRecord> {
        self.property.as_ref()
    }

    pub fn estimated_arv(&self) -> Option<f64> {
        self.estimated_arv
    }

    pub fn mode(&self) -> RehabMode {
        self.mode
    }

    pub fn level(&self) -> RehabLevel {
        self.level
    }

    pub fn selection(&self, item_id: &str) -> Option<ItemSelection> {
        self.catalog
            .position(item_id)
            .map(|index| self.selections[index])
    }

    pub(crate) fn selections(&self) -> &[ItemSelection] {
        &self.selections
    }

    pub fn offer_ranges(&self) -> &OfferRanges {
        &self.ranges
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn comparables(&self) -> &[ComparableRecord] {
        &self.comparables
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn validation_message(&self) -> Option<&str> {
        self.validation_message.as_deref()
    }

    pub fn pending_requests(&self) -> Vec<RequestKind> {
        self.requests.pending()
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.property.is_some(), self.mode) {
            (false, _) => SessionPhase::NoProperty,
            (true, RehabMode::Quick) => SessionPhase::QuickMode,
            (true, RehabMode::Detailed) => SessionPhase::DetailedMode,
        }
    }

    pub fn quick_estimate(&self) -> &QuickEstimate {
        &self.derived.quick
    }

    pub fn detailed_estimate(&self) -> &DetailedEstimate {
        &self.derived.detailed
    }

    pub fn total_rehab_cost(&self) -> f64 {
        self.derived.total_rehab_cost
    }

    /// Per-category subtotals; empty outside detailed mode.
    pub fn category_totals(&self) -> &BTreeMap<String, f64> {
        &self.derived.category_totals
    }

    pub fn offers(&self) -> &CalculatedOffers {
        &self.derived.offers
    }

    fn install_property(&mut self, property: PropertyRecord) {
        self.requests.supersede(RequestKind::Comparables);
        self.address_input = property.formatted_address.clone();
        self.property = Some(property);
        self.estimated_arv = None;
        self.comparables.clear();
    }

    fn item_index(&self, item_id: &str) -> Result<usize, SessionError> {
        self.catalog
            .position(item_id)
            .ok_or_else(|| SessionError::UnknownItem(item_id.to_string()))
    }

    fn recompute(&mut self) {
        let empty = PropertyRecord::default();
        let property = self.property.as_ref().unwrap_or(&empty);

        let quick = quick_estimate(property, self.estimated_arv, self.level);
        let detailed = detailed_estimate(&self.catalog, &self.selections, property.square_feet());

        let (total_rehab_cost, category_totals) = match self.mode {
            RehabMode::Quick => (quick.cost as f64, BTreeMap::new()),
            RehabMode::Detailed => (detailed.total, detailed.category_totals.clone()),
        };
        let offers = CalculatedOffers::compute(self.estimated_arv, total_rehab_cost, &self.ranges);

        self.derived = Derived {
            quick,
            detailed,
            total_rehab_cost,
            category_totals,
            offers,
        };
    }
}
