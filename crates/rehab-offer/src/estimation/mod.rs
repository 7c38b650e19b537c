//! Pure rehab cost and offer formulas.

mod catalog;
mod detailed;
mod offers;
mod quick;

pub use catalog::{CatalogError, RehabCatalog, RehabItem};
pub use detailed::{detailed_estimate, DetailedEstimate, EstimateLine, ItemSelection};
pub use offers::{
    max_suggested_offer, ranged_offer, CalculatedOffers, OfferRanges, MAX_OFFER_ARV_SHARE,
};
pub use quick::{
    quick_estimate, ArvTier, QuickEstimate, RehabLevel, AGE_PREMIUM_CUTOFF_YEAR,
    AGE_PREMIUM_MULTIPLIER, EXTRA_BATHROOM_COST,
};
