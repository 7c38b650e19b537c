use crate::formatting::round_half_up;
use crate::input::{parse_percentage, ValidationError};
use serde::{Deserialize, Serialize};

/// Share of ARV an investor pays before subtracting rehab (the "70% rule").
pub const MAX_OFFER_ARV_SHARE: f64 = 0.70;

/// `round(arv * 0.70 - rehab_cost)`; negative results mean the deal does not pencil.
pub fn max_suggested_offer(arv: f64, rehab_cost: f64) -> i64 {
    round_half_up(arv * MAX_OFFER_ARV_SHARE - rehab_cost)
}

pub fn ranged_offer(arv: f64, pct: f64) -> i64 {
    round_half_up(arv * pct / 100.0)
}

/// Percent-of-ARV offer bands plus the fee percentage shown beside them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfferRanges {
    pub low: f64,
    pub top: f64,
    pub fair_cash: f64,
    #[serde(default = "default_fee_percentage")]
    pub fee_percentage: f64,
}

fn default_fee_percentage() -> f64 {
    4.0
}

impl Default for OfferRanges {
    fn default() -> Self {
        Self {
            low: 65.0,
            top: 80.0,
            fair_cash: 75.0,
            fee_percentage: default_fee_percentage(),
        }
    }
}

impl OfferRanges {
    pub fn new(low: f64, top: f64, fair_cash: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            low: parse_percentage("low range percentage", low)?,
            top: parse_percentage("top range percentage", top)?,
            fair_cash: parse_percentage("fair cash percentage", fair_cash)?,
            fee_percentage: default_fee_percentage(),
        })
    }

    pub fn with_fee_percentage(mut self, fee_percentage: f64) -> Result<Self, ValidationError> {
        self.fee_percentage = parse_percentage("fee percentage", fee_percentage)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        Self::new(self.low, self.top, self.fair_cash)?.with_fee_percentage(self.fee_percentage)?;
        Ok(())
    }
}

/// Offer figures derived from ARV. `None` means ARV was absent or not positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedOffers {
    pub low_range: Option<i64>,
    pub top_range: Option<i64>,
    pub fair_cash_offer: Option<i64>,
    pub max_suggested_offer: Option<i64>,
}

impl CalculatedOffers {
    pub fn compute(arv: Option<f64>, rehab_cost: f64, ranges: &OfferRanges) -> Self {
        let Some(arv) = arv.filter(|value| value.is_finite() && *value > 0.0) else {
            return Self::default();
        };

        let rehab_cost = if rehab_cost.is_finite() { rehab_cost } else { 0.0 };

        Self {
            low_range: Some(ranged_offer(arv, ranges.low)),
            top_range: Some(ranged_offer(arv, ranges.top)),
            fair_cash_offer: Some(ranged_offer(arv, ranges.fair_cash)),
            max_suggested_offer: Some(max_suggested_offer(arv, rehab_cost)),
        }
    }

    pub fn is_computable(&self) -> bool {
        self.max_suggested_offer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_offer_applies_seventy_percent_rule() {
        assert_eq!(max_suggested_offer(675_000.0, 120_353.0), 352_147);
        assert_eq!(max_suggested_offer(300_000.0, 0.0), 210_000);
    }

    #[test]
    fn max_offer_goes_negative_without_clamping() {
        assert_eq!(max_suggested_offer(100_000.0, 90_000.0), -20_000);
    }

    #[test]
    fn ranged_offer_edges() {
        assert_eq!(ranged_offer(675_000.0, 0.0), 0);
        assert_eq!(ranged_offer(675_000.0, 100.0), 675_000);
        assert_eq!(ranged_offer(675_000.0, 65.0), 438_750);
        assert_eq!(ranged_offer(333_333.0, 75.0), 250_000);
    }

    #[test]
    fn offers_are_not_computable_without_positive_arv() {
        let ranges = OfferRanges::default();
        assert_eq!(
            CalculatedOffers::compute(None, 10_000.0, &ranges),
            CalculatedOffers::default()
        );
        assert!(!CalculatedOffers::compute(Some(0.0), 0.0, &ranges).is_computable());
        assert!(!CalculatedOffers::compute(Some(-5.0), 0.0, &ranges).is_computable());
    }

    #[test]
    fn offers_use_each_range_independently() {
        let ranges = OfferRanges::default();
        let offers = CalculatedOffers::compute(Some(400_000.0), 50_000.0, &ranges);

        assert_eq!(offers.low_range, Some(260_000));
        assert_eq!(offers.top_range, Some(320_000));
        assert_eq!(offers.fair_cash_offer, Some(300_000));
        assert_eq!(offers.max_suggested_offer, Some(230_000));
    }

    #[test]
    fn ranges_reject_out_of_bounds_percentages() {
        assert!(OfferRanges::new(65.0, 80.0, 75.0).is_ok());
        assert!(OfferRanges::new(65.0, 180.0, 75.0).is_err());
        assert!(OfferRanges::default().with_fee_percentage(-1.0).is_err());
    }
}
