use super::catalog::{RehabCatalog, RehabItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-session choice for one catalog item. A zero quantity means "use the
/// default quantity": the property's square footage for per-area items,
/// otherwise one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemSelection {
    pub selected: bool,
    pub quantity: f64,
}

impl ItemSelection {
    pub fn effective_quantity(&self, item: &RehabItem, square_feet: f64) -> f64 {
        if self.quantity > 0.0 {
            self.quantity
        } else if item.per_area {
            square_feet
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateLine {
    pub item_id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub unit_cost: f64,
    pub quantity: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailedEstimate {
    pub lines: Vec<EstimateLine>,
    pub category_totals: BTreeMap<String, f64>,
    pub total: f64,
}

/// Sums selected line items. `selections` is parallel to `catalog.items()`;
/// missing trailing entries count as unselected.
pub fn detailed_estimate(
    catalog: &RehabCatalog,
    selections: &[ItemSelection],
    square_feet: f64,
) -> DetailedEstimate {
    let square_feet = if square_feet.is_finite() && square_feet > 0.0 {
        square_feet
    } else {
        0.0
    };

    let mut estimate = DetailedEstimate::default();
    for (item, selection) in catalog.items().iter().zip(selections) {
        if !selection.selected {
            continue;
        }

        let quantity = selection.effective_quantity(item, square_feet);
        let cost = item.unit_cost * quantity;

        *estimate
            .category_totals
            .entry(item.category.clone())
            .or_insert(0.0) += cost;
        estimate.total += cost;
        estimate.lines.push(EstimateLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            unit: item.unit.clone(),
            unit_cost: item.unit_cost,
            quantity,
            cost,
        });
    }

    estimate
}
