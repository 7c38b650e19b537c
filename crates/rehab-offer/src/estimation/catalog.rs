use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Line item a user can pick in the detailed rehab estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehabItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub unit_cost: f64,
    /// When set and no quantity is entered, the item is priced per square
    /// foot of the subject property.
    #[serde(alias = "per_sqft")]
    pub per_area: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read rehab catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rehab catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("duplicate rehab item id '{0}'")]
    DuplicateId(String),
    #[error("rehab item '{id}' has invalid unit cost {unit_cost}")]
    InvalidUnitCost { id: String, unit_cost: f64 },
    #[error("rehab catalog is empty")]
    Empty,
}

/// Read-only catalog of repair items, grouped by category.
#[derive(Debug, Clone, PartialEq)]
pub struct RehabCatalog {
    items: Vec<RehabItem>,
}

impl RehabCatalog {
    pub fn standard() -> Self {
        Self {
            items: standard_items(),
        }
    }

    pub fn new(items: Vec<RehabItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
            if !item.unit_cost.is_finite() || item.unit_cost < 0.0 {
                return Err(CatalogError::InvalidUnitCost {
                    id: item.id.clone(),
                    unit_cost: item.unit_cost,
                });
            }
        }

        Ok(Self { items })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Expects a header row of `id,name,category,unit,unit_cost,per_sqft`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut items = Vec::new();
        for row in csv_reader.deserialize::<RehabItem>() {
            items.push(row?);
        }
        Self::new(items)
    }

    pub fn items(&self) -> &[RehabItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&RehabItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Category names in the order they first appear.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for item in &self.items {
            if !categories.contains(&item.category.as_str()) {
                categories.push(item.category.as_str());
            }
        }
        categories
    }

    pub fn items_in(&self, category: &str) -> Vec<&RehabItem> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn item(
    id: &str,
    name: &str,
    category: &str,
    unit: &str,
    unit_cost: f64,
    per_area: bool,
) -> RehabItem {
    RehabItem {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        unit: unit.to_string(),
        unit_cost,
        per_area,
    }
}

fn standard_items() -> Vec<RehabItem> {
    vec![
        item("general_dumpster", "Dumpster rental", "General", "each", 650.0, false),
        item("general_permits", "Permits and inspections", "General", "each", 1_500.0, false),
        item("general_cleanout", "Trash cleanout", "General", "each", 1_200.0, false),
        item("general_final_clean", "Final cleaning", "General", "sqft", 0.35, true),
        item("general_pest", "Pest treatment", "General", "each", 450.0, false),
        item("exterior_roof", "Roof replacement (asphalt shingle)", "Exterior", "sqft", 4.5, true),
        item("exterior_paint", "Exterior paint", "Exterior", "sqft", 2.25, true),
        item("exterior_gutters", "Gutters and downspouts", "Exterior", "lf", 9.0, false),
        item("exterior_windows", "Window replacement", "Exterior", "each", 650.0, false),
        item("exterior_landscaping", "Landscaping cleanup", "Exterior", "each", 1_800.0, false),
        item("exterior_driveway", "Driveway repair", "Exterior", "each", 2_500.0, false),
        item("kitchen_cabinets", "Kitchen cabinets", "Kitchen", "lf", 250.0, false),
        item("kitchen_countertops", "Quartz countertops", "Kitchen", "sqft", 65.0, false),
        item("kitchen_appliances", "Appliance package", "Kitchen", "each", 4_500.0, false),
        item("kitchen_backsplash", "Tile backsplash", "Kitchen", "sqft", 18.0, false),
        item("kitchen_sink_faucet", "Sink and faucet", "Kitchen", "each", 550.0, false),
        item("bath_full_remodel", "Full bathroom remodel", "Bathrooms", "each", 9_500.0, false),
        item("bath_vanity", "Vanity with top", "Bathrooms", "each", 850.0, false),
        item("bath_toilet", "Toilet replacement", "Bathrooms", "each", 375.0, false),
        item("bath_tub_surround", "Tub and shower surround", "Bathrooms", "each", 1_800.0, false),
        item("bath_tile_floor", "Bathroom tile floor", "Bathrooms", "sqft", 14.0, false),
        item("interior_paint", "Interior paint", "Interior", "sqft", 2.5, true),
        item("interior_lvp", "Luxury vinyl plank flooring", "Interior", "sqft", 5.0, true),
        item("interior_carpet", "Carpet", "Interior", "sqft", 3.25, false),
        item("interior_doors", "Interior doors", "Interior", "each", 275.0, false),
        item("interior_lighting", "Light fixtures", "Interior", "each", 150.0, false),
        item("interior_drywall", "Drywall repair", "Interior", "sqft", 3.0, false),
        item("systems_hvac", "HVAC replacement", "Systems", "each", 8_500.0, false),
        item("systems_water_heater", "Water heater", "Systems", "each", 1_600.0, false),
        item(
            "systems_electrical_panel",
            "Electrical panel upgrade",
            "Systems",
            "each",
            2_800.0,
            false,
        ),
        item("systems_rewire", "Electrical rewire", "Systems", "sqft", 6.0, true),
        item("systems_repipe", "Plumbing repipe", "Systems", "sqft", 4.0, true),
        item("systems_sewer_line", "Sewer line repair", "Systems", "each", 4_500.0, false),
    ]
}
