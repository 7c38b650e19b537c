use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Subject property attributes as returned by the lookup provider.
///
/// Every attribute except the address may be missing from the provider
/// response. Missing values are `None` and estimators treat them as
/// "contributes nothing" (zero area, no extra bathrooms, no age premium).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub bedrooms: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub bathrooms: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub square_footage: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year_built: Option<i32>,
    #[serde(
        default,
        deserialize_with = "lenient_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub lot_square_footage: Option<u32>,
}

impl PropertyRecord {
    pub fn square_feet(&self) -> f64 {
        self.square_footage.map(f64::from).unwrap_or(0.0)
    }

    /// One-line summary used by the CLI, e.g. `2817 sqft, 4 beds, 3 baths, built 1979`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(sqft) = self.square_footage {
            parts.push(format!("{sqft} sqft"));
        }
        if let Some(beds) = self.bedrooms {
            parts.push(format!("{beds} beds"));
        }
        if let Some(baths) = self.bathrooms {
            parts.push(format!("{baths} baths"));
        }
        if let Some(year) = self.year_built {
            parts.push(format!("built {year}"));
        }
        if parts.is_empty() {
            "no attributes on record".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Recently sold or listed property used to benchmark value.
///
/// Only the pricing and status fields are interpreted; everything else the
/// provider sends is carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_date: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ComparableRecord {
    /// Sale date when closed, otherwise the listing date.
    pub fn effective_date(&self) -> Option<&str> {
        self.sale_date.as_deref().or(self.list_date.as_deref())
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(numeric_value)
        .filter(|number| *number >= 0.0))
}

fn lenient_whole_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(numeric_value)
        .filter(|number| *number >= 0.0 && *number <= f64::from(u32::MAX))
        .map(|number| number.round() as u32))
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(numeric_value)
        .filter(|number| *number > 0.0 && *number < 10_000.0)
        .map(|number| number.round() as i32))
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
}
