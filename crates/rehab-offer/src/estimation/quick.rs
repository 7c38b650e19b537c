use crate::formatting::round_half_up;
use crate::property::PropertyRecord;
use serde::{Deserialize, Serialize};

pub const EXTRA_BATHROOM_COST: f64 = 4_000.0;
pub const AGE_PREMIUM_CUTOFF_YEAR: i32 = 1980;
pub const AGE_PREMIUM_MULTIPLIER: f64 = 1.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RehabLevel {
    Light,
    #[default]
    Mid,
    Full,
}

impl RehabLevel {
    pub const fn ordered() -> [Self; 3] {
        [Self::Light, Self::Mid, Self::Full]
    }

    /// Base cost per square foot before the finish-tier multiplier.
    pub const fn base_rate(self) -> f64 {
        match self {
            Self::Light => 15.0,
            Self::Mid => 30.0,
            Self::Full => 50.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light Rehab",
            Self::Mid => "Medium Rehab",
            Self::Full => "Full Rehab",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Light => "Paint, flooring, light fixtures, minor repairs",
            Self::Mid => "Kitchen refresh, bathroom updates, some system repairs",
            Self::Full => "Complete renovation including kitchen, baths, and all systems",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "mid" | "medium" => Some(Self::Mid),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

/// Finish quality implied by the after-repair value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArvTier {
    Standard,
    MidGrade,
    HighEnd,
    Luxury,
}

impl ArvTier {
    pub fn for_arv(arv: f64) -> Self {
        if arv < 300_000.0 {
            Self::Standard
        } else if arv < 600_000.0 {
            Self::MidGrade
        } else if arv < 900_000.0 {
            Self::HighEnd
        } else {
            Self::Luxury
        }
    }

    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Standard => 0.85,
            Self::MidGrade => 1.00,
            Self::HighEnd => 1.20,
            Self::Luxury => 1.40,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::MidGrade => "Mid-grade",
            Self::HighEnd => "High-end",
            Self::Luxury => "Luxury",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickEstimate {
    pub level: RehabLevel,
    pub cost: i64,
    pub tier: ArvTier,
    pub tier_label: &'static str,
    pub multiplier: f64,
    pub adjusted_rate: f64,
    pub bathroom_add_on: f64,
    pub age_premium_applied: bool,
    pub description: &'static str,
    /// Set when no usable ARV was available; the tier then defaults to
    /// Standard with a neutral multiplier.
    pub provisional: bool,
}

/// Flat-rate rehab estimate from area, bathrooms, age and finish tier.
///
/// Without a positive ARV the estimate is still produced using the Standard
/// tier at multiplier 1.0 and flagged provisional.
pub fn quick_estimate(
    property: &PropertyRecord,
    arv: Option<f64>,
    level: RehabLevel,
) -> QuickEstimate {
    let usable_arv = arv.filter(|value| value.is_finite() && *value > 0.0);
    let (tier, multiplier, provisional) = match usable_arv {
        Some(value) => {
            let tier = ArvTier::for_arv(value);
            (tier, tier.multiplier(), false)
        }
        None => (ArvTier::Standard, 1.0, true),
    };

    let adjusted_rate = level.base_rate() * multiplier;
    let mut cost = property.square_feet() * adjusted_rate;

    let bathroom_add_on = match property.bathrooms {
        Some(baths) if baths.is_finite() && baths > 1.0 => (baths - 1.0) * EXTRA_BATHROOM_COST,
        _ => 0.0,
    };
    cost += bathroom_add_on;

    let age_premium_applied = property
        .year_built
        .map(|year| year < AGE_PREMIUM_CUTOFF_YEAR)
        .unwrap_or(false);
    if age_premium_applied {
        cost *= AGE_PREMIUM_MULTIPLIER;
    }

    QuickEstimate {
        level,
        cost: round_half_up(cost),
        tier,
        tier_label: tier.label(),
        multiplier,
        adjusted_rate,
        bathroom_add_on,
        age_premium_applied,
        description: level.description(),
        provisional,
    }
}
