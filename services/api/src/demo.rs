use crate::infra::{load_catalog, parse_amount, parse_level};
use chrono::Local;
use clap::Args;
use rehab_offer::config::AppConfig;
use rehab_offer::error::AppError;
use rehab_offer::estimation::{OfferRanges, RehabCatalog, RehabLevel};
use rehab_offer::formatting::{format_currency, format_date, format_optional_currency, format_rate};
use rehab_offer::lookup::{PropertyProvider, RealieClient};
use rehab_offer::property::{ComparableRecord, PropertyRecord};
use rehab_offer::session::{OfferSession, RehabMode, SessionId};
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct QuickArgs {
    /// Living area in square feet
    #[arg(long)]
    pub(crate) sqft: u32,
    /// Bathroom count (fractions allowed, e.g. 2.5)
    #[arg(long)]
    pub(crate) baths: Option<f64>,
    /// Year the property was built
    #[arg(long)]
    pub(crate) year_built: Option<i32>,
    /// After-repair value, e.g. 675000 or "$675,000"
    #[arg(long, value_parser = parse_amount)]
    pub(crate) arv: Option<f64>,
    /// Rehab level: light, mid, or full
    #[arg(long, value_parser = parse_level, default_value = "mid")]
    pub(crate) level: RehabLevel,
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Street address of the subject property
    #[arg(long)]
    pub(crate) address: String,
    /// After-repair value override
    #[arg(long, value_parser = parse_amount)]
    pub(crate) arv: Option<f64>,
    /// Rehab level: light, mid, or full
    #[arg(long, value_parser = parse_level, default_value = "mid")]
    pub(crate) level: RehabLevel,
    /// Also fetch comparable sales
    #[arg(long)]
    pub(crate) comps: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the detailed line-item portion of the demo.
    #[arg(long)]
    pub(crate) skip_detailed: bool,
}

const DEMO_ARV: f64 = 675_000.0;
const DEMO_ITEMS: [(&str, Option<f64>); 5] = [
    ("general_dumpster", None),
    ("interior_paint", None),
    ("interior_lvp", None),
    ("kitchen_cabinets", Some(24.0)),
    ("systems_hvac", None),
];

pub(crate) fn run_quick(args: QuickArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let property = PropertyRecord {
        formatted_address: "Manual entry".to_string(),
        bathrooms: args.baths,
        square_footage: Some(args.sqft),
        year_built: args.year_built,
        ..PropertyRecord::default()
    };

    let mut session = new_session(Arc::new(load_catalog(&config)?), config.offers);
    session.select_property(property);
    session.set_mode(RehabMode::Quick);
    session.set_level(args.level);
    session.set_arv_value(args.arv);

    print!("{}", render_quick_estimate(&session));
    print!("{}", render_offers(&session));
    Ok(())
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let client = RealieClient::from_config(&config.provider)?;
    let mut session = new_session(Arc::new(load_catalog(&config)?), config.offers);

    let ticket = session.begin_lookup(args.address.trim());
    let result = client.lookup(args.address.trim()).await;
    if let Err(err) = &result {
        session.complete_lookup(ticket, Err(err.clone()));
        return Err(AppError::from(err.clone()));
    }
    session.complete_lookup(ticket, result);
    session.set_mode(RehabMode::Quick);
    session.set_level(args.level);
    session.set_arv_value(args.arv);

    println!("Offer analysis as of {}", Local::now().format("%b %-d, %Y"));
    print!("{}", render_property(&session));
    print!("{}", render_quick_estimate(&session));
    print!("{}", render_offers(&session));

    if args.comps {
        match session.begin_comparables() {
            Ok((ticket, address)) => {
                let result = client.comparables(&address).await;
                session.complete_comparables(ticket, result);
                match session.error_message() {
                    Some(message) => println!("\nComparables unavailable: {message}"),
                    None => print!("{}", render_comparables(session.comparables())),
                }
            }
            Err(err) => println!("\nComparables unavailable: {err}"),
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut session = new_session(Arc::new(RehabCatalog::standard()), OfferRanges::default());
    session.select_property(demo_property());
    session.set_mode(RehabMode::Quick);
    session.set_level(RehabLevel::Mid);
    session.set_arv_value(Some(DEMO_ARV));

    println!("Rehab offer demo");
    print!("{}", render_property(&session));
    print!("{}", render_quick_estimate(&session));
    print!("{}", render_offers(&session));

    if args.skip_detailed {
        return Ok(());
    }

    session.set_mode(RehabMode::Detailed);
    for (item_id, quantity) in DEMO_ITEMS {
        let applied = session.set_item_selected(item_id, true).and_then(|()| match quantity {
            Some(quantity) => session.set_item_quantity(item_id, &quantity.into()),
            None => Ok(()),
        });
        if let Err(err) = applied {
            println!("  skipped {item_id}: {err}");
        }
    }

    print!("{}", render_detailed_estimate(&session));
    print!("{}", render_offers(&session));
    Ok(())
}

fn new_session(catalog: Arc<RehabCatalog>, ranges: OfferRanges) -> OfferSession {
    OfferSession::new(SessionId("cli".to_string()), catalog, ranges)
}

pub(crate) fn demo_property() -> PropertyRecord {
    PropertyRecord {
        formatted_address: "123 Main St, Springfield, IL 62704".to_string(),
        property_type: Some("Single Family".to_string()),
        bedrooms: Some(4),
        bathrooms: Some(3.0),
        square_footage: Some(2817),
        year_built: Some(1979),
        lot_square_footage: Some(7405),
    }
}

pub(crate) fn render_property(session: &OfferSession) -> String {
    let mut out = String::new();
    match session.property() {
        Some(property) => {
            let _ = writeln!(out, "\nSubject property: {}", property.formatted_address);
            let _ = writeln!(out, "- {}", property.summary());
        }
        None => {
            let _ = writeln!(out, "\nNo property selected ({})", session.address_input());
        }
    }
    let _ = writeln!(
        out,
        "- Estimated ARV: {}",
        format_optional_currency(session.estimated_arv())
    );
    out
}

pub(crate) fn render_quick_estimate(session: &OfferSession) -> String {
    let estimate = session.quick_estimate();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nQuick estimate ({}, {} tier)",
        estimate.level.label(),
        estimate.tier_label
    );
    let _ = writeln!(out, "- {}", estimate.description);
    let _ = writeln!(
        out,
        "- Rate: ${}/sqft (x{:.2} multiplier)",
        format_rate(estimate.adjusted_rate),
        estimate.multiplier
    );
    if estimate.bathroom_add_on > 0.0 {
        let _ = writeln!(
            out,
            "- Extra bathrooms: {}",
            format_currency(estimate.bathroom_add_on)
        );
    }
    if estimate.age_premium_applied {
        let _ = writeln!(out, "- Pre-1980 construction premium applied");
    }
    let _ = writeln!(out, "- Rehab cost: {}", format_currency(estimate.cost as f64));
    if estimate.provisional {
        let _ = writeln!(out, "  (provisional: enter an ARV to apply the tier multiplier)");
    }
    out
}

pub(crate) fn render_detailed_estimate(session: &OfferSession) -> String {
    let estimate = session.detailed_estimate();
    let mut out = String::new();
    let _ = writeln!(out, "\nDetailed estimate ({} items)", estimate.lines.len());
    for line in &estimate.lines {
        let _ = writeln!(
            out,
            "  - {} [{}]: {} {} x {} = {}",
            line.name,
            line.category,
            line.quantity,
            line.unit,
            format_rate(line.unit_cost),
            format_currency(line.cost)
        );
    }
    let _ = writeln!(out, "Category totals:");
    for (category, total) in session.category_totals() {
        let _ = writeln!(out, "  - {category}: {}", format_currency(*total));
    }
    let _ = writeln!(
        out,
        "- Total rehab cost: {}",
        format_currency(session.total_rehab_cost())
    );
    out
}

pub(crate) fn render_offers(session: &OfferSession) -> String {
    let offers = session.offers();
    let ranges = session.offer_ranges();
    let amount = |value: Option<i64>| format_optional_currency(value.map(|v| v as f64));

    let mut out = String::new();
    let _ = writeln!(out, "\nOffers");
    let _ = writeln!(
        out,
        "- Max suggested offer (70% of ARV less rehab): {}",
        amount(offers.max_suggested_offer)
    );
    let _ = writeln!(out, "- Low range ({}%): {}", ranges.low, amount(offers.low_range));
    let _ = writeln!(out, "- Top range ({}%): {}", ranges.top, amount(offers.top_range));
    let _ = writeln!(
        out,
        "- Fair cash offer ({}%): {}",
        ranges.fair_cash,
        amount(offers.fair_cash_offer)
    );
    let _ = writeln!(out, "- Fee: {}%", ranges.fee_percentage);
    if let Some(message) = session.validation_message() {
        let _ = writeln!(out, "  ! {message}");
    }
    out
}

pub(crate) fn render_comparables(comparables: &[ComparableRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nComparables ({})", comparables.len());
    for comp in comparables {
        let _ = writeln!(
            out,
            "  - {} | {} | {} | {}",
            comp.formatted_address.as_deref().unwrap_or("(address withheld)"),
            comp.status.as_deref().unwrap_or("Unknown"),
            format_optional_currency(comp.sale_price),
            comp.effective_date().map(format_date).unwrap_or_else(|| "N/A".to_string())
        );
    }
    out
}
