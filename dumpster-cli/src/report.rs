//! Plain-text rendering of quotes and route plans.

use chrono::NaiveDate;
use dumpster_core::calculations::common::{format_currency, format_tax_rate};
use dumpster_core::routing::format_eta;
use dumpster_core::{
    MaterialType, PricedQuote, QuoteCatalog, QuoteRecord, QuoteSubmission, RoutePlan, ServiceArea,
};

/// Itemized quote as shown on the review step.
pub fn render_quote(quote: &PricedQuote) -> String {
    let s = &quote.selection;
    let b = quote.breakdown.rounded();

    let mut lines = vec![
        format!("Service area:   {}", s.area.name()),
        format!("Material:       {}", s.material.name()),
        format!("Container:      {}", s.size),
        format!("Rental period:  {}", s.rental_period.name()),
        format!("Payment:        {}", s.payment.name()),
        String::new(),
        format!("Base price:     {:>12}", format_currency(b.subtotal)),
    ];
    if !b.duration_modifier.is_zero() {
        lines.push(format!("Duration:       {:>12}", format_currency(b.duration_modifier)));
    }
    lines.push(format!(
        "Tax ({} {}): {:>12}",
        quote.tax.county_label,
        format_tax_rate(b.tax_rate),
        format_currency(b.tax)
    ));
    if !b.applied_discount.is_zero() {
        lines.push(format!("Referral credit: {:>11}", format_currency(-b.applied_discount)));
    }
    lines.push(format!("Total:          {:>12}", format_currency(b.total)));
    lines.join("\n")
}

/// Confirmation shown after a quote is stored.
pub fn render_submission(
    submission: &QuoteSubmission,
    record: &QuoteRecord,
) -> String {
    [
        format!("Reference:      {}", record.reference_number),
        format!("Status:         {}", record.status.as_str()),
        format!("Customer:       {}", record.customer_name),
        format!("Delivery to:    {}", submission.delivery_address.address),
        format!("Photos:         {}", submission.photos.len()),
        String::new(),
        render_quote(&submission.quote),
    ]
    .join("\n")
}

/// One line per stored quote.
pub fn render_record_list(records: &[QuoteRecord]) -> String {
    if records.is_empty() {
        return "No quotes.".to_string();
    }
    records
        .iter()
        .map(|r| {
            format!(
                "{:<20} {:<10} {:<28} {:>6} {:>12}  {}",
                r.reference_number,
                r.status.as_str(),
                r.material.name(),
                r.size.to_string(),
                format_currency(r.total_price),
                r.customer_name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sizes and "starting at" cash prices for a material in an area.
pub fn render_price_list(
    catalog: &QuoteCatalog,
    area: ServiceArea,
    material: Option<MaterialType>,
) -> String {
    let resolver = catalog.resolver();
    let materials = match material {
        Some(m) => vec![m],
        None => resolver.available_materials(area),
    };

    let mut lines = vec![format!("{} ({})", area.name(), area.description())];
    for material in materials {
        lines.push(format!("  {}", material.name()));
        let sizes = resolver.available_sizes(area, material);
        if sizes.is_empty() {
            lines.push("    not offered".to_string());
        }
        for size in sizes {
            if let Some(price) = resolver.cash_price(area, material, size) {
                lines.push(format!("    {:>6}  from {}", size.to_string(), format_currency(price)));
            }
        }
    }
    lines.join("\n")
}

/// Stop list with arrival times, followed by totals and the maps link.
pub fn render_route(
    plan: &RoutePlan,
    date: NaiveDate,
) -> String {
    let mut lines = vec![format!(
        "Route for {} ({} stops, departing {})",
        date.format("%a %b %-d, %Y"),
        plan.stops().len(),
        plan.start_time().format("%-I:%M %p")
    )];

    let etas = plan.etas(date);
    let legs = plan.legs();
    for (i, stop) in plan.stops().iter().enumerate() {
        let eta = etas
            .get(i)
            .copied()
            .flatten()
            .map_or_else(|| "--".to_string(), format_eta);
        let leg = legs
            .get(i)
            .copied()
            .flatten()
            .and_then(|l| l.distance.as_ref())
            .map_or(String::new(), |d| format!(" ({})", d.text));
        let slot = if stop.time_slot.is_empty() {
            String::new()
        } else {
            format!(" [{}]", stop.time_slot)
        };
        lines.push(format!(
            "{:>2}. {:>8}  {}{}{}",
            i + 1,
            eta,
            stop.address,
            slot,
            leg
        ));
    }

    if let Some(totals) = plan.totals() {
        lines.push(format!(
            "Total: {}, {}",
            totals.distance_label(),
            totals.duration_label()
        ));
    }
    if let Some(url) = plan.maps_url() {
        lines.push(url);
    }
    lines.join("\n")
}
