//! Quote pricing.
//!
//! A quote is priced in a fixed order:
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Base price from the price table (area, material, size, payment) |
//! | 2    | Rental-duration modifier (signed, relative to the 7-day base) |
//! | 3    | Adjusted subtotal (Step 1 + Step 2, minimum 0) |
//! | 4    | Sales tax on the adjusted subtotal |
//! | 5    | Referral discount, capped at Step 3 + Step 4 |
//! | 6    | Total (Step 3 + Step 4 - Step 5) |
//!
//! The duration modifier is applied before tax and the discount after it.
//! Changing either order changes the tax owed.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use dumpster_core::calculations::compose_quote;
//!
//! let quote = compose_quote(dec!(525), dec!(50), dec!(0), dec!(0.0875));
//!
//! assert_eq!(quote.adjusted_subtotal, dec!(575));
//! assert_eq!(quote.tax, dec!(50.3125));
//! assert_eq!(quote.total, dec!(625.3125));
//! assert_eq!(quote.rounded().total, dec!(625.31));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::common::{max, min, round_half_up};
use super::price_table::PriceTable;
use super::tax::{TaxCalculation, TaxEngine};
use crate::models::{County, MaterialType, PaymentMethod, RentalPeriod, ServiceArea, SizeClass};

/// Errors that can occur while pricing a quote.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The combination has no price leaf and cannot be sold.
    #[error("{material} {size} is not available in {area} for {payment} payment")]
    UnavailableCombination {
        area: ServiceArea,
        material: MaterialType,
        size: SizeClass,
        payment: PaymentMethod,
    },
}

/// Signed price adjustments per rental period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationModifiers {
    modifiers: BTreeMap<RentalPeriod, Decimal>,
}

impl DurationModifiers {
    pub fn new(modifiers: BTreeMap<RentalPeriod, Decimal>) -> Self {
        Self { modifiers }
    }

    /// 3 days -25, 7 days 0, 14 days +50, 30 days +125.
    pub fn standard() -> Self {
        Self::new(BTreeMap::from([
            (RentalPeriod::ThreeDay, dec!(-25)),
            (RentalPeriod::SevenDay, dec!(0)),
            (RentalPeriod::FourteenDay, dec!(50)),
            (RentalPeriod::ThirtyDay, dec!(125)),
        ]))
    }

    /// Modifier for `period`; a period missing from the table adjusts nothing.
    pub fn modifier(
        &self,
        period: RentalPeriod,
    ) -> Decimal {
        self.modifiers.get(&period).copied().unwrap_or(Decimal::ZERO)
    }
}

impl Default for DurationModifiers {
    fn default() -> Self {
        Self::standard()
    }
}

/// Itemized price of a quote. Values are unrounded; use
/// [`QuoteBreakdown::rounded`] for display or persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    /// Base table price.
    pub subtotal: Decimal,

    /// Rental-duration adjustment.
    pub duration_modifier: Decimal,

    /// `subtotal + duration_modifier`, floored at zero. Tax is charged on this.
    pub adjusted_subtotal: Decimal,

    /// `adjusted_subtotal × tax_rate`.
    pub tax: Decimal,

    /// The exact rate applied. Never rounded.
    pub tax_rate: Decimal,

    /// Referral credit actually applied.
    pub applied_discount: Decimal,

    /// Amount due. Never negative.
    pub total: Decimal,
}

impl QuoteBreakdown {
    /// Pre-discount total, the cap on any referral credit.
    pub fn pre_discount_total(&self) -> Decimal {
        self.adjusted_subtotal + self.tax
    }

    /// Copy with every currency field rounded half-up to cents. Each field
    /// is rounded from its exact value; the rate is left untouched.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_half_up(self.subtotal),
            duration_modifier: round_half_up(self.duration_modifier),
            adjusted_subtotal: round_half_up(self.adjusted_subtotal),
            tax: round_half_up(self.tax),
            tax_rate: self.tax_rate,
            applied_discount: round_half_up(self.applied_discount),
            total: round_half_up(self.total),
        }
    }
}

/// Composes an itemized quote.
///
/// A negative `referral_requested` is treated as no discount. A negative
/// adjusted subtotal (a duration discount larger than the base price) is
/// floored at zero so the total can never go negative.
pub fn compose_quote(
    subtotal: Decimal,
    duration_modifier: Decimal,
    referral_requested: Decimal,
    tax_rate: Decimal,
) -> QuoteBreakdown {
    let adjusted_subtotal = max(subtotal + duration_modifier, Decimal::ZERO);
    let tax = adjusted_subtotal * tax_rate;
    let pre_discount_total = adjusted_subtotal + tax;
    let applied_discount = min(max(referral_requested, Decimal::ZERO), pre_discount_total);
    let total = pre_discount_total - applied_discount;

    QuoteBreakdown {
        subtotal,
        duration_modifier,
        adjusted_subtotal,
        tax,
        tax_rate,
        applied_discount,
        total,
    }
}

/// The four keys that select a price, plus the rental period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSelection {
    pub area: ServiceArea,
    pub material: MaterialType,
    pub size: SizeClass,
    pub payment: PaymentMethod,
    #[serde(default)]
    pub rental_period: RentalPeriod,
}

/// A fully priced quote with its tax disclosure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedQuote {
    pub selection: QuoteSelection,
    pub breakdown: QuoteBreakdown,
    pub tax: TaxCalculation,
}

/// Reference data needed to price a quote.
#[derive(Debug, Clone)]
pub struct QuoteCatalog {
    pub prices: PriceTable,
    pub durations: DurationModifiers,
    pub tax: TaxEngine,
}

impl QuoteCatalog {
    pub fn new(
        prices: PriceTable,
        durations: DurationModifiers,
        tax: TaxEngine,
    ) -> Self {
        Self {
            prices,
            durations,
            tax,
        }
    }

    /// Published prices, modifiers and county rates.
    pub fn standard() -> Self {
        Self::new(
            PriceTable::standard(),
            DurationModifiers::standard(),
            TaxEngine::standard(),
        )
    }

    pub fn resolver(&self) -> PricingResolver<'_> {
        PricingResolver::new(&self.prices, &self.durations)
    }

    /// Prices `selection` end to end.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::UnavailableCombination`] when the selection has
    /// no price. No substitute price is ever used.
    pub fn quote(
        &self,
        selection: &QuoteSelection,
        county: Option<County>,
        referral_requested: Decimal,
    ) -> Result<PricedQuote, PricingError> {
        let resolver = self.resolver();
        let base = resolver
            .resolve_base_price(selection.area, selection.material, selection.size, selection.payment)
            .ok_or(PricingError::UnavailableCombination {
                area: selection.area,
                material: selection.material,
                size: selection.size,
                payment: selection.payment,
            })?;
        let modifier = resolver.resolve_duration_modifier(Some(selection.rental_period));

        // Tax is looked up for the adjusted subtotal so the disclosure and
        // the breakdown agree.
        let adjusted = max(base + modifier, Decimal::ZERO);
        let tax = self.tax.calculate_tax(adjusted, county);
        let breakdown = compose_quote(base, modifier, referral_requested, tax.rate);

        debug!(
            ?selection,
            subtotal = %breakdown.subtotal,
            total = %breakdown.total,
            "priced quote"
        );

        Ok(PricedQuote {
            selection: *selection,
            breakdown,
            tax,
        })
    }
}

/// Read-only price lookups over a [`PriceTable`].
#[derive(Debug, Clone, Copy)]
pub struct PricingResolver<'a> {
    prices: &'a PriceTable,
    durations: &'a DurationModifiers,
}

impl<'a> PricingResolver<'a> {
    pub fn new(
        prices: &'a PriceTable,
        durations: &'a DurationModifiers,
    ) -> Self {
        Self { prices, durations }
    }

    /// Base price for a combination, or `None` when it is not offered.
    pub fn resolve_base_price(
        &self,
        area: ServiceArea,
        material: MaterialType,
        size: SizeClass,
        payment: PaymentMethod,
    ) -> Option<Decimal> {
        let price = self.prices.get(area, material, size, payment);
        debug!(%area, %material, size = size.as_str(), %payment, ?price, "resolved base price");
        price
    }

    /// Duration adjustment; an absent period adjusts nothing.
    pub fn resolve_duration_modifier(
        &self,
        period: Option<RentalPeriod>,
    ) -> Decimal {
        period.map_or(Decimal::ZERO, |p| self.durations.modifier(p))
    }

    /// Base price plus duration modifier, the figure shown while the
    /// customer is still choosing.
    pub fn price(
        &self,
        selection: &QuoteSelection,
    ) -> Option<Decimal> {
        self.resolve_base_price(selection.area, selection.material, selection.size, selection.payment)
            .map(|base| base + self.resolve_duration_modifier(Some(selection.rental_period)))
    }

    /// Materials with at least one priced size in `area`, in catalog order.
    pub fn available_materials(
        &self,
        area: ServiceArea,
    ) -> Vec<MaterialType> {
        MaterialType::ALL
            .into_iter()
            .filter(|m| self.prices.has_material(area, *m))
            .collect()
    }

    /// Sizes of `material` priced in `area`, in catalog order.
    pub fn available_sizes(
        &self,
        area: ServiceArea,
        material: MaterialType,
    ) -> Vec<SizeClass> {
        material
            .supported_sizes()
            .iter()
            .copied()
            .filter(|s| self.prices.has_size(area, material, *s))
            .collect()
    }

    /// Whether the size can be offered at all for this area and material.
    pub fn is_available(
        &self,
        area: ServiceArea,
        material: MaterialType,
        size: SizeClass,
    ) -> bool {
        self.prices.has_size(area, material, size)
    }

    /// Cash ("starting at") price shown on size cards.
    pub fn cash_price(
        &self,
        area: ServiceArea,
        material: MaterialType,
        size: SizeClass,
    ) -> Option<Decimal> {
        self.prices.get(area, material, size, PaymentMethod::Cash)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn trees_brush_selection(period: RentalPeriod) -> QuoteSelection {
        QuoteSelection {
            area: ServiceArea::NassauSuffolk,
            material: MaterialType::TreesBrush,
            size: SizeClass::Yards10,
            payment: PaymentMethod::Cash,
            rental_period: period,
        }
    }

    // =========================================================================
    // compose_quote tests
    // =========================================================================

    #[test]
    fn compose_quote_taxes_adjusted_subtotal() {
        let quote = compose_quote(dec!(525), dec!(50), dec!(0), dec!(0.0875));

        assert_eq!(quote.adjusted_subtotal, dec!(575));
        assert_eq!(quote.tax, dec!(50.3125));
        assert_eq!(quote.applied_discount, dec!(0));
        assert_eq!(quote.total, dec!(625.3125));
    }

    #[test]
    fn compose_quote_tax_differs_from_base_only_tax() {
        let quote = compose_quote(dec!(525), dec!(50), dec!(0), dec!(0.0875));

        assert_ne!(quote.tax, dec!(525) * dec!(0.0875));
    }

    #[test]
    fn compose_quote_applies_negative_modifier_before_tax() {
        let quote = compose_quote(dec!(425), dec!(-25), dec!(0), dec!(0.08875));

        assert_eq!(quote.adjusted_subtotal, dec!(400));
        assert_eq!(quote.tax, dec!(35.5));
        assert_eq!(quote.total, dec!(435.5));
    }

    #[test]
    fn compose_quote_applies_discount_after_tax() {
        let quote = compose_quote(dec!(525), dec!(50), dec!(100), dec!(0.0875));

        assert_eq!(quote.tax, dec!(50.3125));
        assert_eq!(quote.applied_discount, dec!(100));
        assert_eq!(quote.total, dec!(525.3125));
    }

    #[test]
    fn compose_quote_caps_discount_at_pre_discount_total() {
        let quote = compose_quote(dec!(525), dec!(50), dec!(10000), dec!(0.0875));

        assert_eq!(quote.applied_discount, dec!(625.3125));
        assert_eq!(quote.total, dec!(0));
    }

    #[test]
    fn compose_quote_ignores_negative_discount() {
        let quote = compose_quote(dec!(100), dec!(0), dec!(-20), dec!(0.0875));

        assert_eq!(quote.applied_discount, dec!(0));
        assert_eq!(quote.total, dec!(108.75));
    }

    #[test]
    fn compose_quote_floors_adjusted_subtotal_at_zero() {
        let quote = compose_quote(dec!(10), dec!(-25), dec!(5), dec!(0.0875));

        assert_eq!(quote.adjusted_subtotal, dec!(0));
        assert_eq!(quote.tax, dec!(0));
        assert_eq!(quote.total, dec!(0));
    }

    #[test]
    fn compose_quote_total_never_negative() {
        let subtotals = [dec!(0), dec!(1), dec!(24.99), dec!(525), dec!(1929.81)];
        let modifiers = [dec!(-125), dec!(-25), dec!(0), dec!(50), dec!(125)];
        let discounts = [dec!(0), dec!(0.01), dec!(100), dec!(99999)];

        for s in subtotals {
            for m in modifiers {
                for d in discounts {
                    let quote = compose_quote(s, m, d, dec!(0.08875));
                    assert!(quote.total >= Decimal::ZERO, "{s} {m} {d}: {quote:?}");
                    assert!(quote.applied_discount <= quote.pre_discount_total());
                }
            }
        }
    }

    #[test]
    fn rounded_keeps_exact_rate() {
        let quote = compose_quote(dec!(525), dec!(50), dec!(0), dec!(0.0875)).rounded();

        assert_eq!(quote.tax, dec!(50.31));
        assert_eq!(quote.total, dec!(625.31));
        assert_eq!(quote.tax_rate, dec!(0.0875));
    }

    // =========================================================================
    // PricingResolver tests
    // =========================================================================

    #[test]
    fn resolve_base_price_matches_every_table_leaf() {
        let catalog = QuoteCatalog::standard();
        let resolver = catalog.resolver();

        for e in catalog.prices.entries() {
            assert_eq!(
                resolver.resolve_base_price(e.area, e.material, e.size, e.payment),
                Some(e.price)
            );
        }
    }

    #[test]
    fn resolve_base_price_returns_none_for_absent_combination() {
        let catalog = QuoteCatalog::standard();

        let price = catalog.resolver().resolve_base_price(
            ServiceArea::NassauSuffolk,
            MaterialType::CleanDirt,
            SizeClass::Yards5,
            PaymentMethod::Cash,
        );

        assert_eq!(price, None);
    }

    #[test]
    fn resolve_duration_modifier_defaults_to_zero() {
        let catalog = QuoteCatalog::standard();
        let resolver = catalog.resolver();

        assert_eq!(resolver.resolve_duration_modifier(None), dec!(0));
        assert_eq!(resolver.resolve_duration_modifier(Some(RentalPeriod::ThreeDay)), dec!(-25));
        assert_eq!(resolver.resolve_duration_modifier(Some(RentalPeriod::ThirtyDay)), dec!(125));
    }

    #[test]
    fn duration_modifier_missing_from_table_is_zero() {
        let durations = DurationModifiers::new(BTreeMap::from([(RentalPeriod::ThreeDay, dec!(-25))]));

        assert_eq!(durations.modifier(RentalPeriod::ThirtyDay), dec!(0));
    }

    #[test]
    fn price_adds_duration_modifier() {
        let catalog = QuoteCatalog::standard();

        let price = catalog
            .resolver()
            .price(&trees_brush_selection(RentalPeriod::FourteenDay));

        assert_eq!(price, Some(dec!(575)));
    }

    #[test]
    fn available_sizes_follow_material_and_table() {
        let catalog = QuoteCatalog::standard();

        let sizes = catalog
            .resolver()
            .available_sizes(ServiceArea::EastRiverhead, MaterialType::TreesBrush);

        assert_eq!(
            sizes,
            vec![
                SizeClass::Yards10,
                SizeClass::Yards15,
                SizeClass::Yards20,
                SizeClass::Yards30,
                SizeClass::Yards40
            ]
        );
    }

    #[test]
    fn available_options_filter_out_unpriced_combinations() {
        let prices = PriceTable::from_entries([crate::calculations::PriceEntry {
            area: ServiceArea::EastRiverhead,
            material: MaterialType::Asphalt,
            size: SizeClass::Yards10,
            payment: PaymentMethod::Credit,
            price: dec!(867.01),
        }])
        .unwrap();
        let durations = DurationModifiers::standard();
        let resolver = PricingResolver::new(&prices, &durations);

        assert_eq!(
            resolver.available_materials(ServiceArea::EastRiverhead),
            vec![MaterialType::Asphalt]
        );
        assert!(resolver.available_materials(ServiceArea::NassauSuffolk).is_empty());
        assert_eq!(
            resolver.available_sizes(ServiceArea::EastRiverhead, MaterialType::Asphalt),
            vec![SizeClass::Yards10]
        );
        assert_eq!(
            resolver.cash_price(ServiceArea::EastRiverhead, MaterialType::Asphalt, SizeClass::Yards10),
            None
        );
    }

    // =========================================================================
    // QuoteCatalog::quote tests
    // =========================================================================

    #[test]
    fn quote_matches_published_example() {
        let catalog = QuoteCatalog::standard();

        let quote = catalog
            .quote(&trees_brush_selection(RentalPeriod::FourteenDay), Some(County::Suffolk), dec!(0))
            .unwrap();

        assert_eq!(quote.breakdown.subtotal, dec!(525));
        assert_eq!(quote.breakdown.adjusted_subtotal, dec!(575));
        assert_eq!(quote.breakdown.tax, dec!(50.3125));
        assert_eq!(quote.breakdown.total, dec!(625.3125));
        assert_eq!(quote.tax.tax, quote.breakdown.tax);
        assert_eq!(quote.tax.county_label, "Suffolk County");
    }

    #[test]
    fn quote_discloses_default_county() {
        let catalog = QuoteCatalog::standard();

        let quote = catalog
            .quote(&trees_brush_selection(RentalPeriod::SevenDay), None, dec!(0))
            .unwrap();

        assert!(quote.tax.is_default);
        assert_eq!(quote.breakdown.tax_rate, dec!(0.0875));
    }

    #[test]
    fn quote_rejects_unavailable_combination() {
        let catalog = QuoteCatalog::standard();
        let selection = QuoteSelection {
            size: SizeClass::Yards5,
            ..trees_brush_selection(RentalPeriod::SevenDay)
        };

        let result = catalog.quote(&selection, Some(County::Nassau), dec!(0));

        assert_eq!(
            result,
            Err(PricingError::UnavailableCombination {
                area: ServiceArea::NassauSuffolk,
                material: MaterialType::TreesBrush,
                size: SizeClass::Yards5,
                payment: PaymentMethod::Cash,
            })
        );
    }
}
