//! County sales-tax calculation.
//!
//! New York sales tax is the sum of a state component and a county
//! component. Only the combined rate is used for computation; the split is
//! kept for disclosure on invoices.
//!
//! When the delivery county cannot be determined the engine does **not**
//! fail. It charges the default county's rate and labels the line
//! `"<County> (default)"` so the estimate can be disclosed to the customer.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use dumpster_core::County;
//! use dumpster_core::calculations::TaxEngine;
//!
//! let engine = TaxEngine::standard();
//!
//! let confirmed = engine.calculate_tax(dec!(575), Some(County::Suffolk));
//! assert_eq!(confirmed.tax, dec!(50.3125));
//! assert_eq!(confirmed.county_label, "Suffolk County");
//!
//! let estimated = engine.calculate_tax(dec!(575), None);
//! assert_eq!(estimated.rate, dec!(0.0875));
//! assert_eq!(estimated.county_label, "Suffolk County (default)");
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{AddressComponents, COUNTY_COMPONENT, County};

/// Errors raised when building a custom rate table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxTableError {
    /// The default county has no rate, so undetermined addresses could not
    /// be taxed.
    #[error("default county '{0}' has no tax rate")]
    MissingDefaultRate(County),

    /// A rate component is negative.
    #[error("negative tax rate for county '{0}'")]
    NegativeRate(County),
}

/// Combined sales-tax rate for one county.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyRate {
    pub state_rate: Decimal,
    pub local_rate: Decimal,
}

impl CountyRate {
    pub fn new(
        state_rate: Decimal,
        local_rate: Decimal,
    ) -> Self {
        Self {
            state_rate,
            local_rate,
        }
    }

    /// The applied rate.
    pub fn total(&self) -> Decimal {
        self.state_rate + self.local_rate
    }
}

/// Rate reference data plus the county used when detection fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountyRateTable {
    rates: BTreeMap<County, CountyRate>,
    default_county: County,
}

impl CountyRateTable {
    pub fn new(
        rates: BTreeMap<County, CountyRate>,
        default_county: County,
    ) -> Result<Self, TaxTableError> {
        if let Some((county, _)) = rates
            .iter()
            .find(|(_, r)| r.state_rate.is_sign_negative() || r.local_rate.is_sign_negative())
        {
            return Err(TaxTableError::NegativeRate(*county));
        }
        if !rates.contains_key(&default_county) {
            return Err(TaxTableError::MissingDefaultRate(default_county));
        }
        Ok(Self {
            rates,
            default_county,
        })
    }

    /// Nassau 4% + 4.875%, Suffolk 4% + 4.75%, defaulting to Suffolk.
    pub fn standard() -> Self {
        let rates = BTreeMap::from([
            (County::Nassau, CountyRate::new(dec!(0.04), dec!(0.04875))),
            (County::Suffolk, CountyRate::new(dec!(0.04), dec!(0.0475))),
        ]);
        Self {
            rates,
            default_county: County::Suffolk,
        }
    }

    pub fn rate(
        &self,
        county: County,
    ) -> Option<&CountyRate> {
        self.rates.get(&county)
    }

    pub fn default_county(&self) -> County {
        self.default_county
    }

    fn default_rate(&self) -> &CountyRate {
        // Presence is checked in `new` and guaranteed by `standard`.
        &self.rates[&self.default_county]
    }
}

impl Default for CountyRateTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Result of a tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculation {
    /// `subtotal × rate`, unrounded.
    pub tax: Decimal,

    /// The exact combined rate applied.
    pub rate: Decimal,

    /// County whose rate was applied.
    pub county: County,

    /// Human label, suffixed with `(default)` for estimates.
    pub county_label: String,

    /// True when the county was not determined and the default was used.
    pub is_default: bool,
}

/// Computes sales tax for a subtotal and a (possibly undetermined) county.
#[derive(Debug, Clone, Default)]
pub struct TaxEngine {
    rates: CountyRateTable,
}

impl TaxEngine {
    pub fn new(rates: CountyRateTable) -> Self {
        Self { rates }
    }

    pub fn standard() -> Self {
        Self::new(CountyRateTable::standard())
    }

    pub fn rates(&self) -> &CountyRateTable {
        &self.rates
    }

    /// Calculates tax on `subtotal`.
    ///
    /// Never fails: a missing or unrated county falls back to the table's
    /// default county and the result is flagged with `is_default`.
    pub fn calculate_tax(
        &self,
        subtotal: Decimal,
        county: Option<County>,
    ) -> TaxCalculation {
        let requested = county;
        match county.and_then(|c| self.rates.rate(c).map(|r| (c, r))) {
            Some((county, rate)) => {
                let rate = rate.total();
                debug!(%county, %rate, %subtotal, "applying county tax rate");
                TaxCalculation {
                    tax: subtotal * rate,
                    rate,
                    county,
                    county_label: county.name().to_string(),
                    is_default: false,
                }
            }
            None => {
                let county = self.rates.default_county();
                let rate = self.rates.default_rate().total();
                warn!(
                    requested = ?requested,
                    default = %county,
                    %rate,
                    "county undetermined, applying default tax rate"
                );
                TaxCalculation {
                    tax: subtotal * rate,
                    rate,
                    county,
                    county_label: format!("{} (default)", county.name()),
                    is_default: true,
                }
            }
        }
    }
}

/// Detects the delivery county from geocoder address components.
///
/// The county component is scanned first; only when it names no known
/// county is the concatenation of every component scanned. Matching is a
/// case-insensitive substring test and the first county (in
/// [`County::ALL`] order) that matches wins.
pub fn detect_county(components: &AddressComponents) -> Option<County> {
    let county_field = components
        .get(COUNTY_COMPONENT)
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    if let Some(county) = match_county(&county_field) {
        return Some(county);
    }

    let full_address = components
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    match_county(&full_address)
}

fn match_county(haystack: &str) -> Option<County> {
    if haystack.is_empty() {
        return None;
    }
    County::ALL
        .into_iter()
        .find(|county| haystack.contains(county.as_str()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn components(pairs: &[(&str, &str)]) -> AddressComponents {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // =========================================================================
    // calculate_tax tests
    // =========================================================================

    #[test]
    fn calculate_tax_uses_suffolk_rate() {
        let result = TaxEngine::standard().calculate_tax(dec!(575), Some(County::Suffolk));

        assert_eq!(result.tax, dec!(50.3125));
        assert_eq!(result.rate, dec!(0.0875));
        assert_eq!(result.county_label, "Suffolk County");
        assert!(!result.is_default);
    }

    #[test]
    fn calculate_tax_uses_nassau_rate() {
        let result = TaxEngine::standard().calculate_tax(dec!(1000), Some(County::Nassau));

        assert_eq!(result.tax, dec!(88.75));
        assert_eq!(result.rate, dec!(0.08875));
        assert_eq!(result.county_label, "Nassau County");
    }

    #[test]
    fn calculate_tax_defaults_to_suffolk_when_undetermined() {
        let result = TaxEngine::standard().calculate_tax(dec!(1000), None);

        assert_eq!(result.rate, dec!(0.0875));
        assert_eq!(result.tax, dec!(87.5));
        assert_eq!(result.county, County::Suffolk);
        assert!(result.county_label.contains("(default)"));
        assert!(result.is_default);
    }

    #[test]
    fn calculate_tax_defaults_when_county_missing_from_custom_table() {
        let rates = BTreeMap::from([(County::Suffolk, CountyRate::new(dec!(0.04), dec!(0.0475)))]);
        let engine = TaxEngine::new(CountyRateTable::new(rates, County::Suffolk).unwrap());

        let result = engine.calculate_tax(dec!(100), Some(County::Nassau));

        assert_eq!(result.county_label, "Suffolk County (default)");
        assert_eq!(result.tax, dec!(8.75));
    }

    #[test]
    fn calculate_tax_keeps_full_precision() {
        let result = TaxEngine::standard().calculate_tax(dec!(0.01), Some(County::Nassau));

        assert_eq!(result.tax, dec!(0.0008875));
    }

    #[test]
    fn rate_components_sum_to_applied_rate() {
        let table = CountyRateTable::standard();

        assert_eq!(table.rate(County::Nassau).unwrap().total(), dec!(0.08875));
        assert_eq!(table.rate(County::Suffolk).unwrap().total(), dec!(0.0875));
    }

    #[test]
    fn rate_table_requires_default_county_rate() {
        let rates = BTreeMap::from([(County::Nassau, CountyRate::new(dec!(0.04), dec!(0.04875)))]);

        assert_eq!(
            CountyRateTable::new(rates, County::Suffolk),
            Err(TaxTableError::MissingDefaultRate(County::Suffolk))
        );
    }

    #[test]
    fn rate_table_rejects_negative_components() {
        let rates = BTreeMap::from([(County::Suffolk, CountyRate::new(dec!(0.04), dec!(-0.01)))]);

        assert_eq!(
            CountyRateTable::new(rates, County::Suffolk),
            Err(TaxTableError::NegativeRate(County::Suffolk))
        );
    }

    // =========================================================================
    // detect_county tests
    // =========================================================================

    #[test]
    fn detect_county_reads_county_component() {
        let c = components(&[("administrative_area_level_2", "Nassau County")]);

        assert_eq!(detect_county(&c), Some(County::Nassau));
    }

    #[test]
    fn detect_county_falls_back_to_all_components() {
        let c = components(&[("route", "123 Suffolk Ave")]);

        assert_eq!(detect_county(&c), Some(County::Suffolk));
    }

    #[test]
    fn detect_county_prefers_county_component_over_other_fields() {
        let c = components(&[
            ("administrative_area_level_2", "Suffolk County"),
            ("route", "Nassau Road"),
        ]);

        assert_eq!(detect_county(&c), Some(County::Suffolk));
    }

    #[test]
    fn detect_county_is_case_insensitive() {
        let c = components(&[("administrative_area_level_2", "SUFFOLK COUNTY")]);

        assert_eq!(detect_county(&c), Some(County::Suffolk));
    }

    #[test]
    fn detect_county_returns_none_without_match() {
        let c = components(&[
            ("administrative_area_level_2", "Kings County"),
            ("locality", "Brooklyn"),
        ]);

        assert_eq!(detect_county(&c), None);
        assert!(
            TaxEngine::standard()
                .calculate_tax(dec!(100), detect_county(&c))
                .county_label
                .contains("(default)")
        );
    }

    #[test]
    fn detect_county_handles_empty_components() {
        assert_eq!(detect_county(&AddressComponents::new()), None);
    }
}
