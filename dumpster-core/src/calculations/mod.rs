//! Quote calculation modules.
//!
//! Pricing and tax are pure functions over reference data. Nothing here
//! performs I/O; tables are loaded by the caller and passed in.

pub mod common;
pub mod price_table;
pub mod pricing;
pub mod tax;

pub use price_table::{PriceEntry, PriceTable, PriceTableError};
pub use pricing::{
    DurationModifiers, PricedQuote, PricingError, PricingResolver, QuoteBreakdown, QuoteCatalog,
    QuoteSelection, compose_quote,
};
pub use tax::{CountyRate, CountyRateTable, TaxCalculation, TaxEngine, TaxTableError, detect_county};
