//! Price-sheet import.
//!
//! A price sheet is a CSV file with one row per area, material and size,
//! carrying the cash, debit and credit prices:
//!
//! ```text
//! area,material,size,cash,debit,credit
//! nassau-suffolk,construction-demo,5,425,461.66,475.46
//! ```

pub mod loader;

pub use loader::{PriceSheetLoader, PriceSheetLoaderError, PriceSheetRecord};
