pub mod calculations;
pub mod db;
pub mod models;
pub mod routing;
pub mod wizard;

pub use calculations::{PriceTable, PricedQuote, QuoteBreakdown, QuoteCatalog, QuoteSelection, TaxEngine};
pub use db::repository::{QuoteRepository, RepositoryError};
pub use models::*;
pub use routing::{RouteLeg, RoutePlan};
pub use wizard::{QuoteSubmission, QuoteWizard, WizardCommand, WizardError, WizardStep};
