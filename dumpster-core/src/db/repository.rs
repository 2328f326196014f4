use async_trait::async_trait;
use thiserror::Error;

use crate::calculations::PriceEntry;
use crate::models::{NewQuoteRecord, QuoteRecord, QuoteStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot move quote from '{from}' to '{to}'")]
    InvalidStatusTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Persistence collaborator for submitted quotes and the price sheet.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    // Quotes
    async fn create_quote(
        &self,
        quote: NewQuoteRecord,
    ) -> Result<QuoteRecord, RepositoryError>;

    async fn get_quote(
        &self,
        id: i64,
    ) -> Result<QuoteRecord, RepositoryError>;

    async fn get_quote_by_reference(
        &self,
        reference_number: &str,
    ) -> Result<QuoteRecord, RepositoryError>;

    /// Newest first, optionally restricted to one status.
    async fn list_quotes(
        &self,
        status: Option<QuoteStatus>,
    ) -> Result<Vec<QuoteRecord>, RepositoryError>;

    /// Moves a quote along its lifecycle. Transitions not allowed by
    /// [`QuoteStatus::can_transition_to`] are rejected.
    async fn update_status(
        &self,
        id: i64,
        status: QuoteStatus,
    ) -> Result<QuoteRecord, RepositoryError>;

    async fn delete_quote(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    // Price sheet
    async fn load_price_entries(&self) -> Result<Vec<PriceEntry>, RepositoryError>;

    /// Replaces the stored price sheet in one transaction.
    async fn replace_price_entries(
        &self,
        entries: &[PriceEntry],
    ) -> Result<(), RepositoryError>;
}
