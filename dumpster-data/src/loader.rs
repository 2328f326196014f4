use std::io::Read;
use std::str::FromStr;

use dumpster_core::calculations::{PriceEntry, PriceTable, PriceTableError};
use dumpster_core::db::{QuoteRepository, RepositoryError};
use dumpster_core::{MaterialType, PaymentMethod, ServiceArea, SizeClass};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading a price sheet.
#[derive(Debug, Error, PartialEq)]
pub enum PriceSheetLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("line {line}: unknown service area '{value}'")]
    InvalidArea { line: usize, value: String },

    #[error("line {line}: unknown material '{value}'")]
    InvalidMaterial { line: usize, value: String },

    #[error("line {line}: unknown container size '{value}'")]
    InvalidSize { line: usize, value: String },

    #[error("Invalid price sheet: {0}")]
    Table(#[from] PriceTableError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for PriceSheetLoaderError {
    fn from(err: csv::Error) -> Self {
        PriceSheetLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the price sheet.
///
/// - `area`: service area code (`nassau-suffolk`, `east-riverhead`)
/// - `material`: material code (e.g. `trees-brush`)
/// - `size`: container size in cubic yards (`10` or `10yd`)
/// - `cash`, `debit`, `credit`: price for each payment method
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PriceSheetRecord {
    pub area: String,
    pub material: String,
    pub size: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub cash: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub debit: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub credit: Decimal,
}

fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Decimal::from_str(s.trim()).map_err(serde::de::Error::custom)
}

impl PriceSheetRecord {
    /// The three price leaves this row describes.
    ///
    /// `line` is the 1-based data line used in error messages.
    pub fn to_entries(
        &self,
        line: usize,
    ) -> Result<[PriceEntry; 3], PriceSheetLoaderError> {
        let area = ServiceArea::parse(self.area.trim()).ok_or_else(|| {
            PriceSheetLoaderError::InvalidArea {
                line,
                value: self.area.clone(),
            }
        })?;
        let material = MaterialType::parse(self.material.trim()).ok_or_else(|| {
            PriceSheetLoaderError::InvalidMaterial {
                line,
                value: self.material.clone(),
            }
        })?;
        let size = SizeClass::parse(&self.size).ok_or_else(|| {
            PriceSheetLoaderError::InvalidSize {
                line,
                value: self.size.clone(),
            }
        })?;

        let entry = |payment, price| PriceEntry {
            area,
            material,
            size,
            payment,
            price,
        };
        Ok([
            entry(PaymentMethod::Cash, self.cash),
            entry(PaymentMethod::Debit, self.debit),
            entry(PaymentMethod::Credit, self.credit),
        ])
    }
}

/// Loader for container price sheets.
///
/// Parsing and validation are separate from storage, so a sheet can be
/// checked without a database. Storage goes through [`QuoteRepository`] and
/// works with any backend.
pub struct PriceSheetLoader;

impl PriceSheetLoader {
    /// Parse price-sheet rows from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<PriceSheetRecord>, PriceSheetLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: PriceSheetRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Build a validated [`PriceTable`] from parsed rows.
    ///
    /// Fails on the first unknown code, non-positive price, size the
    /// material is never hauled in, or duplicated row.
    pub fn to_table(records: &[PriceSheetRecord]) -> Result<PriceTable, PriceSheetLoaderError> {
        let mut entries = Vec::with_capacity(records.len() * 3);
        for (index, record) in records.iter().enumerate() {
            entries.extend(record.to_entries(index + 1)?);
        }
        Ok(PriceTable::from_entries(entries)?)
    }

    /// Parse and validate a sheet in one step.
    pub fn read_table<R: Read>(reader: R) -> Result<PriceTable, PriceSheetLoaderError> {
        let records = Self::parse(reader)?;
        Self::to_table(&records)
    }

    /// Replace the stored price table with the one described by `records`.
    ///
    /// The sheet is validated in full before anything is written, and the
    /// replacement is all-or-nothing, so loading the same sheet twice leaves
    /// the same table behind. Returns the number of price leaves stored.
    pub async fn load<R: QuoteRepository + ?Sized>(
        repo: &R,
        records: &[PriceSheetRecord],
    ) -> Result<usize, PriceSheetLoaderError> {
        let table = Self::to_table(records)?;
        let entries = table.entries();

        repo.replace_price_entries(&entries).await?;

        info!(rows = records.len(), entries = entries.len(), "price sheet loaded");
        Ok(entries.len())
    }
}
