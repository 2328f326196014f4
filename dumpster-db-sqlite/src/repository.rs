use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dumpster_core::calculations::PriceEntry;
use dumpster_core::{
    MaterialType, NewQuoteRecord, PaymentMethod, QuoteRecord, QuoteRepository, QuoteStatus,
    RentalPeriod, RepositoryError, ServiceArea, SizeClass,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::{Row, SqliteConnection};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal};

const QUOTE_COLUMNS: &str = "id, reference_number, status, service_area, material, size,
    rental_period, payment_method, customer_name, customer_email, customer_phone,
    delivery_address, delivery_lat, delivery_lng, base_price, duration_modifier,
    tax_amount, tax_rate, county, referral_discount, total_price, created_at, updated_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to `database_url`, creating the file if needed. Accepts a
    /// bare path, a `sqlite:` URL or `:memory:`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url: {}", database_url))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Sets `to` only while the quote is still in status `from`. Returns
    /// false when no row matched.
    async fn swap_status(
        &self,
        id: i64,
        from: QuoteStatus,
        to: QuoteStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE quotes SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(Utc::now())
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(result.rows_affected() == 1)
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn photos_for(
        &self,
        quote_id: i64,
    ) -> Result<Vec<String>, RepositoryError> {
        sqlx::query_scalar("SELECT url FROM quote_photos WHERE quote_id = ? ORDER BY position")
            .bind(quote_id)
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)
    }

    async fn hydrate(
        &self,
        row: &SqliteRow,
    ) -> Result<QuoteRecord, RepositoryError> {
        let mut quote = row_to_quote(row)?;
        quote.photos = self.photos_for(quote.id).await?;
        Ok(quote)
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn get_column<T>(
    row: &SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", column, e)))
}

/// Reads a TEXT column and converts it with one of the model `parse`
/// functions.
fn get_parsed<T>(
    row: &SqliteRow,
    column: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, RepositoryError> {
    let raw: String = get_column(row, column)?;
    parse(&raw).ok_or_else(|| RepositoryError::Database(format!("Invalid {}: {}", column, raw)))
}

fn row_to_quote(row: &SqliteRow) -> Result<QuoteRecord, RepositoryError> {
    Ok(QuoteRecord {
        id: get_column(row, "id")?,
        reference_number: get_column(row, "reference_number")?,
        status: get_parsed(row, "status", QuoteStatus::parse)?,
        service_area: get_parsed(row, "service_area", ServiceArea::parse)?,
        material: get_parsed(row, "material", MaterialType::parse)?,
        size: get_parsed(row, "size", SizeClass::parse)?,
        rental_period: get_parsed(row, "rental_period", RentalPeriod::parse)?,
        payment_method: get_parsed(row, "payment_method", PaymentMethod::parse)?,
        customer_name: get_column(row, "customer_name")?,
        customer_email: get_column(row, "customer_email")?,
        customer_phone: get_column(row, "customer_phone")?,
        delivery_address: get_column(row, "delivery_address")?,
        delivery_lat: get_column(row, "delivery_lat")?,
        delivery_lng: get_column(row, "delivery_lng")?,
        photos: Vec::new(),
        base_price: get_decimal(row, "base_price")?,
        duration_modifier: get_decimal(row, "duration_modifier")?,
        tax_amount: get_decimal(row, "tax_amount")?,
        tax_rate: get_decimal(row, "tax_rate")?,
        county: get_column(row, "county")?,
        referral_discount: get_decimal(row, "referral_discount")?,
        total_price: get_decimal(row, "total_price")?,
        created_at: get_column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: get_column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_price_entry(row: &SqliteRow) -> Result<PriceEntry, RepositoryError> {
    Ok(PriceEntry {
        area: get_parsed(row, "service_area", ServiceArea::parse)?,
        material: get_parsed(row, "material", MaterialType::parse)?,
        size: get_parsed(row, "size", SizeClass::parse)?,
        payment: get_parsed(row, "payment_method", PaymentMethod::parse)?,
        price: get_decimal(row, "price")?,
    })
}

async fn insert_photos(
    conn: &mut SqliteConnection,
    quote_id: i64,
    photos: &[String],
) -> Result<(), RepositoryError> {
    for (position, url) in photos.iter().enumerate() {
        sqlx::query("INSERT INTO quote_photos (quote_id, position, url) VALUES (?, ?, ?)")
            .bind(quote_id)
            .bind(position as i64)
            .bind(url)
            .execute(&mut *conn)
            .await
            .map_err(database_error)?;
    }
    Ok(())
}

#[async_trait]
impl QuoteRepository for SqliteRepository {
    async fn create_quote(
        &self,
        quote: NewQuoteRecord,
    ) -> Result<QuoteRecord, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let result = sqlx::query(
            "INSERT INTO quotes (
                reference_number, status, service_area, material, size,
                rental_period, payment_method, customer_name, customer_email,
                customer_phone, delivery_address, delivery_lat, delivery_lng,
                base_price, duration_modifier, tax_amount, tax_rate, county,
                referral_discount, total_price, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&quote.reference_number)
        .bind(QuoteStatus::Pending.as_str())
        .bind(quote.service_area.as_str())
        .bind(quote.material.as_str())
        .bind(quote.size.as_str())
        .bind(quote.rental_period.as_str())
        .bind(quote.payment_method.as_str())
        .bind(&quote.customer_name)
        .bind(&quote.customer_email)
        .bind(&quote.customer_phone)
        .bind(&quote.delivery_address)
        .bind(quote.delivery_lat)
        .bind(quote.delivery_lng)
        .bind(decimal_to_text(quote.base_price))
        .bind(decimal_to_text(quote.duration_modifier))
        .bind(decimal_to_text(quote.tax_amount))
        .bind(decimal_to_text(quote.tax_rate))
        .bind(&quote.county)
        .bind(decimal_to_text(quote.referral_discount))
        .bind(decimal_to_text(quote.total_price))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        let id = result.last_insert_rowid();
        insert_photos(&mut *tx, id, &quote.photos).await?;
        tx.commit().await.map_err(database_error)?;

        info!(id, reference = %quote.reference_number, "stored quote");
        self.get_quote(id).await
    }

    async fn get_quote(
        &self,
        id: i64,
    ) -> Result<QuoteRecord, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM quotes WHERE id = ?", QUOTE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(RepositoryError::NotFound)?;

        self.hydrate(&row).await
    }

    async fn get_quote_by_reference(
        &self,
        reference_number: &str,
    ) -> Result<QuoteRecord, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM quotes WHERE reference_number = ?",
            QUOTE_COLUMNS
        ))
        .bind(reference_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .ok_or(RepositoryError::NotFound)?;

        self.hydrate(&row).await
    }

    async fn list_quotes(
        &self,
        status: Option<QuoteStatus>,
    ) -> Result<Vec<QuoteRecord>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {} FROM quotes WHERE status = ? ORDER BY created_at DESC, id DESC",
                    QUOTE_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM quotes ORDER BY created_at DESC, id DESC",
                    QUOTE_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(database_error)?;

        let mut quotes = Vec::with_capacity(rows.len());
        for row in &rows {
            quotes.push(self.hydrate(row).await?);
        }
        Ok(quotes)
    }

    async fn update_status(
        &self,
        id: i64,
        status: QuoteStatus,
    ) -> Result<QuoteRecord, RepositoryError> {
        let current = self.get_quote(id).await?;
        if !current.status.can_transition_to(status) {
            return Err(RepositoryError::InvalidStatusTransition {
                from: current.status.as_str(),
                to: status.as_str(),
            });
        }

        if !self.swap_status(id, current.status, status).await? {
            // Another writer moved the quote after it was read.
            let latest = self.get_quote(id).await?;
            return Err(RepositoryError::InvalidStatusTransition {
                from: latest.status.as_str(),
                to: status.as_str(),
            });
        }

        info!(id, from = current.status.as_str(), to = status.as_str(), "quote status changed");
        self.get_quote(id).await
    }

    async fn delete_quote(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query("DELETE FROM quote_photos WHERE quote_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;
        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(database_error)
    }

    async fn load_price_entries(&self) -> Result<Vec<PriceEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT service_area, material, size, payment_method, price
             FROM price_entries
             ORDER BY service_area, material, CAST(size AS INTEGER), payment_method",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.iter().map(row_to_price_entry).collect()
    }

    async fn replace_price_entries(
        &self,
        entries: &[PriceEntry],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query("DELETE FROM price_entries")
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO price_entries (service_area, material, size, payment_method, price)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(entry.area.as_str())
            .bind(entry.material.as_str())
            .bind(entry.size.as_str())
            .bind(entry.payment.as_str())
            .bind(decimal_to_text(entry.price))
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;
        }

        tx.commit().await.map_err(database_error)?;
        info!(entries = entries.len(), "replaced price sheet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dumpster_core::PriceTable;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn new_quote(reference: &str) -> NewQuoteRecord {
        NewQuoteRecord {
            reference_number: reference.to_string(),
            service_area: ServiceArea::NassauSuffolk,
            material: MaterialType::TreesBrush,
            size: SizeClass::Yards10,
            rental_period: RentalPeriod::FourteenDay,
            payment_method: PaymentMethod::Cash,
            customer_name: "Jane Doe".to_string(),
            customer_email: "jane@example.com".to_string(),
            customer_phone: "(631) 555-0100".to_string(),
            delivery_address: "1 Main St, Riverhead, NY".to_string(),
            delivery_lat: Some(40.917),
            delivery_lng: Some(-72.662),
            photos: vec!["driveway.jpg".to_string(), "yard.jpg".to_string()],
            base_price: dec!(525),
            duration_modifier: dec!(50),
            tax_amount: dec!(50.31),
            tax_rate: dec!(0.0875),
            county: "Suffolk County".to_string(),
            referral_discount: dec!(0.00),
            total_price: dec!(625.31),
        }
    }

    // =========================================================================
    // Quotes
    // =========================================================================

    #[tokio::test]
    async fn test_create_and_get_quote() {
        let repo = setup_test_db().await;

        let created = repo
            .create_quote(new_quote("SW-TEST-0001"))
            .await
            .expect("Should create quote");

        assert_eq!(created.status, QuoteStatus::Pending);
        assert_eq!(created.reference_number, "SW-TEST-0001");
        assert_eq!(created.photos, vec!["driveway.jpg", "yard.jpg"]);
        assert_eq!(created.tax_amount, dec!(50.31));
        assert_eq!(created.tax_rate, dec!(0.0875));
        assert_eq!(created.total_price, dec!(625.31));
        assert_eq!(created.delivery_lat, Some(40.917));

        let fetched = repo.get_quote(created.id).await.expect("Should get quote");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_quote_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_quote(99999).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_get_quote_by_reference() {
        let repo = setup_test_db().await;
        repo.create_quote(new_quote("SW-TEST-0001")).await.unwrap();
        let second = repo.create_quote(new_quote("SW-TEST-0002")).await.unwrap();

        let found = repo
            .get_quote_by_reference("SW-TEST-0002")
            .await
            .expect("Should find by reference");

        assert_eq!(found.id, second.id);
        assert_eq!(
            repo.get_quote_by_reference("SW-NOPE").await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_duplicate_reference_is_rejected() {
        let repo = setup_test_db().await;
        repo.create_quote(new_quote("SW-TEST-0001")).await.unwrap();

        let result = repo.create_quote(new_quote("SW-TEST-0001")).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[tokio::test]
    async fn test_list_quotes_filters_by_status() {
        let repo = setup_test_db().await;
        let first = repo.create_quote(new_quote("SW-TEST-0001")).await.unwrap();
        repo.create_quote(new_quote("SW-TEST-0002")).await.unwrap();
        repo.update_status(first.id, QuoteStatus::Confirmed)
            .await
            .unwrap();

        let all = repo.list_quotes(None).await.expect("Should list quotes");
        let pending = repo
            .list_quotes(Some(QuoteStatus::Pending))
            .await
            .expect("Should list pending");
        let cancelled = repo
            .list_quotes(Some(QuoteStatus::Cancelled))
            .await
            .expect("Should list cancelled");

        assert_eq!(all.len(), 2);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].reference_number, "SW-TEST-0002");
        assert!(cancelled.is_empty());
    }

    #[tokio::test]
    async fn test_update_status_follows_lifecycle() {
        let repo = setup_test_db().await;
        let quote = repo.create_quote(new_quote("SW-TEST-0001")).await.unwrap();

        let confirmed = repo
            .update_status(quote.id, QuoteStatus::Confirmed)
            .await
            .expect("Should confirm");
        assert_eq!(confirmed.status, QuoteStatus::Confirmed);

        let skipped = repo.update_status(quote.id, QuoteStatus::PickedUp).await;
        assert_eq!(
            skipped,
            Err(RepositoryError::InvalidStatusTransition {
                from: "confirmed",
                to: "picked-up",
            })
        );
    }

    #[tokio::test]
    async fn test_swap_status_requires_expected_status() {
        let repo = setup_test_db().await;
        let quote = repo.create_quote(new_quote("SW-TEST-0001")).await.unwrap();
        repo.update_status(quote.id, QuoteStatus::Cancelled)
            .await
            .unwrap();

        let swapped = repo
            .swap_status(quote.id, QuoteStatus::Pending, QuoteStatus::Confirmed)
            .await
            .expect("Should run update");

        assert!(!swapped);
        assert_eq!(
            repo.get_quote(quote.id).await.unwrap().status,
            QuoteStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_concurrent_status_updates_apply_once() {
        let repo = setup_test_db().await;
        let quote = repo.create_quote(new_quote("SW-TEST-0001")).await.unwrap();

        let (first, second) = tokio::join!(
            repo.update_status(quote.id, QuoteStatus::Confirmed),
            repo.update_status(quote.id, QuoteStatus::Confirmed),
        );

        assert_eq!([&first, &second].iter().filter(|r| r.is_ok()).count(), 1);
        let failed = if first.is_err() { first } else { second };
        assert_eq!(
            failed,
            Err(RepositoryError::InvalidStatusTransition {
                from: "confirmed",
                to: "confirmed",
            })
        );
    }

    #[tokio::test]
    async fn test_update_status_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(
            repo.update_status(99999, QuoteStatus::Confirmed).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_delete_quote_removes_photos() {
        let repo = setup_test_db().await;
        let quote = repo.create_quote(new_quote("SW-TEST-0001")).await.unwrap();

        repo.delete_quote(quote.id).await.expect("Should delete quote");

        assert_eq!(repo.get_quote(quote.id).await, Err(RepositoryError::NotFound));
        let photos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quote_photos")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(photos, 0);
    }

    #[tokio::test]
    async fn test_delete_quote_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.delete_quote(99999).await, Err(RepositoryError::NotFound));
    }

    // =========================================================================
    // Price sheet
    // =========================================================================

    #[tokio::test]
    async fn test_price_entries_start_empty() {
        let repo = setup_test_db().await;

        assert_eq!(repo.load_price_entries().await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_replace_and_load_price_entries() {
        let repo = setup_test_db().await;
        let standard = PriceTable::standard();

        repo.replace_price_entries(&standard.entries())
            .await
            .expect("Should store price sheet");
        let loaded = PriceTable::from_entries(repo.load_price_entries().await.unwrap())
            .expect("Stored sheet should be valid");

        assert_eq!(loaded, standard);
    }

    #[tokio::test]
    async fn test_replace_price_entries_drops_old_rows() {
        let repo = setup_test_db().await;
        repo.replace_price_entries(&PriceTable::standard().entries())
            .await
            .unwrap();
        let single = PriceEntry {
            area: ServiceArea::EastRiverhead,
            material: MaterialType::Asphalt,
            size: SizeClass::Yards10,
            payment: PaymentMethod::Credit,
            price: dec!(867.01),
        };

        repo.replace_price_entries(&[single]).await.unwrap();

        assert_eq!(repo.load_price_entries().await, Ok(vec![single]));
    }

    // =========================================================================
    // Seeds
    // =========================================================================

    #[tokio::test]
    async fn test_run_seeds_loads_standard_price_sheet() {
        let repo = setup_test_db().await;

        repo.run_seeds(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/seeds")))
            .await
            .expect("Should run seeds successfully");
        let seeded = PriceTable::from_entries(repo.load_price_entries().await.unwrap())
            .expect("Seeded sheet should be valid");

        assert_eq!(seeded, PriceTable::standard());
    }

    #[tokio::test]
    async fn test_run_seeds_keeps_existing_price_sheet() {
        let repo = setup_test_db().await;
        let single = PriceEntry {
            area: ServiceArea::NassauSuffolk,
            material: MaterialType::Mixed,
            size: SizeClass::Yards5,
            payment: PaymentMethod::Cash,
            price: dec!(600),
        };
        repo.replace_price_entries(&[single]).await.unwrap();

        repo.run_seeds(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/seeds")))
            .await
            .unwrap();

        assert_eq!(repo.load_price_entries().await, Ok(vec![single]));
    }

    #[tokio::test]
    async fn test_run_seeds_nonexistent_directory() {
        let repo = setup_test_db().await;

        let result = repo.run_seeds(Path::new("./nonexistent")).await;

        let err = result.expect_err("Should fail for nonexistent directory");
        assert_eq!(
            err.to_string(),
            "Failed to read seeds directory './nonexistent'"
        );
    }
}
