//! Glue between configuration, storage and the quoting engine.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use dumpster_core::calculations::{DurationModifiers, PriceTable, TaxEngine};
use dumpster_core::db::{DbConfig, QuoteRepository, RepositoryRegistry};
use dumpster_core::routing::{Directions, DirectionsOutcome, RoutePlan};
use dumpster_core::wizard::reference_number;
use dumpster_core::{
    DeliveryStop, QuoteCatalog, QuoteRecord, QuoteSubmission, QuoteWizard, WizardCommand,
};
use dumpster_data::PriceSheetLoader;
use dumpster_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info, warn};

use crate::requests::run_wizard;

/// Registry with every backend compiled into this binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(config: &DbConfig) -> Result<Box<dyn QuoteRepository>> {
    debug!(backend = %config.backend, "connecting");
    build_registry()
        .create(config)
        .await
        .with_context(|| format!("Failed to open {} database: {}", config.backend, config.connection_string))
}

/// Price table from a CSV sheet when one is configured, otherwise from the
/// repository. An empty stored table falls back to the built-in sheet.
pub async fn load_price_table(
    repo: &dyn QuoteRepository,
    price_sheet: Option<&Path>,
) -> Result<PriceTable> {
    if let Some(path) = price_sheet {
        let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let table = PriceSheetLoader::read_table(file)
            .with_context(|| format!("Invalid price sheet: {}", path.display()))?;
        info!(path = %path.display(), prices = table.len(), "using price sheet");
        return Ok(table);
    }

    let entries = repo
        .load_price_entries()
        .await
        .context("Failed to load stored prices")?;
    if entries.is_empty() {
        warn!("no stored prices, using the built-in price sheet");
        return Ok(PriceTable::standard());
    }
    PriceTable::from_entries(entries).context("Stored prices are invalid")
}

pub async fn load_catalog(
    repo: &dyn QuoteRepository,
    price_sheet: Option<&Path>,
) -> Result<QuoteCatalog> {
    Ok(QuoteCatalog::new(
        load_price_table(repo, price_sheet).await?,
        DurationModifiers::standard(),
        TaxEngine::standard(),
    ))
}

/// Replays `commands`, builds the submission and stores it.
pub async fn submit_quote(
    repo: &dyn QuoteRepository,
    catalog: &QuoteCatalog,
    commands: Vec<WizardCommand>,
    submitted_at: DateTime<Utc>,
    entropy: u32,
) -> Result<(QuoteSubmission, QuoteRecord)> {
    let mut wizard = run_wizard(catalog, commands).context("Quote request was rejected")?;
    persist_submission(repo, &mut wizard, reference_number(submitted_at, entropy)).await
}

/// Stores the wizard's submission. The draft is reset only once the
/// repository has accepted the quote; on failure it is left as it was.
pub async fn persist_submission(
    repo: &dyn QuoteRepository,
    wizard: &mut QuoteWizard<'_>,
    reference_number: String,
) -> Result<(QuoteSubmission, QuoteRecord)> {
    let submission = wizard
        .prepare_submission(reference_number)
        .context("Quote is not ready to submit")?;

    let record = repo
        .create_quote(submission.to_new_record())
        .await
        .context("Failed to store quote")?;
    info!(
        reference = %record.reference_number,
        total = %record.total_price,
        "quote stored"
    );
    wizard.reset();
    Ok((submission, record))
}

/// Everything needed to plan one day's route.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub start_time: Option<NaiveTime>,
    /// Optimized waypoint order from the directions collaborator.
    pub optimized_order: Option<Vec<usize>>,
    /// Directions for the final stop order.
    pub directions: Option<Directions>,
}

/// Builds the plan for `date` and applies the collaborator's answers in the
/// order a live session would receive them: optimized order first, then
/// directions for the resulting order.
pub fn plan_route(
    schedule: &[DeliveryStop],
    date: NaiveDate,
    options: RouteOptions,
) -> Result<RoutePlan> {
    let mut plan = RoutePlan::for_day(schedule, date);
    if let Some(start) = options.start_time {
        plan.set_start_time(start);
    }
    info!(%date, stops = plan.stops().len(), "planning route");

    if let Some(order) = options.optimized_order {
        let request = plan
            .optimize_request()
            .context("Cannot optimize this route")?;
        plan.apply_optimized_order(request.generation, &order)
            .context("Optimized order does not match the stops")?;
    }

    if let Some(directions) = options.directions {
        match plan.directions_request() {
            Some(request) => match plan.accept_directions(request.generation, directions) {
                DirectionsOutcome::Applied => {}
                DirectionsOutcome::Discarded => warn!("directions were discarded"),
                DirectionsOutcome::LegCountMismatch { expected, received } => {
                    bail!("Directions have {received} legs but the route has {expected} mapped stops")
                }
            },
            None => warn!("no routable stops, ignoring directions"),
        }
    }

    Ok(plan)
}
