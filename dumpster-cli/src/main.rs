use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dumpster_core::routing::{Directions, nearest_scheduled_day};
use dumpster_core::{DeliveryStop, MaterialType, QuoteRepository, QuoteStatus, ServiceArea};
use tracing::{debug, info};

use dumpster_cli::app::{self, RouteOptions};
use dumpster_cli::config::{AppConfig, parse_start_time};
use dumpster_cli::requests::{QuoteInput, read_json, run_wizard};
use dumpster_cli::{logging, report};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Dumpster rental quotes and delivery routes.
#[derive(Debug, Parser)]
#[command(name = "dumpster", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "DUMPSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Database backend to use, overriding the config file.
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string, overriding the config file.
    /// For SQLite this is a file path (e.g. `dumpster.db`) or `:memory:`.
    #[arg(long, env = "DUMPSTER_DB")]
    db: Option<String>,

    /// Log level or EnvFilter directive, overriding the config file.
    #[arg(long)]
    log_level: Option<String>,

    /// Append logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Hide log output on the terminal.
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List container sizes and starting prices.
    Prices {
        #[arg(long, default_value = "nassau-suffolk", value_parser = parse_area)]
        area: ServiceArea,

        #[arg(long, value_parser = parse_material)]
        material: Option<MaterialType>,
    },

    /// Price a quote request without storing it.
    Quote {
        /// JSON quote request or list of wizard commands.
        request: PathBuf,

        /// Print the priced quote as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Price and store a quote request.
    Submit {
        /// JSON quote request or list of wizard commands.
        request: PathBuf,
    },

    /// List stored quotes.
    Quotes {
        #[arg(long, value_parser = parse_status)]
        status: Option<QuoteStatus>,
    },

    /// Move a stored quote to a new status.
    Status {
        reference: String,

        #[arg(value_parser = parse_status)]
        status: QuoteStatus,
    },

    /// Plan one day's delivery route.
    Route {
        /// JSON list of scheduled delivery stops.
        schedule: PathBuf,

        /// Day to route; defaults to the next day with deliveries.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Departure time, e.g. `08:00`; defaults to the configured start.
        #[arg(long)]
        start: Option<String>,

        /// Optimized waypoint order, e.g. `2,0,1`.
        #[arg(long, value_delimiter = ',')]
        order: Option<Vec<usize>>,

        /// JSON directions response for the final stop order.
        #[arg(long)]
        directions: Option<PathBuf>,
    },
}

fn parse_area(s: &str) -> Result<ServiceArea, String> {
    ServiceArea::parse(s).ok_or_else(|| {
        let known: Vec<_> = ServiceArea::ALL.iter().map(|a| a.as_str()).collect();
        format!("unknown service area '{s}'; expected one of {known:?}")
    })
}

fn parse_material(s: &str) -> Result<MaterialType, String> {
    MaterialType::parse(s).ok_or_else(|| {
        let known: Vec<_> = MaterialType::ALL.iter().map(|m| m.as_str()).collect();
        format!("unknown material '{s}'; expected one of {known:?}")
    })
}

fn parse_status(s: &str) -> Result<QuoteStatus, String> {
    QuoteStatus::parse(s).ok_or_else(|| format!("unknown status '{s}'"))
}

// ─── logging ─────────────────────────────────────────────────────────────────

/// Starts logging before the config file is read, at the level given on
/// the command line.
fn init_logging(cli: &Cli) -> Result<()> {
    logging::init_logging(cli.log_level.as_deref().unwrap_or("info"));
    if cli.quiet {
        logging::set_stderr_enabled(false)?;
    }
    Ok(())
}

/// Applies the config file's logging section. `--log-level` and `RUST_LOG`
/// keep precedence over the configured level.
fn apply_logging_config(
    cli: &Cli,
    config: &AppConfig,
) -> Result<()> {
    if cli.log_level.is_none() && std::env::var_os("RUST_LOG").is_none() {
        logging::set_log_level(&config.logging.level)?;
    }
    if let Some(path) = cli.log_file.as_ref().or(config.logging.file.as_ref()) {
        logging::enable_file_logging(path)?;
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(backend) = &cli.backend {
        config.database.backend = backend.clone();
    }
    if let Some(db) = &cli.db {
        config.database.connection_string = db.clone();
    }

    apply_logging_config(&cli, &config)?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Command::Prices { area, material } => {
            let repo = app::open_repository(&config.database).await?;
            let catalog = app::load_catalog(&*repo, config.pricing.price_sheet.as_deref()).await?;
            println!("{}", report::render_price_list(&catalog, area, material));
        }

        Command::Quote { request, json } => {
            let repo = app::open_repository(&config.database).await?;
            let catalog = app::load_catalog(&*repo, config.pricing.price_sheet.as_deref()).await?;
            let input: QuoteInput = read_json(&request)?;

            let wizard = run_wizard(&catalog, input.into_commands()).context("Quote request was rejected")?;
            let quote = wizard.quote().context("Quote is incomplete")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                println!("{}", report::render_quote(&quote));
            }
        }

        Command::Submit { request } => {
            let repo = app::open_repository(&config.database).await?;
            let catalog = app::load_catalog(&*repo, config.pricing.price_sheet.as_deref()).await?;
            let input: QuoteInput = read_json(&request)?;

            let now = Utc::now();
            let (submission, record) = app::submit_quote(
                &*repo,
                &catalog,
                input.into_commands(),
                now,
                now.timestamp_subsec_nanos(),
            )
            .await?;
            println!("{}", report::render_submission(&submission, &record));
        }

        Command::Quotes { status } => {
            let repo = app::open_repository(&config.database).await?;
            let records = repo.list_quotes(status).await.context("Failed to list quotes")?;
            println!("{}", report::render_record_list(&records));
        }

        Command::Status { reference, status } => {
            let repo = app::open_repository(&config.database).await?;
            let quote = repo
                .get_quote_by_reference(&reference)
                .await
                .with_context(|| format!("No quote with reference {reference}"))?;
            let updated = repo
                .update_status(quote.id, status)
                .await
                .with_context(|| format!("Cannot move {reference} to {}", status.as_str()))?;
            info!(reference = %updated.reference_number, status = updated.status.as_str(), "status updated");
            println!("{} is now {}", updated.reference_number, updated.status.as_str());
        }

        Command::Route {
            schedule,
            date,
            start,
            order,
            directions,
        } => {
            let stops: Vec<DeliveryStop> = read_json(&schedule)?;
            let today = Local::now().date_naive();
            let Some(date) = date.or_else(|| nearest_scheduled_day(&stops, today)) else {
                bail!("No deliveries scheduled on or after {today}");
            };
            let start_time = match start {
                Some(s) => parse_start_time(&s)?,
                None => config.route_start_time()?,
            };
            let directions = directions
                .map(|path| read_json::<Directions>(&path))
                .transpose()?;

            let plan = app::plan_route(
                &stops,
                date,
                RouteOptions {
                    start_time: Some(start_time),
                    optimized_order: order,
                    directions,
                },
            )?;
            println!("{}", report::render_route(&plan, date));
        }
    }

    Ok(())
}
