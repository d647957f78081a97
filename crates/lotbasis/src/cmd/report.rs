//! lotbasis-report - Replay a JSON trade ledger and report realized results.
//!
//! # Usage
//!
//! ```bash
//! lotbasis-report ledger.json
//! lotbasis-report --format json ledger.json
//! lotbasis-report --cash-dates last-wins ledger.json
//! ```
//!
//! The report lists every sale record with its profit or loss, the total
//! profit or loss, and the units and average cost left per SKU.

use crate::ledger_file::LedgerFile;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lotbasis_booking::{CashDatePolicy, Ledger, ResolverOptions};
use lotbasis_core::{profit_or_loss, total_quantity, DateMap, Decimal, Inventory, SaleRecord, Sku};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Output format for the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for tooling
    Json,
}

/// Handling of trades that receive cash on several dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CashDates {
    /// Fail the trade (default)
    #[default]
    Reject,
    /// File all cash under the last date seen
    LastWins,
}

impl From<CashDates> for CashDatePolicy {
    fn from(value: CashDates) -> Self {
        match value {
            CashDates::Reject => Self::Reject,
            CashDates::LastWins => Self::LastWins,
        }
    }
}

/// Replay a trade ledger and report sales and remaining basis.
#[derive(Parser, Debug)]
#[command(name = "lotbasis-report")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The JSON ledger file to replay
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// What to do when a trade receives cash on more than one date
    #[arg(long, value_enum, default_value = "reject")]
    pub cash_dates: CashDates,

    /// Show debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// A sale record with its realized result.
#[derive(Debug, Serialize)]
struct JsonSale<'a> {
    #[serde(flatten)]
    record: &'a SaleRecord,
    #[serde(rename = "ProfitOrLoss")]
    profit_or_loss: Option<Decimal>,
}

/// Units left of one SKU.
#[derive(Debug, Serialize)]
struct JsonHolding {
    sku: Sku,
    units: u64,
    average_cost: Option<Decimal>,
    book_value: DateMap,
}

/// JSON output structure for the whole report.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    sales: Vec<JsonSale<'a>>,
    total_profit_or_loss: Decimal,
    inventory: Vec<JsonHolding>,
}

/// Load, replay and report, writing to `writer`.
pub fn run<W: Write>(args: &Args, writer: &mut W) -> Result<()> {
    let file = LedgerFile::load(&args.file)?;
    debug!(
        path = %args.file.display(),
        events = file.event_count(),
        skus = file.inventory.len(),
        "ledger loaded"
    );

    let options = ResolverOptions::new().with_cash_dates(args.cash_dates.into());
    let mut ledger = Ledger::new()
        .with_inventory(file.inventory)
        .with_options(options);
    ledger
        .replay(file.transactions)
        .with_context(|| format!("failed to replay {}", args.file.display()))?;

    match args.format {
        OutputFormat::Text => write_text(&ledger, writer),
        OutputFormat::Json => write_json(&ledger, writer),
    }
}

fn write_text<W: Write>(ledger: &Ledger, writer: &mut W) -> Result<()> {
    let sales = ledger.sales();
    writeln!(writer, "Sales ({} total)", sales.len())?;
    writeln!(writer, "{}", "=".repeat(40))?;
    writeln!(writer)?;
    for record in sales {
        let result = profit_or_loss(record)
            .map_or_else(|| "n/a".to_string(), |value| value.normalize().to_string());
        writeln!(
            writer,
            "SKU {}: {} units, proceeds {}, basis {}, P&L {}",
            record.sku,
            total_quantity(&record.cost),
            record.proceeds().normalize(),
            record.basis().normalize(),
            result
        )?;
    }
    writeln!(writer)?;
    writeln!(
        writer,
        "Total P&L: {}",
        ledger.total_profit_or_loss().normalize()
    )?;
    writeln!(writer)?;

    write_inventory(ledger.inventory(), writer)
}

fn write_inventory<W: Write>(inventory: &Inventory, writer: &mut W) -> Result<()> {
    writeln!(writer, "Inventory ({} SKUs)", inventory.len())?;
    writeln!(writer, "{}", "=".repeat(40))?;
    writeln!(writer)?;
    for sku in inventory.skus() {
        let average = inventory
            .average_cost(sku)
            .map_or_else(|| "n/a".to_string(), |value| value.normalize().to_string());
        writeln!(
            writer,
            "SKU {sku}: {} units, average cost {average}",
            inventory.units(sku)
        )?;
    }
    Ok(())
}

fn write_json<W: Write>(ledger: &Ledger, writer: &mut W) -> Result<()> {
    let inventory = ledger.inventory();
    let report = JsonReport {
        sales: ledger
            .sales()
            .iter()
            .map(|record| JsonSale {
                record,
                profit_or_loss: profit_or_loss(record).map(|value| value.normalize()),
            })
            .collect(),
        total_profit_or_loss: ledger.total_profit_or_loss().normalize(),
        inventory: inventory
            .skus()
            .map(|sku| JsonHolding {
                sku,
                units: inventory.units(sku),
                average_cost: inventory.average_cost(sku).map(|value| value.normalize()),
                book_value: inventory.book_value(sku),
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let builder = tracing_subscriber::fmt().with_writer(io::stderr);
    if verbose {
        builder.with_max_level(Level::DEBUG).init();
    } else {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        builder.with_env_filter(filter).init();
    }
}

/// Main entry point for the report command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
