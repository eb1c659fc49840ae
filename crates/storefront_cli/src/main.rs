//! `storefront` command line entry point.
//!
//! # Responsibility
//! - Initialize a storefront database file (schema + migrations).
//! - Load a small demo data set.
//! - Print analytical reports as JSON lines.

mod demo;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use storefront_core::db::migrations::current_user_version;
use storefront_core::db::open_db;
use storefront_core::report::analytics;
use storefront_core::{init_logging, CustomerId, StoreConfig};

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Storefront schema toolkit")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Database file; overrides `database_path` from the config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or migrate the database and print the schema version.
    Init,
    /// Insert demo categories, products, customers and orders.
    SeedDemo,
    /// Print one report.
    Report {
        #[command(subcommand)]
        kind: ReportKind,
    },
}

#[derive(Debug, Subcommand)]
enum ReportKind {
    SalesByCategory,
    TopCustomers {
        #[arg(long)]
        limit: Option<u32>,
    },
    BestSellers {
        #[arg(long)]
        limit: Option<u32>,
    },
    Unsold,
    AboveAverage,
    LowStock {
        #[arg(long)]
        threshold: Option<i64>,
    },
    History {
        /// Customer UUID.
        #[arg(long)]
        customer: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_ref() {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let mut conn = open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.database_path.display()
        )
    })?;

    match cli.command {
        Command::Init => {
            let version = current_user_version(&conn)?;
            println!(
                "storefront database `{}` at schema version {version}",
                config.database_path.display()
            );
        }
        Command::SeedDemo => {
            let summary = demo::seed(&mut conn)?;
            println!("{}", serde_json::to_string(&summary)?);
        }
        Command::Report { kind } => {
            let rows = run_report(&conn, &config, kind)?;
            for row in rows {
                println!("{row}");
            }
        }
    }

    Ok(())
}

fn run_report(
    conn: &Connection,
    config: &StoreConfig,
    kind: ReportKind,
) -> Result<Vec<Value>> {
    let rows = match kind {
        ReportKind::SalesByCategory => to_json(analytics::sales_by_category(conn)?)?,
        ReportKind::TopCustomers { limit } => to_json(analytics::top_customers(
            conn,
            limit.unwrap_or(config.report_limit),
        )?)?,
        ReportKind::BestSellers { limit } => to_json(analytics::best_selling_products(
            conn,
            limit.unwrap_or(config.report_limit),
        )?)?,
        ReportKind::Unsold => to_json(analytics::unsold_products(conn)?)?,
        ReportKind::AboveAverage => to_json(analytics::customers_above_average_spend(conn)?)?,
        ReportKind::LowStock { threshold } => to_json(analytics::low_stock_products(
            conn,
            threshold.unwrap_or(config.low_stock_threshold),
        )?)?,
        ReportKind::History { customer } => {
            let customer_id = CustomerId::parse_str(customer.trim())
                .with_context(|| format!("invalid customer id `{customer}`"))?;
            to_json(analytics::customer_order_history(conn, customer_id)?)?
        }
    };
    Ok(rows)
}

fn to_json<T: Serialize>(rows: Vec<T>) -> Result<Vec<Value>> {
    rows.into_iter()
        .map(|row| serde_json::to_value(row).map_err(Into::into))
        .collect()
}
