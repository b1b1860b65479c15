use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use partcode_engine::SkuEngine;
use partcode_models::{Component, Domain};
use partcode_utils::{init_logging, AppConfig};

mod bom;

use bom::BomReader;

#[derive(Parser, Debug)]
#[command(name = "partcode-import", version, about = "Generate and look up component SKUs from BOM exports")]
struct Cli {
    /// SQLite database URL, overriding the configured one
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue SKUs for every row of the given BOM files
    Generate {
        domain: Domain,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Count new versus already-known components without writing
    Analyze {
        domain: Domain,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Explain the parts of a SKU
    Decode { sku: String },
    /// Find SKUs containing a fragment
    Search { pattern: String },
    /// List SKUs of the same domain and component type
    Similar { domain: String, component_type: String },
    /// List the most recently issued SKUs
    Recent {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Catalog totals by domain, route and routing
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });
    if let Some(url) = cli.database {
        config.database.url = url;
    }

    init_logging(&config.logging)?;
    info!(database = %config.database.url, "Starting partcode import");

    let engine = SkuEngine::open(&config)
        .await
        .context("Failed to open SKU engine")?;

    let result = run(&engine, cli.command).await;
    engine.close().await;
    result
}

async fn run(engine: &SkuEngine, command: Command) -> Result<()> {
    match command {
        Command::Generate { domain, files } => {
            let components = read_boms(domain, &files)?;
            let report = engine.generate_batch(&components).await;
            print_json(&report)?;
            if report.failed > 0 {
                bail!("{} of {} components could not be stored", report.failed, report.total());
            }
        }
        Command::Analyze { domain, files } => {
            let components = read_boms(domain, &files)?;
            let report = engine.analyze(&components).await?;
            print_json(&report)?;
        }
        Command::Decode { sku } => {
            let decoded = engine.catalog().decode(&sku)?;
            print_json(&decoded)?;
        }
        Command::Search { pattern } => {
            print_json(&engine.catalog().search_by_partial_sku(&pattern).await?)?;
        }
        Command::Similar { domain, component_type } => {
            print_json(&engine.catalog().find_similar(&domain, &component_type).await?)?;
        }
        Command::Recent { limit } => {
            print_json(&engine.catalog().list_recent(limit).await?)?;
        }
        Command::Stats => {
            print_json(&engine.catalog().aggregate_stats().await?)?;
        }
    }
    Ok(())
}

fn read_boms(domain: Domain, files: &[PathBuf]) -> Result<Vec<Component>> {
    let reader = BomReader::new(domain);
    let mut components = Vec::new();

    for path in files {
        let bom = reader.read_path(path)?;
        for warning in &bom.parse_warnings {
            tracing::warn!(file = %bom.filename, "{}", warning);
        }
        components.extend(bom.components);
    }

    Ok(components)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}
