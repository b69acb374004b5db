//! hotel-dedup command-line tool
//!
//! Scans catalog cities for duplicate hotels, checks descriptions for error
//! markers, or runs the engine offline over a JSON file of records.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use hotel_catalog::export::{write_clusters_csv, write_issues_csv, write_json};
use hotel_catalog::{
    run_error_scan, run_scan, CatalogClient, DescriptionIssue, ScanConfig, ScanContext,
    StatsSnapshot,
};
use hotel_dedup::{consolidate, find_duplicates, DuplicateCluster, HotelRecord};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hotel-dedup")]
#[command(about = "Find duplicate hotel listings in a catalog feed")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/hotel-dedup/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load cities, enrich candidates and report duplicate groups
    Scan {
        /// City id (repeatable)
        #[arg(long = "city", required = true)]
        cities: Vec<u64>,
        #[arg(long)]
        country: Option<u64>,
        /// Requests per second
        #[arg(long)]
        rps: Option<f64>,
        /// Write groups to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Print groups as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Report hotels whose description contains "Error"
    Errors {
        #[arg(long = "city", required = true)]
        cities: Vec<u64>,
        #[arg(long)]
        country: Option<u64>,
        #[arg(long)]
        rps: Option<f64>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Run duplicate detection over a JSON array of hotel records
    Dedup {
        input: PathBuf,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },

    /// List catalog countries
    Countries,

    /// List cities of a country
    Cities {
        #[arg(long)]
        country: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            cities,
            country,
            rps,
            csv,
            json,
        } => {
            let config = load_config(cli.config.as_deref(), rps)?;
            cmd_scan(config, &cities, country, csv.as_deref(), json).await
        }
        Commands::Errors {
            cities,
            country,
            rps,
            csv,
        } => {
            let config = load_config(cli.config.as_deref(), rps)?;
            cmd_errors(config, &cities, country, csv.as_deref()).await
        }
        Commands::Dedup { input, csv, json } => cmd_dedup(&input, csv.as_deref(), json),
        Commands::Countries => {
            let client = CatalogClient::new(load_config(cli.config.as_deref(), None)?)?;
            let countries = client.countries().await?;
            print_entities(countries.iter().map(|c| (c.id, c.name.as_str())));
            Ok(())
        }
        Commands::Cities { country } => {
            let client = CatalogClient::new(load_config(cli.config.as_deref(), None)?)?;
            let cities = client.cities(country).await?;
            print_entities(cities.iter().map(|c| (c.id, c.name.as_str())));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, rps: Option<f64>) -> Result<ScanConfig> {
    let mut config = match path {
        Some(path) => ScanConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ScanConfig::load_default().context("loading default config")?,
    };
    if let Some(rps) = rps {
        config.rps = rps;
        config.validate()?;
    }
    Ok(config)
}

/// Context that cancels on Ctrl-C and logs progress
fn scan_context(config: &ScanConfig) -> ScanContext {
    let ctx = ScanContext::from_config(config).on_progress(|progress| {
        tracing::debug!(
            phase = ?progress.phase,
            percent = progress.percent,
            hotels = progress.hotels_loaded,
            enriched = progress.enriched,
            "Progress"
        );
    });

    let cancel = ctx.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling scan");
            cancel.cancel();
        }
    });

    ctx
}

async fn cmd_scan(
    config: ScanConfig,
    cities: &[u64],
    country: Option<u64>,
    csv: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut ctx = scan_context(&config);
    let client = CatalogClient::new(config)?;
    let outcome = run_scan(&client, cities, country, &mut ctx).await?;

    if let Some(path) = csv {
        write_clusters_csv(create(path)?, &outcome.clusters)?;
        tracing::info!(path = %path.display(), "Wrote CSV");
    }
    if json {
        write_json(io::stdout().lock(), &outcome.clusters)?;
        println!();
    } else {
        print_clusters(&outcome.clusters);
        print_stats(&outcome.stats);
    }
    Ok(())
}

async fn cmd_errors(
    config: ScanConfig,
    cities: &[u64],
    country: Option<u64>,
    csv: Option<&Path>,
) -> Result<()> {
    let mut ctx = scan_context(&config);
    let client = CatalogClient::new(config)?;
    let issues = run_error_scan(&client, cities, country, &mut ctx).await?;

    if let Some(path) = csv {
        write_issues_csv(create(path)?, &issues)?;
        tracing::info!(path = %path.display(), "Wrote CSV");
    }
    print_issues(&issues);
    Ok(())
}

fn cmd_dedup(input: &Path, csv: Option<&Path>, json: bool) -> Result<()> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let records: Vec<HotelRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", input.display()))?;

    let pairs = find_duplicates(&records);
    let clusters = consolidate(&pairs);
    tracing::info!(
        hotels = records.len(),
        flagged = pairs.len(),
        clusters = clusters.len(),
        "Detection finished"
    );

    if let Some(path) = csv {
        write_clusters_csv(create(path)?, &clusters)?;
    }
    if json {
        write_json(io::stdout().lock(), &clusters)?;
        println!();
    } else {
        print_clusters(&clusters);
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn print_clusters(clusters: &[DuplicateCluster]) {
    if clusters.is_empty() {
        println!("No duplicates found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Hotel name", "ID 1", "ID 2", "Flag", "Score", "Reason"]);
    for cluster in clusters {
        let others = cluster
            .other_ids()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            cluster.hotel_name.clone(),
            cluster.primary_id().to_string(),
            others,
            cluster.flag.to_string(),
            format!("{:.3}", cluster.confidence),
            cluster.reason.clone(),
        ]);
    }
    println!("{table}");
    println!("{} duplicate group(s)", clusters.len());
}

fn print_issues(issues: &[DescriptionIssue]) {
    if issues.is_empty() {
        println!("No description errors found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Hotel name", "ID", "Stars"]);
    for issue in issues {
        table.add_row(vec![
            issue.name.clone(),
            issue.hotel_id.to_string(),
            issue.stars.clone(),
        ]);
    }
    println!("{table}");
}

fn print_entities<'a>(entities: impl Iterator<Item = (u64, &'a str)>) {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name"]);
    for (id, name) in entities {
        table.add_row(vec![id.to_string(), name.to_string()]);
    }
    println!("{table}");
}

fn print_stats(stats: &StatsSnapshot) {
    println!(
        "{} requests, avg {} ms, peak {} ms",
        stats.request_count, stats.avg_response_ms, stats.peak_response_ms
    );
}
