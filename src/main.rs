mod db;
mod error;
mod export;
mod fetch;
mod film;
mod listing;
mod parser;
mod pipeline;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use tracing::error;

use error::ScrapeError;
use fetch::HttpFetcher;
use film::Film;
use pipeline::Pipeline;

#[derive(Parser)]
#[command(
    name = "film_scraper",
    about = "Scrape the highest-grossing films list into SQLite and JSON"
)]
struct Cli {
    /// Defaults to `run` with default settings
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the listing and film pages, then replace stored data
    Run(RunArgs),
    /// Stored films table
    Overview {
        /// Only films from this country
        #[arg(short, long)]
        country: Option<String>,
        /// Earliest release year (inclusive)
        #[arg(long)]
        year_min: Option<i32>,
        /// Latest release year (inclusive)
        #[arg(long)]
        year_max: Option<i32>,
        #[arg(short, long, value_enum, default_value_t = db::SortKey::BoxOfficeDesc)]
        sort: db::SortKey,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = db::DB_PATH)]
        db: PathBuf,
    },
    /// Summary of stored films
    Stats {
        #[arg(long, default_value = db::DB_PATH)]
        db: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Listing page to scrape
    #[arg(long, default_value = listing::LISTING_URL)]
    url: String,
    /// SQLite database to replace
    #[arg(long, default_value = db::DB_PATH)]
    db: PathBuf,
    /// JSON file to overwrite
    #[arg(long, default_value = export::JSON_PATH)]
    json: PathBuf,
    /// Pause after each film, in milliseconds
    #[arg(long, default_value_t = pipeline::REQUEST_DELAY_MS)]
    delay_ms: u64,
    /// Max films to scrape (default: all)
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            url: listing::LISTING_URL.to_string(),
            db: PathBuf::from(db::DB_PATH),
            json: PathBuf::from(export::JSON_PATH),
            delay_ms: pipeline::REQUEST_DELAY_MS,
            limit: None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(args),
        Commands::Overview {
            country,
            year_min,
            year_max,
            sort,
            limit,
            db,
        } => {
            let conn = db::connect(&db)?;
            db::init_schema(&conn)?;
            let filter = db::OverviewFilter {
                country,
                year_min,
                year_max,
                sort,
                limit,
            };
            let rows = db::fetch_overview(&conn, &filter)?;
            if rows.is_empty() {
                println!("No films match the current filters.");
                return Ok(());
            }
            print_overview(&rows);
            Ok(())
        }
        Commands::Stats { db } => {
            let conn = db::connect(&db)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            let year = |y: Option<i32>| y.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
            println!("Films:      {}", s.films);
            println!("Years:      {} - {}", year(s.first_year), year(s.last_year));
            println!("Countries:  {}", s.countries);
            println!("Box office: {}", format_dollars(s.total_box_office));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(HttpFetcher::new()?)
        .listing_url(&args.url)
        .delay(Duration::from_millis(args.delay_ms))
        .limit(args.limit);

    let output = match pipeline.run() {
        Ok(output) => output,
        Err(e) => {
            if let Some(ScrapeError::TableNotFound { .. }) = e.downcast_ref::<ScrapeError>() {
                error!("{}", e);
                println!("Could not find the main table with film data");
                return Ok(());
            }
            return Err(e);
        }
    };

    let conn = db::connect(&args.db)?;
    db::init_schema(&conn)?;
    let saved = db::replace_films(&conn, &output.films)?;
    export::write_json(&args.json, &output.films)?;

    println!(
        "Saved {} films to {} and {}.",
        saved,
        args.db.display(),
        args.json.display()
    );
    println!("Successfully extracted data for {} films", output.films.len());
    Ok(())
}

fn print_overview(rows: &[Film]) {
    println!(
        "{:>3} | {:<32} | {:>4} | {:<24} | {:>15} | {:<16}",
        "#", "Title", "Year", "Director", "Box office", "Country"
    );
    println!("{}", "-".repeat(110));

    for (i, f) in rows.iter().enumerate() {
        let year = f.release_year.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
        let gross = f.box_office.map(format_dollars).unwrap_or_else(|| "-".into());
        println!(
            "{:>3} | {:<32} | {:>4} | {:<24} | {:>15} | {:<16}",
            i + 1,
            truncate(&f.title, 32),
            year,
            truncate(f.director_or_unknown(), 24),
            gross,
            truncate(f.country_or_unknown(), 16),
        );
    }

    println!("\n{} films", rows.len());
}

/// Whole dollars with thousands separators: `2923706026.0` -> `$2,923,706,026`.
fn format_dollars(amount: f64) -> String {
    let whole = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
