//! CLI administration tool for tinylink.
//!
//! Runs the shortening engine and the stats reporter directly against the
//! configured storage, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! cargo run --bin tinylink-admin -- shorten https://example.com/some/path
//!
//! # View statistics
//! cargo run --bin tinylink-admin -- stats --page 2 --page-size 20
//!
//! # Check database connection
//! cargo run --bin tinylink-admin -- db check
//! ```
//!
//! Reads the same environment variables as the server (`DATABASE_URL`,
//! `BASE_URL`, `CLOCK_UTC_OFFSET_MINUTES`, ...).

use tinylink::AppError;
use tinylink::application::services::{ShortenOutcome, StatsReport};
use tinylink::config::{self, Config, mask_connection_string};
use tinylink::server::{self, Storage};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

/// CLI tool for managing tinylink.
#[derive(Parser)]
#[command(name = "tinylink-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Shorten a long URL (or renew its mapping)
    Shorten {
        /// Absolute http(s) URL
        url: String,
    },

    /// Show access statistics
    Stats {
        #[arg(short, long, default_value_t = 1)]
        page: i64,

        #[arg(short = 's', long, default_value_t = 10)]
        page_size: i64,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check storage connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let storage = server::connect_storage(&config)
        .await
        .context("Failed to open storage")?;

    match cli.command {
        Commands::Shorten { url } => handle_shorten(&config, &storage, &url).await?,
        Commands::Stats { page, page_size } => {
            handle_stats(&config, &storage, page, page_size).await?
        }
        Commands::Db { action } => handle_db_action(action, &config, &storage).await?,
    }

    Ok(())
}

/// Shortens `url` and prints the resulting short URL.
async fn handle_shorten(config: &Config, storage: &Storage, url: &str) -> Result<()> {
    let state = server::build_state(config, storage)?;

    let shortened = state
        .link_service
        .shorten(url)
        .await
        .map_err(describe)?;

    let outcome = match shortened.outcome {
        ShortenOutcome::Created => "created".green(),
        ShortenOutcome::Existing => "existing".cyan(),
        ShortenOutcome::Renewed => "renewed".yellow(),
    };

    println!("{}", "🔗 Shortened".bright_blue().bold());
    println!();
    println!("  Long URL:  {}", shortened.mapping.long_url.bright_white());
    println!("  Token:     {}", shortened.token().bright_yellow().bold());
    println!(
        "  Short URL: {}",
        state.short_url(shortened.token()).bright_green()
    );
    println!("  Mapping:   {outcome}");

    let hits = state
        .stats_service
        .access_count(shortened.mapping.id)
        .await
        .map_err(describe)?;
    println!("  Hits:      {}", hits.to_string().bright_green());
    println!();

    Ok(())
}

/// Prints one page of access statistics.
///
/// # Output Format
///
/// ```text
/// 📊 Statistics (page 1 of 3, 25 records)
///
///   Token   Hits    Last accessed        Long URL
///   ───────────────────────────────────────────────────────────────────────────
///   a1b2c3  4       2024-06-01 12:45:09  https://example.com
/// ```
async fn handle_stats(
    config: &Config,
    storage: &Storage,
    page: i64,
    page_size: i64,
) -> Result<()> {
    let state = server::build_state(config, storage)?;

    let report = state
        .stats_service
        .paginate(page, page_size)
        .await
        .map_err(describe)?;

    let page = match report {
        StatsReport::Empty => {
            println!("{}", "  No data available.".yellow());
            return Ok(());
        }
        StatsReport::Page(page) => page,
    };

    println!(
        "{}",
        format!(
            "📊 Statistics (page {} of {}, {} records)",
            page.current_page, page.total_pages, page.total_records
        )
        .bright_blue()
        .bold()
    );
    println!();
    println!(
        "  {:<7} {:<7} {:<20} {}",
        "Token".bright_white().bold(),
        "Hits".bright_white().bold(),
        "Last accessed".bright_white().bold(),
        "Long URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for record in &page.records {
        println!(
            "  {:<7} {:<7} {:<20} {}",
            record.short_token.cyan(),
            record.access_count.to_string().bright_green(),
            record
                .last_accessed
                .as_deref()
                .unwrap_or("never")
                .bright_black(),
            record.long_url
        );
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, config: &Config, storage: &Storage) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking storage connection...".bright_blue());
            println!(
                "  Storage: {}",
                mask_connection_string(&config.database_url).bright_white()
            );

            if let Some(pool) = &storage.pool {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
            }
            let tracked = storage.stats.count_tracked().await.map_err(describe)?;

            println!("{}", "✅ Storage connection OK".green().bold());
            println!("  Tracked mappings: {}", tracked.to_string().bright_green());
        }
    }

    Ok(())
}

/// Turns an engine error into a printable one, keeping the error code.
fn describe(err: AppError) -> anyhow::Error {
    anyhow::anyhow!("{} ({})", err, err.code())
}
