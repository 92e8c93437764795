//! CLI administration tool for link-endings.
//!
//! Manages the ending pool and API keys, and shows statistics without
//! requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Pre-generate endings into the pool
//! cargo run --bin admin -- pool refill --count 10000
//!
//! # Show pool, link and click counts
//! cargo run --bin admin -- stats
//!
//! # Print sample candidates without touching the database
//! cargo run --bin admin -- generate --count 20 --length 6
//!
//! # Generate a random API key for API_KEYS
//! cargo run --bin admin -- key generate
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_*` components): PostgreSQL connection
//! - `ENDING_LENGTH`, `FORBIDDEN_ENDING_SUBSTRINGS`: generator settings

use link_endings::application::services::EndingPoolService;
use link_endings::config::{AllocationConfig, Config};
use link_endings::domain::repositories::{EndingPoolRepository, LinkRepository};
use link_endings::infrastructure::persistence::{PgEndingPoolRepository, PgLinkRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-endings.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage the ending pool
    Pool {
        #[command(subcommand)]
        action: PoolAction,
    },

    /// Show statistics
    Stats,

    /// Print candidate endings without storing them
    Generate {
        /// Number of candidates
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// Ending length (defaults to ENDING_LENGTH)
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Manage API keys
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Ending pool subcommands.
#[derive(Subcommand)]
enum PoolAction {
    /// Generate fresh endings into the pool
    Refill {
        /// Number of endings to add
        #[arg(short, long, default_value_t = 1000)]
        count: usize,
    },

    /// Show the number of pooled endings
    Status,
}

/// API key subcommands.
#[derive(Subcommand)]
enum KeyAction {
    /// Generate a random key to add to API_KEYS
    Generate,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let allocation = AllocationConfig::from_env();

    match cli.command {
        Commands::Generate { count, length } => handle_generate(&allocation, count, length)?,
        Commands::Key {
            action: KeyAction::Generate,
        } => handle_key_generate(),
        Commands::Pool { action } => {
            allocation.validate()?;
            let pool = connect().await?;
            handle_pool_action(action, &pool, &allocation).await?;
        }
        Commands::Stats => handle_stats(&connect().await?).await?,
        Commands::Db { action } => handle_db_action(action, &connect().await?).await?,
    }

    Ok(())
}

async fn connect() -> Result<PgPool> {
    let database_url = Config::load_database_url()?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

fn pool_service(
    pool: &PgPool,
    allocation: &AllocationConfig,
) -> EndingPoolService<dyn LinkRepository, dyn EndingPoolRepository> {
    let pool = Arc::new(pool.clone());
    let links: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let pending: Arc<dyn EndingPoolRepository> = Arc::new(PgEndingPoolRepository::new(pool));

    EndingPoolService::new(links, pending, allocation.generator())
}

/// Dispatches ending pool commands.
async fn handle_pool_action(
    action: PoolAction,
    pool: &PgPool,
    allocation: &AllocationConfig,
) -> Result<()> {
    let service = pool_service(pool, allocation);

    match action {
        PoolAction::Refill { count } => {
            println!("{}", "Refilling ending pool".bright_blue().bold());
            println!();
            println!(
                "  Length: {}",
                allocation.ending_length.to_string().bright_white()
            );
            println!("  Requested: {}", count.to_string().bright_white());

            let inserted = service
                .refill(count)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to refill pool: {}", e))?;

            println!(
                "  Inserted: {}",
                inserted.to_string().bright_green().bold()
            );
            if (inserted as usize) < count {
                println!(
                    "{}",
                    "  Fewer endings than requested: generation budget exhausted or duplicates skipped"
                        .yellow()
                );
            }
            println!();
        }
        PoolAction::Status => {
            let size = service
                .pool_size()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to count pool: {}", e))?;

            println!(
                "  Pooled endings: {}",
                size.to_string().bright_green().bold()
            );
            if size == 0 {
                println!(
                    "  Fill it with: {} admin -- pool refill",
                    "cargo run --bin".bright_cyan()
                );
            }
        }
    }

    Ok(())
}

/// Prints sample candidates from the configured generator.
fn handle_generate(
    allocation: &AllocationConfig,
    count: usize,
    length: Option<usize>,
) -> Result<()> {
    let allocation = AllocationConfig {
        ending_length: length.unwrap_or(allocation.ending_length),
        forbidden_substrings: allocation.forbidden_substrings.clone(),
    };
    allocation.validate()?;

    let candidates = allocation.generator().candidates(count);

    for candidate in &candidates {
        println!("  {}", candidate.bright_yellow());
    }

    if candidates.len() < count {
        println!(
            "{}",
            format!(
                "  Only {} of {} candidates generated",
                candidates.len(),
                count
            )
            .yellow()
        );
    }

    Ok(())
}

/// Prints a fresh random API key.
///
/// # Format
///
/// - Length: 48 characters
/// - Character set: A-Z, a-z, 0-9
fn handle_key_generate() {
    let key = generate_key();

    println!("{}", "Generated API key".bright_blue().bold());
    println!();
    println!("  {}", key.bright_yellow().bold());
    println!();
    println!("{}", "Add it to API_KEYS (comma-separated) and restart the service.".bright_white());
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        key.bright_yellow()
    );
    println!();
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Number of pooled endings
/// - Total number of clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let pending_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_endings")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks")
        .fetch_one(pool)
        .await?;

    println!(
        "  Links:          {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Pooled endings: {}",
        pending_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:         {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
    }

    Ok(())
}

fn generate_key() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const KEY_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..KEY_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
