//! CLI administration tool for short-url.
//!
//! Works directly against the PostgreSQL record store, without going through
//! the HTTP API. When the Redis cache is configured, `enable` and `disable`
//! re-read the record after writing it and store that copy in the cache, so
//! redirects pick up the change immediately.
//!
//! # Usage
//!
//! ```bash
//! # Most clicked short URLs
//! cargo run --bin admin -- stats --limit 20
//!
//! # Inspect one record
//! cargo run --bin admin -- show Ab3_x9Z
//!
//! # Toggle redirects
//! cargo run --bin admin -- disable Ab3_x9Z
//! cargo run --bin admin -- enable Ab3_x9Z
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `REDIS_URL` or `REDIS_*`, `CACHE_BACKEND`, `CACHE_TTL_SECONDS`: cache
//!   refreshed after `enable` and `disable`

use short_url::application::services::DEFAULT_STATS_LIMIT;
use short_url::config::{CacheBackend, Config};
use short_url::domain::entities::{ShortUrlPatch, ShortUrlRecord};
use short_url::domain::repositories::RecordStore;
use short_url::error::ErrorKind;
use short_url::infrastructure::cache::{CacheService, RedisCache, connect_manager};
use short_url::infrastructure::persistence::PgRecordStore;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing short-url.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the most clicked short URLs
    Stats {
        /// Number of records to show
        #[arg(short, long, default_value_t = DEFAULT_STATS_LIMIT)]
        limit: i64,
    },

    /// Show a single short URL
    Show {
        /// Short URL identifier
        id: String,
    },

    /// Re-enable redirects for a short URL
    Enable {
        /// Short URL identifier
        id: String,
    },

    /// Disable redirects for a short URL
    Disable {
        /// Short URL identifier
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
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
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL or DB_* must be set")?;

    let pool = PgPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    let store = PgRecordStore::new(Arc::new(pool.clone()));

    match cli.command {
        Commands::Stats { limit } => show_stats(&store, limit).await?,
        Commands::Show { id } => show_record(&store, &id).await?,
        Commands::Enable { id } => {
            let cache = connect_cache(&config).await;
            set_enabled(&store, cache.as_deref(), &id, true, true).await?
        }
        Commands::Disable { id, yes } => {
            let cache = connect_cache(&config).await;
            set_enabled(&store, cache.as_deref(), &id, false, yes).await?
        }
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Prints the top records by clicks.
///
/// ```text
/// Top short URLs
///
///   ID          Clicks    Status     URL
///   -------------------------------------------------------------------
///   Ab3_x9Z     1024      ENABLED    https://example.com/landing
/// ```
async fn show_stats(store: &PgRecordStore, limit: i64) -> Result<()> {
    let limit = if limit <= 0 { DEFAULT_STATS_LIMIT } else { limit };

    println!("{}", "Top short URLs".bright_blue().bold());
    println!();

    let records = store
        .top_by_clicks(limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    if records.is_empty() {
        println!("{}", "  No short URLs yet".yellow());
        return Ok(());
    }

    println!(
        "  {:<12} {:<9} {:<10} {}",
        "ID".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Status".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "-".repeat(75).bright_black());

    for record in &records {
        println!(
            "  {:<12} {:<9} {:<10} {}",
            record.id.cyan(),
            record.clicks.to_string().bright_green(),
            status_label(record),
            truncate(&record.url, 60)
        );
    }

    println!();
    println!("  Shown: {}", records.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn show_record(store: &PgRecordStore, id: &str) -> Result<()> {
    let record = find(store, id).await?;

    println!("{}", "Short URL".bright_blue().bold());
    println!();
    println!("  ID:       {}", record.id.cyan());
    println!("  URL:      {}", record.url.bright_white());
    println!(
        "  Created:  {}",
        record
            .create_time
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );
    println!("  Status:   {}", status_label(&record));
    println!(
        "  Clicks:   {}",
        record.clicks.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Redis cache shared with the server, if one is configured and reachable.
///
/// The in-process memory cache lives inside the server, so it is never
/// reachable from here.
async fn connect_cache(config: &Config) -> Option<Box<dyn CacheService>> {
    let redis_url = match (config.cache_backend, &config.redis_url) {
        (CacheBackend::Redis, Some(url)) => url,
        _ => return None,
    };

    match connect_manager(redis_url).await {
        Ok(manager) => Some(Box::new(RedisCache::from_manager(
            manager,
            config.cache_ttl_seconds,
        ))),
        Err(e) => {
            println!(
                "{}",
                format!("⚠ Redis unavailable ({e}), cached copies will expire on their own").yellow()
            );
            None
        }
    }
}

/// Toggles the `enabled` flag, asking for confirmation unless `skip_confirm`,
/// then refreshes the cached copy from the store.
async fn set_enabled(
    store: &PgRecordStore,
    cache: Option<&dyn CacheService>,
    id: &str,
    enabled: bool,
    skip_confirm: bool,
) -> Result<()> {
    let record = find(store, id).await?;

    if record.enabled == enabled {
        println!(
            "{}",
            format!("Short URL {} is already {}", id, status_word(enabled)).yellow()
        );
        return Ok(());
    }

    println!("  ID:  {}", record.id.cyan());
    println!("  URL: {}", record.url.bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Mark this short URL as {}?", status_word(enabled)))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let patch = ShortUrlPatch {
        url: None,
        enabled: Some(enabled),
    };

    store
        .update_fields(id, patch)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update short URL: {}", e))?;

    println!(
        "{}",
        format!("✓ Short URL {} is now {}", id, status_word(enabled))
            .green()
            .bold()
    );

    let Some(cache) = cache else {
        return Ok(());
    };

    match refresh_cache(store, cache, id).await {
        Ok(()) => println!("{}", "✓ Cache refreshed".green()),
        Err(e) => println!(
            "{}",
            format!("⚠ Cache refresh failed ({e}), cached copies will expire on their own").yellow()
        ),
    }

    Ok(())
}

/// Re-reads `id` from the store and overwrites the cached copy with it.
async fn refresh_cache(store: &dyn RecordStore, cache: &dyn CacheService, id: &str) -> Result<()> {
    let record = find(store, id).await?;
    cache
        .set(&record)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
}

async fn find(store: &dyn RecordStore, id: &str) -> Result<ShortUrlRecord> {
    match store.find_by_id(id).await {
        Ok(Some(record)) => Ok(record),
        Ok(None) => anyhow::bail!("Short URL '{}' not found", id),
        Err(e) if e.kind() == ErrorKind::NotFound => anyhow::bail!("Short URL '{}' not found", id),
        Err(e) => Err(anyhow::anyhow!("Database error: {}", e)),
    }
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✓ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_urls")
                .fetch_one(pool)
                .await?;
            let clicks: i64 =
                sqlx::query_scalar("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM short_urls")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL:  {}", version.bright_white());
            println!("  Short URLs:  {}", records.to_string().bright_green().bold());
            println!("  Clicks:      {}", clicks.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}

fn status_word(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

fn status_label(record: &ShortUrlRecord) -> ColoredString {
    if record.enabled {
        "ENABLED".green()
    } else {
        "DISABLED".red()
    }
}

fn truncate(url: &str, max: usize) -> String {
    if url.chars().count() <= max {
        url.to_string()
    } else {
        let head: String = url.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
