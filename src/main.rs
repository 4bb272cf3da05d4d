//! # Fashion News Digest
//!
//! Collects Korean fashion-industry news from the Naver News Search API and
//! trade-press sites, curates it, and posts a short digest to Slack.
//!
//! ## Usage
//!
//! ```sh
//! NAVER_CLIENT_ID=... NAVER_CLIENT_SECRET=... SLACK_WEBHOOK_URL=... fashion_news_digest
//! ```
//!
//! Meant to be run by an external scheduler (cron, CI schedule); each
//! invocation is one independent run with no state carried between runs.
//!
//! ## Architecture
//!
//! 1. **Fetching**: query the search API per keyword, scrape each site once
//! 2. **Curation**: normalize, filter, trust-check, deduplicate, rank, cap
//! 3. **Output**: optional JSON archive, then Slack delivery

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod delivery;
mod error;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use cli::Cli;
use config::CurationConfig;
use delivery::slack::SlackNotifier;
use models::Digest;
use pipeline::curator::Curator;
use sources::naver::NaverSearchAdapter;
use sources::site::SiteScraper;
use utils::{ensure_writable_dir, upcase};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load .env before clap reads the environment
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("fashion_news_digest starting up");
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env loaded"),
    }

    let args = Cli::parse();
    let credentials = args.credentials();
    info!(?credentials, config = ?args.config, dry_run = args.dry_run, "Parsed CLI arguments");

    let config = CurationConfig::load(args.config.as_deref())?;

    // Early check: fail before any network traffic if the archive dir is unusable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
    }

    // ---- Adapters ----
    let client = sources::build_client(config.request_timeout())?;
    let backoff = config.rate_limit_backoff();

    let search = credentials.search().map(|(id, secret)| {
        NaverSearchAdapter::new(client.clone(), id, secret, config.recency_days, backoff)
    });
    let scrapers = config
        .sites
        .iter()
        .cloned()
        .filter_map(|profile| {
            let name = profile.name.clone();
            match SiteScraper::new(client.clone(), profile, backoff) {
                Ok(scraper) => Some(scraper),
                Err(e) => {
                    warn!(site = %name, error = %e, "Invalid site profile; skipping");
                    None
                }
            }
        })
        .collect::<Vec<_>>();
    info!(
        search = search.is_some(),
        scrapers = scrapers.len(),
        "Source adapters ready"
    );

    // ---- Curate ----
    let curator = Curator::new(config, credentials.clone(), search, scrapers);
    let digest = curator.curate().await;
    info!(
        items = digest.len(),
        placeholder = digest.is_placeholder(),
        edition = %digest.edition,
        "Digest ready"
    );

    // ---- Outputs ----
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = outputs::json::write_digest(&digest, dir).await {
            error!(error = %e, "Failed to write digest JSON");
        }
    }

    let delivered = if args.dry_run {
        print_digest(&digest);
        true
    } else {
        SlackNotifier::new(client, credentials.webhook())
            .send(&digest)
            .await
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        delivered,
        "Execution complete"
    );

    if delivered {
        Ok(())
    } else {
        Err("digest was not delivered".into())
    }
}

fn print_digest(digest: &Digest) {
    println!(
        "{} digest for {} ({} items)",
        upcase(&digest.edition),
        digest.local_date,
        digest.len()
    );
    for (i, item) in digest.items.iter().enumerate() {
        println!("{:>2}. [{}] {}", i + 1, item.published_at, item.title);
        println!("    {} | {}", item.source, item.link.as_deref().unwrap_or("-"));
        if !item.description.is_empty() {
            println!("    {}", item.description);
        }
    }
}
