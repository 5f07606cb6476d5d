use anyhow::{Context, Result};
use car_scout::{CarScraper, ScrapeOptions, ScraperConfig};
use clap::Parser;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Scrape a single vehicle listing and print it as JSON
#[derive(Debug, Parser)]
#[command(name = "car-scout", version)]
struct Cli {
    /// Listing URL, e.g. https://www.mobile.bg/obiava-...
    url: String,

    /// Print the raw extraction next to the normalized listing
    #[arg(long)]
    raw: bool,

    /// Request timeout in seconds
    #[arg(long, env = "CAR_SCOUT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ScraperConfig::from_env();
    if let Some(secs) = cli.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }

    let scraper = CarScraper::new(config).context("Failed to create HTTP client")?;

    // Ctrl-C aborts the in-flight request
    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling scrape");
            on_interrupt.cancel();
        }
    });

    info!("🚗 Car Scout - {}", cli.url);
    let result = scraper
        .scrape(&cli.url, &ScrapeOptions::with_cancellation(token))
        .await
        .with_context(|| format!("Failed to scrape {}", cli.url))?;

    let json = if cli.raw {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string_pretty(&result.listing)?
    };
    println!("{}", json);

    info!(
        "💾 {} images, {} attributes",
        result.listing.images.len(),
        result.listing.attributes.len()
    );

    Ok(())
}
