//! Single-listing scraper for vehicle classifieds.
//!
//! [`scrape_car_listing`] resolves the marketplace from the URL, downloads and
//! decodes the page, extracts raw fields and normalizes them into a
//! [`NormalizedListing`].
//!
//! ```no_run
//! # async fn demo() -> Result<(), car_scout::ScrapeError> {
//! use car_scout::{scrape_car_listing, ScrapeOptions};
//!
//! let result = scrape_car_listing(
//!     "https://www.mobile.bg/obiava-11712345678901234-bmw-330",
//!     &ScrapeOptions::default(),
//! )
//! .await?;
//! println!("{:?} {:?}", result.listing.title, result.listing.price);
//! # Ok(()) }
//! ```

pub mod error;
pub mod models;
pub mod normalize;
pub mod scrapers;
pub mod utils;

pub use error::{ExtractError, FetchError, ScrapeError, StageError};
pub use models::{NormalizedListing, RawListing, ScrapeResult, Source};
pub use normalize::normalize;
pub use scrapers::{
    Extractor, HttpFetcher, MobileBgExtractor, PageFetcher, Registry, ScrapeOptions,
    ScraperConfig,
};

use chrono::Utc;
use std::sync::OnceLock;
use tracing::{info, warn};
use url::Url;

/// Registry plus fetcher: everything a scrape needs.
pub struct CarScraper {
    registry: Registry,
    fetcher: Box<dyn PageFetcher>,
}

impl CarScraper {
    /// Default registry with an HTTP fetcher built from `config`.
    pub fn new(config: ScraperConfig) -> Result<Self, FetchError> {
        Ok(Self::with_parts(
            Registry::default(),
            Box::new(HttpFetcher::with_config(config)?),
        ))
    }

    pub fn with_parts(registry: Registry, fetcher: Box<dyn PageFetcher>) -> Self {
        Self { registry, fetcher }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Scrape one listing.
    ///
    /// A bad URL or an unknown host fails before any request is made. Fetch and
    /// extraction failures are wrapped in [`ScrapeError::Execution`] with the
    /// original error as the cause. Nothing is retried.
    pub async fn scrape(
        &self,
        url: &str,
        options: &ScrapeOptions,
    ) -> Result<ScrapeResult, ScrapeError> {
        let parsed = Url::parse(url.trim()).map_err(|source| ScrapeError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let Some(extractor) = self.registry.resolve(&parsed) else {
            warn!("No extractor registered for {}", parsed);
            return Err(ScrapeError::UnsupportedMarketplace {
                url: parsed.to_string(),
            });
        };
        let marketplace = extractor.source();
        info!("Scraping {} listing {}", marketplace, parsed);

        let raw = self
            .fetch_and_extract(extractor, &parsed, options)
            .await
            .map_err(|cause| {
                warn!("{} scrape of {} failed: {}", marketplace, parsed, cause);
                ScrapeError::Execution {
                    url: parsed.to_string(),
                    marketplace,
                    cause,
                }
            })?;

        let listing = normalize(&raw);
        info!(
            "✅ Scraped {:?} ({:?} {:?})",
            listing.title, listing.price, listing.currency
        );

        Ok(ScrapeResult {
            listing,
            raw,
            scraped_at: Utc::now(),
        })
    }

    async fn fetch_and_extract(
        &self,
        extractor: &dyn Extractor,
        url: &Url,
        options: &ScrapeOptions,
    ) -> Result<RawListing, StageError> {
        let page = self.fetcher.fetch(url, options).await?;
        Ok(extractor.extract(&page.document, &page.url)?)
    }
}

impl Default for CarScraper {
    fn default() -> Self {
        Self::with_parts(Registry::default(), Box::new(HttpFetcher::default()))
    }
}

fn default_scraper() -> &'static CarScraper {
    static SCRAPER: OnceLock<CarScraper> = OnceLock::new();
    SCRAPER.get_or_init(CarScraper::default)
}

/// Scrape one listing with the process-wide default registry and fetcher.
pub async fn scrape_car_listing(
    url: &str,
    options: &ScrapeOptions,
) -> Result<ScrapeResult, ScrapeError> {
    default_scraper().scrape(url, options).await
}
