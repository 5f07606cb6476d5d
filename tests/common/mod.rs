#![allow(dead_code)]

use async_trait::async_trait;
use car_scout::error::{ExtractError, FetchError};
use car_scout::scrapers::{EncodingSource, FetchedPage};
use car_scout::{
    CarScraper, Extractor, MobileBgExtractor, PageFetcher, RawListing, Registry, ScrapeOptions,
    Source,
};
use encoding_rs::UTF_8;
use scraper::Html;
use std::path::PathBuf;
use std::sync::OnceLock;
use url::Url;

static TRACING: OnceLock<()> = OnceLock::new();

pub fn init_test_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("car_scout=debug")
            .with_test_writer()
            .try_init();
    });
}

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// Serves the same HTML for every URL without touching the network.
pub struct FixtureFetcher {
    html: String,
}

impl FixtureFetcher {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn from_fixture(name: &str) -> Self {
        Self::new(fixture(name))
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &Url, options: &ScrapeOptions) -> Result<FetchedPage, FetchError> {
        if options
            .cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
        {
            return Err(FetchError::Cancelled);
        }

        Ok(FetchedPage {
            url: url.clone(),
            text: self.html.clone(),
            document: Html::parse_document(&self.html),
            encoding: UTF_8,
            encoding_source: EncodingSource::Fallback,
        })
    }
}

pub fn fixture_scraper(name: &str) -> CarScraper {
    CarScraper::with_parts(
        Registry::default(),
        Box::new(FixtureFetcher::from_fixture(name)),
    )
}

/// mobile.bg extraction, served from a local mock server.
pub struct LocalMobileBg;

impl Extractor for LocalMobileBg {
    fn source(&self) -> Source {
        Source::MobileBg
    }

    fn matches_host(&self, host: &str) -> bool {
        host == "127.0.0.1" || host == "localhost"
    }

    fn extract(&self, document: &Html, url: &Url) -> Result<RawListing, ExtractError> {
        MobileBgExtractor::new().extract(document, url)
    }
}
