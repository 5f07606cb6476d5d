use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace a listing was scraped from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Source {
    #[serde(rename = "mobile.bg")]
    MobileBg,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::MobileBg => "mobile.bg",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label/value pairs as they appear on the page, in page order.
pub type Attributes = IndexMap<String, String>;

/// What an extractor found on the page, before any validation.
///
/// Every field except `source` and `url` is optional: a missing selector
/// leaves its field empty instead of failing the scrape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    pub source: Source,
    pub url: String,
    pub title: Option<String>,
    /// Combined price text, e.g. `"12 500 €"`.
    pub price_text: Option<String>,
    /// Amount of the primary (EUR) price segment.
    pub price_euro: Option<String>,
    /// Amount of the secondary (local currency) price segment.
    pub price_leva: Option<String>,
    /// Explicit currency, when the page states one separately from the price.
    pub currency: Option<String>,
    pub year: Option<String>,
    pub mileage: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub posted_at: Option<String>,
    pub vin: Option<String>,
    pub images: Vec<String>,
    pub attributes: Attributes,
}

impl RawListing {
    pub fn new(source: Source, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
            title: None,
            price_text: None,
            price_euro: None,
            price_leva: None,
            currency: None,
            year: None,
            mileage: None,
            description: None,
            location: None,
            posted_at: None,
            vin: None,
            images: Vec::new(),
            attributes: Attributes::new(),
        }
    }
}

/// Canonical listing record handed to persistence and UI layers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedListing {
    pub source: Source,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub posted_at: Option<String>,
    pub price: Option<f64>,
    pub price_euro: Option<f64>,
    pub price_leva: Option<f64>,
    pub mileage_km: Option<i64>,
    pub year: Option<i64>,
    pub currency: Option<String>,
    pub vin: Option<String>,
    pub images: Vec<String>,
    pub attributes: Attributes,
}

/// Rebuilds a raw record from canonical values, so a normalized listing can
/// be fed back through the normalizer.
impl From<&NormalizedListing> for RawListing {
    fn from(listing: &NormalizedListing) -> Self {
        Self {
            source: listing.source,
            url: listing.url.clone(),
            title: listing.title.clone(),
            price_text: listing.price.map(|p| p.to_string()),
            price_euro: listing.price_euro.map(|p| p.to_string()),
            price_leva: listing.price_leva.map(|p| p.to_string()),
            currency: listing.currency.clone(),
            year: listing.year.map(|y| y.to_string()),
            mileage: listing.mileage_km.map(|km| km.to_string()),
            description: listing.description.clone(),
            location: listing.location.clone(),
            posted_at: listing.posted_at.clone(),
            vin: listing.vin.clone(),
            images: listing.images.clone(),
            attributes: listing.attributes.clone(),
        }
    }
}

/// Output of a single scrape: both records plus when it happened
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub listing: NormalizedListing,
    pub raw: RawListing,
    pub scraped_at: DateTime<Utc>,
}
