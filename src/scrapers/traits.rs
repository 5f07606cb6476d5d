use crate::error::ExtractError;
use crate::models::{RawListing, Source};
use scraper::Html;
use url::Url;

/// Common trait for all marketplace extractors
/// Adding a marketplace means implementing this and registering it; nothing
/// else in the pipeline changes.
pub trait Extractor: Send + Sync {
    /// Marketplace tag stamped on every listing this extractor produces
    fn source(&self) -> Source;

    /// Whether this extractor handles pages served from `host`
    fn matches_host(&self, host: &str) -> bool;

    /// Pull raw field strings out of a parsed page.
    ///
    /// Missing fields are left empty. Only a page that is unusable as a whole
    /// is an error.
    fn extract(&self, document: &Html, url: &Url) -> Result<RawListing, ExtractError>;
}
