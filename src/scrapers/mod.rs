pub mod fetch;
pub mod mobile_bg;
pub mod registry;
pub mod traits;
pub mod types;

pub use fetch::{EncodingSource, FetchedPage, HttpFetcher, PageFetcher};
pub use mobile_bg::MobileBgExtractor;
pub use registry::Registry;
pub use traits::Extractor;
pub use types::{ScrapeOptions, ScraperConfig};
