use crate::scrapers::mobile_bg::MobileBgExtractor;
use crate::scrapers::traits::Extractor;
use url::Url;

/// Ordered set of extractors, resolved by hostname
pub struct Registry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Registry {
    pub fn new(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { extractors }
    }

    /// First registered extractor whose host predicate accepts the URL.
    pub fn resolve(&self, url: &Url) -> Option<&dyn Extractor> {
        let host = url.host_str()?.to_ascii_lowercase();
        self.extractors
            .iter()
            .find(|extractor| extractor.matches_host(&host))
            .map(|extractor| extractor.as_ref())
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(vec![Box::new(MobileBgExtractor::new())])
    }
}
