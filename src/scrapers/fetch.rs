use crate::error::FetchError;
use crate::scrapers::types::{ScrapeOptions, ScraperConfig};
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use scraper::Html;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Where the encoding used to decode a page came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    /// `<meta charset>` or `<meta http-equiv>` near the top of the document
    Meta,
    /// `charset` parameter of the `Content-Type` response header
    Header,
    /// Nothing usable was declared
    Fallback,
}

/// A downloaded page, decoded and parsed
#[derive(Debug)]
pub struct FetchedPage {
    pub url: Url,
    pub text: String,
    pub document: Html,
    pub encoding: &'static Encoding,
    pub encoding_source: EncodingSource,
}

/// Downloads a page and turns it into a queryable document.
///
/// The orchestrator only talks to this trait, so tests (or callers with their
/// own transport) can hand in pages without touching the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, options: &ScrapeOptions) -> Result<FetchedPage, FetchError>;
}

/// `reqwest`-backed fetcher with a browser-like request profile
pub struct HttpFetcher {
    client: Client,
    config: ScraperConfig,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(ScraperConfig::default())
    }

    pub fn with_config(config: ScraperConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    fn request(&self, url: &Url) -> RequestBuilder {
        self.client
            .get(url.clone())
            .header(USER_AGENT, self.config.user_agent.as_str())
            .header(ACCEPT, self.config.accept.as_str())
            .header(ACCEPT_LANGUAGE, self.config.accept_language.as_str())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::with_config(ScraperConfig::from_env()).expect("Failed to create default HttpFetcher")
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, options: &ScrapeOptions) -> Result<FetchedPage, FetchError> {
        let token = options.cancellation.clone().unwrap_or_default();
        if token.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        debug!("Fetching URL: {}", url);
        let (content_type, bytes) = download(self.request(url), &token).await?;
        debug!("Downloaded {} bytes of HTML", bytes.len());

        let (declared, encoding_source) =
            resolve_encoding(&bytes, content_type.as_deref(), self.config.sniff_window);
        // decode() honours a byte-order mark over the declared encoding
        let (text, encoding, had_errors) = declared.decode(&bytes);
        if had_errors {
            warn!("Malformed {} sequences in {}, replaced", encoding.name(), url);
        }
        info!(
            "Decoded {} as {} (from {:?})",
            url,
            encoding.name(),
            encoding_source
        );

        let text = text.into_owned();
        let document = Html::parse_document(&text);

        Ok(FetchedPage {
            url: url.clone(),
            text,
            document,
            encoding,
            encoding_source,
        })
    }
}

async fn download(
    request: RequestBuilder,
    token: &CancellationToken,
) -> Result<(Option<String>, Vec<u8>), FetchError> {
    let transfer = async {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Listing page returned status: {}", status);
            return Err(FetchError::Status {
                status,
                text: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok::<_, FetchError>((content_type, bytes))
    };

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            warn!("Fetch cancelled by caller");
            Err(FetchError::Cancelled)
        }
        result = transfer => result,
    }
}

fn meta_charset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9._:\-]+)"#)
            .expect("meta charset pattern is valid")
    })
}

fn header_charset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)charset\s*=\s*"?\s*([^";\s]+)"#).expect("header charset pattern is valid")
    })
}

/// Charset label declared by a `<meta>` tag within the first `window` bytes.
pub fn sniff_meta_charset(bytes: &[u8], window: usize) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(window)]);
    meta_charset()
        .captures(&head)
        .map(|caps| caps[1].to_string())
}

/// Charset label from a `Content-Type` header value.
pub fn header_charset_label(content_type: &str) -> Option<String> {
    header_charset()
        .captures(content_type)
        .map(|caps| caps[1].to_string())
}

/// Picks the encoding for a response body.
///
/// The in-document `<meta>` declaration wins over the HTTP header, and UTF-8
/// is used when neither is present. A label that `encoding_rs` does not know
/// also ends up as UTF-8; it does not fall through to the next source.
pub fn resolve_encoding(
    bytes: &[u8],
    content_type: Option<&str>,
    window: usize,
) -> (&'static Encoding, EncodingSource) {
    let declared = sniff_meta_charset(bytes, window)
        .map(|label| (label, EncodingSource::Meta))
        .or_else(|| {
            content_type
                .and_then(header_charset_label)
                .map(|label| (label, EncodingSource::Header))
        });

    match declared {
        Some((label, source)) => match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => (encoding, source),
            None => {
                debug!("Unknown charset {:?}, falling back to UTF-8", label);
                (UTF_8, EncodingSource::Fallback)
            }
        },
        None => (UTF_8, EncodingSource::Fallback),
    }
}
