//! Turns an extractor's raw field bag into a [`NormalizedListing`].
//!
//! [`normalize`] is total: every field degrades to `None` (or empty) on its
//! own when its raw text is missing or unparsable.

use crate::models::{NormalizedListing, RawListing};
use crate::utils::{clean_text, collapse_lines, dedupe_ordered, parse_decimal, parse_int};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Attribute labels consulted when the page has no dedicated location node.
const LOCATION_KEYS: [&str; 2] = ["location", "местоположение"];

/// Symbols and whole words, so "лв" never matches inside "Волво".
fn currency_candidates() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"€|\$|\p{L}+").expect("currency pattern is valid"))
}

fn vin_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("vin pattern is valid"))
}

/// `"Euro 6"`, `"EURO-5"`, `"Euro VI"`: an emission class, not a price.
fn is_emission_class(rest: &str) -> bool {
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '-');
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        return true;
    }
    let word: String = rest
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(word.as_str(), "i" | "ii" | "iii" | "iv" | "v" | "vi")
}

/// Currency code for the first known currency token in `text`.
pub fn detect_currency(text: &str) -> Option<&'static str> {
    currency_candidates().find_iter(text).find_map(|token| {
        match token.as_str().to_lowercase().as_str() {
            "€" | "eur" => Some("EUR"),
            "euro" | "евро" if !is_emission_class(&text[token.end()..]) => Some("EUR"),
            "лв" | "bgn" => Some("BGN"),
            "$" | "usd" => Some("USD"),
            _ => None,
        }
    })
}

fn has_digit(text: &Option<String>) -> bool {
    text.as_deref()
        .is_some_and(|t| t.chars().any(|c| c.is_ascii_digit()))
}

pub type CurrencyRule = fn(&RawListing) -> Option<String>;

/// Currency resolution, highest priority first.
pub const CURRENCY_RULES: &[(&str, CurrencyRule)] = &[
    ("explicit field", currency_from_explicit),
    ("price text", currency_from_price_text),
    ("populated price field", currency_from_price_fields),
    ("title", currency_from_title),
];

fn currency_from_explicit(raw: &RawListing) -> Option<String> {
    let explicit = raw.currency.as_deref()?.trim();
    detect_currency(explicit)
        .map(str::to_string)
        .or_else(|| {
            (explicit.len() == 3 && explicit.chars().all(|c| c.is_ascii_alphabetic()))
                .then(|| explicit.to_ascii_uppercase())
        })
}

fn currency_from_price_text(raw: &RawListing) -> Option<String> {
    detect_currency(raw.price_text.as_deref()?).map(str::to_string)
}

fn currency_from_price_fields(raw: &RawListing) -> Option<String> {
    if has_digit(&raw.price_euro) {
        Some("EUR".to_string())
    } else if has_digit(&raw.price_leva) {
        Some("BGN".to_string())
    } else {
        None
    }
}

fn currency_from_title(raw: &RawListing) -> Option<String> {
    detect_currency(raw.title.as_deref()?).map(str::to_string)
}

pub fn resolve_currency(raw: &RawListing) -> Option<String> {
    CURRENCY_RULES.iter().find_map(|(name, rule)| {
        let currency = rule(raw)?;
        debug!("currency {} resolved from {}", currency, name);
        Some(currency)
    })
}

fn decimal(text: &Option<String>) -> Option<f64> {
    text.as_deref().and_then(parse_decimal)
}

fn integer(text: &Option<String>) -> Option<i64> {
    text.as_deref().and_then(parse_int)
}

/// Combined price text, else the EUR amount, else the BGN amount.
pub fn resolve_price(raw: &RawListing) -> Option<f64> {
    decimal(&raw.price_text)
        .or_else(|| decimal(&raw.price_euro))
        .or_else(|| decimal(&raw.price_leva))
}

fn resolve_location(raw: &RawListing) -> Option<String> {
    clean_text(raw.location.as_deref()).or_else(|| {
        raw.attributes
            .iter()
            .find(|(label, _)| {
                let label = label.to_lowercase();
                LOCATION_KEYS.contains(&label.as_str())
            })
            .and_then(|(_, value)| clean_text(Some(value.as_str())))
    })
}

fn resolve_vin(raw: &RawListing) -> Option<String> {
    let vin: String = raw
        .vin
        .as_deref()?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    vin_pattern().is_match(&vin).then_some(vin)
}

/// Build the canonical record from a raw extraction. Never fails.
///
/// Text fields are whitespace-collapsed. The description is collapsed line by
/// line: line breaks from the page survive, blank lines are dropped.
pub fn normalize(raw: &RawListing) -> NormalizedListing {
    let description = raw
        .description
        .as_deref()
        .map(collapse_lines)
        .filter(|text| !text.is_empty());

    NormalizedListing {
        source: raw.source,
        url: raw.url.clone(),
        title: clean_text(raw.title.as_deref()),
        description,
        location: resolve_location(raw),
        posted_at: clean_text(raw.posted_at.as_deref()),
        price: resolve_price(raw),
        price_euro: decimal(&raw.price_euro),
        price_leva: decimal(&raw.price_leva),
        mileage_km: integer(&raw.mileage),
        year: integer(&raw.year),
        currency: resolve_currency(raw),
        vin: resolve_vin(raw),
        images: dedupe_ordered(raw.images.iter().cloned()),
        attributes: raw.attributes.clone(),
    }
}
