//! Extractor for vehicle listings on mobile.bg.
//!
//! The site serves several template generations at once, so every field is
//! read through an ordered list of strategies: the current markup first,
//! then older layouts. The first strategy that yields a non-empty value wins.

use crate::error::ExtractError;
use crate::models::{Attributes, RawListing, Source};
use crate::normalize::detect_currency;
use crate::scrapers::traits::Extractor;
use crate::utils::{collapse_lines, collapse_whitespace, dedupe_ordered};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

const HOST: &str = "mobile.bg";
const FEATURES_KEY: &str = "Features";

/// Lazy-load attributes are preferred over `src`, in this order.
const IMAGE_ATTRS: [&str; 3] = ["data-src", "data-lazy", "src"];

struct Selectors {
    title_heading: Selector,
    title_container: Selector,
    og_title: Selector,
    price_containers: Vec<Selector>,
    manufacture_date: Selector,
    mileage: Selector,
    tech_items: Selector,
    definition_list: Selector,
    features: Selector,
    galleries: Vec<Selector>,
    image: Selector,
    rich_description: Selector,
    legacy_description: Selector,
    location: Selector,
    statistics: Selector,
    body: Selector,
}

fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector is valid")
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        title_heading: css("div.obTitle h1"),
        title_container: css("div.obTitle"),
        og_title: css(r#"meta[property="og:title"]"#),
        price_containers: vec![css("div.Price"), css("span#details_price")],
        manufacture_date: css("div.mainCarParams div.item.proizvodstvo div.mpInfo"),
        mileage: css("div.mainCarParams div.item.probeg div.mpInfo"),
        tech_items: css("div.techData div.items div.item"),
        definition_list: css("div.carParams dl"),
        features: css("div.carExtri ul li"),
        galleries: vec![
            css("div#owlcarousel"),
            css("div.owl-carousel"),
            css("div#pictures_moving"),
        ],
        image: css("img"),
        rich_description: css("div.moreInfo div.text"),
        legacy_description: css("div.description"),
        location: css("div.carLocation"),
        statistics: css("div.statistiki"),
        body: css("body"),
    })
}

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern is valid"))
}

fn year_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?:^|\D)((?:19|20)\d{2})(?:\D|$)")
}

fn line_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?i)<br\s*/?>")
}

fn paragraph_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?i)</p\s*>")
}

fn amount_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"\d(?:[\d\s.,]*\d)?")
}

fn currency_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?i)(?:^|[^\p{L}])(€|\$|eur|bgn|usd|лв\.?)(?:[^\p{L}]|$)")
}

fn mileage_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?i)пробег|километраж|mileage")
}

fn vin_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"\b[A-HJ-NPR-Z0-9]{17}\b")
}

fn published_at_time() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(
        &RE,
        r"(?i)публикувана\s+в\s+(\d{1,2}:\d{2})\s+часа\s+на\s+(\d{1,2}\s+\p{L}+,?\s+\d{4}|\d{1,2}\.\d{1,2}\.\d{4})",
    )
}

fn published_on() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(
        &RE,
        r"(?i)публикувана\s+на\s+(\d{1,2}\s+\p{L}+,?\s+\d{4}|\d{1,2}\.\d{1,2}\.\d{4})",
    )
}

/// Location cleanup, applied in order: leading phrase, settlement prefix,
/// region prefix, trailing region clause.
fn location_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?i)^\s*(?:намира\s+се\s+в|местоположение\s*:?)\s*", ""),
            (r"(?i)^(?:гр\.|град\s|с\.|село\s)\s*", ""),
            (r"(?i)^(?:обл\.|област\s)\s*", ""),
            (r"(?i),\s*(?:обл\.|област\s).*$", ""),
        ]
        .into_iter()
        .map(|(source, replacement)| {
            (Regex::new(source).expect("static pattern is valid"), replacement)
        })
        .collect()
    })
}

/// Price segment split into its amount and currency token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSegment {
    /// Cleaned segment text, e.g. `"12 500 €"`
    pub text: String,
    /// Digits and decimal separators only, e.g. `"12500"`
    pub amount: Option<String>,
    /// The currency as written, e.g. `"€"` or `"лв."`. Slots are filled by
    /// position, so this is only logged when a segment looks swapped.
    pub currency: Option<String>,
}

/// Split one price segment into amount and currency token.
pub fn parse_price_segment(segment: &str) -> PriceSegment {
    let text = collapse_whitespace(segment);
    let amount = amount_pattern()
        .find(&text)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect());
    let currency = currency_token()
        .captures(&text)
        .map(|caps| caps[1].to_string());

    PriceSegment {
        text,
        amount,
        currency,
    }
}

/// Resolve image sources against the page URL.
///
/// Sources are deduplicated as written, before resolution, so two spellings
/// of one resource (`//host/a.jpg` and `https://host/a.jpg`) both survive.
pub fn resolve_image_urls<I, S>(sources: I, base: &Url) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    dedupe_ordered(sources)
        .into_iter()
        .filter(|src| !src.starts_with("data:"))
        .filter_map(|src| base.join(&src).ok())
        .map(String::from)
        .collect()
}

/// Cleanup sequence for the location node.
pub fn clean_location(text: &str) -> Option<String> {
    let mut location = collapse_whitespace(text);
    for (rule, replacement) in location_rules() {
        let replaced = rule.replace(&location, *replacement).trim().to_string();
        location = replaced;
    }
    let location = location.trim_matches(|c: char| c == ',' || c.is_whitespace());
    if location.is_empty() {
        None
    } else {
        Some(location.to_string())
    }
}

/// `"DATE TIME"` or `"DATE"` from a "published ..." phrase.
pub fn parse_posted_at(text: &str) -> Option<String> {
    let text = collapse_whitespace(text);
    if let Some(caps) = published_at_time().captures(&text) {
        return Some(format!("{} {}", &caps[2], &caps[1]));
    }
    published_on()
        .captures(&text)
        .map(|caps| caps[1].to_string())
}

fn find_year(text: &str) -> Option<String> {
    year_pattern()
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Text of an element with child text nodes separated by spaces.
fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Line breaks and paragraph ends become newlines, other markup is dropped.
fn rich_text_to_plain(inner_html: &str) -> String {
    let marked = line_break().replace_all(inner_html, "\n");
    let marked = paragraph_close().replace_all(&marked, "</p>\n");
    let fragment = Html::parse_fragment(&marked);
    collapse_lines(&fragment.root_element().text().collect::<String>())
}

/// A body with neither child elements nor text; a gallery-only body is fine.
fn is_blank(document: &Html) -> bool {
    let Some(body) = document.select(&selectors().body).next() else {
        return true;
    };
    let has_elements = body
        .descendants()
        .skip(1)
        .any(|node| node.value().is_element());
    !has_elements && body.text().all(|text| text.trim().is_empty())
}

/// A page being extracted, with the technical data list read once up front.
struct Page<'a> {
    document: &'a Html,
    tech_items: Vec<(String, String)>,
}

impl<'a> Page<'a> {
    fn new(document: &'a Html) -> Self {
        let sel = selectors();
        let tech_items = document
            .select(&sel.tech_items)
            .filter_map(|item| {
                let mut columns = item
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|column| column.value().name() == "div");
                let label = element_text(columns.next()?);
                let value = element_text(columns.next()?);
                Some((label.trim_end_matches(':').trim().to_string(), value))
            })
            .filter(|(label, _)| !label.is_empty())
            .collect();

        Self {
            document,
            tech_items,
        }
    }

    fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .next()
            .map(element_text)
            .and_then(non_empty)
    }
}

type Strategy = fn(&Page<'_>) -> Option<String>;

const TITLE: &[Strategy] = &[title_heading, title_leading_text, title_og_meta];
const YEAR: &[Strategy] = &[year_manufacture_date, year_tech_value];
const MILEAGE: &[Strategy] = &[mileage_dedicated, mileage_tech_label];
const DESCRIPTION: &[Strategy] = &[description_rich, description_legacy];
const LOCATION: &[Strategy] = &[location_node];
const POSTED_AT: &[Strategy] = &[posted_at_statistics, posted_at_body];

fn first_match(field: &str, page: &Page<'_>, strategies: &[Strategy]) -> Option<String> {
    let found = strategies
        .iter()
        .enumerate()
        .find_map(|(idx, strategy)| strategy(page).map(|value| (idx, value)));

    match found {
        Some((0, value)) => Some(value),
        Some((idx, value)) => {
            debug!("{}: primary selector missed, fallback #{} matched", field, idx);
            Some(value)
        }
        None => {
            debug!("{}: not found on page", field);
            None
        }
    }
}

fn title_heading(page: &Page<'_>) -> Option<String> {
    page.first_text(&selectors().title_heading)
}

/// Only the container's own leading text; nested badges and links are skipped.
fn title_leading_text(page: &Page<'_>) -> Option<String> {
    let container = page.document.select(&selectors().title_container).next()?;
    container
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| collapse_whitespace(text))
        .find(|text| !text.is_empty())
}

fn title_og_meta(page: &Page<'_>) -> Option<String> {
    page.document
        .select(&selectors().og_title)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(collapse_whitespace)
        .and_then(non_empty)
}

fn year_manufacture_date(page: &Page<'_>) -> Option<String> {
    find_year(&page.first_text(&selectors().manufacture_date)?)
}

fn year_tech_value(page: &Page<'_>) -> Option<String> {
    page.tech_items
        .iter()
        .find_map(|(_, value)| find_year(value))
}

fn mileage_dedicated(page: &Page<'_>) -> Option<String> {
    page.first_text(&selectors().mileage)
        .filter(|text| text.chars().any(|c| c.is_ascii_digit()))
}

fn mileage_tech_label(page: &Page<'_>) -> Option<String> {
    page.tech_items
        .iter()
        .find(|(label, _)| mileage_label().is_match(label))
        .map(|(_, value)| value.clone())
}

fn description_rich(page: &Page<'_>) -> Option<String> {
    let node = page.document.select(&selectors().rich_description).next()?;
    non_empty(rich_text_to_plain(&node.inner_html()))
}

fn description_legacy(page: &Page<'_>) -> Option<String> {
    let node = page.document.select(&selectors().legacy_description).next()?;
    non_empty(rich_text_to_plain(&node.inner_html()))
}

fn location_node(page: &Page<'_>) -> Option<String> {
    clean_location(&page.first_text(&selectors().location)?)
}

fn posted_at_statistics(page: &Page<'_>) -> Option<String> {
    parse_posted_at(&page.first_text(&selectors().statistics)?)
}

fn posted_at_body(page: &Page<'_>) -> Option<String> {
    parse_posted_at(&page.first_text(&selectors().body)?)
}

/// mobile.bg listing extractor
#[derive(Debug, Default, Clone, Copy)]
pub struct MobileBgExtractor;

impl MobileBgExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Segment 0 of the price container is the primary (EUR) price, segment 1
    /// the secondary (BGN) one. Returns `(text, primary, secondary)`.
    fn extract_price(
        &self,
        document: &Html,
    ) -> (Option<String>, Option<PriceSegment>, Option<PriceSegment>) {
        let Some(container) = selectors()
            .price_containers
            .iter()
            .find_map(|selector| document.select(selector).next())
        else {
            debug!("price: no price container on page");
            return (None, None, None);
        };

        let mut segments = line_break()
            .split(&container.inner_html())
            .map(|segment| {
                let fragment = Html::parse_fragment(segment);
                let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
                parse_price_segment(&text)
            })
            .filter(|segment| !segment.text.is_empty())
            .collect::<Vec<_>>()
            .into_iter();

        let primary = segments.next();
        let secondary = segments.next();
        let text = primary.as_ref().map(|segment| segment.text.clone());
        (text, primary, secondary)
    }

    fn extract_images(&self, document: &Html, url: &Url) -> Vec<String> {
        let sel = selectors();
        let Some(gallery) = sel.galleries.iter().find_map(|selector| {
            document
                .select(selector)
                .find(|gallery| gallery.select(&sel.image).next().is_some())
        }) else {
            debug!("images: no gallery container on page");
            return Vec::new();
        };

        let sources = gallery.select(&sel.image).filter_map(|img| {
            IMAGE_ATTRS
                .iter()
                .filter_map(|attr| img.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(str::to_string)
        });

        resolve_image_urls(sources, url)
    }

    /// Definition list first, then the technical data list, which wins on
    /// key collisions. Feature bullets are joined into one entry.
    fn extract_attributes(&self, document: &Html, page: &Page<'_>) -> Attributes {
        let sel = selectors();
        let mut attributes = Attributes::new();

        for list in document.select(&sel.definition_list) {
            let mut label: Option<String> = None;
            for child in list.children().filter_map(ElementRef::wrap) {
                match child.value().name() {
                    "dt" => {
                        label = non_empty(
                            element_text(child).trim_end_matches(':').trim().to_string(),
                        );
                    }
                    "dd" => {
                        if let Some(key) = label.take() {
                            attributes.insert(key, element_text(child));
                        }
                    }
                    _ => {}
                }
            }
        }

        for (label, value) in &page.tech_items {
            attributes.insert(label.clone(), value.clone());
        }

        let features: Vec<String> = document
            .select(&sel.features)
            .map(element_text)
            .filter(|feature| !feature.is_empty())
            .collect();
        if !features.is_empty() {
            attributes.insert(FEATURES_KEY.to_string(), features.join(", "));
        }

        attributes
    }

    fn extract_vin(&self, attributes: &Attributes, description: Option<&str>) -> Option<String> {
        attributes
            .iter()
            .find(|(label, _)| label.to_ascii_lowercase().starts_with("vin"))
            .map(|(_, value)| value.clone())
            .and_then(non_empty)
            .or_else(|| {
                description
                    .and_then(|text| vin_pattern().find(text))
                    .map(|m| m.as_str().to_string())
            })
    }
}

impl Extractor for MobileBgExtractor {
    fn source(&self) -> Source {
        Source::MobileBg
    }

    fn matches_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.');
        host.eq_ignore_ascii_case(HOST)
            || host
                .to_ascii_lowercase()
                .strip_suffix(HOST)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    fn extract(&self, document: &Html, url: &Url) -> Result<RawListing, ExtractError> {
        if is_blank(document) {
            return Err(ExtractError::EmptyDocument);
        }

        let page = Page::new(document);
        let mut raw = RawListing::new(Source::MobileBg, url.as_str());

        raw.title = first_match("title", &page, TITLE);
        raw.year = first_match("year", &page, YEAR);
        raw.mileage = first_match("mileage", &page, MILEAGE);
        raw.description = first_match("description", &page, DESCRIPTION);
        raw.location = first_match("location", &page, LOCATION);
        raw.posted_at = first_match("posted_at", &page, POSTED_AT);

        let (price_text, primary, secondary) = self.extract_price(document);
        if let Some(segment) = &secondary {
            if segment.currency.as_deref().and_then(detect_currency) == Some("EUR") {
                debug!("price: secondary segment {:?} is in EUR", segment.text);
            }
        }
        raw.price_text = price_text;
        raw.price_euro = primary.and_then(|segment| segment.amount);
        raw.price_leva = secondary.and_then(|segment| segment.amount);

        raw.images = self.extract_images(document, url);
        raw.attributes = self.extract_attributes(document, &page);
        raw.vin = self.extract_vin(&raw.attributes, raw.description.as_deref());

        info!(
            "Extracted mobile.bg listing {:?}: {} images, {} attributes",
            raw.title,
            raw.images.len(),
            raw.attributes.len()
        );

        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://www.mobile.bg/obiava-11712345678901234-bmw-330-xdrive").unwrap()
    }

    fn extract(body: &str) -> RawListing {
        let html = format!("<html><head></head><body>{body}</body></html>");
        let doc = Html::parse_document(&html);
        MobileBgExtractor::new().extract(&doc, &page_url()).unwrap()
    }

    #[test]
    fn host_predicate() {
        let extractor = MobileBgExtractor::new();
        assert!(extractor.matches_host("mobile.bg"));
        assert!(extractor.matches_host("www.mobile.bg"));
        assert!(extractor.matches_host("M.Mobile.BG"));
        assert!(!extractor.matches_host("automobile.bg"));
        assert!(!extractor.matches_host("mobile.bg.example.com"));
    }

    #[test]
    fn empty_document_is_rejected() {
        let doc = Html::parse_document("");
        let err = MobileBgExtractor::new().extract(&doc, &page_url()).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument));
    }

    #[test]
    fn whitespace_only_body_is_rejected() {
        let doc = Html::parse_document("<html><body>  \n  </body></html>");
        let err = MobileBgExtractor::new().extract(&doc, &page_url()).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument));
    }

    #[test]
    fn gallery_only_body_is_usable() {
        let raw = extract(r#"<div id="owlcarousel"><img src="/photos/1.webp"></div>"#);
        assert_eq!(raw.images, vec!["https://www.mobile.bg/photos/1.webp"]);
        assert_eq!(raw.title, None);
    }

    #[test]
    fn price_segments() {
        let eur = parse_price_segment("12 500 €");
        assert_eq!(eur.amount.as_deref(), Some("12500"));
        assert_eq!(eur.currency.as_deref(), Some("€"));

        let bgn = parse_price_segment("24 900 лв.");
        assert_eq!(bgn.amount.as_deref(), Some("24900"));
        assert_eq!(bgn.currency.as_deref(), Some("лв."));

        let glued = parse_price_segment("9900лв");
        assert_eq!(glued.currency.as_deref(), Some("лв"));

        let volvo = parse_price_segment("Волво");
        assert_eq!(volvo.currency, None);

        let negotiable = parse_price_segment("По договаряне");
        assert_eq!(negotiable.amount, None);
        assert_eq!(negotiable.currency, None);
    }

    #[test]
    fn price_container_split_on_line_breaks() {
        let raw = extract(r#"<div class="Price"><div>12&nbsp;500 €<br>24 447.18 лв.</div></div>"#);
        assert_eq!(raw.price_text.as_deref(), Some("12 500 €"));
        assert_eq!(raw.price_euro.as_deref(), Some("12500"));
        assert_eq!(raw.price_leva.as_deref(), Some("24447.18"));
    }

    #[test]
    fn single_price_segment_leaves_secondary_empty() {
        let raw = extract(r#"<div class="Price">8 000 €</div>"#);
        assert_eq!(raw.price_euro.as_deref(), Some("8000"));
        assert_eq!(raw.price_leva, None);
    }

    #[test]
    fn title_prefers_heading() {
        let raw = extract(r#"<div class="obTitle"><h1> BMW  330 xDrive </h1>Стар текст</div>"#);
        assert_eq!(raw.title.as_deref(), Some("BMW 330 xDrive"));
    }

    #[test]
    fn title_falls_back_to_leading_text() {
        let raw = extract(
            r#"<div class="obTitle">
                 Audi A4 Avant
                 <span class="obNumber">Обява: 11712345678901234</span>
               </div>"#,
        );
        assert_eq!(raw.title.as_deref(), Some("Audi A4 Avant"));
    }

    #[test]
    fn year_from_manufacture_date() {
        let raw = extract(
            r#"<div class="mainCarParams">
                 <div class="item proizvodstvo"><div class="mpLabel">Дата на производство</div><div class="mpInfo">юни 2016 г.</div></div>
               </div>"#,
        );
        assert_eq!(raw.year.as_deref(), Some("2016"));
    }

    #[test]
    fn year_scans_tech_values_regardless_of_label() {
        let raw = extract(
            r#"<div class="mainCarParams">
                 <div class="item proizvodstvo"><div class="mpInfo">неизвестна</div></div>
               </div>
               <div class="techData"><div class="items">
                 <div class="item"><div>Двигател</div><div>Бензинов</div></div>
                 <div class="item"><div>Произведена</div><div>март 2011</div></div>
                 <div class="item"><div>Регистрация</div><div>2012</div></div>
               </div></div>"#,
        );
        assert_eq!(raw.year.as_deref(), Some("2011"));
    }

    #[test]
    fn mileage_dedicated_then_tech_label() {
        let raw = extract(
            r#"<div class="mainCarParams"><div class="item probeg"><div class="mpInfo">135 000 км</div></div></div>"#,
        );
        assert_eq!(raw.mileage.as_deref(), Some("135 000 км"));

        let raw = extract(
            r#"<div class="techData"><div class="items">
                 <div class="item"><div>Мощност</div><div>258 к.с.</div></div>
                 <div class="item"><div>Пробег:</div><div>98 500 км</div></div>
               </div></div>"#,
        );
        assert_eq!(raw.mileage.as_deref(), Some("98 500 км"));
    }

    #[test]
    fn images_prefer_lazy_attributes_and_resolve() {
        let raw = extract(
            r#"<div id="owlcarousel">
                 <img data-src="//cdn.mobile.bg/photos/1.webp" src="/img/placeholder.gif">
                 <img data-lazy="/photos/2.webp">
                 <img src="https://cdn.mobile.bg/photos/3.webp">
                 <img data-src="//cdn.mobile.bg/photos/1.webp">
               </div>"#,
        );
        assert_eq!(
            raw.images,
            vec![
                "https://cdn.mobile.bg/photos/1.webp",
                "https://www.mobile.bg/photos/2.webp",
                "https://cdn.mobile.bg/photos/3.webp",
            ]
        );
    }

    #[test]
    fn image_dedup_is_by_spelling() {
        let base = Url::parse("https://mobile.bg").unwrap();
        let images = resolve_image_urls(["//img/a.jpg", "https://img/a.jpg", "/rel/b.jpg"], &base);
        assert_eq!(
            images,
            vec!["https://img/a.jpg", "https://img/a.jpg", "https://mobile.bg/rel/b.jpg"]
        );
    }

    #[test]
    fn description_rich_text_keeps_line_breaks() {
        let raw = extract(
            r#"<div class="moreInfo"><div class="text"><p>Първи собственик.</p><p>Обслужена<br>в сервиз &amp; с история.</p></div></div>"#,
        );
        assert_eq!(
            raw.description.as_deref(),
            Some("Първи собственик.\nОбслужена\nв сервиз & с история.")
        );
    }

    #[test]
    fn description_falls_back_to_legacy_container() {
        let raw = extract(
            r#"<div class="moreInfo"><div class="text">  <br> </div></div>
               <div class="description">Колата е в отлично състояние.</div>"#,
        );
        assert_eq!(raw.description.as_deref(), Some("Колата е в отлично състояние."));
    }

    #[test]
    fn legacy_description_keeps_line_breaks() {
        let raw = extract(r#"<div class="description">Колата е добре.<br>Нов съединител.</div>"#);
        assert_eq!(
            raw.description.as_deref(),
            Some("Колата е добре.\nНов съединител.")
        );
    }

    #[test]
    fn location_prefixes_are_stripped() {
        assert_eq!(
            clean_location("Намира се в гр. София, област София-град").as_deref(),
            Some("София")
        );
        assert_eq!(
            clean_location("Намира се в с. Горна баня, обл. София").as_deref(),
            Some("Горна баня")
        );
        assert_eq!(clean_location("обл. Пловдив").as_deref(), Some("Пловдив"));
        assert_eq!(clean_location("Намира се в").as_deref(), None);
    }

    #[test]
    fn posted_at_patterns() {
        assert_eq!(
            parse_posted_at("Публикувана в 14:32 часа на 12 октомври, 2024 год.").as_deref(),
            Some("12 октомври, 2024 14:32")
        );
        assert_eq!(
            parse_posted_at("Публикувана на 03.10.2024").as_deref(),
            Some("03.10.2024")
        );
        assert_eq!(parse_posted_at("Редактирана вчера"), None);
    }

    #[test]
    fn attributes_merge_with_tech_data_winning() {
        let raw = extract(
            r#"<div class="carParams"><dl>
                 <dt>Двигател</dt><dd>Дизелов</dd>
                 <dt>Цвят:</dt><dd>Черен</dd>
                 <dt>VIN</dt><dd>WBA8E11080A123456</dd>
               </dl></div>
               <div class="techData"><div class="items">
                 <div class="item"><div>Двигател</div><div>Хибриден</div></div>
                 <div class="item"><div>Скоростна кутия</div><div>Автоматична</div></div>
               </div></div>
               <div class="carExtri"><ul><li>Навигация</li><li> Климатроник </li><li></li></ul></div>"#,
        );

        assert_eq!(raw.attributes.get("Двигател").map(String::as_str), Some("Хибриден"));
        assert_eq!(raw.attributes.get("Цвят").map(String::as_str), Some("Черен"));
        assert_eq!(
            raw.attributes.get("Скоростна кутия").map(String::as_str),
            Some("Автоматична")
        );
        assert_eq!(
            raw.attributes.get("Features").map(String::as_str),
            Some("Навигация, Климатроник")
        );
        assert_eq!(raw.vin.as_deref(), Some("WBA8E11080A123456"));
    }

    #[test]
    fn missing_fields_stay_empty() {
        let raw = extract("<p>Обявата е изтрита.</p>");
        assert_eq!(raw.source, Source::MobileBg);
        assert_eq!(raw.title, None);
        assert_eq!(raw.price_text, None);
        assert_eq!(raw.year, None);
        assert_eq!(raw.mileage, None);
        assert!(raw.images.is_empty());
        assert!(raw.attributes.is_empty());
    }
}
