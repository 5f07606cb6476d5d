//! Text and number helpers shared by extractors and the normalizer.
//!
//! Everything here is pure: no I/O, no logging, no failure modes beyond
//! returning `None`.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn number_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d[\d\s.,']*").expect("number pattern is valid"))
}

/// Collapse every run of whitespace (including non-breaking spaces) into a
/// single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace and turn an empty result into `None`.
pub fn clean_text(text: Option<&str>) -> Option<String> {
    let cleaned = collapse_whitespace(text?);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Like [`collapse_whitespace`], but keeps line structure: each line is
/// collapsed on its own and blank lines are dropped.
pub fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse an integer by dropping every non-digit character.
///
/// A minus sign is honoured only when it is the first non-whitespace
/// character, so `"135 000 км"` gives `135000` and `"-15 °C"` gives `-15`.
/// Text without a single digit yields `None`.
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let negative = trimmed.starts_with('-');
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Parse the first number found in `text`, tolerating the usual European
/// spellings: space or apostrophe grouping, `.` or `,` as the decimal mark.
///
/// When both `.` and `,` appear, the right-most one is the decimal mark.
/// A lone separator followed by exactly three digits (or repeated more than
/// once) is read as grouping, so `"12.500"` is twelve thousand five hundred.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let run = number_run().find(text)?;
    let compact: String = run
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect();
    let compact = compact.trim_end_matches(['.', ',']);

    let normalized = match (compact.rfind('.'), compact.rfind(',')) {
        (Some(dot), Some(comma)) => {
            let (decimal, group) = if dot > comma { ('.', ',') } else { (',', '.') };
            compact.replace(group, "").replace(decimal, ".")
        }
        (Some(_), None) => single_separator(compact, '.'),
        (None, Some(_)) => single_separator(compact, ','),
        (None, None) => compact.to_string(),
    };

    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn single_separator(number: &str, separator: char) -> String {
    let parts: Vec<&str> = number.split(separator).collect();
    let grouping = parts.len() > 2 || parts.last().is_some_and(|tail| tail.len() == 3);
    if grouping {
        parts.concat()
    } else {
        number.replace(separator, ".")
    }
}

/// Drop repeated strings, keeping the first occurrence of each in order.
/// Equality is exact string equality.
pub fn dedupe_ordered<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let item = item.into();
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}
