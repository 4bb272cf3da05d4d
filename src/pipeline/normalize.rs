//! Text and date normalization.
//!
//! Search results carry highlight markup and entities, scraped listings carry
//! stray whitespace, and every source formats dates differently. Everything
//! here is infallible: bad input degrades to a safe default.

use crate::models::{NewsCandidate, RawCandidate};
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use tracing::debug;
use url::Url;

/// `2025-01-01`, `2025.01.01`, `2025/1/1`, optionally followed by a time.
static SEPARATED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\s*[-./]\s*(\d{1,2})\s*[-./]\s*(\d{1,2})").unwrap());

/// `20250101`, optionally followed by a time.
static COMPACT_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:\D|$)").unwrap());

/// Strip markup, decode entities, trim and collapse whitespace.
///
/// Clean text passes through unchanged, and so does any output of this
/// function except one case: escaped tag-like text such as `&lt;Vogue&gt;`
/// decodes to `<Vogue>`, which a second pass reads as a tag and drops. The
/// pipeline normalizes each candidate exactly once.
pub fn normalize_text(raw: &str) -> String {
    let visible = if raw.contains('<') || raw.contains('&') {
        Html::parse_fragment(raw)
            .root_element()
            .text()
            .collect::<String>()
    } else {
        raw.to_string()
    };
    visible.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

/// Clean a title/description pair; the description is capped at
/// `max_description_chars`.
pub fn normalize(
    raw_title: &str,
    raw_description: &str,
    max_description_chars: usize,
) -> (String, String) {
    let title = normalize_text(raw_title);
    let description = truncate_chars(&normalize_text(raw_description), max_description_chars);
    (title, description)
}

/// Parse a wire-format publication date to the calendar date as written.
///
/// Recognizes RFC 2822, RFC 3339 and `YYYY-MM-DD`-like forms with `-`, `.`
/// or `/` separators or none at all.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    let caps = SEPARATED_DATE
        .captures(raw)
        .or_else(|| COMPACT_DATE.captures(raw))?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize a publication date to `YYYY-MM-DD`, falling back to `today`.
pub fn normalize_date(raw: Option<&str>, today: NaiveDate) -> String {
    let date = match raw.and_then(parse_date) {
        Some(date) => date,
        None => {
            if let Some(raw) = raw {
                debug!(%raw, "Unrecognized publication date; using today");
            }
            today
        }
    };
    date.format("%Y-%m-%d").to_string()
}

/// Absolute http(s) URL check.
fn absolute_link(link: &str) -> Option<String> {
    let parsed = Url::parse(link.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(parsed.to_string()),
        _ => None,
    }
}

/// Turns raw adapter output into [`NewsCandidate`]s.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pub max_description_chars: usize,
    /// Substituted for unparsable publication dates.
    pub today: NaiveDate,
}

impl Normalizer {
    pub fn new(max_description_chars: usize, today: NaiveDate) -> Self {
        Self {
            max_description_chars,
            today,
        }
    }

    /// `None` when the title or source is empty after cleaning.
    pub fn candidate(&self, raw: RawCandidate) -> Option<NewsCandidate> {
        let (title, description) =
            normalize(&raw.title, &raw.description, self.max_description_chars);
        let source = normalize_text(&raw.source);
        if title.is_empty() || source.is_empty() {
            debug!(raw_title = %raw.title, source = %raw.source, "Dropping candidate without title or source");
            return None;
        }

        Some(NewsCandidate {
            title,
            description,
            link: raw.link.as_deref().and_then(absolute_link),
            source,
            keyword: raw.keyword,
            published_at: normalize_date(raw.published.as_deref(), self.today),
        })
    }
}
