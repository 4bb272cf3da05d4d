//! Data models for news candidates and the curated digest.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawCandidate`]: an article exactly as a source adapter found it
//! - [`NewsCandidate`]: a cleaned article ready for filtering and ranking
//! - [`SourceQuery`]: one unit of work handed to a source adapter
//! - [`Digest`]: the bounded, never-empty list delivered at the end of a run

use serde::{Deserialize, Serialize};

/// Keyword tag carried by synthetic placeholder candidates.
pub const NOTICE_KEYWORD: &str = "notice";

/// Source label carried by synthetic placeholder candidates.
pub const BOT_SOURCE: &str = "패션뉴스봇";

/// An article as returned by a source adapter, before normalization.
///
/// Title and description may still contain markup and entities, and the
/// publication date is whatever the source put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub title: String,
    pub description: String,
    /// Absolute article URL, if the source exposed one.
    pub link: Option<String>,
    /// Origin label (press host for search results, site name for scrapers).
    pub source: String,
    /// The keyword or category that produced this candidate.
    pub keyword: String,
    /// Raw publication date string, e.g. `Wed, 01 Jan 2025 10:00:00 +0900`.
    pub published: Option<String>,
}

/// One discovered article after normalization.
///
/// `title` and `source` are always non-empty; `link`, when present, is an
/// absolute URL. `published_at` is always `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsCandidate {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub source: String,
    pub keyword: String,
    pub published_at: String,
}

impl NewsCandidate {
    /// Key used for duplicate detection: lower-cased title with every
    /// whitespace character removed.
    pub fn dedup_key(&self) -> String {
        self.title
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Synthetic candidate signalling an operability state rather than news.
    pub fn placeholder(title: &str, description: &str, today: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            link: None,
            source: BOT_SOURCE.to_string(),
            keyword: NOTICE_KEYWORD.to_string(),
            published_at: today.to_string(),
        }
    }

    /// True only when both the notice keyword and the bot's source label are set.
    pub fn is_placeholder(&self) -> bool {
        self.keyword == NOTICE_KEYWORD && self.source == BOT_SOURCE
    }
}

/// A unit of work issued to a source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub keyword: String,
    /// Requested number of results.
    pub display: usize,
}

impl SourceQuery {
    pub fn new(keyword: impl Into<String>, display: usize) -> Self {
        Self {
            keyword: keyword.into(),
            display,
        }
    }
}

/// The curated result of one run.
///
/// A digest always holds at least one candidate: when nothing qualifies it
/// carries a single placeholder instead.
///
/// # Edition Naming
///
/// The `edition` field categorizes runs as:
/// - `"morning"`: 00:00 - 08:00
/// - `"afternoon"`: 08:00 - 16:00
/// - `"evening"`: 16:00 - 24:00
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Digest {
    /// The local date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time of the run in `HH:MM:SS` format.
    pub local_time: String,
    /// "morning", "afternoon", or "evening".
    pub edition: String,
    pub items: Vec<NewsCandidate>,
}

impl Digest {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the digest holds only a synthetic notice.
    pub fn is_placeholder(&self) -> bool {
        self.items.iter().all(NewsCandidate::is_placeholder)
    }
}
