//! Quality and trust filtering.
//!
//! Matching is case-insensitive. Latin exclusion terms such as `PR` must
//! stand alone between non-alphanumeric characters, so `Prada` or `April`
//! pass while `PR팀` does not. Hangul terms and trust checks are plain
//! substring search.

use crate::config::CurationConfig;
use crate::models::NewsCandidate;
use regex::Regex;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct QualityFilter {
    /// Lower-cased promotional terms without ASCII letters or digits.
    exclude: Vec<String>,
    /// Alternation of the ASCII-only terms, bounded by non-alphanumerics.
    exclude_words: Option<Regex>,
    /// Lower-cased outlet names and domains.
    trusted: Vec<String>,
    min_title_chars: usize,
}

impl QualityFilter {
    pub fn new(exclude: &[String], trusted: &[String], min_title_chars: usize) -> Self {
        let (words, exclude): (Vec<String>, Vec<String>) = lowercase_terms(exclude)
            .into_iter()
            .partition(|t| t.is_ascii());
        Self {
            exclude,
            exclude_words: word_pattern(&words),
            trusted: lowercase_terms(trusted),
            min_title_chars,
        }
    }

    pub fn from_config(config: &CurationConfig) -> Self {
        Self::new(
            &config.exclude_keywords,
            &config.trusted_sources,
            config.min_title_chars,
        )
    }

    /// Reject promotional content and titles shorter than the minimum.
    pub fn is_valid(&self, title: &str, description: &str) -> bool {
        let content = format!("{title} {description}").to_lowercase();
        if self.exclude.iter().any(|term| content.contains(term.as_str())) {
            return false;
        }
        if self
            .exclude_words
            .as_ref()
            .is_some_and(|re| re.is_match(&content))
        {
            return false;
        }
        title.chars().count() >= self.min_title_chars
    }

    /// Keep only candidates whose source, title or link names a trusted outlet.
    pub fn is_trusted(&self, candidate: &NewsCandidate) -> bool {
        let source = candidate.source.to_lowercase();
        let title = candidate.title.to_lowercase();
        let link = candidate.link.as_deref().unwrap_or_default().to_lowercase();

        self.trusted.iter().any(|t| {
            source.contains(t.as_str()) || title.contains(t.as_str()) || link.contains(t.as_str())
        })
    }
}

fn lowercase_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Build `(?:^|[^a-z0-9])(?:a|b)(?:$|[^a-z0-9])` over already lower-cased terms.
fn word_pattern(words: &[String]) -> Option<Regex> {
    if words.is_empty() {
        return None;
    }
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!("(?:^|[^a-z0-9])(?:{alternation})(?:$|[^a-z0-9])");
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, "Could not compile exclusion pattern; Latin terms ignored");
            None
        }
    }
}
