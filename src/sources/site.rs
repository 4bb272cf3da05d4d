//! Trade-press listing page scraper.
//!
//! Each site is described by a [`SiteProfile`]: the listing URL plus the CSS
//! selectors that locate article items, their title links and, optionally, a
//! summary and a date. Links are resolved against the profile's base URL.
//!
//! Markup changes on the site side are expected; when the selectors match
//! nothing the scraper returns an empty list instead of failing.

use crate::error::FetchError;
use crate::models::{RawCandidate, SourceQuery};
use crate::sources::{SourceAdapter, fetch_text};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Where and how to scrape one site's news listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteProfile {
    /// Outlet name; used as the candidate source label.
    pub name: String,
    /// Listing page to download.
    pub url: String,
    /// Base for resolving relative article links.
    pub base_url: String,
    /// Selector matching one article item on the listing.
    pub item_selector: String,
    /// Tried in order inside each item; the first match supplies title and href.
    pub title_selectors: Vec<String>,
    #[serde(default)]
    pub summary_selector: Option<String>,
    /// Element holding the date; a `datetime` attribute wins over its text.
    #[serde(default)]
    pub date_selector: Option<String>,
    /// Only the first `limit` items are read.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    3
}

impl SiteProfile {
    /// Built-in profile for Fashionbiz.
    pub fn fashionbiz() -> Self {
        Self {
            name: "패션비즈".to_string(),
            url: "https://fashionbiz.co.kr/news/".to_string(),
            base_url: "https://fashionbiz.co.kr".to_string(),
            item_selector: "li.list-item".to_string(),
            title_selectors: vec!["h3 a".to_string(), ".title a".to_string()],
            summary_selector: None,
            date_selector: None,
            limit: default_limit(),
        }
    }
}

/// Compiled selectors for a profile.
struct ListingSelectors {
    item: Selector,
    titles: Vec<Selector>,
    summary: Option<Selector>,
    date: Option<Selector>,
}

impl ListingSelectors {
    fn compile(profile: &SiteProfile) -> Result<Self, FetchError> {
        Ok(Self {
            item: compile(&profile.item_selector)?,
            titles: profile
                .title_selectors
                .iter()
                .map(|s| compile(s))
                .collect::<Result<Vec<_>, _>>()?,
            summary: profile.summary_selector.as_deref().map(compile).transpose()?,
            date: profile.date_selector.as_deref().map(compile).transpose()?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector)
        .map_err(|e| FetchError::Parse(format!("invalid selector {selector:?}: {e}")))
}

/// Scraper adapter for one site.
#[derive(Debug)]
pub struct SiteScraper {
    client: Client,
    profile: SiteProfile,
    base_url: Url,
    rate_limit_backoff: Duration,
}

impl SiteScraper {
    pub fn new(
        client: Client,
        profile: SiteProfile,
        rate_limit_backoff: Duration,
    ) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&profile.base_url)?;
        Ok(Self {
            client,
            profile,
            base_url,
            rate_limit_backoff,
        })
    }
}

impl SourceAdapter for SiteScraper {
    fn name(&self) -> &str {
        &self.profile.name
    }

    #[instrument(level = "info", skip_all, fields(site = %self.profile.name, url = %self.profile.url))]
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawCandidate>, FetchError> {
        let request = self.client.get(&self.profile.url);
        let html = fetch_text(request, self.rate_limit_backoff).await?;
        let candidates = parse_listing(&html, &self.profile, &self.base_url, &query.keyword)?;
        info!(count = candidates.len(), "Scraped listing");
        Ok(candidates)
    }
}

/// Extract candidates from a listing page.
///
/// Items without a title element are skipped. Only selector compilation can
/// fail; an unfamiliar page simply yields no candidates.
pub fn parse_listing(
    html: &str,
    profile: &SiteProfile,
    base_url: &Url,
    keyword: &str,
) -> Result<Vec<RawCandidate>, FetchError> {
    let selectors = ListingSelectors::compile(profile)?;
    let document = Html::parse_document(html);

    let mut candidates = Vec::new();
    for item in document.select(&selectors.item).take(profile.limit) {
        let Some(anchor) = selectors
            .titles
            .iter()
            .find_map(|sel| item.select(sel).next())
        else {
            debug!(site = %profile.name, "Listing item has no title element; skipping");
            continue;
        };

        let title = element_text(&anchor);
        let link = anchor
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .and_then(|href| match base_url.join(href) {
                Ok(resolved) => Some(resolved.to_string()),
                Err(e) => {
                    warn!(%href, error = %e, "Could not resolve article link");
                    None
                }
            });
        let description = selectors
            .summary
            .as_ref()
            .and_then(|sel| item.select(sel).next())
            .map(|el| element_text(&el))
            .unwrap_or_default();
        let published = selectors
            .date
            .as_ref()
            .and_then(|sel| item.select(sel).next())
            .map(|el| {
                el.value()
                    .attr("datetime")
                    .map(str::to_string)
                    .unwrap_or_else(|| element_text(&el))
            });

        candidates.push(RawCandidate {
            title,
            description,
            link,
            source: profile.name.clone(),
            keyword: keyword.to_string(),
            published,
        });
    }

    if candidates.is_empty() {
        debug!(site = %profile.name, selector = %profile.item_selector, "No listing items matched");
    }
    Ok(candidates)
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
