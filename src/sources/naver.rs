//! Naver News Search API adapter.
//!
//! Queries [the news search endpoint](https://developers.naver.com/docs/serviceapi/search/news/news.md)
//! sorted by date and turns each item into a [`RawCandidate`].
//!
//! Titles and descriptions come back with `<b>` highlight tags and HTML
//! entities; they are left untouched here and cleaned by the normalizer.

use crate::error::FetchError;
use crate::models::{RawCandidate, SourceQuery};
use crate::pipeline::normalize::parse_date;
use crate::sources::{SourceAdapter, fetch_text};
use crate::utils::truncate_for_log;
use chrono::{Local, NaiveDate, TimeDelta};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const NAVER_NEWS_ENDPOINT: &str = "https://openapi.naver.com/v1/search/news.json";

/// Source label used when an item's link has no usable host.
const FALLBACK_SOURCE: &str = "naver";

/// Response envelope of the news search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

/// One search hit. Field names mirror the API's JSON keys.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    originallink: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    pubDate: String,
}

/// Search-API adapter restricted to a recent time window.
pub struct NaverSearchAdapter {
    client: Client,
    client_id: String,
    client_secret: String,
    endpoint: String,
    recency_days: i64,
    rate_limit_backoff: StdDuration,
}

impl NaverSearchAdapter {
    pub fn new(
        client: Client,
        client_id: &str,
        client_secret: &str,
        recency_days: i64,
        rate_limit_backoff: StdDuration,
    ) -> Self {
        Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            endpoint: NAVER_NEWS_ENDPOINT.to_string(),
            recency_days,
            rate_limit_backoff,
        }
    }

    fn search_url(&self, query: &SourceQuery) -> String {
        format!(
            "{}?query={}&display={}&start=1&sort=date",
            self.endpoint,
            urlencoding::encode(&query.keyword),
            query.display
        )
    }
}

impl std::fmt::Debug for NaverSearchAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverSearchAdapter")
            .field("endpoint", &self.endpoint)
            .field("recency_days", &self.recency_days)
            .finish()
    }
}

impl SourceAdapter for NaverSearchAdapter {
    fn name(&self) -> &str {
        "naver-news"
    }

    #[instrument(level = "info", skip_all, fields(keyword = %query.keyword, display = query.display))]
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawCandidate>, FetchError> {
        let request = self
            .client
            .get(self.search_url(query))
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret);

        let body = fetch_text(request, self.rate_limit_backoff).await?;
        let cutoff = recency_cutoff(Local::now().date_naive(), self.recency_days);

        let candidates = parse_search_response(&body, &query.keyword, cutoff).map_err(|e| {
            warn!(error = %e, body = %truncate_for_log(&body, 300), "Search response did not decode");
            e
        })?;
        info!(count = candidates.len(), "Search returned candidates");
        Ok(candidates)
    }
}

/// Oldest publication day inside a window of `days` ending at `today`.
///
/// A negative window, or one reaching past the calendar's range, applies no
/// cutoff at all.
pub fn recency_cutoff(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days < 0 {
        return None;
    }
    TimeDelta::try_days(days).and_then(|window| today.checked_sub_signed(window))
}

/// Decode a search response body.
///
/// Items whose publication date parses to a day before `cutoff` are dropped;
/// items with an unreadable date are kept and dated later by the normalizer.
pub fn parse_search_response(
    body: &str,
    keyword: &str,
    cutoff: Option<NaiveDate>,
) -> Result<Vec<RawCandidate>, FetchError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let candidates = response
        .items
        .into_iter()
        .filter(|item| match (cutoff, parse_date(&item.pubDate)) {
            (Some(cutoff), Some(date)) if date < cutoff => {
                debug!(title = %item.title, %date, "Dropping item outside recency window");
                false
            }
            _ => true,
        })
        .map(|item| {
            let link = [item.originallink.trim(), item.link.trim()]
                .into_iter()
                .find(|l| !l.is_empty())
                .map(str::to_string);
            let source = link
                .as_deref()
                .and_then(source_label)
                .unwrap_or_else(|| FALLBACK_SOURCE.to_string());
            let published = Some(item.pubDate).filter(|d| !d.trim().is_empty());

            RawCandidate {
                title: item.title,
                description: item.description,
                link,
                source,
                keyword: keyword.to_string(),
                published,
            }
        })
        .collect();

    Ok(candidates)
}

/// Press label for a search hit: the link's host without a leading `www.`.
/// For example: "https://www.yna.co.kr/view/AKR2025" -> "yna.co.kr"
pub fn source_label(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
