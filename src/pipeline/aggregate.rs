//! Merge, deduplicate and order candidates.

use crate::models::NewsCandidate;
use chrono::NaiveDate;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

/// Drop duplicate titles (first occurrence wins) and order newest first.
///
/// The sort is stable, so same-day candidates keep their arrival order. If
/// any `published_at` is not a `YYYY-MM-DD` date the arrival order is kept
/// as a whole.
#[instrument(level = "info", skip_all, fields(input = candidates.len()))]
pub fn aggregate(candidates: Vec<NewsCandidate>) -> Vec<NewsCandidate> {
    let before = candidates.len();
    let mut unique = candidates
        .into_iter()
        .unique_by(NewsCandidate::dedup_key)
        .collect::<Vec<_>>();
    debug!(before, after = unique.len(), "Removed duplicate titles");

    let malformed = unique
        .iter()
        .filter(|c| NaiveDate::parse_from_str(&c.published_at, "%Y-%m-%d").is_err())
        .map(|c| c.published_at.clone())
        .collect::<Vec<_>>();
    if malformed.is_empty() {
        unique.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    } else {
        warn!(?malformed, "Unsortable publication dates; keeping arrival order");
    }
    unique
}
