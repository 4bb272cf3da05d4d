//! Drives one collection run from fetch to a finished [`Digest`].
//!
//! `Fetch → Normalize → Filter → Trust-check → Aggregate → Truncate → fallback`
//!
//! Source failures are logged with their reason tag and otherwise ignored;
//! the curator always hands back a digest, substituting a placeholder notice
//! when nothing qualifies.

use crate::config::{CurationConfig, Credentials};
use crate::models::{Digest, NewsCandidate, RawCandidate, SourceQuery};
use crate::pipeline::aggregate::aggregate;
use crate::pipeline::filter::QualityFilter;
use crate::pipeline::normalize::Normalizer;
use crate::sources::SourceAdapter;
use crate::utils::edition_for;
use chrono::{Local, NaiveDateTime};
use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

pub const NO_CREDENTIALS_TITLE: &str = "🤖 패션 뉴스 봇이 실행 중입니다";
pub const NO_CREDENTIALS_DESCRIPTION: &str =
    "NAVER_CLIENT_ID / NAVER_CLIENT_SECRET 환경변수를 설정하면 뉴스 수집이 시작됩니다.";
pub const NO_NEWS_TITLE: &str = "📭 오늘은 새로운 패션 뉴스가 없습니다";
pub const NO_NEWS_DESCRIPTION: &str =
    "조건을 만족하는 기사를 찾지 못했습니다. 다음 실행에서 다시 확인합니다.";

/// Per-run drop counters, logged once at the end.
#[derive(Debug, Default)]
struct RunStats {
    fetched: usize,
    failed_sources: usize,
    malformed: usize,
    low_quality: usize,
    untrusted: usize,
    accepted: usize,
}

/// Owns the adapters and curation policy for a run.
///
/// `S` is the search adapter, queried once per keyword; `P` are the scrapers,
/// each invoked once.
pub struct Curator<S, P> {
    config: CurationConfig,
    credentials: Credentials,
    search: Option<S>,
    scrapers: Vec<P>,
}

impl<S, P> Curator<S, P>
where
    S: SourceAdapter,
    P: SourceAdapter,
{
    pub fn new(
        config: CurationConfig,
        credentials: Credentials,
        search: Option<S>,
        scrapers: Vec<P>,
    ) -> Self {
        Self {
            config,
            credentials,
            search,
            scrapers,
        }
    }

    fn max_items(&self) -> usize {
        self.config.max_items.max(1)
    }

    /// Run the pipeline now.
    pub async fn curate(&self) -> Digest {
        self.curate_at(Local::now().naive_local()).await
    }

    /// Run the pipeline as if the local clock read `now`.
    #[instrument(level = "info", skip(self))]
    pub async fn curate_at(&self, now: NaiveDateTime) -> Digest {
        let today = now.date();
        let today_str = today.format("%Y-%m-%d").to_string();

        let items = if self.credentials.search().is_none() {
            warn!("Search API credentials missing; sending setup notice instead of news");
            vec![NewsCandidate::placeholder(
                NO_CREDENTIALS_TITLE,
                NO_CREDENTIALS_DESCRIPTION,
                &today_str,
            )]
        } else {
            let normalizer = Normalizer::new(self.config.max_description_chars, today);
            let filter = QualityFilter::from_config(&self.config);
            let mut items = self.collect(&normalizer, &filter).await;
            items.truncate(self.max_items());

            if items.is_empty() {
                info!("Nothing survived curation; sending no-news notice");
                items.push(NewsCandidate::placeholder(
                    NO_NEWS_TITLE,
                    NO_NEWS_DESCRIPTION,
                    &today_str,
                ));
            }
            items
        };

        Digest {
            local_date: today_str,
            local_time: now.format("%H:%M:%S").to_string(),
            edition: edition_for(now.time()).to_string(),
            items,
        }
    }

    /// Fetch from every adapter and return the deduplicated, sorted survivors.
    async fn collect(&self, normalizer: &Normalizer, filter: &QualityFilter) -> Vec<NewsCandidate> {
        let mut stats = RunStats::default();
        let mut accepted = Vec::new();

        if let Some(search) = &self.search {
            let keywords = self.config.keywords.iter().take(self.config.max_keywords);
            for (i, keyword) in keywords.enumerate() {
                if i > 0 && !self.config.query_delay().is_zero() {
                    sleep(self.config.query_delay()).await;
                }
                let query = SourceQuery::new(keyword.as_str(), self.config.results_per_keyword);
                let raw = fetch_soft(search, &query, &mut stats).await;
                ingest(raw, normalizer, filter, &mut accepted, &mut stats);
            }
        }

        // distinct sites: fetched together, consumed in configured order
        let scraped = join_all(self.scrapers.iter().map(|scraper| async move {
            let mut local = RunStats::default();
            let query = SourceQuery::new(scraper.name(), self.config.results_per_keyword);
            let raw = fetch_soft(scraper, &query, &mut local).await;
            (raw, local)
        }))
        .await;
        for (raw, local) in scraped {
            stats.fetched += local.fetched;
            stats.failed_sources += local.failed_sources;
            ingest(raw, normalizer, filter, &mut accepted, &mut stats);
        }

        let curated = aggregate(accepted);
        info!(
            fetched = stats.fetched,
            failed_sources = stats.failed_sources,
            malformed = stats.malformed,
            low_quality = stats.low_quality,
            untrusted = stats.untrusted,
            accepted = stats.accepted,
            unique = curated.len(),
            "Curation finished"
        );
        curated
    }
}

/// Call an adapter, turning failure into an empty result plus a warning.
async fn fetch_soft<A: SourceAdapter>(
    adapter: &A,
    query: &SourceQuery,
    stats: &mut RunStats,
) -> Vec<RawCandidate> {
    match adapter.fetch(query).await {
        Ok(raw) => {
            stats.fetched += raw.len();
            raw
        }
        Err(e) => {
            stats.failed_sources += 1;
            warn!(
                adapter = adapter.name(),
                keyword = %query.keyword,
                reason = e.reason(),
                error = %e,
                "Source fetch failed; continuing without it"
            );
            Vec::new()
        }
    }
}

/// Normalize, filter and trust-check a batch, appending survivors.
fn ingest(
    raw: Vec<RawCandidate>,
    normalizer: &Normalizer,
    filter: &QualityFilter,
    accepted: &mut Vec<NewsCandidate>,
    stats: &mut RunStats,
) {
    for candidate in raw {
        let Some(candidate) = normalizer.candidate(candidate) else {
            stats.malformed += 1;
            continue;
        };
        if !filter.is_valid(&candidate.title, &candidate.description) {
            debug!(title = %candidate.title, "Rejected by quality filter");
            stats.low_quality += 1;
            continue;
        }
        if !filter.is_trusted(&candidate) {
            debug!(title = %candidate.title, source = %candidate.source, "Rejected as untrusted source");
            stats.untrusted += 1;
            continue;
        }
        stats.accepted += 1;
        accepted.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::NOTICE_KEYWORD;
    use chrono::NaiveDate;
    use itertools::Itertools;
    use std::sync::Mutex;

    /// Adapter that answers from a fixed list, keyed by query keyword.
    struct MockAdapter {
        name: String,
        items: Vec<RawCandidate>,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl MockAdapter {
        fn new(name: &str, items: Vec<RawCandidate>) -> Self {
            Self {
                name: name.to_string(),
                items,
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                fail: true,
                ..Self::new(name, Vec::new())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SourceAdapter for MockAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawCandidate>, FetchError> {
            self.calls.lock().unwrap().push(query.keyword.clone());
            if self.fail {
                return Err(FetchError::Timeout);
            }
            Ok(self
                .items
                .iter()
                .filter(|c| c.keyword == query.keyword)
                .take(query.display)
                .cloned()
                .collect())
        }
    }

    fn raw(keyword: &str, title: &str, source: &str, date: &str) -> RawCandidate {
        RawCandidate {
            title: title.to_string(),
            description: String::new(),
            link: None,
            source: source.to_string(),
            keyword: keyword.to_string(),
            published: Some(date.to_string()),
        }
    }

    fn config() -> CurationConfig {
        CurationConfig {
            keywords: vec!["K-패션".into(), "패션트렌드".into(), "섬유산업".into()],
            query_delay_ms: 0,
            sites: Vec::new(),
            ..CurationConfig::default()
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            naver_client_id: Some("id".into()),
            naver_client_secret: Some("secret".into()),
            slack_webhook_url: None,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_credentials_short_circuits() {
        let search = MockAdapter::new("search", vec![raw("K-패션", "무신사 일본 진출 본격화 소식", "연합뉴스", "2025-01-02")]);
        let scraper = MockAdapter::new("패션비즈", Vec::new());
        let curator = Curator::new(config(), Credentials::default(), Some(search), vec![scraper]);

        let digest = curator.curate_at(now()).await;

        assert_eq!(digest.len(), 1);
        assert_eq!(digest.items[0].keyword, NOTICE_KEYWORD);
        assert_eq!(digest.items[0].title, NO_CREDENTIALS_TITLE);
        assert!(curator.search.as_ref().unwrap().calls().is_empty());
        assert!(curator.scrapers[0].calls().is_empty());
    }

    #[tokio::test]
    async fn test_all_sources_empty_yields_no_news_notice() {
        let search = MockAdapter::new("search", Vec::new());
        let scraper = MockAdapter::new("패션비즈", Vec::new());
        let curator = Curator::new(config(), credentials(), Some(search), vec![scraper]);

        let digest = curator.curate_at(now()).await;

        assert_eq!(digest.len(), 1);
        assert!(digest.is_placeholder());
        assert_eq!(digest.items[0].keyword, NOTICE_KEYWORD);
        assert_eq!(digest.items[0].title, NO_NEWS_TITLE);
        assert_eq!(digest.items[0].published_at, "2025-01-03");
        assert_eq!(curator.search.as_ref().unwrap().calls().len(), 3);
        assert_eq!(curator.scrapers[0].calls(), vec!["패션비즈"]);
    }

    #[tokio::test]
    async fn test_failing_sources_do_not_abort() {
        let search = MockAdapter::failing("search");
        let good = MockAdapter::new(
            "패션비즈",
            vec![raw("패션비즈", "서울패션위크 2025 F/W 일정 발표", "패션비즈", "2025.01.02")],
        );
        let curator = Curator::new(config(), credentials(), Some(search), vec![good]);

        let digest = curator.curate_at(now()).await;

        assert_eq!(digest.len(), 1);
        assert!(!digest.is_placeholder());
        assert_eq!(digest.items[0].published_at, "2025-01-02");
    }

    #[tokio::test]
    async fn test_full_pipeline_properties() {
        let search = MockAdapter::new(
            "search",
            vec![
                raw("K-패션", "<b>K-패션</b> 브랜드 파리 패션위크서 주목", "yna.co.kr", "Wed, 01 Jan 2025 10:00:00 +0900"),
                raw("K-패션", "짧은 제목", "yna.co.kr", "Thu, 02 Jan 2025 10:00:00 +0900"),
                raw("K-패션", "신상 가방 특가 할인 행사 진행합니다", "news1.kr", "Thu, 02 Jan 2025 10:00:00 +0900"),
                raw("패션트렌드", "올해 패션 트렌드는 미니멀리즘 강세", "someblog.example", "Thu, 02 Jan 2025 11:00:00 +0900"),
                raw("패션트렌드", "Brand X launches collection", "hankyung.com", "Thu, 02 Jan 2025 12:00:00 +0900"),
                raw("섬유산업", "섬유산업 수출 3개월 연속 반등", "mk.co.kr", "garbage date"),
            ],
        );
        let scraper = MockAdapter::new(
            "패션비즈",
            vec![
                raw("패션비즈", "brand x launches  collection", "패션비즈", "2025-01-03"),
                raw("패션비즈", "무신사, 일본 오프라인 매장 첫 오픈", "패션비즈", "2025-01-01"),
            ],
        );
        let curator = Curator::new(config(), credentials(), Some(search), vec![scraper]);

        let digest = curator.curate_at(now()).await;
        let titles: Vec<_> = digest.items.iter().map(|c| c.title.as_str()).collect();

        assert_eq!(
            titles,
            vec![
                // unparsable date falls back to the run date
                "섬유산업 수출 3개월 연속 반등",
                "Brand X launches collection",
                "K-패션 브랜드 파리 패션위크서 주목",
                "무신사, 일본 오프라인 매장 첫 오픈",
            ]
        );
        // the search hit came first, so the scraped duplicate is dropped
        assert_eq!(digest.items[1].source, "hankyung.com");

        assert!(digest.len() >= 1 && digest.len() <= 15);
        assert!(digest.items.iter().map(NewsCandidate::dedup_key).all_unique());
        assert!(digest.items.iter().all(|c| c.title.chars().count() >= 10));
        assert!(
            digest
                .items
                .windows(2)
                .all(|w| w[0].published_at >= w[1].published_at)
        );
        assert_eq!(digest.local_date, "2025-01-03");
        assert_eq!(digest.edition, "afternoon");
    }

    #[tokio::test]
    async fn test_only_keyword_prefix_is_searched() {
        let search = MockAdapter::new("search", Vec::new());
        let cfg = CurationConfig {
            max_keywords: 2,
            ..config()
        };
        let curator = Curator::new(cfg, credentials(), Some(search), Vec::<MockAdapter>::new());

        curator.curate_at(now()).await;

        assert_eq!(
            curator.search.as_ref().unwrap().calls(),
            vec!["K-패션", "패션트렌드"]
        );
    }

    #[tokio::test]
    async fn test_search_queries_are_spaced_by_delay() {
        let search = MockAdapter::new("search", Vec::new());
        let cfg = CurationConfig {
            query_delay_ms: 50,
            ..config()
        };
        let curator = Curator::new(cfg, credentials(), Some(search), Vec::<MockAdapter>::new());

        let started = std::time::Instant::now();
        curator.curate_at(now()).await;

        // three keywords, two gaps
        assert!(started.elapsed() >= std::time::Duration::from_millis(100));
        assert_eq!(curator.search.as_ref().unwrap().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_digest_truncated_to_max_items() {
        let items = (0..10)
            .map(|i| raw("K-패션", &format!("연합뉴스 패션 산업 기사 번호 {i}"), "연합뉴스", "2025-01-02"))
            .collect();
        let search = MockAdapter::new("search", items);
        let cfg = CurationConfig {
            max_items: 3,
            results_per_keyword: 10,
            ..config()
        };
        let curator = Curator::new(cfg, credentials(), Some(search), Vec::<MockAdapter>::new());

        let digest = curator.curate_at(now()).await;

        assert_eq!(digest.len(), 3);
        assert_eq!(digest.items[0].title, "연합뉴스 패션 산업 기사 번호 0");
    }

    #[tokio::test]
    async fn test_zero_max_items_still_returns_one() {
        let search = MockAdapter::new(
            "search",
            vec![raw("K-패션", "무신사 일본 진출 본격화 소식", "연합뉴스", "2025-01-02")],
        );
        let cfg = CurationConfig {
            max_items: 0,
            ..config()
        };
        let curator = Curator::new(cfg, credentials(), Some(search), Vec::<MockAdapter>::new());

        let digest = curator.curate_at(now()).await;
        assert_eq!(digest.len(), 1);
        assert!(!digest.is_placeholder());
    }
}
