//! Run configuration: credentials from the environment and the curation
//! profile (keywords, allow/deny lists, limits, scraper sites).
//!
//! The profile is an optional YAML file. Every field has a default, so a
//! partial file only overrides what it names.

use crate::error::ConfigError;
use crate::sources::site::SiteProfile;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

/// Secrets supplied through CLI flags or environment variables.
///
/// Missing search credentials are a degraded mode, not an error: the
/// curator answers with a "configure credentials" notice instead.
#[derive(Clone, Default)]
pub struct Credentials {
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    pub slack_webhook_url: Option<String>,
}

impl Credentials {
    /// Both search API credentials, if present and non-blank.
    pub fn search(&self) -> Option<(&str, &str)> {
        let id = non_blank(self.naver_client_id.as_deref())?;
        let secret = non_blank(self.naver_client_secret.as_deref())?;
        Some((id, secret))
    }

    pub fn webhook(&self) -> Option<&str> {
        non_blank(self.slack_webhook_url.as_deref())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print secret values
        f.debug_struct("Credentials")
            .field("naver_client_id", &self.naver_client_id.is_some())
            .field("naver_client_secret", &self.naver_client_secret.is_some())
            .field("slack_webhook_url", &self.slack_webhook_url.is_some())
            .finish()
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// Curation profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    /// Search keywords in priority order.
    pub keywords: Vec<String>,
    /// Outlet names or domains a candidate must mention to be kept.
    pub trusted_sources: Vec<String>,
    /// Promotional terms that disqualify a candidate.
    pub exclude_keywords: Vec<String>,
    /// Only this many keywords (from the front of the list) are searched.
    pub max_keywords: usize,
    pub results_per_keyword: usize,
    /// Digest length cap.
    pub max_items: usize,
    /// Search results older than this many days are dropped.
    pub recency_days: i64,
    pub min_title_chars: usize,
    pub max_description_chars: usize,
    /// Pause between successive queries to the same adapter.
    pub query_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Backoff applied once when a source answers 429.
    pub rate_limit_backoff_ms: u64,
    pub sites: Vec<SiteProfile>,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            keywords: strings(&[
                "K-패션",
                "패션트렌드",
                "패션브랜드",
                "패션산업",
                "패션기업",
                "의류산업",
                "패션시장",
                "패션디자인",
                "섬유산업",
                "패션테크",
                "패션플랫폼",
                "패션스타트업",
                "한국패션",
                "패션위크",
                "명동패션",
                "동대문패션",
                "패션유통",
                "온라인패션",
                "패션소비",
                "지속가능패션",
                "SPA브랜드",
                "패스트패션",
            ]),
            trusted_sources: strings(&[
                "연합뉴스",
                "뉴시스",
                "뉴스1",
                "헤럴드경제",
                "한국경제",
                "매일경제",
                "파이낸셜뉴스",
                "아시아경제",
                "패션비즈",
                "패션인사이트",
                "한국섬유신문",
                "어패럴뉴스",
                "WWD코리아",
                "섬유저널",
                "패션채널",
                "yna.co.kr",
                "newsis.com",
                "news1.kr",
                "heraldcorp.com",
                "hankyung.com",
                "mk.co.kr",
                "fnnews.com",
                "asiae.co.kr",
                "fashionbiz.co.kr",
                "fashioninsight.co.kr",
                "ktnews.com",
                "apparelnews.co.kr",
                "wwdkorea.com",
                "tinnews.co.kr",
                "fashionchannel.co.kr",
            ]),
            exclude_keywords: strings(&[
                "할인", "세일", "쿠폰", "이벤트", "프로모션", "광고", "협찬", "PR", "홍보",
            ]),
            max_keywords: 8,
            results_per_keyword: 5,
            max_items: 15,
            recency_days: 3,
            min_title_chars: 10,
            max_description_chars: 200,
            query_delay_ms: 150,
            request_timeout_secs: 10,
            rate_limit_backoff_ms: 1000,
            sites: vec![SiteProfile::fashionbiz()],
        }
    }
}

impl CurationConfig {
    /// Load the profile from `path`, or the built-in defaults when no path
    /// is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using built-in curation profile");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_string(),
            source,
        })?;
        info!(
            keywords = config.keywords.len(),
            sites = config.sites.len(),
            max_items = config.max_items,
            "Loaded curation profile"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_millis(self.rate_limit_backoff_ms)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
