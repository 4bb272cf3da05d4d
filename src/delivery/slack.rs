//! Slack incoming-webhook delivery.
//!
//! The digest becomes a Block Kit message: a header with the run date, one
//! section per article and a context footer with the count.

use crate::models::{Digest, NewsCandidate};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

/// Escape the three characters Slack treats as control sequences.
pub fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn item_section(candidate: &NewsCandidate) -> Value {
    let title = escape_mrkdwn(&candidate.title);
    let mut text = match &candidate.link {
        Some(link) => format!("*<{}|{}>*", link, title),
        None => format!("*{}*", title),
    };
    if !candidate.is_placeholder() {
        text.push_str(&format!(
            "\n_{} · {}_",
            escape_mrkdwn(&candidate.source),
            candidate.published_at
        ));
    }
    if !candidate.description.is_empty() {
        text.push('\n');
        text.push_str(&escape_mrkdwn(&candidate.description));
    }

    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": text }
    })
}

/// Build the webhook payload for a digest.
pub fn build_message(digest: &Digest) -> Value {
    let header = format!("👗 오늘의 패션 뉴스 ({})", digest.local_date);

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": header, "emoji": true }
        }),
        json!({ "type": "divider" }),
    ];
    blocks.extend(digest.items.iter().map(item_section));

    let footer = if digest.is_placeholder() {
        "패션 뉴스 봇 알림".to_string()
    } else {
        format!("총 {}건 · 네이버 뉴스 및 패션 전문지 수집", digest.len())
    };
    blocks.push(json!({
        "type": "context",
        "elements": [{ "type": "mrkdwn", "text": footer }]
    }));

    json!({
        "text": header,
        "blocks": blocks,
    })
}

/// Posts digests to a Slack incoming webhook.
#[derive(Debug)]
pub struct SlackNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl SlackNotifier {
    pub fn new(client: Client, webhook_url: Option<&str>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.map(str::to_string),
        }
    }

    /// Send the digest once. Returns whether Slack accepted it.
    #[instrument(level = "info", skip_all, fields(items = digest.len()))]
    pub async fn send(&self, digest: &Digest) -> bool {
        let Some(url) = self.webhook_url.as_deref() else {
            warn!("SLACK_WEBHOOK_URL not configured; digest not delivered");
            return false;
        };

        let payload = build_message(digest);
        match self.client.post(url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(status = %resp.status(), "Delivered digest to Slack");
                true
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                error!(%status, body = %truncate_for_log(&body, 300), "Slack rejected the digest");
                false
            }
            Err(e) => {
                error!(error = %e, "Slack webhook request failed");
                false
            }
        }
    }
}
