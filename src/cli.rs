//! Command-line interface definitions.
//!
//! Credentials can be given as flags but are normally read from the
//! environment (or a `.env` file loaded at startup).

use clap::Parser;

/// Command-line arguments for the fashion news digest.
///
/// # Examples
///
/// ```sh
/// # Credentials from the environment, built-in curation profile
/// fashion_news_digest
///
/// # Custom keyword/site profile, archive the digest, don't post
/// fashion_news_digest --config fashion.yaml --json-output-dir ./digests --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Naver search API client id
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    pub naver_client_id: Option<String>,

    /// Naver search API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    pub naver_client_secret: Option<String>,

    /// Slack incoming webhook URL
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: Option<String>,

    /// Optional path to a YAML curation profile
    #[arg(short, long, env = "FASHION_NEWS_CONFIG")]
    pub config: Option<String>,

    /// Also write the digest as JSON under this directory
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Print the digest instead of posting it to Slack
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn credentials(&self) -> crate::config::Credentials {
        crate::config::Credentials {
            naver_client_id: self.naver_client_id.clone(),
            naver_client_secret: self.naver_client_secret.clone(),
            slack_webhook_url: self.slack_webhook_url.clone(),
        }
    }
}
