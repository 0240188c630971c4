use clap::Parser;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};
use crate::template::DEFAULT_TEMPLATE;

/// Command line interface. Every secret can also come from the environment
/// (or a `.env` file).
#[derive(Debug, Parser)]
#[command(name = "feed2bsky", version, about = "Post new feed items to Bluesky")]
pub struct Cli {
    /// Feed URL (RSS, Atom or JSON Feed)
    #[arg(long)]
    pub feed: String,

    /// Postgres connection string for the dedup table
    #[arg(long, env = "FEED2BSKY_DSN", hide_env_values = true)]
    pub dsn: String,

    /// Post template (Handlebars)
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub format: String,

    /// Only post items whose rendered text matches this regex
    #[arg(long, env = "FEED2BSKY_FILTER")]
    pub filter: Option<String>,

    /// PDS host
    #[arg(long, env = "FEED2BSKY_HOST", default_value = bsky::DEFAULT_HOST)]
    pub host: String,

    /// Account handle
    #[arg(long, env = "FEED2BSKY_HANDLE")]
    pub handle: Option<String>,

    /// Account app password
    #[arg(long, env = "FEED2BSKY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Record and render items but do not post them
    #[arg(long, alias = "skip")]
    pub dry_run: bool,
}

/// Posting account credentials.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub host: String,
    pub handle: String,
    pub password: SecretString,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub dry_run: bool,
    pub dsn: String,
    pub feed_url: String,
    pub template: String,
    pub filter: Option<String>,
    pub account: AccountConfig,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            dry_run: cli.dry_run,
            dsn: cli.dsn,
            feed_url: cli.feed,
            template: cli.format,
            filter: cli.filter.filter(|pattern| !pattern.is_empty()),
            account: AccountConfig {
                host: cli.host,
                handle: cli.handle.unwrap_or_default(),
                password: SecretString::from(cli.password.unwrap_or_default()),
            },
        }
    }
}

impl Config {
    /// Credentials are only needed when posting.
    pub fn validate(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        if self.account.handle.is_empty() {
            return Err(Error::Config(
                "handle is required (--handle or FEED2BSKY_HANDLE)".to_string(),
            ));
        }
        if self.account.password.expose_secret().is_empty() {
            return Err(Error::Config(
                "password is required (--password or FEED2BSKY_PASSWORD)".to_string(),
            ));
        }
        Ok(())
    }
}
