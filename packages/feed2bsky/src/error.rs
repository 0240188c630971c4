//! Typed errors for the feed bridge.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Template string could not be compiled
    #[error("invalid template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    /// Template failed for a particular item
    #[error("render failed: {0}")]
    Render(#[from] Box<handlebars::RenderError>),

    /// Filter pattern is not a valid regular expression
    #[error("invalid filter pattern: {0}")]
    Filter(#[from] regex::Error),

    /// Settings are incomplete or inconsistent
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Dedup store operation failed
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request returned a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Feed document could not be parsed
    #[error("feed parse error: {0}")]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),

    /// Posting API call failed
    #[error("posting API error: {0}")]
    Bsky(#[from] bsky::BskyError),

    /// Anything else, with context
    #[error("{0}")]
    Other(String),
}

impl From<handlebars::TemplateError> for Error {
    fn from(err: handlebars::TemplateError) -> Self {
        Error::Template(Box::new(err))
    }
}

impl From<handlebars::RenderError> for Error {
    fn from(err: handlebars::RenderError) -> Self {
        Error::Render(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
