//! URL and hashtag detection for post text.
//!
//! Offsets are byte positions in the UTF-8 text, which is how the posting API
//! addresses facets. Links and hashtags are found by two independent scans
//! and merged by start offset.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{EntityKind, TextEntity};

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[-A-Za-z0-9+&@#/%?=~_|!:,.;()]+").expect("URL pattern is valid")
});

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\S+").expect("hashtag pattern is valid"));

/// All links and hashtags in `text`, ordered by start offset.
///
/// Hashtags that fall inside a link (URL fragments) are dropped.
pub fn extract(text: &str) -> Vec<TextEntity> {
    merge(extract_links(text), extract_hashtags(text))
}

/// Maximal `http://` / `https://` runs, left to right.
pub fn extract_links(text: &str) -> Vec<TextEntity> {
    URL_RE
        .find_iter(text)
        .map(|m| TextEntity {
            kind: EntityKind::Link,
            start_byte: m.start(),
            end_byte: m.end(),
            value: m.as_str().to_string(),
        })
        .collect()
}

/// `#tag` runs not preceded by a word character. The value excludes the `#`.
///
/// Every `#` is a candidate on its own, so a rejected `foo#bar,#baz` still
/// yields `baz`. A `#` inside an accepted tag starts nothing.
pub fn extract_hashtags(text: &str) -> Vec<TextEntity> {
    let mut tags = Vec::new();
    let mut resume_at = 0;

    for (pos, _) in text.match_indices('#') {
        if pos < resume_at || text[..pos].chars().next_back().is_some_and(is_word_char) {
            continue;
        }
        let Some(m) = HASHTAG_RE.find_at(text, pos).filter(|m| m.start() == pos) else {
            continue;
        };

        resume_at = m.end();
        tags.push(TextEntity {
            kind: EntityKind::Hashtag,
            start_byte: m.start(),
            end_byte: m.end(),
            value: m.as_str()[1..].to_string(),
        });
    }

    tags
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Merge the two ordered scans into one sequence ordered by `start_byte`.
fn merge(links: Vec<TextEntity>, hashtags: Vec<TextEntity>) -> Vec<TextEntity> {
    let hashtags: Vec<TextEntity> = hashtags
        .into_iter()
        .filter(|tag| !links.iter().any(|link| link.overlaps(tag)))
        .collect();

    let mut merged = Vec::with_capacity(links.len() + hashtags.len());
    let mut links = links.into_iter().peekable();
    let mut hashtags = hashtags.into_iter().peekable();

    loop {
        let take_link = match (links.peek(), hashtags.peek()) {
            (Some(link), Some(tag)) => link.start_byte <= tag.start_byte,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_link { links.next() } else { hashtags.next() };
        merged.extend(next);
    }

    merged
}
