//! Post assembly: rendered text plus facets and at most one link card.

use tracing::debug;

use crate::link_card::LinkCardBuilder;
use crate::richtext;
use crate::types::{EntityKind, Post};

/// Build the publishable post for `text`.
///
/// Only the first link in text order gets an embed attempt, whether or not
/// that attempt produces a card. Never fails; a post without embed is valid.
pub async fn assemble(text: &str, cards: &LinkCardBuilder) -> Post {
    let entities = richtext::extract(text);

    let first_link = entities
        .iter()
        .find(|entity| entity.kind == EntityKind::Link)
        .map(|entity| entity.value.clone());

    let embed = match first_link {
        Some(url) => cards.build(&url).await,
        None => None,
    };

    debug!(
        entities = entities.len(),
        has_embed = embed.is_some(),
        "Assembled post"
    );

    Post {
        text: text.to_string(),
        entities,
        embed,
    }
}
