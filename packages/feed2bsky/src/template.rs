//! Post templates.
//!
//! Templates are Handlebars with HTML escaping off and strict mode on, so a
//! reference to a field the item does not have is a render error for that
//! item. The context exposes `guid`, `title`, `link`, `published`,
//! `description` and `categories`.

use std::sync::LazyLock;

use handlebars::{handlebars_helper, Handlebars};
use regex::Regex;

use crate::error::Result;
use crate::types::FeedItem;

pub const DEFAULT_TEMPLATE: &str = "{{title}}\n{{link}}";

const TEMPLATE_NAME: &str = "post";

static NEWLINE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("newline pattern is valid"));

/// Compiled post template, built once per run.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Compile `template`. A malformed template is a startup error.
    pub fn new(template: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        register_helpers(&mut registry);
        registry.register_template_string(TEMPLATE_NAME, template)?;

        Ok(Self { registry })
    }

    pub fn render(&self, item: &FeedItem) -> Result<String> {
        Ok(self.registry.render(TEMPLATE_NAME, item)?)
    }
}

fn register_helpers(registry: &mut Handlebars<'static>) {
    handlebars_helper!(normalize_helper: |value: Json| normalize(value.as_str().unwrap_or("")));

    registry.register_helper("normalize", Box::new(normalize_helper));
}

/// Strip invisible format-control characters and collapse blank-line runs.
pub fn normalize(text: &str) -> String {
    let visible: String = text.chars().filter(|c| !is_format_control(*c)).collect();
    NEWLINE_RUN_RE.replace_all(&visible, "\n").into_owned()
}

/// Unicode general category Cf.
fn is_format_control(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
    )
}
