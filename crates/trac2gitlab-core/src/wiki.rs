//! Wiki markup normalization
//!
//! Rewrites Trac-specific idioms the generic converter does not know about,
//! then hands the text to a [`MarkupConverter`].

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `In [changeset:"<rev>[/<repo>]"]:` followed by a `{{{ ... }}}` block,
/// optionally opened by a `#!interpreter` line.
static BLOCK_CHANGESET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?sm)In \[changeset:"([^"/]+?)(?:/[^"]+)?"\]:\n\{\{\{(\n#![^\n]+)?\n(.*?)\n\}\}\}"#)
        .expect("valid block changeset regex")
});

/// `[changeset:<rev>]`
static INLINE_CHANGESET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[changeset:([a-zA-Z0-9]+)\]").expect("valid inline changeset regex")
});

/// Where converted text will be rendered, used to resolve relative links
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasePath {
    Issues,
    Milestones,
    /// Wiki page, by source page name
    WikiPage(String),
}

impl BasePath {
    pub fn as_path(&self) -> String {
        match self {
            BasePath::Issues => "/issues/".to_string(),
            BasePath::Milestones => "/milestones/".to_string(),
            BasePath::WikiPage(name) => {
                let depth = name.trim_matches('/').matches('/').count();
                if depth == 0 {
                    "./".to_string()
                } else {
                    "../".repeat(depth)
                }
            }
        }
    }

    /// Ticket and milestone fields are single-line markup in Trac
    pub fn multiline(&self) -> bool {
        matches!(self, BasePath::WikiPage(_))
    }
}

/// Generic Trac -> Markdown converter
pub trait MarkupConverter {
    fn convert(&self, text: &str, base_path: &str, multiline: bool) -> String;
}

/// Converter that leaves the markup untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl MarkupConverter for Passthrough {
    fn convert(&self, text: &str, _base_path: &str, _multiline: bool) -> String {
        text.to_string()
    }
}

/// Apply both changeset rewrites, block form first
pub fn normalize(text: &str) -> String {
    let text = BLOCK_CHANGESET.replace_all(text, |caps: &Captures| {
        let quoted = caps[3].replace('\n', "\n> ");
        format!("In changeset {}:\n> {}", &caps[1], quoted)
    });
    INLINE_CHANGESET.replace_all(&text, "$1").into_owned()
}

/// Normalize and convert text destined for `base`
pub fn convert(converter: &dyn MarkupConverter, text: &str, base: &BasePath) -> String {
    converter.convert(&normalize(text), &base.as_path(), base.multiline())
}
