//! Block splitting and the retained, stale-tolerant formatting tree.

use crate::ast::{Block, Document, Paragraph, Span};
use crate::inline::parse_inline;

/// Parses surface text and keeps the last tree that carried formatting.
///
/// The retained tree is only replaced by a tree that contains at least one
/// formatting node. Plain-text parses are thrown away, so the retained tree
/// may describe text the surface no longer holds.
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser {
    tree: Document,
    last_text: String,
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the full surface text.
    ///
    /// Returns the retained tree and whether it was replaced by this call.
    /// Text identical to the last accepted text short-circuits without
    /// tokenizing.
    pub fn parse(&mut self, text: &str) -> (&Document, bool) {
        if text == self.last_text {
            return (&self.tree, false);
        }

        let candidate = parse_blocks(text);
        if candidate.has_markdown_syntax() {
            tracing::debug!(
                paragraphs = candidate.children.len(),
                "accepting tree with formatting"
            );
            self.tree = candidate;
            self.last_text.clear();
            self.last_text.push_str(text);
            return (&self.tree, true);
        }

        tracing::trace!("plain-text parse discarded, keeping retained tree");
        (&self.tree, false)
    }

    /// The retained tree.
    pub fn tree(&self) -> &Document {
        &self.tree
    }

    /// Text the retained tree was parsed from.
    pub fn last_text(&self) -> &str {
        &self.last_text
    }
}

/// Split `text` on `\n` and tokenize each line as a paragraph.
///
/// Empty text yields no paragraphs and a trailing newline does not start an
/// empty final paragraph; empty lines between newlines do become empty
/// paragraphs.
pub fn parse_blocks(text: &str) -> Document {
    let mut children = Vec::new();
    let mut pos = 0;

    for line in text.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let len = content.chars().count();

        children.push(Block::Paragraph(Paragraph {
            children: parse_inline(content, pos),
            span: Span::new(pos, pos + len),
        }));

        pos += line.chars().count();
    }

    Document { children }
}
