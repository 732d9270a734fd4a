//! Formatting tree produced by the inline tokenizer.
//!
//! Every node carries a half-open [`Span`] of char offsets into the source
//! text the tree was parsed from. The tree is a plain owned value: it is
//! built once per parse pass and never mutated afterwards.

use std::fmt::{self, Write as _};

use serde::Serialize;
use smol_str::SmolStr;

/// Half-open range of char offsets into the parsed source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether `other` lies entirely inside this span.
    pub fn contains_span(&self, other: &Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

/// The three inline formatting kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Bold,
    Italic,
    Strikethrough,
}

impl FormatKind {
    /// Marker text that opens and closes this kind.
    pub fn marker(self) -> &'static str {
        match self {
            FormatKind::Bold => "**",
            FormatKind::Italic => "*",
            FormatKind::Strikethrough => "~~",
        }
    }

    /// Marker length in chars.
    pub fn marker_len(self) -> usize {
        self.marker().len()
    }

    /// Markup tag name this kind renders to.
    pub fn tag(self) -> &'static str {
        match self {
            FormatKind::Bold => "b",
            FormatKind::Italic => "i",
            FormatKind::Strikethrough => "s",
        }
    }

    /// Map a markup tag name back to its kind (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("b") {
            Some(FormatKind::Bold)
        } else if tag.eq_ignore_ascii_case("i") {
            Some(FormatKind::Italic)
        } else if tag.eq_ignore_ascii_case("s") {
            Some(FormatKind::Strikethrough)
        } else {
            None
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Root of a parsed text. Never rendered itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub children: Vec<Block>,
}

/// Block-level node. Only paragraphs exist; they never nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Paragraph(Paragraph),
}

/// One line of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub children: Vec<Inline>,
    pub span: Span,
}

/// Inline node: either a literal run or a formatting span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text(Text),
    Format(Format),
}

/// Literal text run.
///
/// For runs read straight from the source, `value` has exactly
/// `span.len()` chars. Text collapsed from an unterminated formatting
/// node keeps the node's full span but only its direct text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    pub value: SmolStr,
    pub span: Span,
}

/// A closed bold, italic or strikethrough span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Format {
    pub kind: FormatKind,
    pub children: Vec<Inline>,
    pub span: Span,
}

impl Inline {
    pub fn span(&self) -> Span {
        match self {
            Inline::Text(text) => text.span,
            Inline::Format(format) => format.span,
        }
    }

    /// Children of a formatting node; empty for text.
    pub fn children(&self) -> &[Inline] {
        match self {
            Inline::Text(_) => &[],
            Inline::Format(format) => &format.children,
        }
    }

    pub fn format_kind(&self) -> Option<FormatKind> {
        match self {
            Inline::Text(_) => None,
            Inline::Format(format) => Some(format.kind),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Inline::Text(_))
    }

    /// Append this node as markdown source to `out`.
    pub fn write_markdown(&self, out: &mut String) {
        match self {
            Inline::Text(text) => out.push_str(&text.value),
            Inline::Format(format) => {
                let marker = format.kind.marker();
                out.push_str(marker);
                for child in &format.children {
                    child.write_markdown(out);
                }
                out.push_str(marker);
            }
        }
    }
}

impl Block {
    pub fn span(&self) -> Span {
        match self {
            Block::Paragraph(paragraph) => paragraph.span,
        }
    }

    pub fn children(&self) -> &[Inline] {
        match self {
            Block::Paragraph(paragraph) => &paragraph.children,
        }
    }
}

impl Document {
    /// True if any node below the paragraph level is not plain text.
    pub fn has_markdown_syntax(&self) -> bool {
        self.children
            .iter()
            .any(|block| block.children().iter().any(|inline| !inline.is_text()))
    }

    /// Serialize the tree back to marker syntax, one line per paragraph.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for (idx, block) in self.children.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            for inline in block.children() {
                inline.write_markdown(&mut out);
            }
        }
        out
    }

    /// Depth-first visit of every inline node together with its parent span.
    pub fn walk_inlines<F>(&self, mut visit: F)
    where
        F: FnMut(&Inline, Span),
    {
        fn walk<F: FnMut(&Inline, Span)>(nodes: &[Inline], parent: Span, visit: &mut F) {
            for node in nodes {
                visit(node, parent);
                walk(node.children(), node.span(), visit);
            }
        }

        for block in &self.children {
            walk(block.children(), block.span(), &mut visit);
        }
    }
}

/// True if any node in `nodes` (at any depth) is a formatting node.
pub fn has_markdown_syntax(nodes: &[Inline]) -> bool {
    nodes.iter().any(|node| !node.is_text())
}

/// Compact one-line debug rendering, e.g. `b[0,8){"a "[2,4)}`.
pub fn outline(nodes: &[Inline]) -> String {
    fn write_nodes(nodes: &[Inline], out: &mut String) {
        for (idx, node) in nodes.iter().enumerate() {
            if idx > 0 {
                out.push(' ');
            }
            match node {
                Inline::Text(text) => {
                    let _ = write!(out, "{:?}[{},{})", text.value.as_str(), text.span.start, text.span.end);
                }
                Inline::Format(format) => {
                    let _ = write!(out, "{}[{},{}){{", format.kind, format.span.start, format.span.end);
                    write_nodes(&format.children, out);
                    out.push('}');
                }
            }
        }
    }

    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str, start: usize, end: usize) -> Inline {
        Inline::Text(Text {
            value: value.into(),
            span: Span::new(start, end),
        })
    }

    #[test]
    fn test_format_kind_tags() {
        assert_eq!(FormatKind::Bold.tag(), "b");
        assert_eq!(FormatKind::from_tag("I"), Some(FormatKind::Italic));
        assert_eq!(FormatKind::from_tag("s"), Some(FormatKind::Strikethrough));
        assert_eq!(FormatKind::from_tag("em"), None);
        assert_eq!(FormatKind::Strikethrough.marker_len(), 2);
    }

    #[test]
    fn test_has_markdown_syntax() {
        let plain = Document {
            children: vec![Block::Paragraph(Paragraph {
                children: vec![text("hi", 0, 2)],
                span: Span::new(0, 2),
            })],
        };
        assert!(!plain.has_markdown_syntax());
        assert!(!Document::default().has_markdown_syntax());

        let bold = Document {
            children: vec![Block::Paragraph(Paragraph {
                children: vec![Inline::Format(Format {
                    kind: FormatKind::Bold,
                    children: vec![text("hi", 2, 4)],
                    span: Span::new(0, 6),
                })],
                span: Span::new(0, 6),
            })],
        };
        assert!(bold.has_markdown_syntax());
        assert_eq!(bold.to_markdown(), "**hi**");
    }

    #[test]
    fn test_outline() {
        let nodes = vec![
            Inline::Format(Format {
                kind: FormatKind::Italic,
                children: vec![text("x", 1, 2)],
                span: Span::new(0, 3),
            }),
            text("y", 3, 4),
        ];
        assert_eq!(outline(&nodes), r#"i[0,3){"x"[1,2)} "y"[3,4)"#);
    }
}
