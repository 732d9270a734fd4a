//! Markup rendering for text leaves.
//!
//! Output is limited to `<b>`, `<i>`, `<s>` and escaped text. A [`Fragment`]
//! is the structured form handed to a surface; its `Display` impl is the
//! serialized markup.

use std::fmt;

use smol_str::SmolStr;

use crate::ast::{FormatKind, Inline};
use crate::inline::parse_inline;

/// One node of rendered markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element {
        kind: FormatKind,
        children: Vec<MarkupNode>,
    },
    Text(SmolStr),
}

/// An ordered run of markup nodes that replaces a single text leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<MarkupNode>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text node. Empty text is skipped.
    pub fn push_text(&mut self, text: impl Into<SmolStr>) {
        let text = text.into();
        if !text.is_empty() {
            self.nodes.push(MarkupNode::Text(text));
        }
    }

    pub fn push_element(&mut self, kind: FormatKind, children: Fragment) {
        self.nodes.push(MarkupNode::Element {
            kind,
            children: children.nodes,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Plain text of the fragment with all tags removed.
    pub fn text(&self) -> String {
        fn collect(nodes: &[MarkupNode], out: &mut String) {
            for node in nodes {
                match node {
                    MarkupNode::Text(text) => out.push_str(text),
                    MarkupNode::Element { children, .. } => collect(children, out),
                }
            }
        }

        let mut out = String::new();
        collect(&self.nodes, &mut out);
        out
    }
}

impl fmt::Display for MarkupNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupNode::Text(text) => write_escaped(f, text),
            MarkupNode::Element { kind, children } => {
                write!(f, "<{}>", kind.tag())?;
                for child in children {
                    write!(f, "{child}")?;
                }
                write!(f, "</{}>", kind.tag())
            }
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

fn write_escaped<W: fmt::Write>(out: &mut W, text: &str) -> fmt::Result {
    let mut last = 0;
    for (idx, c) in text.char_indices() {
        let escaped = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            _ => continue,
        };
        out.write_str(&text[last..idx])?;
        out.write_str(escaped)?;
        last = idx + c.len_utf8();
    }
    out.write_str(&text[last..])
}

/// Escape `&`, `<` and `>`. Nothing else is touched.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = write_escaped(&mut out, text);
    out
}

/// Render an inline tree under an ambient tag.
///
/// A formatting node whose kind matches `ambient` renders its children
/// directly instead of re-wrapping them in the same tag.
pub fn render_inline(nodes: &[Inline], ambient: Option<FormatKind>) -> Fragment {
    let mut out = Fragment::new();
    for node in nodes {
        render_node(node, ambient, &mut out);
    }
    out
}

fn render_node(node: &Inline, ambient: Option<FormatKind>, out: &mut Fragment) {
    match node {
        Inline::Text(text) => out.push_text(text.value.clone()),
        Inline::Format(format) if ambient == Some(format.kind) => {
            for child in &format.children {
                render_node(child, ambient, out);
            }
        }
        Inline::Format(format) => {
            let mut inner = Fragment::new();
            for child in &format.children {
                render_node(child, Some(format.kind), &mut inner);
            }
            out.push_element(format.kind, inner);
        }
    }
}

/// Re-tokenize a leaf's own text and render it for in-place replacement.
///
/// With `wrap_ambient`, the result is wrapped in the ambient tag so that
/// swapping it in for the leaf reproduces the leaf's formatting context.
pub fn render_leaf(text: &str, ambient: Option<FormatKind>, wrap_ambient: bool) -> Fragment {
    let nodes = parse_inline(text, 0);
    let body = render_inline(&nodes, ambient);

    match ambient {
        Some(kind) if wrap_ambient => {
            let mut wrapped = Fragment::new();
            wrapped.push_element(kind, body);
            wrapped
        }
        _ => body,
    }
}

/// Render full text to markup, one line at a time, joined with `\n`.
pub fn render_markup(text: &str) -> String {
    text.split('\n')
        .map(|line| render_leaf(line, None, false).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
