//! Inline tokenizer: one left-to-right scan with an explicit open-format list.
//!
//! Markers toggle by kind. A marker closes the open node of its kind at
//! whatever depth that node sits, not only the innermost one, so
//! `**a *b** c*` closes bold at the second `**` even though italic opened
//! later. Nodes left open inside a node that closes are stranded: they can
//! no longer be closed and collapse to text at the end of the scan.
//!
//! Nodes are built in a scratch arena so open nodes can keep receiving
//! children after they have been linked into their parent, and so an
//! unterminated node can be rewritten in place as text.

use smol_str::SmolStr;

use crate::ast::{Format, FormatKind, Inline, Span, Text};

/// Tokenize one line of text.
///
/// `base` is the char offset of `text` within the full source; all spans in
/// the result are absolute.
pub fn parse_inline(text: &str, base: usize) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    let mut builder = TreeBuilder::new(base);
    let mut pos = 0;

    while pos < chars.len() {
        match marker_at(&chars, pos) {
            Some(kind) => {
                builder.flush(pos);
                builder.toggle(kind, pos);
                pos += kind.marker_len();
            }
            None => {
                builder.push_char(chars[pos]);
                pos += 1;
            }
        }
    }

    builder.flush(pos);
    builder.finish(pos)
}

/// Recognize a marker at `pos`. Two-char markers win over `*`.
fn marker_at(chars: &[char], pos: usize) -> Option<FormatKind> {
    let next = chars.get(pos + 1).copied();
    match (chars[pos], next) {
        ('~', Some('~')) => Some(FormatKind::Strikethrough),
        ('*', Some('*')) => Some(FormatKind::Bold),
        ('*', _) => Some(FormatKind::Italic),
        _ => None,
    }
}

type NodeId = usize;

#[derive(Debug)]
enum ScratchKind {
    Text(SmolStr),
    Format(FormatKind),
}

#[derive(Debug)]
struct ScratchNode {
    kind: ScratchKind,
    start: usize,
    /// `None` while a formatting node is unterminated.
    end: Option<usize>,
    children: Vec<NodeId>,
}

/// An open formatting node awaiting its closing marker.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    kind: FormatKind,
    node: NodeId,
}

/// Ordered list of open formatting nodes, outermost first.
///
/// Lookup is by kind at any depth; at most one entry per kind is open at a
/// time because a second marker of the same kind closes the first.
#[derive(Debug, Default)]
struct OpenFormats {
    entries: Vec<OpenEntry>,
}

impl OpenFormats {
    /// Index of the open entry of `kind`, searching from the innermost out.
    fn position(&self, kind: FormatKind) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.kind == kind)
    }

    fn innermost(&self) -> Option<NodeId> {
        self.entries.last().map(|entry| entry.node)
    }

    fn push(&mut self, entry: OpenEntry) {
        self.entries.push(entry);
    }

    /// Remove the entry at `idx`, returning it along with every entry opened
    /// after it (innermost last).
    fn close_at(&mut self, idx: usize) -> (OpenEntry, Vec<OpenEntry>) {
        let stranded = self.entries.split_off(idx + 1);
        let closed = self.entries.remove(idx);
        (closed, stranded)
    }
}

/// Nodes stranded by a close, with the offset their text must end at.
#[derive(Debug)]
struct StrandedBatch {
    nodes: Vec<NodeId>,
    end: usize,
}

#[derive(Debug)]
struct TreeBuilder {
    base: usize,
    arena: Vec<ScratchNode>,
    roots: Vec<NodeId>,
    open: OpenFormats,
    stranded: Vec<StrandedBatch>,
    buffer: String,
    buffer_len: usize,
}

impl TreeBuilder {
    fn new(base: usize) -> Self {
        Self {
            base,
            arena: Vec::new(),
            roots: Vec::new(),
            open: OpenFormats::default(),
            stranded: Vec::new(),
            buffer: String::new(),
            buffer_len: 0,
        }
    }

    fn push_char(&mut self, c: char) {
        self.buffer.push(c);
        self.buffer_len += 1;
    }

    fn alloc(&mut self, node: ScratchNode) -> NodeId {
        self.arena.push(node);
        self.arena.len() - 1
    }

    /// Link `id` under the innermost open node, or at top level.
    fn attach(&mut self, id: NodeId) {
        match self.open.innermost() {
            Some(parent) => self.arena[parent].children.push(id),
            None => self.roots.push(id),
        }
    }

    /// Turn the pending literal run ending at `pos` into a text node.
    fn flush(&mut self, pos: usize) {
        if self.buffer.is_empty() {
            return;
        }
        let end = self.base + pos;
        let start = end - self.buffer_len;
        let value = SmolStr::from(std::mem::take(&mut self.buffer));
        self.buffer_len = 0;

        let id = self.alloc(ScratchNode {
            kind: ScratchKind::Text(value),
            start,
            end: Some(end),
            children: Vec::new(),
        });
        self.attach(id);
    }

    fn toggle(&mut self, kind: FormatKind, pos: usize) {
        let marker_start = self.base + pos;

        if let Some(idx) = self.open.position(kind) {
            let (closed, stranded) = self.open.close_at(idx);
            self.arena[closed.node].end = Some(marker_start + kind.marker_len());

            if !stranded.is_empty() {
                tracing::trace!(
                    closed = %kind,
                    stranded = stranded.len(),
                    at = marker_start,
                    "closing marker strands open nodes"
                );
                self.stranded.push(StrandedBatch {
                    nodes: stranded.iter().map(|entry| entry.node).collect(),
                    end: marker_start,
                });
            }
            return;
        }

        let id = self.alloc(ScratchNode {
            kind: ScratchKind::Format(kind),
            start: marker_start,
            end: None,
            children: Vec::new(),
        });
        self.attach(id);
        self.open.push(OpenEntry { kind, node: id });
    }

    /// Collapse every unterminated node and produce the final tree.
    fn finish(mut self, pos: usize) -> Vec<Inline> {
        let eof = self.base + pos;

        for batch in std::mem::take(&mut self.stranded) {
            for &node in batch.nodes.iter().rev() {
                self.collapse(node, batch.end);
            }
        }

        let open = std::mem::take(&mut self.open.entries);
        for entry in open.iter().rev() {
            self.collapse(entry.node, eof);
        }

        let roots = std::mem::take(&mut self.roots);
        roots.iter().map(|&id| self.build(id)).collect()
    }

    /// Rewrite an unterminated node in place as text made of its direct
    /// text children. Marker characters and formatted children are dropped.
    fn collapse(&mut self, id: NodeId, end: usize) {
        let children = std::mem::take(&mut self.arena[id].children);
        let mut value = String::new();
        for child in children {
            if let ScratchKind::Text(text) = &self.arena[child].kind {
                value.push_str(text);
            }
        }

        let node = &mut self.arena[id];
        node.kind = ScratchKind::Text(SmolStr::from(value));
        node.end = Some(end);
    }

    fn build(&self, id: NodeId) -> Inline {
        let node = &self.arena[id];
        // Every format node was either closed or collapsed by `finish`.
        let span = Span::new(node.start, node.end.unwrap_or(node.start));
        match &node.kind {
            ScratchKind::Text(value) => Inline::Text(Text {
                value: value.clone(),
                span,
            }),
            ScratchKind::Format(kind) => Inline::Format(Format {
                kind: *kind,
                children: node.children.iter().map(|&child| self.build(child)).collect(),
                span,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::outline;

    fn parse(text: &str) -> String {
        outline(&parse_inline(text, 0))
    }

    fn assert_contained(nodes: &[Inline], parent: Span) {
        let mut prev_end = parent.start;
        for node in nodes {
            let span = node.span();
            assert!(parent.contains_span(&span), "{span:?} escapes {parent:?}");
            assert!(span.start >= prev_end, "{span:?} overlaps previous sibling");
            prev_end = span.end;
            assert_contained(node.children(), span);
        }
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("hello"), r#""hello"[0,5)"#);
        assert_eq!(parse(""), "");
        assert_eq!(parse("a ~ b"), r#""a ~ b"[0,5)"#);
    }

    #[test]
    fn test_simple_formats() {
        assert_eq!(parse("**bold**"), r#"b[0,8){"bold"[2,6)}"#);
        assert_eq!(parse("*it*"), r#"i[0,4){"it"[1,3)}"#);
        assert_eq!(parse("~~gone~~"), r#"s[0,8){"gone"[2,6)}"#);
        assert_eq!(
            parse("a **b** c"),
            r#""a "[0,2) b[2,7){"b"[4,5)} " c"[7,9)"#
        );
    }

    #[test]
    fn test_nested_formats() {
        assert_eq!(
            parse("**a *b* c**"),
            r#"b[0,11){"a "[2,4) i[4,7){"b"[5,6)} " c"[7,9)}"#
        );
        assert_eq!(
            parse("~~**x**~~"),
            r#"s[0,9){b[2,7){"x"[4,5)}}"#
        );
    }

    #[test]
    fn test_longest_marker_wins() {
        // `***` reads as `**` then `*`. The closing `**` finds bold first and
        // strands the italic; the final `*` opens a new, unterminated italic.
        assert_eq!(parse("***x***"), r#"b[0,6){"x"[2,4)} ""[6,7)"#);
    }

    #[test]
    fn test_kind_keyed_close_strands_inner_node() {
        let nodes = parse_inline("**a *b** c*", 0);
        assert_eq!(
            outline(&nodes),
            r#"b[0,8){"a "[2,4) "b"[4,6)} " c"[8,10) ""[10,11)"#
        );
        assert_contained(&nodes, Span::new(0, 11));
    }

    #[test]
    fn test_unterminated_collapses_to_text() {
        assert_eq!(parse("*abc"), r#""abc"[0,4)"#);
        assert_eq!(parse("x **y"), r#""x "[0,2) "y"[2,5)"#);
        assert_eq!(parse("*"), r#"""[0,1)"#);
    }

    #[test]
    fn test_unterminated_drops_nested_markers() {
        // The inner italic collapses first and its text survives, but both
        // markers are gone from the reconstructed value.
        assert_eq!(parse("**a *b"), r#""a b"[0,6)"#);
    }

    #[test]
    fn test_unterminated_drops_closed_children() {
        // Only direct text children survive a collapse; the closed bold
        // inside the dangling italic is lost entirely.
        assert_eq!(parse("*x **y** z"), r#""x  z"[0,10)"#);
    }

    #[test]
    fn test_stranded_inside_open_ancestor() {
        // italic > bold > strike; bold closes and strands strike, italic
        // never closes. Strike collapses before italic reads its children.
        let nodes = parse_inline("*a **b ~~c** d", 0);
        assert_eq!(outline(&nodes), r#""a  d"[0,14)"#);
    }

    #[test]
    fn test_base_offset() {
        assert_eq!(
            outline(&parse_inline("*x*", 10)),
            r#"i[10,13){"x"[11,12)}"#
        );
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        assert_eq!(parse("é**ü**"), r#""é"[0,1) b[1,6){"ü"[3,4)}"#);
    }

    #[test]
    fn test_span_containment() {
        for input in [
            "**a *b** c*",
            "~~a **b~~ c** d",
            "*a ~~b **c* d~~ e**",
            "***x** y*",
            "a*b**c~~d*e**f~~g",
        ] {
            let nodes = parse_inline(input, 0);
            assert_contained(&nodes, Span::new(0, input.chars().count()));
        }
    }
}
