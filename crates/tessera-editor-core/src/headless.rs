//! In-memory editable surface.
//!
//! A minimal element/text node tree with a collapsed caret, enough to run
//! the synchronizer without a display. Node handles are arena indices
//! tagged with a generation. Removed subtrees go back on a free list, and a
//! handle to a removed node no longer resolves.
//!
//! Offsets are chars. A caret anchored in a text node uses an in-node char
//! offset; one anchored in an element uses a child index, the same way a
//! DOM range boundary does.

use smol_str::SmolStr;

use crate::error::SurfaceError;
use crate::render::{Fragment, MarkupNode, escape_html};
use crate::surface::Surface;
use crate::types::CaretAnchor;

/// Handle to a node of a [`HeadlessSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
enum NodeData {
    Element { tag: SmolStr, children: Vec<NodeId> },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeSlot {
    data: NodeData,
    parent: Option<NodeId>,
    generation: u32,
}

/// Surface backed by an in-memory node tree.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    nodes: Vec<NodeSlot>,
    free: Vec<usize>,
    root: NodeId,
    caret: Option<CaretAnchor<NodeId>>,
    editable: bool,
    suspended: bool,
    frames: u64,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    /// Empty surface with no caret.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeSlot {
                data: NodeData::Element {
                    tag: SmolStr::new_static("div"),
                    children: Vec::new(),
                },
                parent: None,
                generation: 0,
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            caret: None,
            editable: false,
            suspended: false,
            frames: 0,
        }
    }

    /// Surface holding a single text node, caret at the end.
    pub fn with_text(text: &str) -> Self {
        let mut surface = Self::new();
        surface.set_text_content(text);
        surface
    }

    /// Surface holding rendered markup, caret at the end.
    pub fn with_fragment(fragment: &Fragment) -> Self {
        let mut surface = Self::new();
        let root = surface.root;
        let ids: Vec<NodeId> = fragment
            .nodes
            .iter()
            .map(|node| surface.build(node, root))
            .collect();
        surface.set_children(root, ids);
        surface.move_caret_to_end();
        surface
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Slots in the node arena, live or free.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of frames that have elapsed.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance to the next frame, resuming suspended notifications.
    pub fn next_frame(&mut self) {
        self.frames += 1;
        if self.suspended {
            tracing::trace!(frame = self.frames, "resuming notifications");
        }
        self.suspended = false;
    }

    /// Drop the caret, as when the surface loses focus.
    pub fn clear_caret(&mut self) {
        self.caret = None;
    }

    /// Insert text at the caret as if the user typed it.
    ///
    /// Without a caret, the caret is first moved to the end of the text.
    pub fn type_text(&mut self, text: &str) {
        if self.selection_anchor().is_none() {
            self.move_caret_to_end();
        }
        let Some(anchor) = self.caret.clone() else {
            return;
        };
        let typed = text.chars().count();

        if let NodeData::Text(existing) = &mut self.nodes[anchor.node.index].data {
            let byte = byte_index(existing, anchor.offset);
            existing.insert_str(byte, text);
            self.caret = Some(CaretAnchor::new(anchor.node, anchor.offset + typed));
            return;
        }

        let id = self.alloc(NodeData::Text(text.to_string()), Some(anchor.node));
        if let NodeData::Element { children, .. } = &mut self.nodes[anchor.node.index].data {
            let idx = anchor.offset.min(children.len());
            children.insert(idx, id);
        }
        self.caret = Some(CaretAnchor::new(id, typed));
    }

    /// Serialize the surface content as markup.
    pub fn markup(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.index].data {
            NodeData::Text(text) => out.push_str(&escape_html(text)),
            NodeData::Element { tag, children } => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                for &child in children {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn alloc(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.nodes[index];
            slot.data = data;
            slot.parent = parent;
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.nodes.push(NodeSlot {
            data,
            parent,
            generation: 0,
        });
        NodeId {
            index: self.nodes.len() - 1,
            generation: 0,
        }
    }

    /// Return a detached subtree's slots to the free list.
    fn release(&mut self, id: NodeId) {
        if self.slot(id).is_none() {
            return;
        }
        let slot = &mut self.nodes[id.index];
        let data = std::mem::replace(&mut slot.data, NodeData::Text(String::new()));
        slot.parent = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        if let NodeData::Element { children, .. } = data {
            for child in children {
                self.release(child);
            }
        }
    }

    fn build(&mut self, node: &MarkupNode, parent: NodeId) -> NodeId {
        match node {
            MarkupNode::Text(text) => self.alloc(NodeData::Text(text.to_string()), Some(parent)),
            MarkupNode::Element { kind, children } => {
                let id = self.alloc(
                    NodeData::Element {
                        tag: SmolStr::new_static(kind.tag()),
                        children: Vec::new(),
                    },
                    Some(parent),
                );
                let child_ids = children.iter().map(|child| self.build(child, id)).collect();
                self.set_children(id, child_ids);
                id
            }
        }
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.index].data {
            NodeData::Element { children, .. } => children,
            NodeData::Text(_) => &[],
        }
    }

    fn set_children(&mut self, id: NodeId, ids: Vec<NodeId>) {
        if let NodeData::Element { children, .. } = &mut self.nodes[id.index].data {
            *children = ids;
        }
    }

    /// Slot for a live handle.
    fn slot(&self, id: NodeId) -> Option<&NodeSlot> {
        self.nodes
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
    }

    fn get(&self, id: NodeId) -> Result<&NodeSlot, SurfaceError> {
        self.slot(id).ok_or(SurfaceError::NodeNotFound)
    }

    fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.slot(current).and_then(|slot| slot.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn text_len_of(&self, id: NodeId) -> usize {
        match &self.nodes[id.index].data {
            NodeData::Text(text) => text.chars().count(),
            NodeData::Element { children, .. } => {
                children.iter().map(|&child| self.text_len_of(child)).sum()
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.index].data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { children, .. } => {
                for &child in children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match &self.nodes[id.index].data {
            NodeData::Text(_) => out.push(id),
            NodeData::Element { children, .. } => {
                for &child in children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    /// Absolute offset of a boundary point, or `None` if `target` is not in
    /// the tree under `id`.
    fn offset_of(&self, id: NodeId, target: &CaretAnchor<NodeId>, acc: &mut usize) -> Option<usize> {
        if id == target.node {
            return Some(match &self.nodes[id.index].data {
                NodeData::Text(_) => *acc + target.offset,
                NodeData::Element { children, .. } => {
                    let before: usize = children
                        .iter()
                        .take(target.offset)
                        .map(|&child| self.text_len_of(child))
                        .sum();
                    *acc + before
                }
            });
        }

        match &self.nodes[id.index].data {
            NodeData::Text(text) => {
                *acc += text.chars().count();
                None
            }
            NodeData::Element { children, .. } => children
                .iter()
                .find_map(|&child| self.offset_of(child, target, acc)),
        }
    }

    /// Boundary point for an absolute offset: the first text node whose end
    /// reaches the offset.
    fn locate(&self, offset: usize) -> Option<CaretAnchor<NodeId>> {
        let mut leaves = Vec::new();
        self.collect_leaves(self.root, &mut leaves);

        let mut acc = 0;
        for &leaf in &leaves {
            let len = self.text_len_of(leaf);
            if acc + len >= offset {
                return Some(CaretAnchor::new(leaf, offset - acc));
            }
            acc += len;
        }

        match leaves.last() {
            Some(&leaf) if offset == acc => Some(CaretAnchor::new(leaf, self.text_len_of(leaf))),
            None if offset == 0 => Some(CaretAnchor::new(self.root, 0)),
            _ => None,
        }
    }

    fn move_caret_to_end(&mut self) {
        let len = self.text_len_of(self.root);
        self.caret = self.locate(len);
    }
}

fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

impl Surface for HeadlessSurface {
    type Node = NodeId;

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(self.root, &mut out);
        out
    }

    fn set_text_content(&mut self, text: &str) {
        for child in self.children(self.root).to_vec() {
            self.release(child);
        }
        let ids = if text.is_empty() {
            Vec::new()
        } else {
            vec![self.alloc(NodeData::Text(text.to_string()), Some(self.root))]
        };
        self.set_children(self.root, ids);
        self.move_caret_to_end();
    }

    fn text_len(&self) -> usize {
        self.text_len_of(self.root)
    }

    fn text_leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    fn leaf_text(&self, leaf: &NodeId) -> Option<String> {
        match &self.slot(*leaf)?.data {
            NodeData::Text(text) => Some(text.clone()),
            NodeData::Element { .. } => None,
        }
    }

    fn ancestor_tags(&self, node: &NodeId) -> Vec<String> {
        let mut tags = Vec::new();
        let mut current = self.slot(*node).and_then(|slot| slot.parent);
        while let Some(id) = current {
            if id == self.root {
                break;
            }
            if let NodeData::Element { tag, .. } = &self.nodes[id.index].data {
                tags.push(tag.to_string());
            }
            current = self.nodes[id.index].parent;
        }
        tags
    }

    fn replace_leaf(&mut self, leaf: &NodeId, fragment: &Fragment) -> Result<(), SurfaceError> {
        let slot = self.get(*leaf)?;
        let parent = slot.parent.ok_or(SurfaceError::Detached)?;
        if !self.is_attached(parent) {
            return Err(SurfaceError::Detached);
        }
        let idx = self
            .children(parent)
            .iter()
            .position(|child| child == leaf)
            .ok_or(SurfaceError::Detached)?;

        let ids: Vec<NodeId> = fragment
            .nodes
            .iter()
            .map(|node| self.build(node, parent))
            .collect();
        let count = ids.len();

        if let NodeData::Element { children, .. } = &mut self.nodes[parent.index].data {
            children.splice(idx..idx + 1, ids);
        }
        self.release(*leaf);

        // Live-range rules: a caret inside the removed node falls back to
        // the removal point, and later boundaries in the parent shift.
        if let Some(caret) = &mut self.caret {
            if caret.node == *leaf {
                *caret = CaretAnchor::new(parent, idx);
            } else if caret.node == parent && caret.offset > idx {
                caret.offset = caret.offset - 1 + count;
            }
        }

        tracing::trace!(?leaf, ?parent, inserted = count, "replaced leaf");
        Ok(())
    }

    fn selection_anchor(&self) -> Option<CaretAnchor<NodeId>> {
        self.caret
            .clone()
            .filter(|caret| self.is_attached(caret.node))
    }

    fn caret_offset(&self) -> Option<usize> {
        let caret = self.selection_anchor()?;
        let mut acc = 0;
        self.offset_of(self.root, &caret, &mut acc)
    }

    fn set_caret_offset(&mut self, offset: usize) -> Result<(), SurfaceError> {
        let len = self.text_len();
        let anchor = self
            .locate(offset)
            .ok_or(SurfaceError::CaretOutOfRange { offset, len })?;
        tracing::trace!(
            target: "tessera::cursor",
            offset,
            node = ?anchor.node,
            node_offset = anchor.offset,
            "restoring caret"
        );
        self.caret = Some(anchor);
        Ok(())
    }

    fn suspend_notifications(&mut self) {
        self.suspended = true;
    }

    fn notifications_suspended(&self) -> bool {
        self.suspended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FormatKind;
    use crate::config::EditorConfig;
    use crate::render::render_leaf;
    use crate::sync::synchronize;

    #[test]
    fn test_with_text_caret_at_end() {
        let surface = HeadlessSurface::with_text("hello");
        assert_eq!(surface.text_content(), "hello");
        assert_eq!(surface.caret_offset(), Some(5));
        assert_eq!(surface.text_leaves().len(), 1);
    }

    #[test]
    fn test_empty_surface() {
        let mut surface = HeadlessSurface::new();
        assert_eq!(surface.text_len(), 0);
        assert_eq!(surface.caret_offset(), None);
        surface.type_text("hi");
        assert_eq!(surface.text_content(), "hi");
        assert_eq!(surface.caret_offset(), Some(2));
    }

    #[test]
    fn test_type_text_at_caret() {
        let mut surface = HeadlessSurface::with_text("held");
        surface.set_caret_offset(3).unwrap();
        surface.type_text("lo worl");
        assert_eq!(surface.text_content(), "hello world");
        assert_eq!(surface.caret_offset(), Some(10));
    }

    #[test]
    fn test_with_fragment_markup() {
        let surface = HeadlessSurface::with_fragment(&render_leaf("a **b** c", None, true));
        assert_eq!(surface.markup(), "a <b>b</b> c");
        assert_eq!(surface.text_content(), "a b c");
        assert_eq!(surface.caret_offset(), Some(5));

        let leaves = surface.text_leaves();
        assert_eq!(leaves.len(), 3);
        assert_eq!(surface.ancestor_tags(&leaves[1]), vec!["b".to_string()]);
        assert!(surface.ancestor_tags(&leaves[0]).is_empty());
    }

    #[test]
    fn test_replace_leaf_moves_caret_to_removal_point() {
        let mut surface = HeadlessSurface::with_text("x **y**");
        let leaf = surface.text_leaves()[0];
        surface
            .replace_leaf(&leaf, &render_leaf("x **y**", None, true))
            .unwrap();

        assert_eq!(surface.markup(), "x <b>y</b>");
        assert_eq!(surface.selection_anchor(), Some(CaretAnchor::new(surface.root(), 0)));
        assert_eq!(surface.caret_offset(), Some(0));
        assert_eq!(surface.leaf_text(&leaf), None);
        assert_eq!(
            surface.replace_leaf(&leaf, &Fragment::new()),
            Err(SurfaceError::NodeNotFound)
        );
    }

    #[test]
    fn test_replace_nested_leaf() {
        let mut surface = HeadlessSurface::with_fragment(&render_leaf("**a ~~b~~**", None, true));
        let leaves = surface.text_leaves();
        assert_eq!(
            surface.ancestor_tags(&leaves[1]),
            vec!["s".to_string(), "b".to_string()]
        );

        let replacement = render_leaf("b *c*", Some(FormatKind::Strikethrough), true);
        surface.replace_leaf(&leaves[1], &replacement).unwrap();
        assert_eq!(surface.markup(), "<b>a <s><s>b <i>c</i></s></s></b>");
    }

    #[test]
    fn test_set_caret_offset_bounds() {
        let mut surface = HeadlessSurface::with_fragment(&render_leaf("ab*cd*", None, true));
        surface.set_caret_offset(2).unwrap();
        // Offset 2 sits at the end of the first leaf, not the start of the next.
        assert_eq!(surface.selection_anchor(), Some(CaretAnchor::new(surface.text_leaves()[0], 2)));
        assert_eq!(surface.caret_offset(), Some(2));

        assert_eq!(
            surface.set_caret_offset(5),
            Err(SurfaceError::CaretOutOfRange { offset: 5, len: 4 })
        );
    }

    #[test]
    fn test_suspend_until_next_frame() {
        let mut surface = HeadlessSurface::new();
        surface.suspend_notifications();
        assert!(surface.notifications_suspended());
        surface.next_frame();
        assert!(!surface.notifications_suspended());
        assert_eq!(surface.frames(), 1);
    }

    #[test]
    fn test_set_text_content_detaches_old_nodes() {
        let mut surface = HeadlessSurface::with_text("old");
        let old = surface.text_leaves()[0];
        surface.set_text_content("");
        assert_eq!(surface.text_len(), 0);
        assert_eq!(surface.caret_offset(), Some(0));
        assert_eq!(surface.replace_leaf(&old, &Fragment::new()), Err(SurfaceError::NodeNotFound));
    }

    #[test]
    fn test_stale_handle_does_not_resolve_to_reused_slot() {
        let mut surface = HeadlessSurface::with_text("old");
        let old = surface.text_leaves()[0];
        surface.set_text_content("new");
        let new = surface.text_leaves()[0];

        assert_ne!(old, new);
        assert_eq!(surface.arena_len(), 2);
        assert_eq!(surface.leaf_text(&old), None);
        assert_eq!(surface.leaf_text(&new).as_deref(), Some("new"));
        assert!(surface.ancestor_tags(&old).is_empty());
    }

    #[test]
    fn test_repeated_sync_reuses_arena_slots() {
        let config = EditorConfig {
            wrap_ambient: false,
            ..EditorConfig::default()
        };
        let mut surface = HeadlessSurface::with_text("a *b* c");
        surface.clear_caret();

        synchronize(&mut surface, &config);
        let settled = surface.arena_len();
        for _ in 0..999 {
            synchronize(&mut surface, &config);
        }

        assert_eq!(surface.markup(), "a <i>b</i> c");
        assert_eq!(surface.text_leaves().len(), 3);
        assert_eq!(surface.arena_len(), settled);
    }
}
