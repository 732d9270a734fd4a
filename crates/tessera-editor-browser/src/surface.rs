//! [`Surface`] over a contenteditable element.

use std::cell::Cell;
use std::rc::Rc;

use tessera_editor_core::{CaretAnchor, Fragment, MarkupNode, Surface, SurfaceError};
use wasm_bindgen::JsCast;

use crate::cursor::{self, js_err};
use crate::frame::resume_next_frame;

/// A contenteditable element driven as an editable surface.
///
/// Offsets are UTF-16 code units, matching DOM selection offsets.
#[derive(Clone)]
pub struct BrowserSurface {
    element: web_sys::HtmlElement,
    suspended: Rc<Cell<bool>>,
}

impl BrowserSurface {
    pub fn new(element: web_sys::HtmlElement) -> Self {
        Self {
            element,
            suspended: Rc::new(Cell::new(false)),
        }
    }

    /// Look up the editor element by id.
    pub fn from_id(id: &str) -> Option<Self> {
        let element = web_sys::window()?
            .document()?
            .get_element_by_id(id)?
            .dyn_into::<web_sys::HtmlElement>()
            .ok()?;
        Some(Self::new(element))
    }

    pub fn element(&self) -> &web_sys::HtmlElement {
        &self.element
    }

    fn root(&self) -> &web_sys::Node {
        self.element.as_ref()
    }

    fn document(&self) -> Result<web_sys::Document, SurfaceError> {
        Ok(self.root().owner_document().ok_or("no document")?)
    }

    fn build_node(
        document: &web_sys::Document,
        node: &MarkupNode,
    ) -> Result<web_sys::Node, SurfaceError> {
        match node {
            MarkupNode::Text(text) => Ok(document.create_text_node(text).into()),
            MarkupNode::Element { kind, children } => {
                let element = document
                    .create_element(kind.tag())
                    .map_err(|e| js_err("create_element", e))?;
                for child in children {
                    let child = Self::build_node(document, child)?;
                    element
                        .append_child(&child)
                        .map_err(|e| js_err("append_child", e))?;
                }
                Ok(element.into())
            }
        }
    }
}

impl Surface for BrowserSurface {
    type Node = web_sys::Node;

    fn set_editable(&mut self, editable: bool) {
        self.element
            .set_content_editable(if editable { "true" } else { "false" });
    }

    fn text_content(&self) -> String {
        self.root().text_content().unwrap_or_default()
    }

    fn source_text(&self) -> String {
        self.element.inner_text()
    }

    fn set_text_content(&mut self, text: &str) {
        // innerText turns `\n` back into line breaks.
        self.element.set_inner_text(text);
        let end = self.text_len();
        if let Err(e) = self.set_caret_offset(end) {
            tracing::debug!("could not move caret to end: {e}");
        }
    }

    fn text_len(&self) -> usize {
        self.measure(&self.text_content())
    }

    fn measure(&self, text: &str) -> usize {
        text.encode_utf16().count()
    }

    fn text_leaves(&self) -> Vec<web_sys::Node> {
        cursor::text_nodes(self.root()).unwrap_or_else(|e| {
            tracing::warn!("failed to walk text nodes: {e}");
            Vec::new()
        })
    }

    fn leaf_text(&self, leaf: &web_sys::Node) -> Option<String> {
        if leaf.node_type() != web_sys::Node::TEXT_NODE {
            return None;
        }
        leaf.text_content()
    }

    fn ancestor_tags(&self, node: &web_sys::Node) -> Vec<String> {
        let mut tags = Vec::new();
        let mut current = node.parent_node();
        while let Some(parent) = current {
            if &parent == self.root() {
                break;
            }
            if let Some(element) = parent.dyn_ref::<web_sys::Element>() {
                tags.push(element.tag_name().to_ascii_lowercase());
            }
            current = parent.parent_node();
        }
        tags
    }

    fn replace_leaf(&mut self, leaf: &web_sys::Node, fragment: &Fragment) -> Result<(), SurfaceError> {
        if !self.root().contains(Some(leaf)) {
            return Err(SurfaceError::Detached);
        }
        let parent = leaf.parent_node().ok_or(SurfaceError::Detached)?;
        let document = self.document()?;

        let replacement = document.create_document_fragment();
        for node in &fragment.nodes {
            let node = Self::build_node(&document, node)?;
            replacement
                .append_child(&node)
                .map_err(|e| js_err("append_child", e))?;
        }

        parent
            .replace_child(&replacement, leaf)
            .map_err(|e| js_err("replace_child", e))?;
        Ok(())
    }

    fn selection_anchor(&self) -> Option<CaretAnchor<web_sys::Node>> {
        cursor::selection_anchor(self.root())
    }

    fn caret_offset(&self) -> Option<usize> {
        cursor::caret_offset(self.root())
    }

    fn set_caret_offset(&mut self, offset: usize) -> Result<(), SurfaceError> {
        cursor::restore_caret(self.root(), offset)
    }

    fn suspend_notifications(&mut self) {
        self.suspended.set(true);
        resume_next_frame(self.suspended.clone());
    }

    fn notifications_suspended(&self) -> bool {
        self.suspended.get()
    }
}
